//! Account name sanitation and path containment.
//!
//! Names are reduced to `[A-Za-z0-9 _-]` before they ever touch a path,
//! and every path built from a name is checked again after resolution.
//! The second check does not trust the first.

use std::path::{Component, Path, PathBuf};

use crate::errors::{CredSwapError, Result};

/// Longest account name accepted after sanitation.
pub const MAX_NAME_LEN: usize = 100;

/// Strip disallowed characters from an account name.
///
/// Keeps ASCII letters, digits, spaces, underscores and hyphens, then
/// trims surrounding spaces. Fails if nothing is left or the result is
/// longer than [`MAX_NAME_LEN`].
pub fn sanitize_name(raw: &str) -> Result<String> {
    if raw.is_empty() {
        return Err(CredSwapError::InvalidAccountName(
            "account name must be a non-empty string".into(),
        ));
    }

    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .collect();
    let name = kept.trim();

    if name.is_empty() {
        return Err(CredSwapError::InvalidAccountName(
            "account name contains only invalid characters".into(),
        ));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(CredSwapError::InvalidAccountName(format!(
            "account name too long (max {MAX_NAME_LEN} characters)"
        )));
    }

    Ok(name.to_string())
}

/// Verify that `path` resolves to a location strictly inside `base`.
///
/// Both paths are made absolute and `.`/`..` components are folded
/// lexically, so the check holds whether or not the files exist yet.
/// Returns the resolved path.
pub fn ensure_within(path: &Path, base: &Path) -> Result<PathBuf> {
    let resolved = absolutize(path)?;
    let resolved_base = absolutize(base)?;

    if resolved != resolved_base && resolved.starts_with(&resolved_base) {
        Ok(resolved)
    } else {
        Err(CredSwapError::PathTraversal(path.to_path_buf()))
    }
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    Ok(normalize(&absolute))
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_allowed_characters() {
        assert_eq!(sanitize_name("Work Account_2-b").unwrap(), "Work Account_2-b");
    }

    #[test]
    fn strips_and_trims() {
        assert_eq!(sanitize_name("  me@home!  ").unwrap(), "mehome");
        assert_eq!(sanitize_name("../../etc/passwd").unwrap(), "etcpasswd");
    }

    #[test]
    fn rejects_empty_and_garbage() {
        assert!(sanitize_name("").is_err());
        assert!(sanitize_name("../..").is_err());
        assert!(sanitize_name("   ").is_err());
        assert!(sanitize_name("üéø").is_err());
    }

    #[test]
    fn length_limit_applies_after_stripping() {
        assert!(sanitize_name(&"a".repeat(MAX_NAME_LEN)).is_ok());
        assert!(sanitize_name(&"a".repeat(MAX_NAME_LEN + 1)).is_err());
        // Disallowed characters do not count toward the limit.
        let padded = format!("{}{}", "a".repeat(MAX_NAME_LEN), "!".repeat(50));
        assert!(sanitize_name(&padded).is_ok());
    }

    #[test]
    fn ensure_within_accepts_children() {
        let base = Path::new("/vault/claude");
        let ok = ensure_within(Path::new("/vault/claude/work-config.json"), base).unwrap();
        assert_eq!(ok, PathBuf::from("/vault/claude/work-config.json"));
    }

    #[test]
    fn ensure_within_rejects_escapes() {
        let base = Path::new("/vault/claude");
        assert!(ensure_within(Path::new("/vault/claude/../codex/x.json"), base).is_err());
        assert!(ensure_within(Path::new("/vault/claude2/x.json"), base).is_err());
        assert!(ensure_within(Path::new("/vault/claude"), base).is_err());
        assert!(ensure_within(Path::new("/vault/claude/./"), base).is_err());
    }

    #[test]
    fn ensure_within_folds_dot_components() {
        let base = Path::new("/vault/./claude");
        assert!(ensure_within(Path::new("/vault/claude/sub/../a.json"), base).is_ok());
    }
}
