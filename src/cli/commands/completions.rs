//! `credswap completions`: generate shell completion scripts.
//!
//! Usage:
//!   credswap completions bash > ~/.bash_completion.d/credswap
//!   credswap completions zsh
//!   credswap completions fish

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::errors::Result;

/// Execute the `completions` command.
pub fn execute(shell: Shell) -> Result<()> {
    write_completions(shell, &mut io::stdout().lock())
}

/// Write the completion script for `shell` to `out`.
pub fn write_completions(shell: Shell, out: &mut dyn Write) -> Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "credswap", out);
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(shell: Shell) -> String {
        let mut buf = Vec::new();
        write_completions(shell, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn bash_script_names_subcommands() {
        let out = script(Shell::Bash);
        assert!(out.contains("credswap"));
        assert!(out.contains("switch"));
        assert!(out.contains("password"));
    }

    #[test]
    fn every_shell_generates() {
        for shell in [Shell::Zsh, Shell::Fish, Shell::PowerShell, Shell::Elvish] {
            assert!(!script(shell).is_empty());
        }
    }
}
