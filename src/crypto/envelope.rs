//! Password envelopes: the encrypted-at-rest form of a stored profile blob.
//!
//! An envelope is a JSON object:
//!
//! ```text
//! { "encrypted": true, "version": 1, "salt": "<hex>", "iv": "<hex>",
//!   "authTag": "<hex>", "ciphertext": "<hex>" }
//! ```
//!
//! Every call to [`encrypt`] draws a fresh salt and IV, so two envelopes
//! of the same plaintext under the same password never share key or nonce.
//!
//! Stored files are classified once into a [`StoredBlob`]: either the
//! verbatim plaintext JSON text, or a parsed [`Envelope`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use zeroize::{Zeroize, Zeroizing};

use super::encryption::{self, IV_LEN, TAG_LEN};
use super::kdf::{self, SALT_LEN};
use crate::errors::{CredSwapError, Result};

/// Envelope format version written by this build.
pub const ENVELOPE_VERSION: u64 = 1;

/// Encrypted wrapper around one profile blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Always `true`; the marker that distinguishes envelopes from profiles.
    encrypted: bool,

    /// Envelope format version.
    pub version: u64,

    /// PBKDF2 salt (hex in JSON).
    #[serde(with = "hex::serde")]
    pub salt: Vec<u8>,

    /// AES-GCM IV (hex in JSON).
    #[serde(with = "hex::serde")]
    pub iv: Vec<u8>,

    /// AES-GCM authentication tag (hex in JSON).
    #[serde(with = "hex::serde")]
    pub auth_tag: Vec<u8>,

    /// Encrypted plaintext (hex in JSON).
    #[serde(with = "hex::serde")]
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Serialize as pretty JSON, the on-disk form.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CredSwapError::SerializationError(format!("envelope: {e}")))
    }

    /// Convert into a JSON value (used when embedding in export bundles).
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self)
            .map_err(|e| CredSwapError::SerializationError(format!("envelope: {e}")))
    }
}

/// Encrypt `plaintext` under `password`.
pub fn encrypt(plaintext: &str, password: &str) -> Result<Envelope> {
    let salt = kdf::generate_salt();
    let iv = encryption::generate_iv();
    let key = kdf::derive_key(password.as_bytes(), &salt)?;

    let sealed = encryption::seal(&key[..], &iv, plaintext.as_bytes())?;

    Ok(Envelope {
        encrypted: true,
        version: ENVELOPE_VERSION,
        salt: salt.to_vec(),
        iv: iv.to_vec(),
        auth_tag: sealed.tag.to_vec(),
        ciphertext: sealed.ciphertext,
    })
}

/// Decrypt an envelope with `password`.
///
/// Wrong password, tampering, truncated fields and non-UTF-8 output all
/// fail with the same `DecryptionFailed` error.
pub fn decrypt(envelope: &Envelope, password: &str) -> Result<Zeroizing<String>> {
    if envelope.version != ENVELOPE_VERSION {
        return Err(CredSwapError::UnsupportedEnvelope(envelope.version));
    }
    if envelope.salt.len() != SALT_LEN
        || envelope.iv.len() != IV_LEN
        || envelope.auth_tag.len() != TAG_LEN
    {
        return Err(CredSwapError::DecryptionFailed);
    }

    let key = kdf::derive_key(password.as_bytes(), &envelope.salt)?;
    let plaintext = encryption::open(
        &key[..],
        &envelope.iv,
        &envelope.ciphertext,
        &envelope.auth_tag,
    )?;

    String::from_utf8(plaintext)
        .map(Zeroizing::new)
        .map_err(|e| {
            let mut bad_bytes = e.into_bytes();
            bad_bytes.zeroize();
            CredSwapError::DecryptionFailed
        })
}

/// Structural check: does this JSON value look like an envelope?
///
/// Requires `encrypted == true`, a numeric `version`, and the four hex
/// fields to be present.
pub fn is_envelope(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };

    obj.get("encrypted") == Some(&Value::Bool(true))
        && obj.get("version").is_some_and(Value::is_u64)
        && ["salt", "iv", "authTag", "ciphertext"]
            .iter()
            .all(|field| obj.get(*field).is_some_and(Value::is_string))
}

/// A stored file, classified.
#[derive(Debug, Clone)]
pub enum StoredBlob {
    /// Plain JSON, kept as the exact text read from disk.
    Plaintext(String),
    /// An encrypted envelope.
    Sealed(Envelope),
}

impl StoredBlob {
    /// Parse stored file contents.
    ///
    /// The text must be valid JSON. Objects that pass [`is_envelope`] but
    /// carry malformed hex fail with `DecryptionFailed`.
    pub fn parse(text: String) -> Result<Self> {
        let value: Value = serde_json::from_str(&text)
            .map_err(|e| CredSwapError::SerializationError(format!("invalid JSON: {e}")))?;
        Self::classify(value, text)
    }

    /// Classify an already-parsed value. `text` is what gets kept for the
    /// plaintext case.
    fn classify(value: Value, text: String) -> Result<Self> {
        if is_envelope(&value) {
            let envelope: Envelope =
                serde_json::from_value(value).map_err(|_| CredSwapError::DecryptionFailed)?;
            Ok(Self::Sealed(envelope))
        } else {
            Ok(Self::Plaintext(text))
        }
    }

    /// Classify a JSON value that did not come from a file (e.g. a bundle
    /// entry). Plaintext values are rendered as pretty JSON.
    pub fn from_value(value: Value) -> Result<Self> {
        if is_envelope(&value) {
            return Self::classify(value, String::new());
        }
        let text = serde_json::to_string_pretty(&value)
            .map_err(|e| CredSwapError::SerializationError(format!("profile: {e}")))?;
        Ok(Self::Plaintext(text))
    }

    /// Returns `true` for envelopes.
    pub fn is_sealed(&self) -> bool {
        matches!(self, Self::Sealed(_))
    }

    /// Recover the plaintext JSON text.
    ///
    /// Envelopes need a password; without one this fails with
    /// `AuthenticationRequired`.
    pub fn open(self, password: Option<&str>) -> Result<Zeroizing<String>> {
        match self {
            Self::Plaintext(text) => Ok(Zeroizing::new(text)),
            Self::Sealed(envelope) => match password {
                Some(pw) => decrypt(&envelope, pw),
                None => Err(CredSwapError::AuthenticationRequired),
            },
        }
    }
}
