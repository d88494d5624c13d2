//! Cryptographic primitives for credswap.
//!
//! This module provides:
//! - PBKDF2-HMAC-SHA512 key derivation (`kdf`)
//! - AES-256-GCM with a detached tag (`encryption`)
//! - Password envelopes and stored-blob classification (`envelope`)

pub mod encryption;
pub mod envelope;
pub mod kdf;

pub use envelope::{decrypt, encrypt, is_envelope, Envelope, StoredBlob};
pub use kdf::{derive_key, generate_salt, PBKDF2_ITERATIONS};
