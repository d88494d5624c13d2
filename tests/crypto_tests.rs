//! Envelope encryption: round trips, wrong passwords, tampering.

use credswap::crypto::{decrypt, encrypt, is_envelope, Envelope, StoredBlob};
use credswap::errors::{CredSwapError, ErrorKind};
use serde_json::json;

const PROFILE: &str = r#"{"claudeAiOauth":{"accessToken":"sk-ant-oat01-abc","subscriptionType":"pro"}}"#;

#[test]
fn encrypt_decrypt_roundtrip() {
    for (plaintext, password) in [
        (PROFILE, "pw-1234"),
        ("{}", "a much longer pass phrase with spaces"),
        ("{\"emoji\":\"\u{1F511}\"}", "p\u{e4}ssw\u{f6}rd"),
        ("", "pw-1234"),
    ] {
        let envelope = encrypt(plaintext, password).unwrap();
        assert_eq!(decrypt(&envelope, password).unwrap().as_str(), plaintext);
    }
}

#[test]
fn every_envelope_uses_fresh_salt_and_iv() {
    let a = encrypt(PROFILE, "pw-1234").unwrap();
    let b = encrypt(PROFILE, "pw-1234").unwrap();
    assert_ne!(a.salt, b.salt);
    assert_ne!(a.iv, b.iv);
    assert_ne!(a.ciphertext, b.ciphertext);
}

#[test]
fn wrong_password_never_decrypts() {
    let envelope = encrypt(PROFILE, "correct-horse").unwrap();
    for wrong in ["correct-hors", "Correct-horse", "correct-horse ", ""] {
        let err = decrypt(&envelope, wrong).unwrap_err();
        assert!(matches!(err, CredSwapError::DecryptionFailed));
        assert_eq!(err.kind(), ErrorKind::DecryptFailure);
    }
}

#[test]
fn tampered_fields_fail_uniformly() {
    let envelope = encrypt(PROFILE, "pw-1234").unwrap();

    let mut flipped = envelope.clone();
    flipped.ciphertext[0] ^= 0x01;
    assert!(matches!(
        decrypt(&flipped, "pw-1234"),
        Err(CredSwapError::DecryptionFailed)
    ));

    let mut bad_tag = envelope.clone();
    bad_tag.auth_tag[15] ^= 0x80;
    assert!(matches!(
        decrypt(&bad_tag, "pw-1234"),
        Err(CredSwapError::DecryptionFailed)
    ));

    let mut short_iv = envelope.clone();
    short_iv.iv.truncate(8);
    assert!(matches!(
        decrypt(&short_iv, "pw-1234"),
        Err(CredSwapError::DecryptionFailed)
    ));
}

#[test]
fn unknown_version_is_rejected() {
    let mut value = encrypt(PROFILE, "pw-1234").unwrap().to_value().unwrap();
    value["version"] = json!(2);
    let envelope: Envelope = serde_json::from_value(value).unwrap();
    assert!(matches!(
        decrypt(&envelope, "pw-1234"),
        Err(CredSwapError::UnsupportedEnvelope(2))
    ));
}

#[test]
fn envelope_detection_needs_every_field() {
    let value = encrypt(PROFILE, "pw-1234").unwrap().to_value().unwrap();
    assert!(is_envelope(&value));

    for field in ["salt", "iv", "authTag", "ciphertext", "version"] {
        let mut partial = value.clone();
        partial.as_object_mut().unwrap().remove(field);
        assert!(!is_envelope(&partial), "missing {field} still detected");
    }

    let mut not_flagged = value.clone();
    not_flagged["encrypted"] = json!("true");
    assert!(!is_envelope(&not_flagged));

    assert!(!is_envelope(&json!({"encrypted": true})));
    assert!(!is_envelope(&json!([1, 2, 3])));
}

#[test]
fn stored_blob_keeps_plaintext_verbatim() {
    let text = "{\n    \"odd\":   \"spacing\"\n}\n".to_string();
    match StoredBlob::parse(text.clone()).unwrap() {
        StoredBlob::Plaintext(kept) => assert_eq!(kept, text),
        StoredBlob::Sealed(_) => panic!("plain profile classified as envelope"),
    }
}

#[test]
fn sealed_blob_needs_password() {
    let text = encrypt(PROFILE, "pw-1234").unwrap().to_json().unwrap();
    let blob = StoredBlob::parse(text.clone()).unwrap();
    assert!(blob.is_sealed());
    assert!(matches!(
        blob.open(None),
        Err(CredSwapError::AuthenticationRequired)
    ));

    let blob = StoredBlob::parse(text).unwrap();
    assert_eq!(blob.open(Some("pw-1234")).unwrap().as_str(), PROFILE);
}
