//! Integration tests for the secvault crypto module.

use std::collections::HashSet;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use secvault::crypto::credentials::{PASSWORD_LEN, SALT_LEN};
use secvault::crypto::encryption::{NONCE_LEN, TAG_LEN};
use secvault::crypto::{
    decrypt, derive_key, derive_key_with_cost, encrypt, seal, unseal, BlobFormat,
    CredentialMaterial, ScryptCost,
};
use secvault::errors::VaultError;
use tempfile::TempDir;

/// Cheap parameters so the tests don't allocate a gigabyte per derivation.
const FAST: ScryptCost = ScryptCost {
    log_n: 10,
    r: 8,
    p: 1,
};

// ---------------------------------------------------------------------------
// Encryption round-trip
// ---------------------------------------------------------------------------

#[test]
fn encrypt_decrypt_roundtrip() {
    let key = [0xABu8; 32];
    let plaintext = br#"{"services":{"github":{"token":"ghp_x"}}}"#;

    let ciphertext = encrypt(&key, plaintext).expect("encrypt should succeed");

    // Nonce prefix plus tag suffix.
    assert_eq!(ciphertext.len(), NONCE_LEN + plaintext.len() + TAG_LEN);

    let recovered = decrypt(&key, &ciphertext).expect("decrypt should succeed");
    assert_eq!(recovered, plaintext);
}

#[test]
fn nonces_are_never_reused() {
    let key = [0xCDu8; 32];
    let mut seen = HashSet::new();

    for _ in 0..256 {
        let ct = encrypt(&key, b"same plaintext").unwrap();
        assert!(
            seen.insert(ct[..NONCE_LEN].to_vec()),
            "nonce repeated across encryptions"
        );
    }
}

#[test]
fn decrypt_with_wrong_key_is_authentication_failure() {
    let ct = encrypt(&[0x11u8; 32], b"token").unwrap();
    let err = decrypt(&[0x22u8; 32], &ct).unwrap_err();
    assert!(matches!(err, VaultError::DecryptionAuthenticationFailure));
}

#[test]
fn flipping_any_bit_is_detected() {
    let key = [0x42u8; 32];
    let ct = encrypt(&key, b"db password").unwrap();

    for byte in 0..ct.len() {
        for bit in 0..8 {
            let mut tampered = ct.clone();
            tampered[byte] ^= 1 << bit;
            assert!(
                matches!(
                    decrypt(&key, &tampered),
                    Err(VaultError::DecryptionAuthenticationFailure)
                ),
                "tamper at byte {byte} bit {bit} went unnoticed"
            );
        }
    }
}

#[test]
fn truncated_blob_is_rejected() {
    let key = [0x01u8; 32];
    let ct = encrypt(&key, b"x").unwrap();

    for len in [0, NONCE_LEN - 1, NONCE_LEN, NONCE_LEN + TAG_LEN - 1] {
        assert!(
            matches!(
                decrypt(&key, &ct[..len]),
                Err(VaultError::DecryptionAuthenticationFailure)
            ),
            "length {len} should be rejected"
        );
    }
}

// ---------------------------------------------------------------------------
// Blob framing
// ---------------------------------------------------------------------------

#[test]
fn sealed_blob_is_base64_text() {
    let key = [0x33u8; 32];
    let blob = seal(&key, b"{}", BlobFormat::Deflate).unwrap();
    assert!(BASE64.decode(&blob).is_ok());
    assert!(!blob.contains('\n'));
}

#[test]
fn seal_unseal_both_formats() {
    let key = [0x44u8; 32];
    let doc = br#"{"services":{"aws":{"key":"AKIA","secret":null}}}"#;

    for format in [BlobFormat::Deflate, BlobFormat::Plain] {
        let blob = seal(&key, doc, format).unwrap();
        let opened = unseal(&key, &blob, format).unwrap();
        assert_eq!(opened.as_slice(), doc.as_slice(), "{format:?}");
    }
}

#[test]
fn formats_do_not_cross_read() {
    let key = [0x55u8; 32];
    let doc = br#"{"services":{}}"#;

    let plain = seal(&key, doc, BlobFormat::Plain).unwrap();
    // Authenticates fine but the payload is not zlib data.
    let err = unseal(&key, &plain, BlobFormat::Deflate).unwrap_err();
    assert!(matches!(err, VaultError::MalformedDocument(_)), "{err:?}");

    let deflated = seal(&key, doc, BlobFormat::Deflate).unwrap();
    let opened = unseal(&key, &deflated, BlobFormat::Plain).unwrap();
    assert_ne!(opened.as_slice(), doc.as_slice());
}

#[test]
fn garbage_base64_is_authentication_failure() {
    let err = unseal(&[0u8; 32], "not base64 !!!", BlobFormat::Deflate).unwrap_err();
    assert!(matches!(err, VaultError::DecryptionAuthenticationFailure));
}

// ---------------------------------------------------------------------------
// Key derivation
// ---------------------------------------------------------------------------

#[test]
fn key_derivation_is_deterministic() {
    let salt = [7u8; SALT_LEN];
    let password = [9u8; PASSWORD_LEN];

    let k1 = derive_key_with_cost(&salt, &password, &FAST).unwrap();
    let k2 = derive_key_with_cost(&salt, &password, &FAST).unwrap();
    assert_eq!(k1, k2);
}

#[test]
fn key_depends_on_salt_and_password() {
    let base = derive_key_with_cost(&[1u8; 16], &[2u8; 32], &FAST).unwrap();
    let other_salt = derive_key_with_cost(&[3u8; 16], &[2u8; 32], &FAST).unwrap();
    let other_password = derive_key_with_cost(&[1u8; 16], &[4u8; 32], &FAST).unwrap();

    assert_ne!(base, other_salt);
    assert_ne!(base, other_password);
}

#[test]
fn credential_files_reproduce_the_same_key() {
    let dir = TempDir::new().unwrap();

    let first = CredentialMaterial::new(dir.path());
    let salt = first.get_or_create_salt().unwrap();
    let password = first.get_or_create_password().unwrap();
    assert_eq!(salt.len(), SALT_LEN);
    assert_eq!(password.len(), PASSWORD_LEN);
    let k1 = derive_key_with_cost(&salt, &password, &FAST).unwrap();

    // A second handle on the same directory reads, never regenerates.
    let second = CredentialMaterial::new(dir.path());
    let k2 = derive_key_with_cost(
        &second.get_or_create_salt().unwrap(),
        &second.get_or_create_password().unwrap(),
        &FAST,
    )
    .unwrap();

    assert_eq!(k1, k2);
}

#[test]
fn full_cost_parameters_are_the_vault_defaults() {
    assert_eq!(ScryptCost::VAULT.log_n, 20);
    assert_eq!(ScryptCost::VAULT.r, 8);
    assert_eq!(ScryptCost::VAULT.p, 1);
}

#[test]
#[ignore = "allocates ~1 GiB and takes seconds; run with --ignored"]
fn full_cost_derivation_matches_explicit_cost() {
    let salt = [5u8; SALT_LEN];
    let password = [6u8; PASSWORD_LEN];

    let k1 = derive_key(&salt, &password).unwrap();
    let k2 = derive_key_with_cost(&salt, &password, &ScryptCost::VAULT).unwrap();
    assert_eq!(k1, k2);
}
