//! AES-256-GCM authenticated encryption and the stored blob framing.
//!
//! Each call to `encrypt` generates a fresh random 12-byte nonce and
//! prepends it to the ciphertext.  `decrypt` splits the nonce back out
//! before decrypting.
//!
//! Layout of the returned byte buffer:
//!   [ 12-byte nonce | ciphertext + 16-byte auth tag ]
//!
//! `seal` / `unseal` wrap that buffer for storage: the plaintext is
//! optionally zlib-compressed *before* encryption, and the result is
//! base64-encoded so it fits in a string-valued store.

use std::io::{Read, Write};

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::errors::{Result, VaultError};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the AES-256-GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// How plaintext is framed before encryption.
///
/// This is a property of the vault, not of an individual blob: a blob
/// sealed as `Deflate` cannot be read as `Plain` and vice versa.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlobFormat {
    /// zlib-compress the JSON before encrypting.
    #[default]
    Deflate,
    /// Encrypt the JSON bytes as-is.
    Plain,
}

/// Encrypt `plaintext` with a 32-byte `key`.
///
/// Returns the nonce prepended to the ciphertext (nonce || ciphertext).
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| VaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    // Never reuse a nonce: draw a new one for every call.
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| VaultError::EncryptionFailed(format!("encryption error: {e}")))?;

    let mut output = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Decrypt data that was produced by `encrypt`.
///
/// Expects the first 12 bytes to be the nonce, followed by the ciphertext
/// and tag.  Nothing is returned unless the tag verifies.
pub fn decrypt(key: &[u8], ciphertext_with_nonce: &[u8]) -> Result<Vec<u8>> {
    if ciphertext_with_nonce.len() < NONCE_LEN + TAG_LEN {
        return Err(VaultError::DecryptionAuthenticationFailure);
    }

    let (nonce_bytes, ciphertext) = ciphertext_with_nonce.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|_| VaultError::DecryptionAuthenticationFailure)?;

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| VaultError::DecryptionAuthenticationFailure)
}

/// Frame, encrypt and base64-encode `plaintext` for storage.
pub fn seal(key: &[u8], plaintext: &[u8], format: BlobFormat) -> Result<String> {
    let sealed = match format {
        BlobFormat::Plain => encrypt(key, plaintext)?,
        BlobFormat::Deflate => {
            let compressed = Zeroizing::new(compress(plaintext)?);
            encrypt(key, &compressed)?
        }
    };
    Ok(BASE64.encode(sealed))
}

/// Reverse `seal`: base64-decode, authenticate and decrypt, then inflate.
///
/// Invalid base64 and short blobs are reported the same way as a bad tag,
/// since all three mean the stored value cannot be trusted.
pub fn unseal(key: &[u8], blob: &str, format: BlobFormat) -> Result<Zeroizing<Vec<u8>>> {
    let raw = BASE64
        .decode(blob.trim())
        .map_err(|_| VaultError::DecryptionAuthenticationFailure)?;

    let opened = Zeroizing::new(decrypt(key, &raw)?);

    match format {
        BlobFormat::Plain => Ok(opened),
        BlobFormat::Deflate => Ok(Zeroizing::new(decompress(&opened)?)),
    }
}

fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| VaultError::EncryptionFailed(format!("compression failed: {e}")))?;
    encoder
        .finish()
        .map_err(|e| VaultError::EncryptionFailed(format!("compression failed: {e}")))
}

fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| VaultError::MalformedDocument(format!("decompression failed: {e}")))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 32] = [0x5Au8; 32];

    #[test]
    fn seal_unseal_roundtrip_deflate() {
        let blob = seal(&KEY, br#"{"services":{}}"#, BlobFormat::Deflate).unwrap();
        let out = unseal(&KEY, &blob, BlobFormat::Deflate).unwrap();
        assert_eq!(out.as_slice(), br#"{"services":{}}"#);
    }

    #[test]
    fn seal_unseal_roundtrip_plain() {
        let blob = seal(&KEY, b"hello", BlobFormat::Plain).unwrap();
        let out = unseal(&KEY, &blob, BlobFormat::Plain).unwrap();
        assert_eq!(out.as_slice(), b"hello");
    }

    #[test]
    fn sealed_blob_layout_is_nonce_ciphertext_tag() {
        let blob = seal(&KEY, b"abc", BlobFormat::Plain).unwrap();
        let raw = BASE64.decode(blob).unwrap();
        assert_eq!(raw.len(), NONCE_LEN + 3 + TAG_LEN);
    }

    #[test]
    fn deflate_blob_is_not_readable_as_plain() {
        let blob = seal(&KEY, b"some json text", BlobFormat::Deflate).unwrap();
        let out = unseal(&KEY, &blob, BlobFormat::Plain).unwrap();
        assert_ne!(out.as_slice(), b"some json text");
    }

    #[test]
    fn plain_blob_fails_to_inflate() {
        let blob = seal(&KEY, b"{\"services\":{}}", BlobFormat::Plain).unwrap();
        let result = unseal(&KEY, &blob, BlobFormat::Deflate);
        assert!(matches!(result, Err(VaultError::MalformedDocument(_))));
    }

    #[test]
    fn invalid_base64_is_an_authentication_failure() {
        let result = unseal(&KEY, "not*base64!", BlobFormat::Plain);
        assert!(matches!(
            result,
            Err(VaultError::DecryptionAuthenticationFailure)
        ));
    }

    #[test]
    fn blob_shorter_than_nonce_and_tag_fails() {
        let short = BASE64.encode([0u8; NONCE_LEN + TAG_LEN - 1]);
        let result = unseal(&KEY, &short, BlobFormat::Plain);
        assert!(matches!(
            result,
            Err(VaultError::DecryptionAuthenticationFailure)
        ));
    }
}
