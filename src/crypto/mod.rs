//! Field-level encryption primitives.
//!
//! Salary and PII scalar values are encrypted one field at a time with
//! AES-256-CBC and a fresh random IV per call, then encoded as
//! `<b64 iv>:<b64 ciphertext>`. Equal plaintexts therefore never produce
//! equal ciphertexts. Service-level callers prepend the id of the key that
//! produced a field (`<key-id>:<b64 iv>:<b64 ciphertext>`) so rotation does
//! not orphan previously written data.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::{distributions::Alphanumeric, Rng, RngCore};
use thiserror::Error;
use uuid::Uuid;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// AES-256 key length in bytes. Stored key material is exactly this long.
pub const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum CryptoError {
    /// Wrong key, corrupted ciphertext, or malformed encoding. Deliberately
    /// a single opaque variant: callers must not be able to tell which.
    #[error("wrong key or corrupted data")]
    Decrypt,

    #[error("encryption key must be exactly {KEY_LEN} characters")]
    InvalidKeyLength,
}

/// 32-byte symmetric key, built from the UTF-8 bytes of stored key material.
#[derive(Clone)]
pub struct KeyMaterial([u8; KEY_LEN]);

impl KeyMaterial {
    pub fn from_exact(material: &str) -> Result<Self, CryptoError> {
        let bytes = material.as_bytes();
        if bytes.len() != KEY_LEN {
            return Err(CryptoError::InvalidKeyLength);
        }
        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // never print key bytes
        f.write_str("KeyMaterial(..)")
    }
}

/// Generate fresh random key material (32 alphanumeric characters).
pub fn generate_key() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(KEY_LEN)
        .map(char::from)
        .collect()
}

/// Encrypt a scalar field value. Output is `<b64 iv>:<b64 ciphertext>`.
pub fn encrypt_field(value: &str, key: &KeyMaterial) -> String {
    let mut iv = [0u8; IV_LEN];
    rand::thread_rng().fill_bytes(&mut iv);

    let ciphertext = Aes256CbcEnc::new(&key.0.into(), &iv.into())
        .encrypt_padded_vec_mut::<Pkcs7>(value.as_bytes());

    format!("{}:{}", BASE64.encode(iv), BASE64.encode(ciphertext))
}

/// Decrypt a `<b64 iv>:<b64 ciphertext>` token. Every failure mode maps to
/// the same opaque [`CryptoError::Decrypt`].
pub fn decrypt_field(token: &str, key: &KeyMaterial) -> Result<String, CryptoError> {
    let (iv_b64, ct_b64) = token.split_once(':').ok_or(CryptoError::Decrypt)?;

    let iv = BASE64.decode(iv_b64).map_err(|_| CryptoError::Decrypt)?;
    if iv.len() != IV_LEN {
        return Err(CryptoError::Decrypt);
    }
    let iv: [u8; IV_LEN] = iv.as_slice().try_into().map_err(|_| CryptoError::Decrypt)?;
    let ciphertext = BASE64.decode(ct_b64).map_err(|_| CryptoError::Decrypt)?;

    let plaintext = Aes256CbcDec::new(&key.0.into(), &iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|_| CryptoError::Decrypt)?;

    String::from_utf8(plaintext).map_err(|_| CryptoError::Decrypt)
}

/// Prefix an encrypted token with the id of the key that produced it.
pub fn tag_key(key_id: Uuid, token: &str) -> String {
    format!("{}:{}", key_id.simple(), token)
}

/// Split an encoded field into an optional key-id tag and the `iv:ct` token.
///
/// Untagged two-part tokens predate key-id tagging; they decrypt with the
/// owner's currently active key.
pub fn split_tag(field: &str) -> (Option<Uuid>, &str) {
    if let Some((head, rest)) = field.split_once(':') {
        // a simple-format UUID is 32 hex chars; a base64 IV is 24 chars
        if let Ok(key_id) = Uuid::try_parse(head) {
            return (Some(key_id), rest);
        }
    }
    (None, field)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> KeyMaterial {
        KeyMaterial::from_exact(s).unwrap()
    }

    const K1: &str = "0123456789abcdef0123456789abcdef";
    const K2: &str = "fedcba9876543210fedcba9876543210";

    #[test]
    fn round_trip_returns_original_value() {
        let k = key(K1);
        for value in ["50000", "", "Pay grade 7 (confirmed)", "12345.67"] {
            let token = encrypt_field(value, &k);
            assert_eq!(decrypt_field(&token, &k).unwrap(), value);
        }
    }

    #[test]
    fn encryption_is_not_deterministic() {
        let k = key(K1);
        let a = encrypt_field("50000", &k);
        let b = encrypt_field("50000", &k);
        assert_ne!(a, b, "random IV must vary ciphertext");
        assert_eq!(decrypt_field(&a, &k).unwrap(), "50000");
        assert_eq!(decrypt_field(&b, &k).unwrap(), "50000");
    }

    #[test]
    fn wrong_key_never_silently_succeeds() {
        let token = encrypt_field("50000", &key(K1));
        match decrypt_field(&token, &key(K2)) {
            Err(CryptoError::Decrypt) => {}
            Err(other) => panic!("unexpected error: {other}"),
            // CBC without authentication can unpad garbage by chance, but
            // the result must never be the original plaintext
            Ok(v) => assert_ne!(v, "50000"),
        }
    }

    #[test]
    fn malformed_tokens_fail_generically() {
        let k = key(K1);
        for bad in ["", "no-separator", "!!!:???", "aGVsbG8=:aGVsbG8="] {
            assert!(matches!(decrypt_field(bad, &k), Err(CryptoError::Decrypt)));
        }
    }

    #[test]
    fn key_material_length_is_enforced() {
        assert!(KeyMaterial::from_exact("short").is_err());
        assert!(KeyMaterial::from_exact(&"x".repeat(33)).is_err());
        assert!(KeyMaterial::from_exact(&"x".repeat(32)).is_ok());
    }

    #[test]
    fn generated_keys_are_32_chars() {
        let a = generate_key();
        let b = generate_key();
        assert_eq!(a.len(), KEY_LEN);
        assert_ne!(a, b);
        assert!(KeyMaterial::from_exact(&a).is_ok());
    }

    #[test]
    fn tagged_fields_round_trip_the_key_id() {
        let k = key(K1);
        let key_id = Uuid::new_v4();
        let tagged = tag_key(key_id, &encrypt_field("75000", &k));

        let (tag, token) = split_tag(&tagged);
        assert_eq!(tag, Some(key_id));
        assert_eq!(decrypt_field(token, &k).unwrap(), "75000");
    }

    #[test]
    fn untagged_legacy_fields_parse_without_a_tag() {
        let k = key(K1);
        let token = encrypt_field("75000", &k);
        let (tag, rest) = split_tag(&token);
        assert_eq!(tag, None);
        assert_eq!(rest, token);
    }
}
