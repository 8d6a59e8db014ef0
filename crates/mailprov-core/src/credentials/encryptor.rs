//! Credential encryption at rest.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use rand::rngs::OsRng;

use super::{CredentialError, CredentialResult};

/// Length of the AES-256 key in bytes.
const KEY_LENGTH: usize = 32;

/// Length of the GCM nonce in bytes.
const NONCE_LENGTH: usize = 12;

/// Prefix identifying the ciphertext format.
const FORMAT_PREFIX: &str = "v1:";

/// Turns plaintext secrets into opaque ciphertext for storage.
///
/// Output is not required to be deterministic; callers must not compare
/// ciphertexts or reuse one ciphertext for several fields.
pub trait CredentialEncryptor: Send + Sync {
    /// Encrypt a secret.
    ///
    /// # Errors
    ///
    /// Returns an error if encryption fails.
    fn encrypt(&self, plaintext: &str) -> CredentialResult<String>;
}

/// AES-256-GCM encryptor with a random nonce per call.
///
/// Ciphertext is `v1:` followed by base64 of `nonce || ciphertext || tag`.
#[derive(Clone)]
pub struct AesGcmEncryptor {
    cipher: Aes256Gcm,
}

impl AesGcmEncryptor {
    /// Create an encryptor from a raw 32-byte key.
    #[must_use]
    pub fn new(key: &[u8; KEY_LENGTH]) -> Self {
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)),
        }
    }

    /// Create an encryptor from a base64-encoded 32-byte key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not valid base64 or has the wrong length.
    pub fn from_base64(key: &str) -> CredentialResult<Self> {
        let bytes = STANDARD
            .decode(key.trim())
            .map_err(|e| CredentialError::InvalidKey(format!("invalid base64 key: {e}")))?;

        let key: [u8; KEY_LENGTH] = bytes.as_slice().try_into().map_err(|_| {
            CredentialError::InvalidKey(format!(
                "key must be {KEY_LENGTH} bytes, got {}",
                bytes.len()
            ))
        })?;

        Ok(Self::new(&key))
    }

    #[cfg(test)]
    fn decrypt(&self, ciphertext: &str) -> CredentialResult<String> {
        let encoded = ciphertext
            .strip_prefix(FORMAT_PREFIX)
            .ok_or_else(|| CredentialError::Encryption("unknown ciphertext format".into()))?;
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| CredentialError::Encryption(e.to_string()))?;
        let (nonce, sealed) = bytes.split_at(NONCE_LENGTH);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|e| CredentialError::Encryption(e.to_string()))?;
        String::from_utf8(plaintext).map_err(|e| CredentialError::Encryption(e.to_string()))
    }
}

impl CredentialEncryptor for AesGcmEncryptor {
    fn encrypt(&self, plaintext: &str) -> CredentialResult<String> {
        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        OsRng.fill_bytes(&mut nonce_bytes);

        let sealed = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|e| CredentialError::Encryption(e.to_string()))?;

        let mut out = Vec::with_capacity(NONCE_LENGTH + sealed.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&sealed);

        Ok(format!("{FORMAT_PREFIX}{}", STANDARD.encode(out)))
    }
}

impl std::fmt::Debug for AesGcmEncryptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesGcmEncryptor").finish_non_exhaustive()
    }
}

/// Generate a fresh random master key, base64-encoded.
#[must_use]
pub fn generate_key() -> String {
    let mut key = [0u8; KEY_LENGTH];
    OsRng.fill_bytes(&mut key);
    STANDARD.encode(key)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn encryptor() -> AesGcmEncryptor {
        AesGcmEncryptor::new(&[7u8; KEY_LENGTH])
    }

    #[test]
    fn test_encrypt_round_trip() {
        let enc = encryptor();
        let ciphertext = enc.encrypt("hunter2").unwrap();
        assert!(ciphertext.starts_with(FORMAT_PREFIX));
        assert!(!ciphertext.contains("hunter2"));
        assert_eq!(enc.decrypt(&ciphertext).unwrap(), "hunter2");
    }

    #[test]
    fn test_same_plaintext_gives_distinct_ciphertexts() {
        let enc = encryptor();
        let a = enc.encrypt("same").unwrap();
        let b = enc.encrypt("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_plaintext() {
        let enc = encryptor();
        let ciphertext = enc.encrypt("").unwrap();
        assert_eq!(enc.decrypt(&ciphertext).unwrap(), "");
    }

    #[test]
    fn test_wrong_key_cannot_decrypt() {
        let ciphertext = encryptor().encrypt("secret").unwrap();
        let other = AesGcmEncryptor::new(&[8u8; KEY_LENGTH]);
        assert!(other.decrypt(&ciphertext).is_err());
    }

    #[test]
    fn test_from_base64() {
        let key = generate_key();
        let enc = AesGcmEncryptor::from_base64(&key).unwrap();
        let ciphertext = enc.encrypt("x").unwrap();
        assert_eq!(enc.decrypt(&ciphertext).unwrap(), "x");
    }

    #[test]
    fn test_from_base64_rejects_bad_keys() {
        assert!(matches!(
            AesGcmEncryptor::from_base64("not base64!!"),
            Err(CredentialError::InvalidKey(_))
        ));
        assert!(matches!(
            AesGcmEncryptor::from_base64(&STANDARD.encode([1u8; 16])),
            Err(CredentialError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_debug_hides_key() {
        assert_eq!(format!("{:?}", encryptor()), "AesGcmEncryptor { .. }");
    }
}
