//! Chromium `encrypted_value` decryption: a PBKDF2-derived AES-128 key
//! and CBC with a fixed all-spaces IV. Padding is validated manually
//! because the scheme is unauthenticated.

use aes::cipher::{block_padding::NoPadding, BlockDecryptMut, KeyIvInit};
use pbkdf2::pbkdf2_hmac;
use sha1::Sha1;
use tracing::warn;

use crate::error::DecryptError;
use crate::util::hex;

type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

const SALT: &[u8] = b"saltysalt";
const ITERATIONS: u32 = 1003;
const BLOCK_SIZE: usize = 16;
// Chromium's CBC IV is sixteen ASCII spaces.
const IV: [u8; BLOCK_SIZE] = [0x20; BLOCK_SIZE];

/// Derives the 16-byte AES key from a keychain master secret.
pub fn derive_key(master_secret: &str) -> [u8; 16] {
    let mut key = [0u8; 16];
    pbkdf2_hmac::<Sha1>(master_secret.as_bytes(), SALT, ITERATIONS, &mut key);
    key
}

/// True when the blob carries the `v10`/`v11` version prefix. Without
/// it the plaintext `value` column is authoritative.
pub fn has_version_prefix(blob: &[u8]) -> bool {
    matches!(blob, [b'v', b'1', b'0' | b'1', ..])
}

/// Decrypts a prefix-stripped ciphertext. The trailing padding is
/// removed by the convention `pad = last byte; 0 < pad <= 16`.
pub fn decrypt_value(ciphertext: &[u8], key: &[u8; 16]) -> Result<Vec<u8>, DecryptError> {
    if ciphertext.is_empty() {
        return Ok(Vec::new());
    }
    if ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(DecryptError::NotBlockAligned {
            len: ciphertext.len(),
        });
    }

    let mut buf = ciphertext.to_vec();
    let decryptor =
        Aes128CbcDec::new_from_slices(key, &IV).map_err(|_| DecryptError::Cipher)?;
    decryptor
        .decrypt_padded_mut::<NoPadding>(&mut buf)
        .map_err(|_| DecryptError::Cipher)?;

    strip_trailing_padding(&mut buf);
    Ok(buf)
}

fn strip_trailing_padding(value: &mut Vec<u8>) {
    if let Some(&pad) = value.last() {
        let pad = pad as usize;
        if pad > 0 && pad <= BLOCK_SIZE && pad <= value.len() {
            value.truncate(value.len() - pad);
        }
    }
}

/// Outcome of the full per-blob pipeline; `decrypted = false` carries
/// the original bytes hex-rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptOutcome {
    pub value: String,
    pub decrypted: bool,
}

/// Strips the version prefix, decrypts, and decodes as UTF-8. All
/// failures recover locally by emitting the stored bytes verbatim in
/// hex with `decrypted = false`.
pub fn decrypt_encrypted_value(blob: &[u8], key: &[u8; 16]) -> DecryptOutcome {
    let ciphertext = if has_version_prefix(blob) {
        &blob[3..]
    } else {
        blob
    };

    match decrypt_value(ciphertext, key) {
        Ok(plain) => match String::from_utf8(plain) {
            Ok(value) => DecryptOutcome {
                value,
                decrypted: true,
            },
            Err(_) => {
                warn!(err = %DecryptError::NotUtf8, "emitting raw value hex-rendered");
                DecryptOutcome {
                    value: hex::encode(blob),
                    decrypted: false,
                }
            }
        },
        Err(err) => {
            warn!(%err, "emitting raw value hex-rendered");
            DecryptOutcome {
                value: hex::encode(blob),
                decrypted: false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encrypt(plaintext: &[u8], key: &[u8; 16]) -> Vec<u8> {
        use aes::cipher::{block_padding::Pkcs7, BlockEncryptMut, KeyIvInit};
        type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;

        let encryptor = Aes128CbcEnc::new_from_slices(key, &IV).unwrap();
        let mut buf = vec![0u8; plaintext.len() + BLOCK_SIZE];
        buf[..plaintext.len()].copy_from_slice(plaintext);
        encryptor
            .encrypt_padded_mut::<Pkcs7>(&mut buf, plaintext.len())
            .unwrap()
            .to_vec()
    }

    #[test]
    fn derive_key_is_deterministic() {
        let a = derive_key("peanuts");
        let b = derive_key("peanuts");
        assert_eq!(a, b);
        assert_ne!(a, derive_key("walnuts"));
    }

    #[test]
    fn version_prefix_detection() {
        assert!(has_version_prefix(b"v10xxxx"));
        assert!(has_version_prefix(b"v11xxxx"));
        assert!(!has_version_prefix(b"v12xxxx"));
        assert!(!has_version_prefix(b"plaintext"));
        assert!(!has_version_prefix(b"v1"));
    }

    #[test]
    fn encrypt_then_decrypt_round_trips() {
        let key = derive_key("peanuts");
        let mut blob = b"v10".to_vec();
        blob.extend_from_slice(&encrypt(b"hello", &key));

        let outcome = decrypt_encrypted_value(&blob, &key);
        assert!(outcome.decrypted);
        assert_eq!(outcome.value, "hello");
    }

    #[test]
    fn v11_prefix_accepted() {
        let key = derive_key("peanuts");
        let mut blob = b"v11".to_vec();
        blob.extend_from_slice(&encrypt(b"world", &key));
        assert_eq!(decrypt_encrypted_value(&blob, &key).value, "world");
    }

    #[test]
    fn block_exact_plaintext_round_trips() {
        // 16-byte plaintext forces a full padding block.
        let key = derive_key("peanuts");
        let mut blob = b"v10".to_vec();
        blob.extend_from_slice(&encrypt(b"0123456789abcdef", &key));
        let outcome = decrypt_encrypted_value(&blob, &key);
        assert!(outcome.decrypted);
        assert_eq!(outcome.value, "0123456789abcdef");
    }

    #[test]
    fn misaligned_ciphertext_is_rejected() {
        let key = derive_key("peanuts");
        assert!(matches!(
            decrypt_value(&[0u8; 17], &key),
            Err(DecryptError::NotBlockAligned { len: 17 })
        ));
        assert_eq!(decrypt_value(&[], &key).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn misaligned_blob_falls_back_to_hex() {
        let key = derive_key("peanuts");
        let blob = b"v10\x01\x02\x03";
        let outcome = decrypt_encrypted_value(blob, &key);
        assert!(!outcome.decrypted);
        assert_eq!(outcome.value, hex::encode(blob));
    }

    #[test]
    fn wrong_key_falls_back_to_hex() {
        // Wrong key produces garbage that is overwhelmingly unlikely
        // to be UTF-8 with sane padding; either way the outcome is
        // marked undecrypted or decodes to noise, never a panic.
        let key = derive_key("peanuts");
        let mut blob = b"v10".to_vec();
        blob.extend_from_slice(&encrypt(b"hello", &key));
        let outcome = decrypt_encrypted_value(&blob, &derive_key("wrong"));
        assert_ne!(outcome.value, "hello");
    }
}
