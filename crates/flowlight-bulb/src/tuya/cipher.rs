//! AES-128-ECB with PKCS#7 padding, as used by protocol 3.3 payloads.

use std::fmt;

use aes::Aes128;
use ecb::cipher::block_padding::Pkcs7;
use ecb::cipher::{BlockDecryptMut, BlockEncryptMut, KeyInit};

use crate::{BulbError, Result};

const BLOCK_LEN: usize = 16;

/// Payload cipher keyed by the device's local key.
#[derive(Clone)]
pub struct EcbCipher {
    encryptor: ecb::Encryptor<Aes128>,
    decryptor: ecb::Decryptor<Aes128>,
}

impl EcbCipher {
    /// Create a cipher from a 16-byte key.
    ///
    /// # Errors
    ///
    /// Returns [`BulbError::InvalidKey`] for any other key length.
    pub fn new(key: &[u8]) -> Result<Self> {
        let encryptor = ecb::Encryptor::<Aes128>::new_from_slice(key)
            .map_err(|_| BulbError::InvalidKey(key.len()))?;
        let decryptor = ecb::Decryptor::<Aes128>::new_from_slice(key)
            .map_err(|_| BulbError::InvalidKey(key.len()))?;
        Ok(Self {
            encryptor,
            decryptor,
        })
    }

    /// Pad and encrypt.
    #[must_use]
    pub fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        self.encryptor
            .clone()
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext)
    }

    /// Decrypt and strip padding.
    ///
    /// # Errors
    ///
    /// Returns [`BulbError::Protocol`] if the input is not whole blocks or
    /// the padding is invalid.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
            return Err(BulbError::Protocol(format!(
                "ciphertext length {} is not a multiple of {BLOCK_LEN}",
                ciphertext.len()
            )));
        }

        self.decryptor
            .clone()
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| BulbError::Protocol("invalid padding".to_string()))
    }
}

impl fmt::Debug for EcbCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EcbCipher(..)")
    }
}
