//! Text-safe ciphertext blob.
//!
//! Blob layout before base64 encoding:
//! ```text
//! NONCE (24) | CIPHERTEXT (n) | TAG (16)
//! ```

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::{MIN_BLOB_LEN, NONCE_LEN};
use crate::error::CryptoError;

/// The output of one encryption: the nonce followed by the sealed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CiphertextBlob {
    nonce: [u8; NONCE_LEN],
    sealed: Vec<u8>,
}

impl CiphertextBlob {
    pub fn from_parts(nonce: [u8; NONCE_LEN], sealed: Vec<u8>) -> Self {
        Self { nonce, sealed }
    }

    pub fn nonce(&self) -> &[u8; NONCE_LEN] {
        &self.nonce
    }

    /// Ciphertext with the authentication tag appended.
    pub fn sealed(&self) -> &[u8] {
        &self.sealed
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(NONCE_LEN + self.sealed.len());
        buf.extend_from_slice(&self.nonce);
        buf.extend_from_slice(&self.sealed);
        buf
    }

    /// Splits raw blob bytes into nonce and sealed payload.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::MalformedCiphertext`] if `data` cannot hold a
    /// nonce and a tag.
    pub fn from_bytes(data: &[u8]) -> Result<Self, CryptoError> {
        if data.len() < MIN_BLOB_LEN {
            return Err(CryptoError::MalformedCiphertext {
                len: data.len(),
                min: MIN_BLOB_LEN,
            });
        }

        let (nonce, sealed) = data.split_at(NONCE_LEN);
        let nonce: [u8; NONCE_LEN] = nonce
            .try_into()
            .map_err(|_| CryptoError::MalformedCiphertext {
                len: data.len(),
                min: MIN_BLOB_LEN,
            })?;

        Ok(Self::from_parts(nonce, sealed.to_vec()))
    }

    /// Encodes the blob as standard padded base64.
    pub fn encode(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Decodes a base64 blob.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Encoding`] for invalid base64, including the
    /// empty string, and [`CryptoError::MalformedCiphertext`] if the decoded
    /// bytes are too short.
    pub fn decode(text: &str) -> Result<Self, CryptoError> {
        if text.is_empty() {
            return Err(CryptoError::Encoding);
        }

        let data = STANDARD.decode(text).map_err(|_| CryptoError::Encoding)?;
        Self::from_bytes(&data)
    }
}
