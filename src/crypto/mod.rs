//! Cryptographic primitives for project files.
//!
//! Provides key derivation, authenticated encryption, and the text blob format.

pub mod aead;
pub mod blob;
pub mod kdf;

pub use aead::{decrypt, encrypt};
pub use blob::CiphertextBlob;
pub use kdf::derive_key;

/// Length of the nonce (24 bytes for XChaCha20-Poly1305).
pub const NONCE_LEN: usize = 24;
/// Length of the encryption key (32 bytes / 256 bits).
pub const KEY_LEN: usize = 32;
/// Length of the Poly1305 authentication tag (16 bytes).
pub const TAG_LEN: usize = 16;
/// Smallest decoded blob: a nonce and the tag of an empty payload.
pub const MIN_BLOB_LEN: usize = NONCE_LEN + TAG_LEN;
