use chacha20poly1305::{
    Key, XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit},
};
use getrandom::fill;
use zeroize::Zeroizing;

use super::{CiphertextBlob, NONCE_LEN, derive_key};
use crate::error::CryptoError;

/// Fill buffer with cryptographically secure random bytes
fn secure_random(buf: &mut [u8]) -> Result<(), CryptoError> {
    fill(buf).map_err(|_| CryptoError::Random)
}

/// Generate a fresh nonce
fn generate_nonce() -> Result<[u8; NONCE_LEN], CryptoError> {
    let mut nonce = [0u8; NONCE_LEN];
    secure_random(&mut nonce)?;
    Ok(nonce)
}

/// Encrypts `plaintext` under a key derived from `password`.
///
/// Every call draws a new nonce, so encrypting the same input twice gives two
/// different blobs. The result is standard base64 text.
///
/// # Errors
///
/// Returns [`CryptoError::EmptyPassword`] before doing any work if the
/// password is empty.
pub fn encrypt(plaintext: &[u8], password: &str) -> Result<String, CryptoError> {
    if password.is_empty() {
        return Err(CryptoError::EmptyPassword);
    }

    let key = derive_key(password.as_bytes());
    let cipher = XChaCha20Poly1305::new(Key::from_slice(&key[..]));

    let nonce = generate_nonce()?;
    let sealed = cipher
        .encrypt(XNonce::from_slice(&nonce), plaintext)
        .map_err(|_| CryptoError::Encryption)?;

    Ok(CiphertextBlob::from_parts(nonce, sealed).encode())
}

/// Decrypts a base64 blob produced by [`encrypt`].
///
/// The tag check is the only signal for a bad key: a wrong password and a
/// modified blob fail the same way.
///
/// # Errors
///
/// * [`CryptoError::Encoding`] if `blob` is not base64 (or is empty).
/// * [`CryptoError::MalformedCiphertext`] if it is too short to hold a nonce and tag.
/// * [`CryptoError::Authentication`] if the tag does not verify.
pub fn decrypt(blob: &str, password: &str) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let blob = CiphertextBlob::decode(blob)?;

    let key = derive_key(password.as_bytes());
    let cipher = XChaCha20Poly1305::new(Key::from_slice(&key[..]));

    let plaintext = cipher
        .decrypt(XNonce::from_slice(blob.nonce()), blob.sealed())
        .map_err(|_| CryptoError::Authentication)?;
    Ok(Zeroizing::new(plaintext))
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use proptest::prelude::*;

    use super::*;
    use crate::crypto::MIN_BLOB_LEN;

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let blob = encrypt(b"TEST=value", "test-password").unwrap();
        let plaintext = decrypt(&blob, "test-password").unwrap();

        assert_eq!(plaintext.as_slice(), b"TEST=value");
    }

    #[test]
    fn empty_plaintext_roundtrip() {
        let blob = encrypt(b"", "test-password").unwrap();
        assert!(!blob.is_empty());

        let plaintext = decrypt(&blob, "test-password").unwrap();
        assert!(plaintext.is_empty());
    }

    #[test]
    fn large_plaintext_roundtrip() {
        let data = vec![b'a'; 1024 * 1024];
        let blob = encrypt(&data, "test-password").unwrap();

        assert_eq!(*decrypt(&blob, "test-password").unwrap(), data);
    }

    #[test]
    fn encryption_is_not_deterministic() {
        let a = encrypt(b"same", "pw").unwrap();
        let b = encrypt(b"same", "pw").unwrap();

        assert_ne!(a, b);
        assert_eq!(decrypt(&a, "pw").unwrap().as_slice(), b"same");
        assert_eq!(decrypt(&b, "pw").unwrap().as_slice(), b"same");
    }

    #[test]
    fn empty_password_is_rejected() {
        assert!(matches!(encrypt(b"data", ""), Err(CryptoError::EmptyPassword)));
        assert!(matches!(encrypt(b"", ""), Err(CryptoError::EmptyPassword)));
    }

    #[test]
    fn wrong_password_fails_authentication() {
        let blob = encrypt(b"secret", "correct").unwrap();

        assert!(matches!(
            decrypt(&blob, "wrong"),
            Err(CryptoError::Authentication)
        ));
    }

    #[test]
    fn tampered_blob_fails_like_wrong_password() {
        let blob = encrypt(b"secret", "pw").unwrap();
        let mut bytes = STANDARD.decode(&blob).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let tampered = STANDARD.encode(&bytes);

        assert!(matches!(
            decrypt(&tampered, "pw"),
            Err(CryptoError::Authentication)
        ));
    }

    #[test]
    fn truncated_blob_fails_authentication() {
        let blob = encrypt(b"some longer secret payload", "pw").unwrap();
        let bytes = STANDARD.decode(&blob).unwrap();
        let truncated = STANDARD.encode(&bytes[..bytes.len() - 4]);

        assert!(matches!(
            decrypt(&truncated, "pw"),
            Err(CryptoError::Authentication)
        ));
    }

    #[test]
    fn malformed_input_is_classified() {
        assert!(matches!(decrypt("", "pw"), Err(CryptoError::Encoding)));
        assert!(matches!(
            decrypt("not-valid-encoding!@#", "pw"),
            Err(CryptoError::Encoding)
        ));

        let short = STANDARD.encode(vec![0u8; MIN_BLOB_LEN - 1]);
        assert!(matches!(
            decrypt(&short, "pw"),
            Err(CryptoError::MalformedCiphertext { .. })
        ));
    }

    #[test]
    fn valid_base64_of_garbage_fails_authentication() {
        let garbage = STANDARD.encode(b"abcdefghijklmnopqrstuvwxyz0123456789ABCDEFGH");

        assert!(matches!(
            decrypt(&garbage, "pw"),
            Err(CryptoError::Authentication)
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn decrypt_inverts_encrypt(
            data in proptest::collection::vec(any::<u8>(), 0..512),
            password in "\\PC{1,32}",
        ) {
            let blob = encrypt(&data, &password).unwrap();
            let plaintext = decrypt(&blob, &password).unwrap();
            prop_assert_eq!(plaintext.as_slice(), data.as_slice());
        }
    }
}
