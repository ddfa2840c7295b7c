use sha2::{Digest, Sha256};
use zeroize::{Zeroize, Zeroizing};

use super::KEY_LEN;

/// Derives the 32-byte encryption key from a password.
///
/// The key is the SHA-256 digest of the password bytes. There is no salt and
/// no work factor, so the same password always yields the same key and an
/// artifact can be opened from any process with nothing but the password.
/// This never fails, including for the empty password.
pub fn derive_key(password: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut digest = Sha256::digest(password);

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    key.copy_from_slice(&digest);
    digest.as_mut_slice().zeroize();

    key
}
