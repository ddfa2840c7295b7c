//! Password-protected storage for `.env` files, one encrypted artifact per project.
//!
//! ```no_run
//! use std::path::Path;
//! use secure_env::ProjectVault;
//!
//! # fn main() -> Result<(), secure_env::VaultError> {
//! let vault = ProjectVault::new("vault");
//! vault.encrypt_project_file("acme", Path::new(".env"), "password")?;
//! vault.decrypt_project_file("acme", Path::new(".env.restored"), "password")?;
//! # Ok(())
//! # }
//! ```

pub mod crypto;
mod error;
pub mod fs;
mod vault;

pub use crate::crypto::{CiphertextBlob, decrypt, derive_key, encrypt};
pub use crate::error::{CryptoError, VaultError};
pub use crate::fs::{Filesystem, OsFilesystem, Permissions};
pub use crate::vault::{ARTIFACT_FILE_NAME, ProjectVault};
