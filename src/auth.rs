use anyhow::{Result, bail};
use sha2::{Digest, Sha256};
use std::io::{self, IsTerminal};
use zeroize::Zeroizing;

pub const USER_ENV: &str = "SECURE_ENV_INITIAL_USER";
pub const PASS_ENV: &str = "SECURE_ENV_INITIAL_PASS";

/// The credentials a session must present before the vault is usable.
pub struct Credentials {
    user: String,
    pass: Zeroizing<String>,
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        Self::from_values(std::env::var(USER_ENV).ok(), std::env::var(PASS_ENV).ok())
    }

    pub fn from_values(user: Option<String>, pass: Option<String>) -> Result<Self> {
        match (user, pass) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Ok(Self {
                user,
                pass: Zeroizing::new(pass),
            }),
            _ => bail!("{USER_ENV} and {PASS_ENV} must be set"),
        }
    }

    /// Checks a login attempt. Both fields are always compared.
    pub fn verify(&self, user: &str, pass: &str) -> Result<()> {
        let user_ok = digest_eq(self.user.as_bytes(), user.as_bytes());
        let pass_ok = digest_eq(self.pass.as_bytes(), pass.as_bytes());

        if !(user_ok & pass_ok) {
            tracing::warn!("rejected login attempt");
            bail!("invalid credentials");
        }
        Ok(())
    }
}

/// Compares two secrets through their SHA-256 digests without early exit.
fn digest_eq(a: &[u8], b: &[u8]) -> bool {
    let a = Sha256::digest(a);
    let b = Sha256::digest(b);

    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Reads the session password when it was not passed as an argument.
pub fn read_password() -> Result<Zeroizing<String>> {
    //  stdin (Pipeline)
    //  printf "%s\n" "$PASS" | secure-env alice encrypt acme .env
    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_line(&mut buf)?;
        trim_newline(&mut buf);

        if !buf.is_empty() {
            return Ok(buf);
        }
    }

    //  Interactive (TTY)
    if io::stdin().is_terminal() {
        let pw = Zeroizing::new(rpassword::prompt_password("Password: ")?);
        if !pw.is_empty() {
            return Ok(pw);
        }
    }

    bail!("No password provided")
}

fn trim_newline(s: &mut String) {
    while s.ends_with('\n') || s.ends_with('\r') {
        s.pop();
    }
}
