//! Interactive session loop.

use anyhow::Result;
use secure_env::{Filesystem, ProjectVault};
use std::io::{BufRead, Write};
use std::path::Path;

use crate::commands;

pub fn show_menu<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "\n=== Secure ENV Manager ===")?;
    writeln!(out, "1. Encrypt .env file")?;
    writeln!(out, "2. Decrypt file")?;
    writeln!(out, "3. Exit")?;
    write!(out, "\nChoose an option: ")?;
    out.flush()?;
    Ok(())
}

/// Reads one trimmed line, or `None` at end of input.
pub fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    label: &str,
) -> Result<Option<String>> {
    write!(out, "{label}")?;
    out.flush()?;
    read_line(input)
}

/// Runs the menu until the user exits or input ends.
///
/// Operation errors are printed and the loop continues; only I/O errors on
/// the session streams end it early.
pub fn run<F, R, W>(
    vault: &ProjectVault<F>,
    password: &str,
    input: &mut R,
    out: &mut W,
) -> Result<()>
where
    F: Filesystem,
    R: BufRead,
    W: Write,
{
    loop {
        show_menu(out)?;
        let Some(option) = read_line(input)? else {
            break;
        };

        match option.as_str() {
            "1" => {
                let Some(project) = prompt(input, out, "\nProject name: ")? else {
                    break;
                };
                let Some(path) = prompt(input, out, "Path to .env file: ")? else {
                    break;
                };

                match commands::encrypt(vault, &project, Path::new(&path), password) {
                    Ok(artifact) => {
                        writeln!(out, "\nEncrypted file saved at: {}", artifact.display())?;
                    }
                    Err(e) => writeln!(out, "Error: {e:#}")?,
                }
            }
            "2" => {
                let Some(project) = prompt(input, out, "\nProject name: ")? else {
                    break;
                };
                let Some(path) = prompt(input, out, "Path to save decrypted file: ")? else {
                    break;
                };

                match commands::decrypt(vault, &project, Path::new(&path), password) {
                    Ok(()) => writeln!(out, "Decrypted file saved at: {path}")?,
                    Err(e) => writeln!(out, "Error: {e:#}")?,
                }
            }
            "3" => break,
            _ => writeln!(out, "\nInvalid option")?,
        }
    }

    writeln!(out, "\nGoodbye!")?;
    Ok(())
}
