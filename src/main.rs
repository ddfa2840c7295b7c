use anyhow::Result;
use clap::{Parser, Subcommand};
mod auth;
mod commands;
mod menu;
use secure_env::ProjectVault;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

#[derive(Debug, Parser)]
#[command(name = "secure-env")]
#[command(
    version,
    about = "Encrypts and decrypts per-project .env files with a password."
)]
struct Cli {
    /// Directory that project names are resolved against
    #[arg(
        long,
        global = true,
        value_name = "DIR",
        env = "SECURE_ENV_ROOT",
        default_value = "."
    )]
    root: PathBuf,

    /// User name, checked against SECURE_ENV_INITIAL_USER
    user: String,

    /// Password, checked against SECURE_ENV_INITIAL_PASS; prompted when omitted
    pass: Option<String>,

    /// Runs one operation instead of the interactive menu
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Encrypts an .env file into the project's artifact
    #[command(arg_required_else_help = true)]
    Encrypt { project: String, path: PathBuf },

    /// Decrypts the project's artifact into a file
    #[command(arg_required_else_help = true)]
    Decrypt { project: String, path: PathBuf },

    /// Lists the variable names stored for a project
    #[command(arg_required_else_help = true)]
    Keys { project: String },
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_env("SECURE_ENV_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let Cli {
        root,
        user,
        pass,
        command,
    } = Cli::parse();

    let credentials = auth::Credentials::from_env()?;
    let password = match pass {
        Some(pass) => Zeroizing::new(pass),
        None => auth::read_password()?,
    };
    credentials.verify(&user, &password)?;
    drop(credentials);

    let vault = ProjectVault::new(root);
    tracing::debug!(root = %vault.root().display(), "session opened");

    match command {
        Some(Commands::Encrypt { project, path }) => {
            let artifact = commands::encrypt(&vault, &project, &path, &password)?;
            println!("Encrypted file saved at: {}", artifact.display());
        }
        Some(Commands::Decrypt { project, path }) => {
            commands::decrypt(&vault, &project, &path, &password)?;
            println!("Decrypted file saved at: {}", path.display());
        }
        Some(Commands::Keys { project }) => {
            for key in commands::keys(&vault, &project, &password)? {
                println!("{key}");
            }
        }
        None => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            menu::run(&vault, &password, &mut stdin.lock(), &mut stdout.lock())?;
        }
    }

    Ok(())
}
