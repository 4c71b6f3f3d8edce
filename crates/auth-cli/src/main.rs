// ============================
// crates/auth-cli/src/main.rs
// ============================
//! `user-auth` command line front end.
//!
//! Passwords are read from stdin so they never show up in the process list or
//! shell history.
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use user_auth::{config::Settings, AppState};
use zeroize::Zeroizing;

#[derive(Parser)]
#[command(name = "user-auth", version, about = "Register users, check logins, issue sessions")]
struct Cli {
    /// Path to a TOML config file (defaults to ./user-auth.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a new user; the password is read from stdin
    Register {
        #[arg(long)]
        email: String,
    },
    /// Check a password read from stdin; exits 1 when it does not match
    Login {
        #[arg(long)]
        email: String,
    },
    /// Create a session for a user and print the token
    Session {
        #[arg(long)]
        email: String,
    },
    /// Print the email of the user holding a session token
    Whoami {
        #[arg(long)]
        session_id: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    init_tracing(&settings.log_level);
    debug!(store = ?settings.store, "settings loaded");

    let state = AppState::open(settings)?;

    match cli.command {
        Command::Register { email } => {
            let password = read_password()?;
            let user = state.auth.register_user(&email, &password).await?;
            println!("registered {} (id {})", user.email, user.id);
        }
        Command::Login { email } => {
            let password = read_password()?;
            if !state.auth.valid_login(&email, &password).await? {
                println!("invalid credentials");
                return Ok(ExitCode::FAILURE);
            }
            println!("ok");
        }
        Command::Session { email } => {
            let token = state.auth.create_session(&email).await?;
            println!("{token}");
        }
        Command::Whoami { session_id } => {
            match state.auth.get_user_from_session_id(&session_id).await? {
                Some(user) => println!("{}", user.email),
                None => {
                    println!("no such session");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// `RUST_LOG` wins over the configured level
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_password() -> Result<Zeroizing<String>> {
    let mut line = Zeroizing::new(String::new());
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password from stdin")?;

    let trimmed = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(trimmed);
    Ok(line)
}
