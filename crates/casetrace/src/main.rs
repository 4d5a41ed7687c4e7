// SPDX-FileCopyrightText: 2026 Casetrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Casetrace - command-line client for the fraud-investigation service.
//!
//! This is the binary entry point for the Casetrace CLI.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use casetrace_core::CasetraceError;
use casetrace_session::DEMO_ACCESS_TOKEN;

mod app;
mod cases;
mod doctor;
mod token;

use app::App;
use cases::CaseCommand;

/// Casetrace - investigate suspicious websites, emails, and documents.
#[derive(Parser, Debug)]
#[command(name = "casetrace", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in and cache the session.
    Login {
        /// Account email.
        email: String,
        /// Password; prompted for when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign out and discard the cached session.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Manage investigations.
    Case {
        #[command(subcommand)]
        command: CaseCommand,
    },
    /// Run diagnostic checks against the configuration and backend.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match casetrace_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            casetrace_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.client.log_level.clone()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli, config).await {
        eprintln!("casetrace: {err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: casetrace_config::CasetraceConfig) -> Result<(), CasetraceError> {
    let app = App::build(config)?;

    match cli.command {
        Some(Commands::Login { email, password }) => {
            let password = match password {
                Some(password) => password,
                None => rpassword::prompt_password("Password: ")
                    .map_err(|err| CasetraceError::Internal(err.to_string()))?,
            };
            let session = app.login(&email, &password).await?;
            if session.access_token == DEMO_ACCESS_TOKEN {
                println!("Signed in as {} (demo mode)", session.user.email);
            } else {
                println!("Signed in as {}", session.user.email);
            }
        }
        Some(Commands::Logout) => {
            // An unreachable backend must not block sign-out; the cached
            // session is discarded regardless.
            if let Err(err) = app.restore().await {
                tracing::warn!(error = %err, "session restore failed during logout");
            }
            app.logout().await?;
            println!("Signed out.");
        }
        Some(Commands::Whoami) => {
            app.restore().await?;
            match app.session.current_user().await {
                Some(user) => println!("{} ({})", user.email, user.id),
                None => println!("Not signed in. Run `casetrace login <email>`."),
            }
        }
        Some(Commands::Case { command }) => {
            cases::run(&app, command).await?;
        }
        Some(Commands::Doctor { plain }) => {
            doctor::run_doctor(&app, plain).await?;
        }
        None => {
            println!("casetrace: use --help for available commands");
        }
    }
    Ok(())
}
