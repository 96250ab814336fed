// SPDX-FileCopyrightText: 2026 Shiftswap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shiftswap -- shift-exchange client for a personal work-schedule planner.
//!
//! This is the binary entry point. It loads and validates configuration,
//! initializes logging, wires the [`shiftswap::ExchangeRuntime`], and runs
//! one command against it.

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use shiftswap::ExchangeRuntime;
use shiftswap_core::{AuthStatus, LoginInput, RegisterInput};

/// Shiftswap -- trade worked days with your colleagues.
#[derive(Parser, Debug)]
#[command(name = "shiftswap", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in and persist the session token.
    Login {
        email: String,
        password: String,
    },
    /// Create an account and sign in.
    Register {
        email: String,
        password: String,
        #[arg(long)]
        display_name: Option<String>,
    },
    /// Sign out and remove the persisted token.
    Logout,
    /// Show the current session.
    Status,
    /// List public exchange requests.
    Requests {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// List your conversations.
    Conversations {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match shiftswap_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            shiftswap_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.client.log_level.clone())),
        )
        .init();

    let runtime = match ExchangeRuntime::new(&config) {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            std::process::exit(1);
        }
    };

    if let Err(err) = run(&cli.command, &runtime).await {
        eprintln!("{} {err}", "error:".red().bold());
        std::process::exit(1);
    }
}

async fn run(
    command: &Commands,
    runtime: &ExchangeRuntime,
) -> Result<(), shiftswap_core::ExchangeError> {
    match command {
        Commands::Login { email, password } => {
            runtime
                .auth
                .login(&LoginInput {
                    email: email.clone(),
                    password: password.clone(),
                })
                .await?;
            print_session(runtime);
        }
        Commands::Register {
            email,
            password,
            display_name,
        } => {
            runtime
                .auth
                .register(&RegisterInput {
                    email: email.clone(),
                    password: password.clone(),
                    display_name: display_name.clone(),
                })
                .await?;
            print_session(runtime);
        }
        Commands::Logout => {
            runtime.auth.logout().await?;
            println!("{}", "signed out".green());
        }
        Commands::Status => {
            runtime.auth.bootstrap().await?;
            print_session(runtime);
        }
        Commands::Requests { page } => {
            runtime.auth.bootstrap().await?;
            runtime.requests.fetch_requests(*page).await?;
            let state = runtime.requests.state();
            if state.items.is_empty() {
                println!("no open exchange requests on page {page}");
            }
            for request in &state.items {
                let service = request
                    .offered_service
                    .code()
                    .or(request.offered_service.text())
                    .unwrap_or("-");
                println!(
                    "{}  {}  {}  {} alternatives",
                    request.id.bold(),
                    request.offered_date,
                    service,
                    request.counter_proposals.len()
                );
            }
            if state.has_next {
                println!("{}", format!("more on page {}", page + 1).dimmed());
            }
        }
        Commands::Conversations { page } => {
            runtime.auth.bootstrap().await?;
            runtime.conversations.fetch_conversations(*page).await?;
            let state = runtime.conversations.state();
            if state.items.is_empty() {
                println!("no conversations on page {page}");
            }
            for conversation in &state.items {
                println!(
                    "{}  {}  {} <-> {}",
                    conversation.id.bold(),
                    conversation.status,
                    conversation.user_a,
                    conversation.user_b
                );
            }
        }
    }
    Ok(())
}

fn print_session(runtime: &ExchangeRuntime) {
    let state = runtime.auth.state();
    match state.status {
        AuthStatus::Authenticated => {
            if let Some(user) = &state.current_user {
                println!(
                    "{} {} <{}>",
                    "signed in as".green(),
                    user.display_name.bold(),
                    user.email
                );
            }
        }
        AuthStatus::Anonymous => println!("{}", "not signed in".yellow()),
        AuthStatus::Loading => println!("session is loading"),
        AuthStatus::Error => {
            if let Some(err) = &state.error {
                println!("{} {err}", "session error:".red());
            }
        }
    }
}
