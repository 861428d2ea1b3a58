//! Chime CLI - a desktop alarm clock for the terminal
//!
//! Set one or more wake/reminder times and wait: at the target time chime
//! rings a built tone or plays a chosen audio file until stopped.
//! Ctrl-C stops an active alarm; pressed while idle, it exits.

use std::time::Duration;

use anyhow::Result;
use clap::{CommandFactory, Parser};

use chime::cli::{Cli, Commands, Display, RunArgs};
use chime::{AlarmEngine, EngineConfig};

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging
    init_tracing();

    // Parse command line arguments
    let cli = Cli::parse();

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&e.to_string());
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    match cli.command {
        Some(Commands::Run(args)) => run_alarms(args).await,
        Some(Commands::Tones { json }) => {
            if json {
                Display::show_tones_json();
            } else {
                Display::show_tones();
            }
            Ok(())
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
            Ok(())
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

/// Registers the requested alarms and waits for them to ring.
async fn run_alarms(args: RunArgs) -> Result<()> {
    if args.at.is_empty() && args.preset.is_empty() {
        anyhow::bail!("set at least one alarm with --at HH:MM or --preset NAME");
    }

    let engine = AlarmEngine::with_defaults(EngineConfig::default());

    for time in &args.at {
        engine.add_alarm(&args.to_spec(*time))?;
    }
    for preset in &args.preset {
        engine.add_preset(*preset)?;
    }
    Display::show_alarms(&engine.alarms());

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    let mut was_ringing = false;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                if engine.is_ringing() {
                    engine.stop_ringing();
                    Display::show_stopped();
                } else {
                    println!();
                    break;
                }
            }
            _ = ticker.tick() => {
                let status = engine.status();
                if args.json {
                    Display::show_status_json(&status);
                } else {
                    if status.is_ringing && !was_ringing {
                        Display::show_ringing(status.ringing_label.as_deref().unwrap_or(""));
                    }
                    Display::show_countdown(&status);
                }
                was_ringing = status.is_ringing;

                // Done once every alarm has fired and been stopped.
                if status.alarms.is_empty() && !status.is_ringing {
                    println!();
                    break;
                }
            }
        }
    }

    engine.shutdown().await;
    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}
