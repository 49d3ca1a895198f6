//! logg CLI
//!
//! Thin wrapper around logg-core for trying out logger configurations.
//!
//! ## Usage
//!
//! ```bash
//! # Emit one message through the sinks described in an INI file
//! logg --config log_config.ini emit --level warn "disk almost full"
//!
//! # Without a config, messages go to the console sink
//! logg emit "hello"
//!
//! # Push many messages through the async queue and report throughput
//! logg --config log_config.ini burst --count 100000 --async --queue 256
//!
//! # Show what an INI file configures
//! logg check log_config.ini
//! ```

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use logg_core::{Level, Logger, LoggerConfig, DEFAULT_QUEUE_LEN};

/// logg - leveled logging with pluggable sinks
#[derive(Parser)]
#[command(name = "logg")]
#[command(version = "0.1.0")]
#[command(about = "Drive the logg logging facility from the command line")]
struct Cli {
    /// Increase diagnostic verbosity on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Logger INI configuration (default: a single console sink)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Emit a single message
    Emit {
        /// Level name: fatal, error, warn, info or debug
        #[arg(short, long, default_value = "info")]
        level: String,

        /// Prefix the message with the caller's file:line
        #[arg(long)]
        caller: bool,

        /// Message words, joined with spaces
        #[arg(required = true)]
        message: Vec<String>,
    },

    /// Emit many messages and report throughput
    Burst {
        /// Number of messages
        #[arg(short = 'n', long, default_value_t = 10_000)]
        count: usize,

        /// Route messages through the async dispatch worker
        #[arg(long = "async")]
        use_async: bool,

        /// Async queue capacity
        #[arg(short, long, default_value_t = DEFAULT_QUEUE_LEN)]
        queue: usize,
    },

    /// Parse an INI file and print the resulting logger setup
    Check {
        /// INI file to inspect
        file: PathBuf,
    },
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();
}

/// Build a logger from the INI file, or a plain console logger without one
fn build_logger(config: Option<&Path>, queue: usize) -> Result<Logger> {
    let logger = Logger::new(queue);
    match config {
        Some(path) => logger
            .load_config(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => logger.set_sink("console", "")?,
    }
    tracing::info!(sinks = ?logger.sink_names(), level = %logger.level(), "logger ready");
    Ok(logger)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    match cli.command {
        Commands::Emit {
            level,
            caller,
            message,
        } => {
            let level: Level = level.parse()?;
            let logger = build_logger(cli.config.as_deref(), DEFAULT_QUEUE_LEN)?;
            if caller {
                logger.enable_caller(true);
            }
            logger.log(level, format_args!("{}", message.join(" ")));
            logger.close();
        }

        Commands::Burst {
            count,
            use_async,
            queue,
        } => {
            let logger = build_logger(cli.config.as_deref(), queue)?;
            if use_async {
                logger.start_async()?;
            }

            let start = Instant::now();
            for i in 0..count {
                logger.info(format_args!("burst message {}", i));
            }
            logger.close();
            let elapsed = start.elapsed();

            eprintln!(
                "Wrote {} messages in {:?} ({:.2} msg/ms, {})",
                count,
                elapsed,
                count as f64 / elapsed.as_millis().max(1) as f64,
                if use_async { "async" } else { "sync" }
            );
        }

        Commands::Check { file } => {
            let config = LoggerConfig::load(&file)
                .with_context(|| format!("parsing {}", file.display()))?;

            println!("Config: {}", file.display());
            println!(
                "  Level: {}",
                config.level.map(|l| l.to_string()).unwrap_or_else(|| "(default)".into())
            );
            println!("  Caller: {}", config.caller.unwrap_or(false));
            if config.appenders.is_empty() {
                println!("  Appenders: (none)");
            } else {
                println!("  Appenders:");
                for spec in &config.appenders {
                    let options = if spec.config.is_empty() {
                        "{}"
                    } else {
                        spec.config.as_str()
                    };
                    println!("    {} ({}) {}", spec.label, spec.kind, options);
                }
            }
        }
    }

    Ok(())
}
