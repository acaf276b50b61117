//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use std::io;
use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};

use crate::analysis::AnalysisError;
use crate::commands::{self, SessionOverrides};
use crate::logging;

/// A terminal audio spectrum analyzer with adaptive calibration
#[derive(Parser)]
#[command(name = "specbars")]
#[command(version)]
#[command(long_about = "A terminal audio spectrum analyzer with adaptive calibration.\n\nThe first values seen are used to learn the display range; after that every\nfrequency bin is drawn as a bar scaled into that range, redrawn in place.\n\nDEFAULT COMMAND:\n    If no command is specified, 'live' is used by default.\n\nEXAMPLES:\n    # Analyze the default input device\n    $ specbars\n\n    # Use device #2 at 22050 Hz with a longer calibration\n    $ specbars live -d 2 -r 22050 --calibration-steps 200\n\n    # Analyze a recording\n    $ specbars file recording.wav")]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/specbars/specbars.toml\n    Logs:               ~/.local/state/specbars/specbars.log.*"
)]
struct Cli {
    #[command(flatten)]
    session: SessionArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Overrides for the analysis session, applied on top of the config file.
#[derive(Args, Debug, Clone, Default)]
struct SessionArgs {
    /// Input device: "default", an index or a name from `list-devices`
    #[arg(short, long, global = true)]
    device: Option<String>,

    /// Requested sample rate in Hz
    #[arg(short = 'r', long, global = true)]
    sample_rate: Option<u32>,

    /// Learning steps before the display range freezes
    #[arg(long, value_name = "N", global = true)]
    calibration_steps: Option<u64>,
}

impl From<SessionArgs> for SessionOverrides {
    fn from(args: SessionArgs) -> Self {
        Self {
            device: args.device,
            sample_rate: args.sample_rate,
            calibration_steps: args.calibration_steps,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the input device in real time (default)
    ///
    /// Press Ctrl-C to stop.
    #[command(visible_alias = "l")]
    Live,

    /// Analyze a WAV file
    ///
    /// Multi-channel files are mixed down to mono. The file's sample rate is
    /// used for the frequency labels.
    #[command(visible_alias = "f")]
    File {
        /// Path to the WAV file
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },

    /// Open configuration file in your preferred editor
    ///
    /// Creates the file with default values if it does not exist yet.
    /// Uses $EDITOR environment variable or falls back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// Print the default configuration
    #[command(name = "init-config")]
    InitConfig,

    /// List available audio input devices
    ///
    /// Shows device IDs, names, and configurations to help configure
    /// the correct input device in specbars.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    Logs,

    /// Generate shell completion script
    ///
    /// Examples:
    ///   specbars completions bash > specbars.bash
    ///   specbars completions zsh > _specbars
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Errors
/// - If logging initialization fails
/// - If command execution fails (configuration, device, or pipeline errors)
pub fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Commands that don't need logging
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "specbars", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::InitConfig) => return commands::handle_init_config(),
        Some(Commands::ListDevices) => return commands::handle_list_devices(),
        Some(Commands::Logs) => return commands::handle_logs(),
        _ => {}
    }

    logging::init_logging()?;

    let overrides = SessionOverrides::from(cli.session);
    match cli.command {
        None | Some(Commands::Live) => commands::handle_live(&overrides)?,
        Some(Commands::File { path }) => commands::handle_file(&path, &overrides)?,
        Some(Commands::Config) => commands::handle_config()?,
        Some(Commands::Completions { .. })
        | Some(Commands::InitConfig)
        | Some(Commands::ListDevices)
        | Some(Commands::Logs) => unreachable!("These commands are handled earlier"),
    }

    Ok(())
}

/// The one-line message printed for a failed run.
///
/// Pipeline failures are prefixed with the stage that failed; anything else
/// (CLI, config file, editor) is printed with its context chain.
pub fn diagnostic(err: &anyhow::Error) -> String {
    match err.downcast_ref::<AnalysisError>() {
        Some(failure) => format!("Error: {}: {failure}", failure.stage()),
        None => format!("Error: {err:#}"),
    }
}
