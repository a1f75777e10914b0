#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::too_many_lines)]

mod commands;
mod logging;

use bundleplan_core::{Config, Mode};
use clap::Parser;
use miette::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bundleplan")]
#[command(author, version, about = "Build and test-session descriptors for a bundled web app", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the project root
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Print the build plan
    BuildPlan {
        /// Build mode. Anything other than "development" is production-like.
        #[arg(long, short = 'm', default_value = "development")]
        mode: String,
    },

    /// Print the test-session descriptor
    TestPlan {
        /// List the test files the session would run instead
        #[arg(long)]
        list_files: bool,
    },

    /// Show the handler chain applied to a file
    Explain {
        /// File to explain, relative to the project root
        file: PathBuf,

        /// Use the test-session rules (with coverage instrumentation)
        #[arg(long, conflicts_with = "mode")]
        test: bool,

        /// Build mode for the build-plan rules
        #[arg(long, short = 'm', default_value = "development")]
        mode: String,
    },

    /// Render the fingerprinted output filename for a file
    Fingerprint {
        /// File whose content is hashed
        file: PathBuf,

        /// Chunk name (defaults to the file stem)
        #[arg(long)]
        name: Option<String>,
    },

    /// Write the test-session descriptor and hand it to an external runner
    Test {
        /// Runner program; receives the descriptor path as its last argument
        #[arg(long)]
        runner: String,

        /// Where to write the descriptor, relative to the project root
        #[arg(long, default_value = commands::test::DEFAULT_DESCRIPTOR)]
        out: PathBuf,

        /// Arguments passed to the runner before the descriptor path (after --)
        #[arg(last = true)]
        args: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::resolved(cli.cwd)
        .with_verbosity(cli.verbose)
        .with_json_logs(cli.json);

    logging::init(config.verbosity, config.json_logs);

    let _span = tracing::info_span!("bundleplan", cwd = %config.cwd.display()).entered();

    match cli.command {
        None | Some(Commands::Version) => commands::version::run(),
        Some(Commands::BuildPlan { mode }) => commands::build_plan::run(&config, Mode::parse(&mode)),
        Some(Commands::TestPlan { list_files }) => commands::test_plan::run(&config, list_files),
        Some(Commands::Explain { file, test, mode }) => {
            commands::explain::run(&config, &file, test, Mode::parse(&mode))
        }
        Some(Commands::Fingerprint { file, name }) => {
            commands::fingerprint::run(&config, &file, name.as_deref())
        }
        Some(Commands::Test { runner, out, args }) => commands::test::run(
            &config,
            commands::test::TestAction { runner, out, args },
        ),
    }
}
