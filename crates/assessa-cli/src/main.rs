//! assessa CLI — take and grade quiz assessments from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "assessa", version, about = "Timed quiz assessments in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a quiz interactively
    Take {
        /// Quiz id (looked up in quiz_dir) or path to a .toml quiz file
        #[arg(long)]
        quiz: String,

        /// Learner id (overrides config)
        #[arg(long)]
        learner: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Grade a set of answers non-interactively
    Grade {
        /// Quiz id (looked up in quiz_dir) or path to a .toml quiz file
        #[arg(long)]
        quiz: String,

        /// JSON file mapping question id to answer
        #[arg(long)]
        answers: PathBuf,

        /// Seconds the learner spent (untimed quizzes only)
        #[arg(long)]
        elapsed: Option<u64>,

        /// Record the attempt in the attempt store
        #[arg(long)]
        record: bool,

        /// Print the attempt as JSON
        #[arg(long)]
        json: bool,

        /// Learner id (overrides config)
        #[arg(long)]
        learner: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List recorded attempts for a quiz
    Attempts {
        /// Quiz id
        #[arg(long)]
        quiz: String,

        /// Learner id (overrides config)
        #[arg(long)]
        learner: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate quiz TOML files
    Validate {
        /// Path to quiz file or directory
        #[arg(long)]
        quiz: PathBuf,
    },

    /// Create starter config and example quiz
    Init,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("assessa=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            quiz,
            learner,
            config,
        } => commands::take::execute(quiz, learner, config).await,
        Commands::Grade {
            quiz,
            answers,
            elapsed,
            record,
            json,
            learner,
            config,
        } => {
            commands::grade::execute(quiz, answers, elapsed, record, json, learner, config).await
        }
        Commands::Attempts {
            quiz,
            learner,
            config,
        } => commands::attempts::execute(quiz, learner, config).await,
        Commands::Validate { quiz } => commands::validate::execute(quiz),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
