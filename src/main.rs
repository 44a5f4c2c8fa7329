//! # Note Recall CLI (`recall`)
//!
//! Builds the note index and answers questions against it.
//!
//! ## Usage
//!
//! ```bash
//! recall --config ./config/recall.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `recall index` | Rebuild the vector index and metadata from the vault |
//! | `recall ask "<question>"` | Answer a question from the notes |
//! | `recall context "<question>"` | Show the context a question resolves to |
//! | `recall classify` | Label workout chunks with a training split |
//! | `recall stats` | Summarise the persisted index |
//! | `recall completions <shell>` | Print a shell completion script |
//!
//! ## Examples
//!
//! ```bash
//! # What happened on a given day
//! recall ask "What did I do on 2025-11-03?" --type workouts
//!
//! # Side-by-side weeks
//! recall ask "Compare week 10 and week 12" --type workouts
//!
//! # Force semantic retrieval even when the question names a date
//! recall ask "How did 2025-11-03 feel compared to usual?" --no-date
//!
//! # Preview labels, then persist them
//! recall classify
//! recall classify --write
//! ```

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use note_recall::context::{QueryProfile, TypeFilter};
use note_recall::intent::IntentBranches;
use note_recall::{ask, config, ingest, splits, stats};

/// Note Recall: question answering over a personal Markdown vault.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/recall.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "recall",
    about = "Note Recall: question answering over a personal Markdown vault",
    version,
    long_about = "Note Recall indexes a Markdown vault into token-window chunks with \
    embeddings, then answers questions by exact-date lookup, week lookup or semantic \
    retrieval, grounding a single generator call in the matching notes."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/recall.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the index from the vault.
    ///
    /// Scans the vault, chunks every note, embeds every chunk and replaces
    /// the index and metadata files. Requires an embedding provider.
    Index,

    /// Answer a question from the notes.
    ///
    /// Prints "Not found in notes." without calling the generator when no
    /// note matches.
    Ask(QueryArgs),

    /// Show the context a question resolves to, without generating.
    Context(QueryArgs),

    /// Label workout chunks as Push, Pull, Legs or Mixed.
    ///
    /// Dry run by default; records that already have a label are skipped.
    Classify {
        /// Persist labels to the metadata file.
        #[arg(long)]
        write: bool,
    },

    /// Summarise the persisted index.
    Stats,

    /// Print a shell completion script.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
struct QueryArgs {
    /// The question. Multiple words are joined with spaces.
    #[arg(required = true, num_args = 1..)]
    question: Vec<String>,

    /// Only use notes whose front matter `type` equals this value.
    #[arg(long = "type")]
    note_type: Option<String>,

    /// Do not resolve `week N` mentions; fall through to semantic retrieval.
    #[arg(long)]
    no_week: bool,

    /// Do not resolve ISO dates; fall through to week or semantic retrieval.
    #[arg(long)]
    no_date: bool,

    /// Number of nearest chunks for semantic retrieval.
    #[arg(long)]
    top_k: Option<usize>,
}

impl QueryArgs {
    fn question(&self) -> String {
        self.question.join(" ")
    }

    fn profile(&self) -> QueryProfile {
        QueryProfile {
            type_filter: TypeFilter::from_option(self.note_type.clone()),
            branches: IntentBranches {
                exact_date: !self.no_date,
                week_range: !self.no_week,
            },
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("RECALL_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("note_recall=info,recall=info"),
            1 => EnvFilter::new("note_recall=debug,recall=debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let load = || config::load_config(&cli.config);

    match &cli.command {
        Commands::Index => {
            ingest::run_index(&load()?).await?;
        }
        Commands::Ask(args) => {
            ask::run_ask(&load()?, &args.question(), &args.profile(), args.top_k).await?;
        }
        Commands::Context(args) => {
            ask::run_context(&load()?, &args.question(), &args.profile(), args.top_k).await?;
        }
        Commands::Classify { write } => {
            splits::run_classify(&load()?, *write).await?;
        }
        Commands::Stats => {
            stats::run_stats(&load()?).await?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "recall", &mut std::io::stdout());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_query_flags_map_to_profile() {
        let cli = Cli::parse_from([
            "recall", "ask", "compare", "week", "10", "--type", "workouts", "--no-date",
        ]);
        let Commands::Ask(args) = cli.command else {
            panic!("expected ask");
        };
        assert_eq!(args.question(), "compare week 10");
        let profile = args.profile();
        assert_eq!(profile.type_filter.note_type(), Some("workouts"));
        assert!(!profile.branches.exact_date);
        assert!(profile.branches.week_range);
    }
}
