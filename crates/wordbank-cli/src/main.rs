//! wordbank CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wordbank_core::model::PartOfSpeech;

mod commands;

use commands::add::EntryFields;
use commands::list::ListArgs;
use commands::Globals;

#[derive(Parser)]
#[command(
    name = "wordbank",
    version,
    about = "Personal vocabulary manager with AI-graded practice"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the entry file (overrides the config)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Run against a copy of the entries; nothing is written to disk
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter wordbank.toml
    Init,

    /// Add a word or phrase
    Add {
        word: String,

        /// Part of speech (verb, noun, adj, adv, phrasal-verb, phrase, other)
        #[arg(long, default_value = "verb")]
        pos: PartOfSpeech,

        /// Autofill empty fields from the dictionary
        #[arg(long)]
        lookup: bool,

        #[command(flatten)]
        fields: EntryFields,
    },

    /// Edit an existing entry
    Edit {
        id: String,

        /// Replace the word
        #[arg(long)]
        word: Option<String>,

        #[arg(long)]
        pos: Option<PartOfSpeech>,

        /// Remove a tag (repeatable)
        #[arg(long = "untag")]
        untag: Vec<String>,

        #[command(flatten)]
        fields: EntryFields,
    },

    /// List entries with filters
    List(ListArgs),

    /// Show one entry in full
    Show { id: String },

    /// Delete an entry
    Delete { id: String },

    /// Collection statistics
    Stats,

    /// Write a sentence with the word and have it graded
    Practice {
        id: String,

        /// The sentence to grade
        #[arg(long)]
        sentence: Option<String>,

        /// Model alias (see `list-models`)
        #[arg(long)]
        model: Option<String>,

        /// Save the improved sentence as an example if it scores high enough
        #[arg(long)]
        add_to_examples: bool,

        /// Print a writing prompt for the word
        #[arg(long)]
        scenario: bool,
    },

    /// Look a word up in the dictionary
    Lookup {
        word: String,

        #[arg(long, default_value = "verb")]
        pos: PartOfSpeech,
    },

    /// Check the spelling of a word
    SpellCheck { word: String },

    /// Translate English text into Traditional Chinese
    Translate { text: String },

    /// Correct an example sentence for a word
    Correct {
        word: String,

        sentence: String,

        #[arg(long, default_value = "verb")]
        pos: PartOfSpeech,
    },

    /// Export all entries as JSON
    Export {
        /// Output file (stdout if omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Import entries from a JSON export
    Import { file: PathBuf },

    /// List configured model aliases
    ListModels,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wordbank=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let globals = Globals {
        config: cli.config,
        data_dir: cli.data_dir,
        dry_run: cli.dry_run,
    };

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Add {
            word,
            pos,
            lookup,
            fields,
        } => commands::add::execute(&globals, word, pos, lookup, fields).await,
        Commands::Edit {
            id,
            word,
            pos,
            untag,
            fields,
        } => commands::edit::execute(&globals, id, word, pos, untag, fields).await,
        Commands::List(args) => commands::list::execute(&globals, args).await,
        Commands::Show { id } => commands::show::execute(&globals, id).await,
        Commands::Delete { id } => commands::delete::execute(&globals, id).await,
        Commands::Stats => commands::stats::execute(&globals).await,
        Commands::Practice {
            id,
            sentence,
            model,
            add_to_examples,
            scenario,
        } => {
            commands::practice::execute(&globals, id, sentence, model, add_to_examples, scenario)
                .await
        }
        Commands::Lookup { word, pos } => commands::lookup::execute(&globals, word, pos).await,
        Commands::SpellCheck { word } => commands::assist::spell_check(&globals, word).await,
        Commands::Translate { text } => commands::assist::translate(&globals, text).await,
        Commands::Correct {
            word,
            sentence,
            pos,
        } => commands::assist::correct(&globals, word, pos, sentence).await,
        Commands::Export { output } => commands::transfer::export(&globals, output).await,
        Commands::Import { file } => commands::transfer::import(&globals, file).await,
        Commands::ListModels => commands::list_models::execute(&globals),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
