// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::{IsTerminal, Read, Write};
use std::path::PathBuf;

use vocadeck::app_config::{self, Config};
use vocadeck::enrichment::CancelToken;
use vocadeck::errors::AppError;
use vocadeck::file_utils::FileManager;
use vocadeck::Controller;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Enrich new words and assemble the package (default command)
    Build(BuildArgs),

    /// Print the stored cards as a table
    List {
        /// Configuration file path
        #[arg(short, long = "config", default_value = "conf.json")]
        config_path: String,
    },

    /// Generate shell completions for vocadeck
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// File with words separated by commas, semicolons, tabs or newlines (stdin if omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Language of the words (e.g., 'en', 'de')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Language of the translations (e.g., 'ru', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Package output path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long = "config", default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// vocadeck - vocabulary flashcards with translations, examples and audio
#[derive(Parser, Debug)]
#[command(name = "vocadeck")]
#[command(version)]
#[command(about = "Turn a list of words into an Anki flashcard deck")]
#[command(long_about = "vocadeck looks up a translation, an example sentence and pronunciation audio
for every new word and writes an Anki-importable deck.

EXAMPLES:
    vocadeck --input words.txt                 # Enrich the words in words.txt
    echo 'cat, dog' | vocadeck                 # Read words from stdin
    vocadeck -s en -t de --input words.txt     # Translate English words to German
    vocadeck list                              # Show stored cards
    vocadeck completions bash > vocadeck.bash  # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    build: BuildArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Tag and ANSI color for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("ERROR", "1;31"),
            Level::Warn => ("WARN ", "1;33"),
            Level::Info => ("INFO ", "1;32"),
            Level::Debug => ("DEBUG", "1;36"),
            Level::Trace => ("TRACE", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (tag, color) = Self::style_for_level(record.level());
            let _ = writeln!(std::io::stderr(), "\x1B[{}m{} {} {}\x1B[0m", color, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The level is lowered or raised once the config is loaded
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "vocadeck", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::List { config_path }) => {
            let config = load_config(&config_path)?;
            log::set_max_level(config.log_level.to_level_filter());
            let controller = Controller::with_config(config)?;
            println!("{}", controller.list_cards()?);
            Ok(())
        }
        Some(Commands::Build(args)) => run_build(args).await,
        None => run_build(cli.build).await,
    }
}

fn load_config(config_path: &str) -> Result<Config> {
    Config::load_or_create(config_path).with_context(|| format!("Failed to load config file: {}", config_path))
}

async fn run_build(options: BuildArgs) -> Result<()> {
    let mut config = load_config(&options.config_path)?;

    // Override config with CLI options if provided
    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }
    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }
    if let Some(output) = &options.output {
        config.storage.output = output.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
    log::set_max_level(config.log_level.to_level_filter());

    let cancel = CancelToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping...");
            signal_token.cancel();
        }
    });

    let controller = Controller::with_config(config)?;

    // Blocking read on its own thread so an interrupt at the prompt is seen
    let input_path = options.input.clone();
    let (input_tx, input_rx) = tokio::sync::oneshot::channel();
    std::thread::spawn(move || {
        let _ = input_tx.send(read_input(input_path.as_ref()));
    });
    let raw_input = tokio::select! {
        _ = cancel.cancelled() => {
            println!();
            println!("Input aborted. Exiting gracefully.");
            return Ok(());
        }
        input = input_rx => input.context("Input reader stopped unexpectedly")??,
    };
    if raw_input.trim().is_empty() {
        info!("No words given; rebuilding the package from stored cards");
    }

    match controller.run(&raw_input, &cancel).await {
        Ok(report) => {
            if !report.new_words().is_empty() {
                let added: Vec<&str> = report.new_words().iter().map(|w| w.as_str()).collect();
                println!("Added {} word(s): {}", added.len(), added.join(", "));
            }
            println!("{}", report.summary());
            Ok(())
        }
        Err(AppError::Pipeline(e)) if e.is_cancelled() => {
            info!("{}. Nothing was saved.", e);
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            Err(e.into())
        }
    }
}

/// Raw batch from the input file, piped stdin, or one interactive line
fn read_input(input: Option<&PathBuf>) -> Result<String> {
    if let Some(path) = input {
        return FileManager::read_to_string(path);
    }

    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        print!("Enter words separated by commas: ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        stdin.read_line(&mut line).context("Failed to read words from the terminal")?;
        return Ok(line);
    }

    let mut text = String::new();
    stdin.read_to_string(&mut text).context("Failed to read words from stdin")?;
    Ok(text)
}
