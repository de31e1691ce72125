use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use console::Term;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::{
    cmd::render::{render_html, render_json, render_text},
    cmd::tui::TuiApp,
    config::Settings,
    corpus::DirectorySource,
    matcher::Matcher,
    types::Answer,
    utils::read_stop_words_from_file,
};

#[derive(Parser)]
#[command(name = "docanswer")]
#[command(about = "Answer questions from a folder of policy documents")]
#[command(version)]
#[command(propagate_version = true)]
pub struct EnhancedCli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Settings file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory containing the documents
    #[arg(long, global = true)]
    corpus: Option<PathBuf>,

    /// File name pattern to scan, repeatable (default "*.txt")
    #[arg(short = 'p', long = "pattern", global = true)]
    patterns: Vec<String>,

    /// Scan subdirectories of the corpus too
    #[arg(short, long, global = true)]
    recursive: bool,

    /// Stop-word list replacing the built-in one
    #[arg(long, global = true)]
    stop_words: Option<PathBuf>,

    /// Log level for diagnostics on stderr (RUST_LOG takes precedence)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Enable interactive mode
    #[arg(short, long)]
    interactive: bool,

    /// Enable TUI mode
    #[arg(short, long)]
    tui: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a single question
    Ask {
        /// The question, e.g. "What is the policy for annual leaves?"
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,

        /// Output format (text, json, html)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Ask questions one after another at a prompt
    Interactive,

    /// Full-screen answer page
    Tui,

    /// List the documents that would be searched
    Corpus,

    /// Show the keywords a question is reduced to
    Tokens {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
}

pub struct CliApp {
    cli: EnhancedCli,
}

impl CliApp {
    pub fn new() -> Self {
        Self {
            cli: EnhancedCli::parse(),
        }
    }

    pub fn run() -> Result<()> {
        let app = Self::new();
        let settings = load_settings(&app.cli)?;

        let wants_tui = matches!(app.cli.command, Some(Commands::Tui))
            || (app.cli.command.is_none() && app.cli.tui);
        if !wants_tui {
            init_logging(&app.cli.log_level);
        }

        match app.cli.command.as_ref() {
            Some(Commands::Ask { question, format }) => {
                Self::run_ask(&settings, &question.join(" "), format)
            }
            Some(Commands::Interactive) => Self::run_interactive(&settings),
            Some(Commands::Tui) => Self::run_tui(settings),
            Some(Commands::Corpus) => Self::run_corpus(&settings),
            Some(Commands::Tokens { question }) => Self::run_tokens(&settings, &question.join(" ")),
            None => {
                if app.cli.tui {
                    Self::run_tui(settings)
                } else if app.cli.interactive {
                    Self::run_interactive(&settings)
                } else {
                    Self::show_help();
                    Ok(())
                }
            }
        }
    }

    fn run_ask(settings: &Settings, question: &str, format: &str) -> Result<()> {
        let source = DirectorySource::from_settings(settings)?;
        let matcher = Matcher::new(settings);
        let answer = matcher.answer(question, &source);

        print!("{}", render_answer(question, &answer, format, &settings.refusal_message)?);
        Ok(())
    }

    fn run_interactive(settings: &Settings) -> Result<()> {
        let source = DirectorySource::from_settings(settings)?;
        let matcher = Matcher::new(settings);
        let term = Term::stdout();

        Self::show_banner(settings);

        loop {
            let question: String = Input::new()
                .with_prompt("How can I help you today?")
                .allow_empty(true)
                .interact_text()?;
            let question = question.trim();

            match question {
                "" | ":quit" | ":q" => break,
                ":refresh" => {
                    term.clear_screen()?;
                    Self::show_banner(settings);
                    continue;
                }
                _ => {}
            }

            let spinner = searching_spinner()?;
            let answer = matcher.answer(question, &source);
            spinner.finish_and_clear();

            println!();
            print!("{}", render_text(&answer, &settings.refusal_message));
            println!();
        }

        Ok(())
    }

    fn run_tui(settings: Settings) -> Result<()> {
        let source = DirectorySource::from_settings(&settings)?;
        let mut tui_app = TuiApp::new(settings, Box::new(source));
        tui_app.run()
    }

    fn run_corpus(settings: &Settings) -> Result<()> {
        let source = DirectorySource::from_settings(settings)?;

        println!("{}", "Corpus".bold().blue());
        println!("{}", "======".blue());
        println!("Directory: {}", source.root().display());
        println!("Patterns: {}", settings.patterns.join(", "));

        let Some(entries) = source.entries() else {
            println!(
                "{}",
                format!("Corpus directory not found: {}", source.root().display()).yellow()
            );
            return Ok(());
        };

        if entries.is_empty() {
            println!("{}", "No documents match the configured patterns.".yellow());
            return Ok(());
        }

        for (i, entry) in entries.iter().enumerate() {
            let size = entry.path.metadata().map(|m| m.len()).unwrap_or(0);
            println!(
                "  {}: {} {} ({} bytes)",
                i + 1,
                format!("[{}]", entry.file_type.label()).blue(),
                entry.name,
                size
            );
        }
        println!("{}", format!("{} documents", entries.len()).green().bold());

        Ok(())
    }

    fn run_tokens(settings: &Settings, question: &str) -> Result<()> {
        let tokens = Matcher::new(settings).tokenize(question);
        if tokens.is_empty() {
            println!("{}", "No usable keywords in this question.".yellow());
        } else {
            for token in tokens {
                println!("{}", token.cyan());
            }
        }
        Ok(())
    }

    fn show_banner(settings: &Settings) {
        println!("{}", "Policy Assistant".bold().blue());
        println!("{}", "================".blue());
        println!(
            "Answers come only from documents in {}. Type :refresh to clear, :quit to leave.",
            settings.corpus_dir.display()
        );
        println!();
    }

    fn show_help() {
        println!("{}", "docanswer - Policy Question Answering".blue().bold());
        println!();
        println!("Usage:");
        println!("  docanswer ask <question>");
        println!("  docanswer --interactive");
        println!("  docanswer --tui");
        println!("  docanswer corpus");
        println!("  docanswer tokens <question>");
        println!();
        println!("Examples:");
        println!("  docanswer ask What is the policy for annual leaves?");
        println!("  docanswer ask --format json how many sick days");
        println!("  docanswer --corpus ./policies --pattern '*.txt' --pattern '*.docx' tui");
        println!("  docanswer --config settings.json corpus");
        println!();
        println!("For more help, run: docanswer --help");
    }
}

/// Defaults, then the settings file, then the stop-word file, then flags
fn load_settings(cli: &EnhancedCli) -> Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };

    if let Some(path) = &cli.stop_words {
        let words = read_stop_words_from_file(path)
            .with_context(|| format!("Failed to load stop-words from {}", path.display()))?;
        settings = settings.with_stop_words(words);
    }

    if let Some(corpus) = &cli.corpus {
        settings = settings.with_corpus_dir(corpus);
    }

    if !cli.patterns.is_empty() {
        settings = settings.with_patterns(cli.patterns.iter().cloned());
    }

    if cli.recursive {
        settings.recursive = true;
    }

    Ok(settings)
}

/// Render an answer in the requested output format (text, json, html)
fn render_answer(question: &str, answer: &Answer, format: &str, refusal_message: &str) -> Result<String> {
    let rendered = match format.to_lowercase().as_str() {
        "json" => format!("{}\n", render_json(answer, refusal_message)?),
        "html" => render_html(question, answer, refusal_message),
        _ => render_text(answer, refusal_message),
    };
    Ok(rendered)
}

fn searching_spinner() -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message("Searching internal corpus...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    Ok(spinner)
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
