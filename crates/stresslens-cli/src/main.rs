mod display;
mod history;
mod session;

use std::io::{self, BufWriter, IsTerminal, Read, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use stresslens_ai::Pipeline;
use stresslens_core::{ArtifactPaths, is_blank};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stresslens", version, about = "Detect stress in free text with pre-trained classifiers")]
struct Cli {
    /// Directory holding the serialized artifacts
    #[arg(long, env = "STRESSLENS_ARTIFACTS_DIR", default_value = ".", global = true)]
    artifacts_dir: PathBuf,

    /// Classifier registry file (relative to the artifacts directory)
    #[arg(long, env = "STRESSLENS_MODELS", global = true)]
    models: Option<PathBuf>,

    /// Fitted vectorizer file (relative to the artifacts directory)
    #[arg(long, env = "STRESSLENS_VECTORIZER", global = true)]
    vectorizer: Option<PathBuf>,

    /// Numeric training matrix file (relative to the artifacts directory)
    #[arg(long, env = "STRESSLENS_NUMERIC", global = true)]
    numeric: Option<PathBuf>,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze one text, given as arguments or on stdin
    Predict {
        text: Vec<String>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Analyze one line at a time, keeping a session history
    Interactive,
    /// Show the shape of the loaded artifacts
    Info,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tracing::debug!("stresslens v{}", env!("CARGO_PKG_VERSION"));

    let paths = ArtifactPaths::resolve(
        &cli.artifacts_dir,
        cli.models.as_deref(),
        cli.vectorizer.as_deref(),
        cli.numeric.as_deref(),
    );
    let pipeline = Pipeline::load(&paths).with_context(|| {
        format!(
            "loading artifacts ({}, {}, {})",
            paths.vectorizer.display(),
            paths.numeric.display(),
            paths.models.display()
        )
    })?;

    match cli.command {
        Command::Predict { text, json } => cmd_predict(&pipeline, text, json),
        Command::Interactive => {
            let stdin = io::stdin();
            let mut out = io::stdout().lock();
            session::run(&pipeline, stdin.lock(), &mut out)?;
            Ok(())
        }
        Command::Info => {
            let mut out = io::stdout().lock();
            display::write_summary(&mut out, &pipeline.summary())?;
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn cmd_predict(pipeline: &Pipeline, words: Vec<String>, json: bool) -> anyhow::Result<()> {
    let text = if words.is_empty() {
        if io::stdin().is_terminal() {
            eprintln!("Enter text, then Ctrl-D:");
        }
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("reading text from stdin")?;
        buf
    } else {
        words.join(" ")
    };

    if is_blank(&text) {
        eprintln!("{}", session::EMPTY_INPUT_WARNING);
        return Ok(());
    }
    let results = pipeline.predict(&text)?;

    let mut out = BufWriter::new(io::stdout().lock());
    if json {
        serde_json::to_writer_pretty(&mut out, &results)?;
        writeln!(out)?;
    } else {
        display::write_results(&mut out, &results)?;
    }
    out.flush()?;
    Ok(())
}
