//! doctar CLI
//!
//! Pack files into a `<documents>` stream and unpack it again (tar-like modes).

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use doctar::{
    parse_path_list, Decoder, Encoder, ErrorPolicy, FsSource, OutputRoot, UnpackOptions, Unpacker,
};
use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "doctar")]
#[command(version)]
#[command(about = "Pack files into a <documents> text stream and unpack them safely")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack files into a document stream
    #[command(name = "a", alias = "pack")]
    Pack {
        /// Files and directories to pack (default: read one path per line from stdin)
        inputs: Vec<PathBuf>,

        /// Output stream file (default: stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Verbose output (repeat for more)
        #[arg(short, long, action = ArgAction::Count)]
        verbose: u8,
    },

    /// Unpack a document stream
    #[command(name = "x", alias = "unpack")]
    Unpack {
        /// Stream file to unpack (default: stdin)
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,

        /// Directory to unpack into (default: current directory)
        #[arg(short = 'C', long)]
        directory: Option<PathBuf>,

        /// Skip documents with unsafe paths instead of stopping
        #[arg(long)]
        lenient: bool,

        /// Verbose output (repeat for more)
        #[arg(short, long, action = ArgAction::Count)]
        verbose: u8,
    },

    /// List the documents in a stream
    #[command(name = "t", alias = "list")]
    List {
        /// Stream file to list (default: stdin)
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,

        /// Show content sizes
        #[arg(short, long, action = ArgAction::Count)]
        verbose: u8,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Pack { inputs, output, verbose } => {
            init_logging(verbose);
            pack(inputs, output)
        }
        Commands::Unpack { input, directory, lenient, verbose } => {
            init_logging(verbose);
            unpack(input, directory, lenient)
        }
        Commands::List { input, verbose } => {
            init_logging(0);
            list(input, verbose > 0)
        }
    }
}

/// Log to stderr so stdout stays free for the stream. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn pack(inputs: Vec<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let paths: Vec<String> = if inputs.is_empty() {
        let mut list = String::new();
        io::stdin()
            .read_to_string(&mut list)
            .context("Failed to read path list from stdin")?;
        parse_path_list(&list).into_iter().map(str::to_string).collect()
    } else {
        expand_inputs(&inputs)?
    };

    let encoder = Encoder::new();
    let source = FsSource::new();

    let count = if let Some(output_path) = &output {
        let file = fs::File::create(output_path)
            .with_context(|| format!("Failed to create: {}", output_path.display()))?;
        encoder.pack(&paths, &source, BufWriter::new(file))?
    } else {
        encoder.pack(&paths, &source, BufWriter::new(io::stdout().lock()))?
    };

    match &output {
        Some(path) => tracing::info!(documents = count, output = %path.display(), "created"),
        None => tracing::info!(documents = count, "created"),
    }
    Ok(())
}

/// Turn the command line inputs into stream paths, walking directories
fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<String>> {
    let mut paths = Vec::new();

    for input in inputs {
        if input.is_dir() {
            add_directory(&mut paths, input)?;
        } else {
            paths.push(stream_path(input));
        }
    }

    Ok(paths)
}

fn add_directory(paths: &mut Vec<String>, dir: &Path) -> Result<()> {
    for entry in walkdir::WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk: {}", dir.display()))?;
        if entry.file_type().is_file() {
            paths.push(stream_path(entry.path()));
        }
    }
    Ok(())
}

fn stream_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn read_input(input: Option<PathBuf>) -> Result<String> {
    if let Some(input_path) = input {
        fs::read_to_string(&input_path)
            .with_context(|| format!("Failed to read: {}", input_path.display()))
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer).context("Failed to read stdin")?;
        Ok(buffer)
    }
}

fn unpack(input: Option<PathBuf>, directory: Option<PathBuf>, lenient: bool) -> Result<()> {
    let stream = read_input(input)?;

    let root = match &directory {
        Some(dir) => OutputRoot::new(dir)
            .with_context(|| format!("Invalid output directory: {}", dir.display()))?,
        None => OutputRoot::current_dir().context("Cannot use the current directory")?,
    };
    let policy = if lenient { ErrorPolicy::Lenient } else { ErrorPolicy::Strict };
    let unpacker = Unpacker::with_options(root, UnpackOptions::default().with_policy(policy));

    let report = unpacker.unpack_str(&stream)?;
    tracing::info!(files = report.written.len(), "unpacked");

    if !report.is_clean() {
        for failure in &report.failures {
            eprintln!("doctar: {}", failure);
        }
        bail!("{} document(s) could not be unpacked", report.failures.len());
    }

    Ok(())
}

fn list(input: Option<PathBuf>, verbose: bool) -> Result<()> {
    let stream = read_input(input)?;
    let archive = Decoder::new().decode(&stream)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for document in &archive.documents {
        if verbose {
            writeln!(out, "{}  {}", document.path, document.content.len())?;
        } else {
            writeln!(out, "{}", document.path)?;
        }
    }

    Ok(())
}
