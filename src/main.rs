//! Surfride CLI - Command-line tool for Surfboard scene containers.
//!
//! This is the main entry point for the Surfride command-line application.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use surfride::prelude::*;
use surfride::vtbf::{decode_chunk, encode_tree};

/// Surfride - Surfboard scene container converter
#[derive(Parser)]
#[command(name = "surfride")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a VTBF file to JSON
    Decode {
        /// Input VTBF file
        #[arg(short, long, env = "SURFRIDE_INPUT")]
        input: PathBuf,

        /// Output JSON file (stdout if omitted)
        #[arg(short, long, env = "SURFRIDE_OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Encode a JSON file to VTBF
    Encode {
        /// Input JSON file
        #[arg(short, long, env = "SURFRIDE_INPUT")]
        input: PathBuf,

        /// Output VTBF file
        #[arg(short, long, env = "SURFRIDE_OUTPUT")]
        output: PathBuf,

        /// Container type tag written to the header [default: SRFF]
        #[arg(short, long, env = "SURFRIDE_TYPE_TAG")]
        tag: Option<String>,
    },

    /// Check that a file survives decode, JSON and encode byte for byte
    Roundtrip {
        /// Input VTBF file
        #[arg(short, long, env = "SURFRIDE_INPUT")]
        input: PathBuf,
    },

    /// List the chunks of a VTBF file
    Info {
        /// Input VTBF file
        #[arg(short, long, env = "SURFRIDE_INPUT")]
        input: PathBuf,
    },

    /// Decode every VTBF file under a directory to JSON
    Batch {
        /// Input directory
        #[arg(short, long, env = "SURFRIDE_INPUT")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, env = "SURFRIDE_OUTPUT")]
        output: PathBuf,

        /// Only consider files with this extension
        #[arg(short, long)]
        extension: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let dict = Dictionary::standard().context("Failed to build the standard dictionary")?;

    match cli.command {
        Commands::Decode { input, output } => {
            cmd_decode(&input, output.as_deref(), &dict)?;
        }
        Commands::Encode { input, output, tag } => {
            cmd_encode(&input, &output, tag.as_deref(), &dict)?;
        }
        Commands::Roundtrip { input } => {
            cmd_roundtrip(&input, &dict)?;
        }
        Commands::Info { input } => {
            cmd_info(&input, &dict)?;
        }
        Commands::Batch {
            input,
            output,
            extension,
        } => {
            cmd_batch(&input, &output, extension.as_deref(), &dict)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_decode(input: &Path, output: Option<&Path>, dict: &Dictionary) -> Result<()> {
    let doc = Document::open(input, dict)
        .with_context(|| format!("Failed to decode {}", input.display()))?;
    let json = serde_json::to_string_pretty(&doc.to_value(dict))?;

    match output {
        Some(path) => {
            fs::write(path, json).context("Failed to write output file")?;
            eprintln!("Decoded {} -> {}", input.display(), path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn cmd_encode(input: &Path, output: &Path, tag: Option<&str>, dict: &Dictionary) -> Result<()> {
    let type_tag = tag
        .map(|t| t.parse::<TypeTag>())
        .transpose()
        .context("Invalid container type tag")?;

    let data = fs::read(input).context("Failed to read input file")?;
    let value: Value = serde_json::from_slice(&data).context("Failed to parse JSON")?;

    let doc = match type_tag {
        Some(type_tag) => Document::from_value(value, type_tag, dict),
        None => Document::from_value_default(value, dict),
    }
    .context("Failed to rebuild the tree")?;
    doc.write(output, dict).context("Failed to encode VTBF")?;

    println!("Encoded {} -> {}", input.display(), output.display());

    Ok(())
}

fn cmd_roundtrip(input: &Path, dict: &Dictionary) -> Result<()> {
    let data = fs::read(input).context("Failed to read input file")?;
    let container = VtbfContainer::parse(&data).context("Failed to read VTBF framing")?;
    let doc = Document::parse(&data, dict).context("Failed to decode")?;

    // Go through JSON text, as a user editing the file would
    let json = serde_json::to_string(&doc.to_value(dict))?;
    let value: Value = serde_json::from_str(&json).context("Failed to re-read JSON")?;
    let reread = Document::from_value(value, container.type_tag(), dict)?;

    let chunks = encode_tree(&reread.tree, dict).context("Failed to re-encode")?;

    if chunks.len() != container.len() {
        anyhow::bail!(
            "Chunk count differs: {} in file, {} re-encoded",
            container.len(),
            chunks.len()
        );
    }

    for (index, (original, encoded)) in container.chunks().iter().zip(&chunks).enumerate() {
        if *original != encoded.as_slice() {
            let offset = original
                .iter()
                .zip(encoded)
                .position(|(a, b)| a != b)
                .unwrap_or_else(|| original.len().min(encoded.len()));
            anyhow::bail!(
                "Chunk {} ({}) differs at byte {}: {} bytes in file, {} re-encoded",
                index,
                chunk_label(original),
                offset,
                original.len(),
                encoded.len()
            );
        }
    }

    println!("{}: {} chunks identical", input.display(), chunks.len());

    Ok(())
}

fn cmd_info(input: &Path, dict: &Dictionary) -> Result<()> {
    let data = fs::read(input).context("Failed to read input file")?;
    let container = VtbfContainer::parse(&data).context("Failed to read VTBF framing")?;

    println!("Type tag: {}", container.type_tag());
    println!("{:>6} {:<6} {:<14} {:>8} {:>10} {:>8}", "Index", "Tag", "Kind", "Children", "Properties", "Bytes");

    for (index, chunk) in container.chunks().iter().enumerate() {
        match decode_chunk(chunk, dict) {
            Ok(node) => println!(
                "{:>6} {:<6} {:<14} {:>8} {:>10} {:>8}",
                index,
                node.tag.to_string(),
                dict.key_for(node.tag),
                node.child_count,
                node.property_count,
                chunk.len()
            ),
            Err(e) => println!("{:>6} {:<6} error: {}", index, chunk_label(chunk), e),
        }
    }

    println!("\nTotal: {} chunks", container.len());

    Ok(())
}

fn cmd_batch(input: &Path, output: &Path, extension: Option<&str>, dict: &Dictionary) -> Result<()> {
    println!("Scanning: {}", input.display());

    let mut files = Vec::new();
    for entry in WalkDir::new(input).follow_links(false) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(ext) = extension {
            if entry.path().extension().and_then(|e| e.to_str()) != Some(ext) {
                continue;
            }
        }
        files.push(entry.into_path());
    }
    files.sort();

    println!("Decoding {} files...", files.len());

    fs::create_dir_all(output)?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let decoded = AtomicUsize::new(0);
    let skipped = AtomicUsize::new(0);
    let errors = AtomicUsize::new(0);

    files.par_iter().for_each(|path| {
        match decode_one(path, input, output, dict) {
            Ok(true) => {
                decoded.fetch_add(1, Ordering::Relaxed);
            }
            Ok(false) => {
                skipped.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                pb.println(format!("Error decoding {}: {:#}", path.display(), e));
                errors.fetch_add(1, Ordering::Relaxed);
            }
        }
        pb.inc(1);
    });

    pb.finish_with_message("Done");
    println!(
        "Decoded {} files in {:?} ({} not VTBF, {} errors)",
        decoded.load(Ordering::Relaxed),
        start.elapsed(),
        skipped.load(Ordering::Relaxed),
        errors.load(Ordering::Relaxed)
    );

    Ok(())
}

/// Decode one file of a batch; `Ok(false)` if it is not a VTBF file.
fn decode_one(path: &Path, root: &Path, output: &Path, dict: &Dictionary) -> Result<bool> {
    let data = fs::read(path)?;
    if !VtbfContainer::is_vtbf(&data) {
        return Ok(false);
    }

    let doc = Document::parse(&data, dict)?;
    let json = serde_json::to_string_pretty(&doc.to_value(dict))?;

    let relative = path.strip_prefix(root).unwrap_or(path);
    let output_path = output.join(relative).with_extension("json");
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output_path, json)?;

    Ok(true)
}

/// Chunk tag for messages, tolerating chunks too short to hold one.
fn chunk_label(chunk: &[u8]) -> String {
    match chunk.get(..4) {
        Some(bytes) => bytes.escape_ascii().to_string(),
        None => "????".to_string(),
    }
}
