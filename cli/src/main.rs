//! docnorm CLI - document structure normalization tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docnorm::{
    load_file, normalize_batch, normalize_with_options, render, Collection, Document, JsonFormat,
    NormalizeOptions, NormalizeReport,
};

#[derive(Parser)]
#[command(name = "docnorm")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Attach captions to pictures and group picture blocks in document JSON", long_about = None)]
struct Cli {
    /// Input document JSON
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize one or more documents
    #[command(alias = "norm")]
    Normalize {
        /// Input document JSON files
        #[arg(value_name = "FILES", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory (stdout for a single file if not specified)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        tuning: Tuning,
    },

    /// Check the parent/child links of a document
    Check {
        /// Input document JSON
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Print the document tree
    Outline {
        /// Input document JSON
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Normalize before printing
        #[arg(short, long)]
        normalize: bool,

        #[command(flatten)]
        tuning: Tuning,
    },

    /// Show document information
    Info {
        /// Input document JSON
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

/// Normalization flags shared by several commands.
#[derive(Args, Clone, Default)]
struct Tuning {
    /// Require captions to be centered or left-aligned with the picture
    #[arg(long)]
    align: bool,

    /// Order pictures by page before position when grouping
    #[arg(long)]
    page_order: bool,

    /// Maximum caption gap, as a fraction of the picture height
    #[arg(long, value_name = "F")]
    vertical_tolerance: Option<f64>,

    /// Allowed caption overhang, as a fraction of the picture width
    #[arg(long, value_name = "F")]
    horizontal_tolerance: Option<f64>,

    /// Process files one at a time
    #[arg(long)]
    sequential: bool,
}

impl Tuning {
    fn options(&self) -> NormalizeOptions {
        let mut options = NormalizeOptions::new().with_alignment_check(self.align);
        if self.page_order {
            options = options.page_ordered();
        }
        if let Some(fraction) = self.vertical_tolerance {
            options = options.with_vertical_tolerance(fraction);
        }
        if let Some(fraction) = self.horizontal_tolerance {
            options = options.with_horizontal_tolerance(fraction);
        }
        if self.sequential {
            options = options.sequential();
        }
        options
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Normalize {
            inputs,
            output,
            compact,
            tuning,
        }) => cmd_normalize(&inputs, output.as_deref(), compact, &tuning.options()),
        Some(Commands::Check { input }) => cmd_check(&input),
        Some(Commands::Outline {
            input,
            normalize,
            tuning,
        }) => cmd_outline(&input, normalize, &tuning.options()),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: normalize if input is provided
            if let Some(input) = cli.input {
                cmd_normalize(
                    &[input],
                    cli.output.as_deref(),
                    false,
                    &NormalizeOptions::default(),
                )
            } else {
                println!("{}", "Usage: docnorm <FILE> [OUTPUT]".yellow());
                println!("       docnorm --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// `<dir>/<stem>.normalized.json`, next to the input when no directory is
/// given.
fn output_path(input: &Path, dir: Option<&Path>) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let name = format!("{}.normalized.json", stem);
    match dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}

fn describe(report: &NormalizeReport) -> String {
    format!(
        "{} released, {} attached, {} groups ({} elements)",
        report.captions_released,
        report.captions_attached,
        report.groups_created,
        report.grouped_members
    )
}

fn cmd_normalize(
    inputs: &[PathBuf],
    output: Option<&Path>,
    compact: bool,
    options: &NormalizeOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    // Single file without an output directory goes to stdout
    if inputs.len() == 1 && output.is_none() {
        let mut doc = load_file(&inputs[0])?;
        let report = normalize_with_options(&mut doc, options)?;
        println!("{}", render::to_json(&doc, format)?);
        eprintln!("{} {}", "Normalized:".green(), describe(&report));
        return Ok(());
    }

    if let Some(dir) = output {
        fs::create_dir_all(dir)?;
    }

    let pb = ProgressBar::new(inputs.len() as u64 * 2);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut failures = 0;
    let mut paths = Vec::with_capacity(inputs.len());
    let mut docs: Vec<Document> = Vec::with_capacity(inputs.len());

    pb.set_message("Loading...");
    for input in inputs {
        match load_file(input) {
            Ok(doc) => {
                paths.push(input);
                docs.push(doc);
            }
            Err(e) => {
                pb.println(format!("{} {}: {}", "Failed".red(), input.display(), e));
                failures += 1;
                // nothing to write for this file
                pb.inc(1);
            }
        }
        pb.inc(1);
    }

    pb.set_message("Normalizing...");
    let results = normalize_batch(&mut docs, options);

    pb.set_message("Writing...");
    for ((input, doc), result) in paths.into_iter().zip(&docs).zip(results) {
        match result {
            Ok(report) => {
                let target = output_path(input, output);
                docnorm::save_file(doc, &target, format)?;
                pb.println(format!(
                    "{} {} {}",
                    "Saved".green(),
                    target.display(),
                    describe(&report).dimmed()
                ));
            }
            Err(e) => {
                pb.println(format!("{} {}: {}", "Failed".red(), input.display(), e));
                failures += 1;
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("Done!");

    if failures > 0 {
        return Err(format!("{} of {} files failed", failures, inputs.len()).into());
    }
    Ok(())
}

fn cmd_check(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load_file(input)?;
    doc.check_integrity()?;

    println!(
        "{} {} ({} elements)",
        "OK".green().bold(),
        input.display(),
        doc.element_count()
    );
    Ok(())
}

fn cmd_outline(
    input: &Path,
    normalize: bool,
    options: &NormalizeOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = load_file(input)?;
    if normalize {
        let report = normalize_with_options(&mut doc, options)?;
        eprintln!("{} {}", "Normalized:".green(), describe(&report));
    }

    print!("{}", render::to_outline(&doc)?);
    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load_file(input)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    for key in ["schema_name", "version", "name"] {
        if let Some(serde_json::Value::String(value)) = doc.extra.get(key) {
            println!("{}: {}", key.bold(), value);
        }
    }
    if let Some(serde_json::Value::Object(pages)) = doc.extra.get("pages") {
        println!("{}: {}", "Pages".bold(), pages.len());
    }

    println!();
    println!("{}", "Collections".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for collection in Collection::ALL {
        println!(
            "{}: {}",
            collection.as_str().bold(),
            doc.collection(collection).len()
        );
    }

    println!();
    println!("{}", "Labels".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    let mut labels: Vec<_> = doc.label_counts().into_iter().collect();
    labels.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));
    for (label, count) in labels {
        println!("{}: {}", label.as_str().bold(), count);
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "docnorm".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Document structure normalization tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/docnorm".dimmed());
    println!("License: MIT");
}
