//! # docnorm
//!
//! Structural normalization for documents produced by a layout-extraction
//! engine.
//!
//! Extraction engines emit a document tree whose elements (texts, pictures,
//! tables, groups) carry page coordinates. This library repairs the
//! relationships between those elements: loose caption text is moved under
//! the picture it describes, and runs of adjacent pictures are wrapped in a
//! single group so that downstream consumers see one figure.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docnorm::{load_file, normalize, render};
//!
//! fn main() -> docnorm::Result<()> {
//!     let mut doc = load_file("document.json")?;
//!
//!     let report = normalize(&mut doc)?;
//!     println!("{} captions attached", report.captions_attached);
//!
//!     let json = render::to_json(&doc, render::JsonFormat::Pretty)?;
//!     println!("{}", json);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Caption association**: geometric matching of text below pictures
//! - **Picture block merging**: adjacent pictures grouped in reading order
//! - **Idempotent**: rerunning on normalized output releases and re-matches
//! - **Lossless**: fields the normalizer does not model are preserved
//! - **Parallel batches**: uses Rayon for independent documents

pub mod error;
pub mod model;
pub mod normalize;
pub mod render;

// Re-export commonly used types
pub use error::{Error, Result};
pub use model::{
    BoundingBox, Collection, CoordOrigin, Document, Element, Handle, Label, Payload,
    ProvenanceItem,
};
pub use normalize::{
    normalize, normalize_batch, normalize_with_options, CaptionTolerance, NormalizeOptions,
    NormalizeReport, Normalizer, ReadingOrder,
};
pub use render::JsonFormat;

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Load a document from a JSON file.
///
/// # Example
///
/// ```no_run
/// use docnorm::load_file;
///
/// let doc = load_file("document.json").unwrap();
/// println!("Elements: {}", doc.element_count());
/// ```
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let path = path.as_ref();
    log::debug!("Loading {}", path.display());
    let file = File::open(path)?;
    Document::from_reader(BufReader::new(file))
}

/// Write a document to a JSON file.
pub fn save_file<P: AsRef<Path>>(doc: &Document, path: P, format: JsonFormat) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    render::write_json(doc, &mut writer, format)?;
    writer.flush()?;
    Ok(())
}

/// Load and normalize a document file with default options.
///
/// # Example
///
/// ```no_run
/// use docnorm::normalize_file;
///
/// let (doc, report) = normalize_file("document.json").unwrap();
/// println!("Groups created: {}", report.groups_created);
/// ```
pub fn normalize_file<P: AsRef<Path>>(path: P) -> Result<(Document, NormalizeReport)> {
    normalize_file_with_options(path, &NormalizeOptions::default())
}

/// Load and normalize a document file with custom options.
///
/// # Example
///
/// ```no_run
/// use docnorm::{normalize_file_with_options, NormalizeOptions};
///
/// let options = NormalizeOptions::new()
///     .with_alignment_check(true)
///     .page_ordered();
/// let (doc, report) = normalize_file_with_options("document.json", &options).unwrap();
/// ```
pub fn normalize_file_with_options<P: AsRef<Path>>(
    path: P,
    options: &NormalizeOptions,
) -> Result<(Document, NormalizeReport)> {
    let mut doc = load_file(path)?;
    let report = normalize_with_options(&mut doc, options)?;
    Ok((doc, report))
}

/// Normalize a JSON document held in memory and return the normalized JSON.
///
/// # Example
///
/// ```no_run
/// use docnorm::{normalize_json, JsonFormat};
///
/// let input = std::fs::read_to_string("document.json").unwrap();
/// let output = normalize_json(&input, JsonFormat::Compact).unwrap();
/// ```
pub fn normalize_json(json: &str, format: JsonFormat) -> Result<String> {
    let mut doc = Document::from_json_str(json)?;
    normalize(&mut doc)?;
    render::to_json(&doc, format)
}
