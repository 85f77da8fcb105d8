//! Structural normalization of extracted documents.
//!
//! A run consists of three passes over one document:
//!
//! 1. **Reset**: captions attached by an earlier run go back to the body.
//! 2. **Caption association**: loose text directly under a picture is moved
//!    under that picture.
//! 3. **Block merging**: runs of adjacent pictures (and a trailing caption)
//!    are wrapped in a new group.

mod blocks;
mod captions;
mod geometry;
mod options;
mod reset;
mod store;
mod tree;

pub use blocks::{MergeOutcome, GROUP_NAME, MIN_RUN};
pub use geometry::{candidate_score, is_caption_candidate, union_provenance};
pub use options::{CaptionTolerance, NormalizeOptions, ReadingOrder};
pub use store::DocumentStore;
pub use tree::InsertPolicy;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::Document;

/// Summary of a normalization run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeReport {
    /// Captions moved back to the body by the reset pass
    pub captions_released: usize,
    /// Captions attached to pictures
    pub captions_attached: usize,
    /// Picture groups created
    pub groups_created: usize,
    /// Elements moved into the new groups
    pub grouped_members: usize,
}

impl NormalizeReport {
    /// Whether the run changed the document structure.
    pub fn changed(&self) -> bool {
        self.captions_released + self.captions_attached + self.groups_created > 0
    }
}

/// Per-document normalization context.
///
/// # Example
///
/// ```no_run
/// use docnorm::normalize::{NormalizeOptions, Normalizer};
///
/// let mut doc = docnorm::load_file("report.json")?;
/// let report = Normalizer::new(&mut doc, NormalizeOptions::default())?.run()?;
/// println!("{} captions attached", report.captions_attached);
/// # Ok::<(), docnorm::Error>(())
/// ```
pub struct Normalizer<'a> {
    store: DocumentStore<'a>,
    options: NormalizeOptions,
}

impl<'a> Normalizer<'a> {
    /// Build the context for `doc`.
    ///
    /// With integrity checks enabled, a document with broken links is
    /// rejected here before anything is touched.
    pub fn new(doc: &'a mut Document, options: NormalizeOptions) -> Result<Self> {
        if options.verify_integrity {
            doc.check_integrity()?;
        }
        Ok(Self {
            store: DocumentStore::new(doc)?,
            options,
        })
    }

    /// The options in use.
    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Move captions attached by a previous run back to the body.
    pub fn release_captions(&mut self) -> Result<usize> {
        reset::release_captions(&mut self.store)
    }

    /// Attach loose text to the picture it captions.
    pub fn associate_captions(&mut self) -> Result<usize> {
        captions::associate_captions(&mut self.store, &self.options)
    }

    /// Wrap runs of adjacent pictures in groups.
    pub fn merge_picture_blocks(&mut self) -> Result<MergeOutcome> {
        blocks::merge_picture_blocks(&mut self.store, self.options.reading_order)
    }

    /// Run all passes in order.
    ///
    /// Any error aborts the run; the document may then be partially
    /// modified.
    pub fn run(mut self) -> Result<NormalizeReport> {
        let captions_released = self.release_captions()?;
        let captions_attached = self.associate_captions()?;
        let merged = self.merge_picture_blocks()?;

        if self.options.verify_integrity {
            self.store.document().check_integrity()?;
        }

        let report = NormalizeReport {
            captions_released,
            captions_attached,
            groups_created: merged.groups.len(),
            grouped_members: merged.members,
        };
        log::info!(
            "Normalizer: released {}, attached {}, grouped {} elements into {} groups",
            report.captions_released,
            report.captions_attached,
            report.grouped_members,
            report.groups_created
        );
        Ok(report)
    }
}

/// Normalize a document with default options.
pub fn normalize(doc: &mut Document) -> Result<NormalizeReport> {
    normalize_with_options(doc, &NormalizeOptions::default())
}

/// Normalize a document with custom options.
pub fn normalize_with_options(
    doc: &mut Document,
    options: &NormalizeOptions,
) -> Result<NormalizeReport> {
    Normalizer::new(doc, options.clone())?.run()
}

/// Normalize independent documents, in parallel when `options.parallel` is
/// set. Results are returned in input order.
pub fn normalize_batch(
    docs: &mut [Document],
    options: &NormalizeOptions,
) -> Vec<Result<NormalizeReport>> {
    if options.parallel {
        docs.par_iter_mut()
            .map(|doc| normalize_with_options(doc, options))
            .collect()
    } else {
        docs.iter_mut()
            .map(|doc| normalize_with_options(doc, options))
            .collect()
    }
}
