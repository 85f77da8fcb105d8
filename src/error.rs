//! Error types for docnorm library.

use std::io;
use thiserror::Error;

use crate::model::{CoordOrigin, Handle};

/// Result type alias for docnorm operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading or normalizing a document.
///
/// Every variant other than `Io`, `Json` and `Render` signals malformed
/// upstream data. The normalizer does not roll back: once one of them is
/// returned the document must be discarded and reloaded.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The document JSON could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A reference string does not follow the `#/<collection>/<index>` scheme.
    #[error("Invalid handle: {0:?}")]
    InvalidHandle(String),

    /// Two elements claim the same handle.
    #[error("Duplicate handle: {0}")]
    DuplicateHandle(Handle),

    /// An element's handle disagrees with the slot it is stored in.
    #[error("Handle {handle} is stored at {collection}[{index}]")]
    MisplacedHandle {
        /// The element's own handle
        handle: Handle,
        /// Collection the element was found in
        collection: &'static str,
        /// Position inside that collection
        index: usize,
    },

    /// A handle does not resolve to any element.
    #[error("Unknown handle: {0}")]
    UnknownHandle(Handle),

    /// A parent does not list the child that points back to it.
    #[error("Missing back-edge: {parent} does not list child {child}")]
    MissingBackEdge {
        /// The parent whose children list was searched
        parent: Handle,
        /// The child that was expected in it
        child: Handle,
    },

    /// A non-root element has no parent.
    #[error("Element {0} has no parent")]
    Detached(Handle),

    /// Boxes that are compared or merged use different coordinate origins.
    #[error("Mixed coordinate origins on page {page}: {expected} and {found}")]
    CoordOriginMismatch {
        /// Page number where the mismatch was found
        page: u32,
        /// Origin of the first box on that page
        expected: CoordOrigin,
        /// The conflicting origin
        found: CoordOrigin,
    },

    /// A caption was matched to a picture on a different page.
    #[error("Caption {caption} on page {caption_page} matched picture {picture} on page {picture_page}")]
    CrossPageCaption {
        /// The picture handle
        picture: Handle,
        /// Page of the picture's primary box
        picture_page: u32,
        /// The caption handle
        caption: Handle,
        /// Page of the caption's primary box
        caption_page: u32,
    },

    /// The parent/child graph is inconsistent.
    #[error("Integrity violation: {0}")]
    IntegrityViolation(String),

    /// Error during rendering (JSON, outline).
    #[error("Rendering error: {0}")]
    Render(String),
}
