//! Normalization options and configuration.

/// Geometric tolerances for caption candidacy.
///
/// Tolerances are fractions of the picture's dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptionTolerance {
    /// Maximum gap below the picture, as a fraction of its height
    pub vertical: f64,

    /// Allowed overhang of the caption width, as a fraction of the picture
    /// width; also the alignment slack when alignment is checked
    pub horizontal: f64,

    /// Require the caption to be centered or left-aligned with the picture
    pub check_alignment: bool,
}

impl Default for CaptionTolerance {
    fn default() -> Self {
        Self {
            vertical: 0.02,
            horizontal: 0.1,
            check_alignment: false,
        }
    }
}

/// How body children are ordered before looking for picture runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadingOrder {
    /// Descending top coordinate of the primary box
    #[default]
    TopOnly,
    /// Ascending page number, then descending top coordinate
    PageThenTop,
}

/// Options for normalizing a document.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Caption candidacy tolerances
    pub caption: CaptionTolerance,

    /// Ordering used by the picture block merger
    pub reading_order: ReadingOrder,

    /// Check referential integrity before and after the pass
    pub verify_integrity: bool,

    /// Process independent documents of a batch in parallel
    pub parallel: bool,
}

impl NormalizeOptions {
    /// Create new normalize options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set all caption tolerances.
    pub fn with_caption_tolerance(mut self, tolerance: CaptionTolerance) -> Self {
        self.caption = tolerance;
        self
    }

    /// Set the vertical caption tolerance.
    pub fn with_vertical_tolerance(mut self, fraction: f64) -> Self {
        self.caption.vertical = fraction;
        self
    }

    /// Set the horizontal caption tolerance.
    pub fn with_horizontal_tolerance(mut self, fraction: f64) -> Self {
        self.caption.horizontal = fraction;
        self
    }

    /// Enable or disable the caption alignment check.
    pub fn with_alignment_check(mut self, check: bool) -> Self {
        self.caption.check_alignment = check;
        self
    }

    /// Set the reading order used for block merging.
    pub fn with_reading_order(mut self, order: ReadingOrder) -> Self {
        self.reading_order = order;
        self
    }

    /// Order by page first when merging blocks.
    pub fn page_ordered(mut self) -> Self {
        self.reading_order = ReadingOrder::PageThenTop;
        self
    }

    /// Enable or disable integrity checks around the pass.
    pub fn with_integrity_checks(mut self, verify: bool) -> Self {
        self.verify_integrity = verify;
        self
    }

    /// Enable or disable parallel batch processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel batch processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            caption: CaptionTolerance::default(),
            reading_order: ReadingOrder::TopOnly,
            verify_integrity: true,
            parallel: true,
        }
    }
}
