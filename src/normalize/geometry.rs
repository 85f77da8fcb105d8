//! Spatial decisions: box unions, caption candidacy and scoring.

use crate::error::{Error, Result};
use crate::model::{BoundingBox, CoordOrigin, Element, ProvenanceItem};

use super::options::CaptionTolerance;

/// Union of the provenance boxes of `elements`, one entry per page.
///
/// Pages appear in the order they are first seen, so the first entry of
/// the result covers the primary page of the first element. All boxes on a
/// page must share a coordinate origin.
pub fn union_provenance<'e, I>(elements: I) -> Result<Vec<ProvenanceItem>>
where
    I: IntoIterator<Item = &'e Element>,
{
    let mut pages: Vec<(u32, Vec<BoundingBox>)> = Vec::new();
    for prov in elements.into_iter().flat_map(|e| e.prov.iter()) {
        match pages.iter_mut().find(|(page, _)| *page == prov.page_no) {
            Some((_, boxes)) => boxes.push(prov.bbox),
            None => pages.push((prov.page_no, vec![prov.bbox])),
        }
    }

    pages
        .into_iter()
        .map(|(page_no, boxes)| {
            union_boxes(page_no, &boxes).map(|bbox| ProvenanceItem::new(page_no, bbox))
        })
        .collect()
}

/// Union of boxes lying on one page.
fn union_boxes(page_no: u32, boxes: &[BoundingBox]) -> Result<BoundingBox> {
    let origin = boxes[0].coord_origin;
    if let Some(other) = boxes.iter().find(|b| b.coord_origin != origin) {
        return Err(Error::CoordOriginMismatch {
            page: page_no,
            expected: origin,
            found: other.coord_origin,
        });
    }

    let l = boxes.iter().map(|b| b.l).fold(f64::INFINITY, f64::min);
    let r = boxes.iter().map(|b| b.r).fold(f64::NEG_INFINITY, f64::max);
    let (t, b) = match origin {
        CoordOrigin::BottomLeft => (
            boxes.iter().map(|b| b.t).fold(f64::NEG_INFINITY, f64::max),
            boxes.iter().map(|b| b.b).fold(f64::INFINITY, f64::min),
        ),
        CoordOrigin::TopLeft => (
            boxes.iter().map(|b| b.t).fold(f64::INFINITY, f64::min),
            boxes.iter().map(|b| b.b).fold(f64::NEG_INFINITY, f64::max),
        ),
    };

    Ok(BoundingBox::new(l, t, r, b, origin))
}

/// Whether `text` may be the caption of `picture`.
///
/// The text must start at or below the picture's bottom edge, within
/// `vertical × picture height`, and must not be wider than
/// `(1 + horizontal) × picture width`. With alignment checking on, it must
/// also be centered on or left-aligned with the picture.
///
/// Both boxes are expected to share a coordinate origin; the caption pass
/// rejects mixed origins before calling this.
pub fn is_caption_candidate(
    text: &BoundingBox,
    picture: &BoundingBox,
    tolerance: &CaptionTolerance,
) -> bool {
    let text_top = text.upward_top();
    let picture_bottom = picture.upward_bottom();
    if text_top > picture_bottom {
        return false;
    }

    let gap = picture_bottom - text_top;
    if gap > tolerance.vertical * picture.height() {
        return false;
    }

    if text.width() > (1.0 + tolerance.horizontal) * picture.width() {
        return false;
    }

    if !tolerance.check_alignment {
        return true;
    }

    let slack = tolerance.horizontal * picture.width();
    let centered = (text.center_x() - picture.center_x()).abs() < slack;
    let left_aligned = (text.l - picture.l).abs() < slack;
    centered || left_aligned
}

/// Distance score of a caption candidate, lower is better.
///
/// Vertical distance counts double so that a caption directly under the
/// picture wins over one that is merely horizontally close.
pub fn candidate_score(text: &BoundingBox, picture: &BoundingBox) -> f64 {
    let vertical = picture.upward_bottom() - text.upward_top();
    let horizontal = (picture.center_x() - text.center_x()).abs();
    2.0 * vertical + horizontal
}
