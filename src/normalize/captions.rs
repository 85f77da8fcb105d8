//! Caption association: file loose text under the picture it describes.

use crate::error::{Error, Result};
use crate::model::{Collection, Handle, Label};

use super::geometry::{candidate_score, is_caption_candidate, union_provenance};
use super::options::NormalizeOptions;
use super::store::DocumentStore;
use super::tree::InsertPolicy;

/// Match unclassified text to pictures and reparent each match under its
/// picture, growing the picture's primary box to cover the caption.
///
/// Pictures are visited in collection order and each takes the best
/// remaining candidate, so an earlier picture wins a contested caption.
/// Returns the number of captions attached.
pub(crate) fn associate_captions(
    store: &mut DocumentStore<'_>,
    options: &NormalizeOptions,
) -> Result<usize> {
    let mut pool: Vec<Handle> = store
        .document()
        .texts
        .iter()
        .filter(|t| t.label == Label::Text)
        .map(|t| t.self_ref.clone())
        .collect();
    log::debug!("CaptionPass: {} candidate texts", pool.len());

    let mut attached = 0;
    for picture in store.handles(Collection::Pictures) {
        let Some(position) = find_caption(store, &picture, &pool, options)? else {
            continue;
        };
        let caption = pool.remove(position);

        check_same_page(store, &picture, &caption)?;
        let union = {
            let picture_el = store.get(&picture)?;
            let caption_el = store.get(&caption)?;
            union_provenance([picture_el, caption_el])?
        };

        store.reparent(&caption, &picture, InsertPolicy::Append)?;
        if let (Some(expanded), Some(primary)) =
            (union.into_iter().next(), store.get_mut(&picture)?.prov.first_mut())
        {
            primary.bbox = expanded.bbox;
        }

        log::debug!("CaptionPass: attached {} to {}", caption, picture);
        attached += 1;
    }

    log::info!("CaptionPass: attached {} captions", attached);
    Ok(attached)
}

/// Index in `pool` of the best caption candidate for `picture`.
///
/// Every text is evaluated regardless of its page. A text whose box uses a
/// different coordinate origin than the picture's cannot be compared and
/// fails with [`Error::CoordOriginMismatch`].
fn find_caption(
    store: &DocumentStore<'_>,
    picture: &Handle,
    pool: &[Handle],
    options: &NormalizeOptions,
) -> Result<Option<usize>> {
    let Some(picture_prov) = store.get(picture)?.primary_prov() else {
        log::warn!("CaptionPass: {} has no provenance, skipping", picture);
        return Ok(None);
    };

    let mut best: Option<(usize, f64)> = None;
    for (position, text) in pool.iter().enumerate() {
        let Some(text_prov) = store.get(text)?.primary_prov() else {
            continue;
        };
        if text_prov.bbox.coord_origin != picture_prov.bbox.coord_origin {
            return Err(Error::CoordOriginMismatch {
                page: text_prov.page_no,
                expected: picture_prov.bbox.coord_origin,
                found: text_prov.bbox.coord_origin,
            });
        }
        if !is_caption_candidate(&text_prov.bbox, &picture_prov.bbox, &options.caption) {
            continue;
        }

        let score = candidate_score(&text_prov.bbox, &picture_prov.bbox);
        if best.map_or(true, |(_, best_score)| score < best_score) {
            best = Some((position, score));
        }
    }

    if best.is_none() {
        log::debug!("CaptionPass: no caption for {}", picture);
    }
    Ok(best.map(|(position, _)| position))
}

fn check_same_page(store: &DocumentStore<'_>, picture: &Handle, caption: &Handle) -> Result<()> {
    let page_of = |handle: &Handle| -> Result<u32> {
        Ok(store
            .get(handle)?
            .primary_prov()
            .map(|p| p.page_no)
            .unwrap_or_default())
    };

    let picture_page = page_of(picture)?;
    let caption_page = page_of(caption)?;
    if picture_page != caption_page {
        return Err(Error::CrossPageCaption {
            picture: picture.clone(),
            picture_page,
            caption: caption.clone(),
            caption_page,
        });
    }
    Ok(())
}
