//! Caption release: undo a previous caption association so the pass can be
//! rerun on its own output.

use crate::error::Result;
use crate::model::{Collection, Handle};

use super::store::DocumentStore;
use super::tree::InsertPolicy;

/// Move every caption-labeled child of every picture back to the body,
/// right after the picture's top-level body ancestor.
///
/// Captions released from the same picture keep their relative order.
/// Picture boxes grown by an earlier association are left as they are.
/// Returns the number of captions released.
pub(crate) fn release_captions(store: &mut DocumentStore<'_>) -> Result<usize> {
    let body = Handle::body();
    let mut released = 0;

    for picture in store.handles(Collection::Pictures) {
        let captions: Vec<Handle> = {
            let picture_el = store.get(&picture)?;
            let mut captions = Vec::new();
            for child in &picture_el.children {
                if store.get(child)?.is_caption() {
                    captions.push(child.clone());
                }
            }
            captions
        };
        if captions.is_empty() {
            continue;
        }

        let mut anchor = store.body_ancestor(&picture)?;
        for caption in captions {
            let policy = match anchor.take() {
                Some(handle) => InsertPolicy::After(handle),
                None => {
                    log::warn!(
                        "ResetPass: {} is outside the body, appending {}",
                        picture,
                        caption
                    );
                    InsertPolicy::Append
                }
            };
            store.reparent(&caption, &body, policy)?;
            log::debug!("ResetPass: released {} from {}", caption, picture);

            anchor = Some(caption);
            released += 1;
        }
    }

    log::info!("ResetPass: released {} captions", released);
    Ok(released)
}
