//! Picture block merging: wrap runs of adjacent pictures in group nodes.

use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::model::{Handle, Label};

use super::options::ReadingOrder;
use super::store::DocumentStore;
use super::tree::InsertPolicy;

/// Minimum number of consecutive pictures that form a block.
pub const MIN_RUN: usize = 2;

/// Name given to the groups created by the merger.
pub const GROUP_NAME: &str = "picture-group";

/// Outcome of a merge pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Handles of the groups created, in creation order
    pub groups: Vec<Handle>,
    /// Elements moved into those groups
    pub members: usize,
}

/// Position of an element in reading order.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ReadingKey {
    page: Option<u32>,
    top: Option<f64>,
}

/// Compute the reading key of `handle`.
///
/// Elements without provenance (groups) take the lowest page and highest
/// top found among their descendants.
fn reading_key(store: &DocumentStore<'_>, handle: &Handle) -> Result<ReadingKey> {
    let mut key = ReadingKey {
        page: None,
        top: None,
    };
    let mut stack = vec![handle.clone()];
    let mut visited = 0;

    while let Some(current) = stack.pop() {
        visited += 1;
        if visited > store.document().element_count() + 1 {
            return Err(Error::IntegrityViolation(format!(
                "cycle below {}",
                handle
            )));
        }

        let element = store.get(&current)?;
        match element.primary_prov() {
            Some(prov) => {
                key.page = Some(key.page.map_or(prov.page_no, |p| p.min(prov.page_no)));
                let top = prov.bbox.upward_top();
                key.top = Some(key.top.map_or(top, |t| t.max(top)));
            }
            None => stack.extend(element.children.iter().cloned()),
        }
    }

    Ok(key)
}

/// Descending order on an optional value, missing values last.
fn descending(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Ascending order on an optional page, missing pages last.
fn ascending_page(a: Option<u32>, b: Option<u32>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Body children sorted top to bottom. The sort is stable, so ties keep
/// their body order.
fn reading_order_snapshot(store: &DocumentStore<'_>, order: ReadingOrder) -> Result<Vec<Handle>> {
    let mut keyed = store
        .get(&Handle::body())?
        .children
        .iter()
        .map(|h| -> Result<(ReadingKey, Handle)> { Ok((reading_key(store, h)?, h.clone())) })
        .collect::<Result<Vec<_>>>()?;

    keyed.sort_by(|(a, _), (b, _)| match order {
        ReadingOrder::TopOnly => descending(a.top, b.top),
        ReadingOrder::PageThenTop => {
            ascending_page(a.page, b.page).then_with(|| descending(a.top, b.top))
        }
    });

    Ok(keyed.into_iter().map(|(_, h)| h).collect())
}

/// Find runs of at least [`MIN_RUN`] pictures among the body's children,
/// plus an optional caption right after the run, and wrap each run in a new
/// group spliced into the body where the run's first picture was.
///
/// The reading-order snapshot is taken once; groups created during the pass
/// are not rescanned.
pub(crate) fn merge_picture_blocks(
    store: &mut DocumentStore<'_>,
    order: ReadingOrder,
) -> Result<MergeOutcome> {
    let snapshot = reading_order_snapshot(store, order)?;
    let mut outcome = MergeOutcome::default();

    let mut cursor = 0;
    while cursor < snapshot.len() {
        let mut end = cursor;
        while end < snapshot.len() && store.get(&snapshot[end])?.label == Label::Picture {
            end += 1;
        }

        if end - cursor < MIN_RUN {
            cursor += 1;
            continue;
        }

        let mut members = snapshot[cursor..end].to_vec();
        if end < snapshot.len() && store.get(&snapshot[end])?.label == Label::Caption {
            members.push(snapshot[end].clone());
            end += 1;
        }

        let group = wrap_block(store, &members)?;
        log::debug!("BlockMerger: {} wraps {} elements", group, members.len());
        outcome.members += members.len();
        outcome.groups.push(group);
        cursor = end;
    }

    log::info!(
        "BlockMerger: created {} groups over {} elements",
        outcome.groups.len(),
        outcome.members
    );
    Ok(outcome)
}

/// Move `members` (all direct body children) into a new group and splice
/// the group into the body at the first member's position.
fn wrap_block(store: &mut DocumentStore<'_>, members: &[Handle]) -> Result<Handle> {
    let body = Handle::body();
    let first = &members[0];

    let position = {
        let children = &store.get(&body)?.children;
        let position = children
            .iter()
            .position(|c| c == first)
            .ok_or_else(|| Error::MissingBackEdge {
                parent: body.clone(),
                child: first.clone(),
            })?;
        // members listed ahead of the first one disappear from the body too
        let removed_before = children[..position]
            .iter()
            .filter(|c| members.contains(c))
            .count();
        position - removed_before
    };

    let group = store.allocate_group(GROUP_NAME);
    for member in members {
        store.reparent(member, &group, InsertPolicy::Append)?;
    }
    store.attach(&group, &body, InsertPolicy::At(position))?;

    Ok(group)
}
