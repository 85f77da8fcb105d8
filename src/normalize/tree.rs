//! Structural mutations that keep parent and children links in sync.

use crate::error::{Error, Result};
use crate::model::Handle;

use super::store::DocumentStore;

/// Where a child is inserted into its new parent's children list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertPolicy {
    /// Append at the end
    Append,
    /// Insert at a position (clamped to the list length)
    At(usize),
    /// Insert immediately after an existing child
    After(Handle),
}

impl DocumentStore<'_> {
    /// Remove `child` from `parent`'s children and clear its parent link.
    ///
    /// A parent that does not list the child is a broken back-edge in the
    /// input and is reported as [`Error::MissingBackEdge`].
    pub fn unchild(&mut self, parent: &Handle, child: &Handle) -> Result<()> {
        let parent_el = self.get_mut(parent)?;
        let position = parent_el
            .child_position(child)
            .ok_or_else(|| Error::MissingBackEdge {
                parent: parent.clone(),
                child: child.clone(),
            })?;
        parent_el.children.remove(position);

        self.get_mut(child)?.parent = None;
        Ok(())
    }

    /// Link a detached `child` under `parent`.
    pub fn attach(&mut self, child: &Handle, parent: &Handle, policy: InsertPolicy) -> Result<()> {
        if let Some(current) = &self.get(child)?.parent {
            return Err(Error::IntegrityViolation(format!(
                "{} is still attached to {}",
                child, current
            )));
        }

        let parent_el = self.get_mut(parent)?;
        let index = match policy {
            InsertPolicy::Append => parent_el.children.len(),
            InsertPolicy::At(index) => index.min(parent_el.children.len()),
            InsertPolicy::After(anchor) => {
                let position =
                    parent_el
                        .child_position(&anchor)
                        .ok_or_else(|| Error::MissingBackEdge {
                            parent: parent.clone(),
                            child: anchor.clone(),
                        })?;
                position + 1
            }
        };
        parent_el.children.insert(index, child.clone());

        self.get_mut(child)?.parent = Some(parent.clone());
        Ok(())
    }

    /// Move `child` from its current parent to `new_parent`.
    pub fn reparent(
        &mut self,
        child: &Handle,
        new_parent: &Handle,
        policy: InsertPolicy,
    ) -> Result<()> {
        let old_parent = self
            .get(child)?
            .parent
            .clone()
            .ok_or_else(|| Error::Detached(child.clone()))?;

        self.unchild(&old_parent, child)?;
        self.attach(child, new_parent, policy)
    }

    /// The ancestor of `handle` that is a direct child of the body.
    ///
    /// Returns `None` when the chain ends at another root (furniture).
    pub fn body_ancestor(&self, handle: &Handle) -> Result<Option<Handle>> {
        let limit = self.document().element_count() + 1;
        let mut current = handle.clone();

        for _ in 0..limit {
            let parent = self
                .get(&current)?
                .parent
                .clone()
                .ok_or_else(|| Error::Detached(current.clone()))?;
            if parent.is_body() {
                return Ok(Some(current));
            }
            if parent.is_root() {
                return Ok(None);
            }
            current = parent;
        }

        Err(Error::IntegrityViolation(format!(
            "parent chain of {} does not reach a root",
            handle
        )))
    }
}
