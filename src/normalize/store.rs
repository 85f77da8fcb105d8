//! Handle index over a document's collections.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::model::{Collection, Document, Element, Handle, Location, Target};

/// Mutable view of a document with a handle→location index.
///
/// One store is built per document and per normalization call; it owns the
/// counter used to allocate new group handles.
pub struct DocumentStore<'a> {
    doc: &'a mut Document,
    index: HashMap<Handle, Location>,
    next_group: usize,
}

impl<'a> DocumentStore<'a> {
    /// Index every element of `doc`.
    ///
    /// Fails if a handle does not match the slot it is stored in, which also
    /// rules out duplicates.
    pub fn new(doc: &'a mut Document) -> Result<Self> {
        let mut index = HashMap::with_capacity(doc.element_count());

        for collection in Collection::ALL {
            for (i, element) in doc.collection(collection).iter().enumerate() {
                let location = Location::new(collection, i);
                if element.self_ref.location()? != Some(location) {
                    return Err(Error::MisplacedHandle {
                        handle: element.self_ref.clone(),
                        collection: collection.as_str(),
                        index: i,
                    });
                }
                index.insert(element.self_ref.clone(), location);
            }
        }

        let next_group = doc.groups.len();
        log::debug!(
            "DocumentStore: indexed {} elements, next group #{}",
            index.len(),
            next_group
        );

        Ok(Self {
            doc,
            index,
            next_group,
        })
    }

    /// The underlying document.
    pub fn document(&self) -> &Document {
        &*self.doc
    }

    fn resolve(&self, handle: &Handle) -> Result<Target> {
        if handle.is_root() {
            return handle.target();
        }
        self.index
            .get(handle)
            .map(|location| Target::Item(*location))
            .ok_or_else(|| Error::UnknownHandle(handle.clone()))
    }

    /// Look up an element by handle.
    pub fn get(&self, handle: &Handle) -> Result<&Element> {
        match self.resolve(handle)? {
            Target::Body => Ok(&self.doc.body),
            Target::Furniture => self
                .doc
                .furniture
                .as_ref()
                .ok_or_else(|| Error::UnknownHandle(handle.clone())),
            Target::Item(location) => Ok(&self.doc.collection(location.collection)[location.index]),
        }
    }

    /// Look up an element by handle for mutation.
    pub fn get_mut(&mut self, handle: &Handle) -> Result<&mut Element> {
        match self.resolve(handle)? {
            Target::Body => Ok(&mut self.doc.body),
            Target::Furniture => self
                .doc
                .furniture
                .as_mut()
                .ok_or_else(|| Error::UnknownHandle(handle.clone())),
            Target::Item(location) => {
                Ok(&mut self.doc.collection_mut(location.collection)[location.index])
            }
        }
    }

    /// Write `element` back into the slot recorded for `handle`.
    pub fn update(&mut self, handle: &Handle, element: Element) -> Result<()> {
        if element.self_ref != *handle {
            return Err(Error::IntegrityViolation(format!(
                "cannot store {} in the slot of {}",
                element.self_ref, handle
            )));
        }
        *self.get_mut(handle)? = element;
        Ok(())
    }

    /// Handles of a collection, in collection order.
    pub fn handles(&self, collection: Collection) -> Vec<Handle> {
        self.doc
            .collection(collection)
            .iter()
            .map(|e| e.self_ref.clone())
            .collect()
    }

    /// Append a new, detached group element and return its handle.
    pub fn allocate_group(&mut self, name: &str) -> Handle {
        let handle = Handle::new(Collection::Groups, self.next_group);
        let location = Location::new(Collection::Groups, self.next_group);
        self.next_group += 1;

        debug_assert_eq!(location.index, self.doc.groups.len());
        self.doc.groups.push(Element::group(handle.clone(), name));
        self.index.insert(handle.clone(), location);

        handle
    }

    /// Number of groups allocated so far, including pre-existing ones.
    pub fn group_count(&self) -> usize {
        self.next_group
    }
}
