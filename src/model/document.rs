//! Document-level types.

use std::collections::{HashMap, HashSet};
use std::io::Read;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Collection, Element, Handle, Label, Location, ProvenanceItem, Target};
use crate::error::{Error, Result};

fn default_body() -> Element {
    let mut body = Element::new(Handle::body(), Label::default());
    body.payload.name = Some("_root_".to_string());
    body
}

/// A document object model produced by the layout-extraction engine.
///
/// Elements live in four append-only collections and refer to each other by
/// [`Handle`]. The body is a virtual root that is never stored in a
/// collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Virtual root of the reading-order tree
    #[serde(default = "default_body")]
    pub body: Element,

    /// Virtual root of page furniture (headers, footers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub furniture: Option<Element>,

    /// Group elements
    #[serde(default)]
    pub groups: Vec<Element>,

    /// Text-like elements
    #[serde(default)]
    pub texts: Vec<Element>,

    /// Pictures
    #[serde(default)]
    pub pictures: Vec<Element>,

    /// Tables
    #[serde(default)]
    pub tables: Vec<Element>,

    /// Other top-level fields (schema_name, version, origin, pages, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            body: default_body(),
            furniture: None,
            groups: Vec::new(),
            texts: Vec::new(),
            pictures: Vec::new(),
            tables: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Parse a document from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a document from a JSON reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Elements of a collection.
    pub fn collection(&self, collection: Collection) -> &[Element] {
        match collection {
            Collection::Texts => &self.texts,
            Collection::Pictures => &self.pictures,
            Collection::Tables => &self.tables,
            Collection::Groups => &self.groups,
        }
    }

    /// Mutable access to a collection.
    pub fn collection_mut(&mut self, collection: Collection) -> &mut Vec<Element> {
        match collection {
            Collection::Texts => &mut self.texts,
            Collection::Pictures => &mut self.pictures,
            Collection::Tables => &mut self.tables,
            Collection::Groups => &mut self.groups,
        }
    }

    /// Resolve a handle by decoding it, without an index.
    pub fn element(&self, handle: &Handle) -> Option<&Element> {
        match handle.target().ok()? {
            Target::Body => Some(&self.body),
            Target::Furniture => self.furniture.as_ref(),
            Target::Item(location) => self
                .collection(location.collection)
                .get(location.index)
                .filter(|e| &e.self_ref == handle),
        }
    }

    /// Append a new element to `collection` as the last child of the body.
    ///
    /// The handle is derived from the collection length. Returns the new
    /// element's handle.
    pub fn add_element(
        &mut self,
        collection: Collection,
        label: Label,
        prov: Vec<ProvenanceItem>,
    ) -> Handle {
        let handle = Handle::new(collection, self.collection(collection).len());
        let mut element = Element::new(handle.clone(), label);
        element.parent = Some(Handle::body());
        element.prov = prov;
        self.collection_mut(collection).push(element);
        self.body.children.push(handle.clone());
        handle
    }

    /// Number of elements across all collections.
    pub fn element_count(&self) -> usize {
        Collection::ALL
            .iter()
            .map(|c| self.collection(*c).len())
            .sum()
    }

    /// Count elements per label.
    pub fn label_counts(&self) -> HashMap<Label, usize> {
        let mut counts = HashMap::new();
        for collection in Collection::ALL {
            for element in self.collection(collection) {
                *counts.entry(element.label.clone()).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Check the parent/child graph for consistency.
    ///
    /// Verifies that every stored handle matches its slot and is unique,
    /// that every non-root element has a parent listing it exactly once,
    /// and that every child link points back at its owner.
    pub fn check_integrity(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for collection in Collection::ALL {
            for (index, element) in self.collection(collection).iter().enumerate() {
                if !seen.insert(&element.self_ref) {
                    return Err(Error::DuplicateHandle(element.self_ref.clone()));
                }
                if element.self_ref.location()? != Some(Location::new(collection, index)) {
                    return Err(Error::MisplacedHandle {
                        handle: element.self_ref.clone(),
                        collection: collection.as_str(),
                        index,
                    });
                }

                let parent_ref = element
                    .parent
                    .as_ref()
                    .ok_or_else(|| Error::Detached(element.self_ref.clone()))?;
                let parent = self
                    .element(parent_ref)
                    .ok_or_else(|| Error::UnknownHandle(parent_ref.clone()))?;
                let listed = parent
                    .children
                    .iter()
                    .filter(|c| **c == element.self_ref)
                    .count();
                if listed == 0 {
                    return Err(Error::MissingBackEdge {
                        parent: parent_ref.clone(),
                        child: element.self_ref.clone(),
                    });
                }
                if listed > 1 {
                    return Err(Error::IntegrityViolation(format!(
                        "{} is listed {} times by its parent {}",
                        element.self_ref, listed, parent_ref
                    )));
                }
            }
        }

        let owners = std::iter::once(&self.body)
            .chain(self.furniture.iter())
            .chain(Collection::ALL.iter().flat_map(|c| self.collection(*c)));
        for owner in owners {
            for child_ref in &owner.children {
                let child = self
                    .element(child_ref)
                    .ok_or_else(|| Error::UnknownHandle(child_ref.clone()))?;
                if child.parent.as_ref() != Some(&owner.self_ref) {
                    return Err(Error::IntegrityViolation(format!(
                        "{} lists {} whose parent is {}",
                        owner.self_ref,
                        child_ref,
                        child
                            .parent
                            .as_ref()
                            .map(|p| p.as_str())
                            .unwrap_or("<none>")
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
