//! Element handles (`#/<collection>/<index>`) and reference serialization.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// The element collections of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Text-like items (text, caption, list items, formulas, footers)
    Texts,
    /// Pictures
    Pictures,
    /// Tables
    Tables,
    /// Groups (pre-existing or created during normalization)
    Groups,
}

impl Collection {
    /// All collections, in the order they are indexed.
    pub const ALL: [Collection; 4] = [
        Collection::Texts,
        Collection::Pictures,
        Collection::Tables,
        Collection::Groups,
    ];

    /// Collection name as it appears in handles and in the JSON document.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Texts => "texts",
            Collection::Pictures => "pictures",
            Collection::Tables => "tables",
            Collection::Groups => "groups",
        }
    }

    /// Look up a collection by its JSON name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "texts" => Some(Collection::Texts),
            "pictures" => Some(Collection::Pictures),
            "tables" => Some(Collection::Tables),
            "groups" => Some(Collection::Groups),
            _ => None,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Slot of an element inside the document's collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    /// Collection holding the element
    pub collection: Collection,
    /// Index inside the collection
    pub index: usize,
}

impl Location {
    /// Create a new location.
    pub fn new(collection: Collection, index: usize) -> Self {
        Self { collection, index }
    }
}

/// What a handle points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The virtual `#/body` root
    Body,
    /// The virtual `#/furniture` root
    Furniture,
    /// An element stored in a collection
    Item(Location),
}

/// Stable identifier of an element.
///
/// Serialized as a plain string (`"self_ref": "#/texts/0"`); parent and
/// children links use the `{"$ref": ...}` form through [`refs`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(String);

impl Handle {
    /// Handle of the virtual body root.
    pub const BODY: &'static str = "#/body";

    /// Handle of the virtual furniture root.
    pub const FURNITURE: &'static str = "#/furniture";

    /// The body handle.
    pub fn body() -> Self {
        Handle(Self::BODY.to_string())
    }

    /// The furniture handle.
    pub fn furniture() -> Self {
        Handle(Self::FURNITURE.to_string())
    }

    /// Build the handle of slot `index` in `collection`.
    pub fn new(collection: Collection, index: usize) -> Self {
        Handle(format!("#/{}/{}", collection, index))
    }

    /// The raw handle string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if this is the body handle.
    pub fn is_body(&self) -> bool {
        self.0 == Self::BODY
    }

    /// Check if this handle names one of the virtual roots.
    pub fn is_root(&self) -> bool {
        self.0 == Self::BODY || self.0 == Self::FURNITURE
    }

    /// Decode the handle into what it points at.
    pub fn target(&self) -> Result<Target> {
        match self.0.as_str() {
            Self::BODY => return Ok(Target::Body),
            Self::FURNITURE => return Ok(Target::Furniture),
            _ => {}
        }

        let invalid = || Error::InvalidHandle(self.0.clone());
        let path = self.0.strip_prefix("#/").ok_or_else(invalid)?;
        let (name, index) = path.split_once('/').ok_or_else(invalid)?;
        let collection = Collection::from_name(name).ok_or_else(invalid)?;
        let index = index.parse::<usize>().map_err(|_| invalid())?;

        Ok(Target::Item(Location::new(collection, index)))
    }

    /// Decode the handle into a collection slot, `None` for the virtual roots.
    pub fn location(&self) -> Result<Option<Location>> {
        Ok(match self.target()? {
            Target::Item(location) => Some(location),
            Target::Body | Target::Furniture => None,
        })
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Handle {
    fn from(s: &str) -> Self {
        Handle(s.to_string())
    }
}

impl From<String> for Handle {
    fn from(s: String) -> Self {
        Handle(s)
    }
}

impl From<Location> for Handle {
    fn from(location: Location) -> Self {
        Handle::new(location.collection, location.index)
    }
}

/// `{"$ref": "#/texts/0"}` wire form of a link.
#[derive(Serialize, Deserialize)]
struct RefItem {
    #[serde(rename = "$ref")]
    cref: Handle,
}

/// Serde helpers for `{"$ref": ...}` links.
pub(crate) mod refs {
    use super::*;

    /// `Option<Handle>` as an optional `{"$ref": ...}` object.
    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<Handle>,
            serializer: S,
        ) -> std::result::Result<S::Ok, S::Error> {
            value
                .as_ref()
                .map(|h| RefItem { cref: h.clone() })
                .serialize(serializer)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> std::result::Result<Option<Handle>, D::Error> {
            let item = Option::<RefItem>::deserialize(deserializer)?;
            // An empty reference marks an element that was detached upstream.
            Ok(item.map(|r| r.cref).filter(|h| !h.as_str().is_empty()))
        }
    }

    /// `Vec<Handle>` as a list of `{"$ref": ...}` objects.
    pub mod list {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &[Handle],
            serializer: S,
        ) -> std::result::Result<S::Ok, S::Error> {
            serializer.collect_seq(value.iter().map(|h| RefItem { cref: h.clone() }))
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> std::result::Result<Vec<Handle>, D::Error> {
            let items = Vec::<RefItem>::deserialize(deserializer)?;
            Ok(items.into_iter().map(|r| r.cref).collect())
        }
    }
}
