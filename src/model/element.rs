//! Document elements: the shared base record and label-specific payload.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::handle::refs;
use super::{BoundingBox, Handle, ProvenanceItem};

/// Layout label attached to an element by the extraction engine.
///
/// Labels the normalizer does not reason about are kept verbatim in
/// [`Label::Other`] so that a load/save round trip is lossless.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    /// Unclassified body text (the only label eligible as a caption candidate)
    Text,
    /// Picture / figure
    Picture,
    /// Caption of a picture or table
    Caption,
    /// Table
    Table,
    /// List item
    #[serde(alias = "listitem")]
    ListItem,
    /// Formula
    Formula,
    /// Page footer
    PageFooter,
    /// Group created by the normalizer
    Group,
    /// Any other label (section_header, unspecified, list, ...)
    #[serde(untagged)]
    Other(String),
}

impl Label {
    /// Label string as written in the document.
    pub fn as_str(&self) -> &str {
        match self {
            Label::Text => "text",
            Label::Picture => "picture",
            Label::Caption => "caption",
            Label::Table => "table",
            Label::ListItem => "list_item",
            Label::Formula => "formula",
            Label::PageFooter => "page_footer",
            Label::Group => "group",
            Label::Other(s) => s,
        }
    }
}

impl Default for Label {
    fn default() -> Self {
        Label::Other("unspecified".to_string())
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label-specific payload.
///
/// Textual items carry `text`/`orig`, groups carry `name`; every other field
/// of the source document (captions, image data, formatting, ...) is kept in
/// `extra` and written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    /// Group name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Original (unnormalized) text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orig: Option<String>,

    /// Text content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Fields not modeled explicitly
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_content_layer() -> String {
    "body".to_string()
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Stable handle of this element
    pub self_ref: Handle,

    /// Parent link; `None` only for the virtual roots
    #[serde(
        default,
        with = "refs::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent: Option<Handle>,

    /// Ordered child links
    #[serde(default, with = "refs::list")]
    pub children: Vec<Handle>,

    /// Content layer (body, furniture, background)
    #[serde(default = "default_content_layer")]
    pub content_layer: String,

    /// Layout label
    #[serde(default)]
    pub label: Label,

    /// Page placements; the first entry is the primary one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prov: Vec<ProvenanceItem>,

    /// Label-specific payload
    #[serde(flatten)]
    pub payload: Payload,
}

impl Element {
    /// Create a detached element with no geometry.
    pub fn new(self_ref: Handle, label: Label) -> Self {
        Self {
            self_ref,
            parent: None,
            children: Vec::new(),
            content_layer: default_content_layer(),
            label,
            prov: Vec::new(),
            payload: Payload::default(),
        }
    }

    /// Create a group element.
    pub fn group(self_ref: Handle, name: impl Into<String>) -> Self {
        let mut group = Self::new(self_ref, Label::Group);
        group.payload.name = Some(name.into());
        group
    }

    /// Set the text content (both `text` and `orig`).
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.payload.orig = Some(text.clone());
        self.payload.text = Some(text);
        self
    }

    /// Add a provenance entry.
    pub fn with_prov(mut self, page_no: u32, bbox: BoundingBox) -> Self {
        self.prov.push(ProvenanceItem::new(page_no, bbox));
        self
    }

    /// Primary provenance entry.
    pub fn primary_prov(&self) -> Option<&ProvenanceItem> {
        self.prov.first()
    }

    /// Bounding box of the primary provenance entry.
    pub fn primary_bbox(&self) -> Option<&BoundingBox> {
        self.prov.first().map(|p| &p.bbox)
    }

    /// Check if this element is a picture.
    pub fn is_picture(&self) -> bool {
        self.label == Label::Picture
    }

    /// Check if this element is a caption.
    pub fn is_caption(&self) -> bool {
        self.label == Label::Caption
    }

    /// Position of `child` in this element's children.
    pub fn child_position(&self, child: &Handle) -> Option<usize> {
        self.children.iter().position(|c| c == child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_label_round_trip() {
        for (raw, label) in [
            ("\"text\"", Label::Text),
            ("\"page_footer\"", Label::PageFooter),
            ("\"list_item\"", Label::ListItem),
            ("\"section_header\"", Label::Other("section_header".into())),
        ] {
            let parsed: Label = serde_json::from_str(raw).unwrap();
            assert_eq!(parsed, label);
            assert_eq!(serde_json::to_string(&parsed).unwrap(), raw);
        }

        let legacy: Label = serde_json::from_str("\"listitem\"").unwrap();
        assert_eq!(legacy, Label::ListItem);
    }

    #[test]
    fn test_element_wire_format() {
        let value = json!({
            "self_ref": "#/pictures/0",
            "parent": {"$ref": "#/body"},
            "children": [{"$ref": "#/texts/2"}],
            "content_layer": "body",
            "label": "picture",
            "prov": [{
                "page_no": 1,
                "bbox": {"l": 0.0, "t": 10.0, "r": 5.0, "b": 0.0, "coord_origin": "BOTTOMLEFT"},
                "charspan": [0, 0]
            }],
            "captions": [],
            "annotations": []
        });

        let element: Element = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(element.self_ref, Handle::from("#/pictures/0"));
        assert_eq!(element.parent, Some(Handle::body()));
        assert_eq!(element.children, vec![Handle::from("#/texts/2")]);
        assert!(element.is_picture());
        assert_eq!(element.primary_bbox().unwrap().t, 10.0);
        assert!(element.payload.extra.contains_key("captions"));

        assert_eq!(serde_json::to_value(&element).unwrap(), value);
    }

    #[test]
    fn test_group_has_name() {
        let group = Element::group(Handle::from("#/groups/0"), "picture-group");
        assert_eq!(group.label, Label::Group);
        assert_eq!(group.payload.name.as_deref(), Some("picture-group"));
        assert!(group.prov.is_empty());
    }
}
