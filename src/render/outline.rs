//! Indented tree outline of a document, for inspection.

use std::collections::HashSet;
use std::fmt::Write;

use crate::error::{Error, Result};
use crate::model::{Document, Element, Handle};

/// Maximum number of characters of text shown per element.
const SNIPPET_LEN: usize = 40;

/// Render the body tree (and the furniture tree, if any) as an indented
/// outline, one element per line.
///
/// ```text
/// body
///   group #/groups/0 "picture-group"
///     picture #/pictures/0 p1 [0.0, 10.0, 5.0, -2.0]
///       text #/texts/0 p1 [1.0, 0.0, 4.0, -2.0] "Figure 1"
/// ```
pub fn to_outline(doc: &Document) -> Result<String> {
    let mut output = String::new();
    let mut visited = HashSet::new();

    output.push_str("body\n");
    for child in &doc.body.children {
        write_subtree(doc, child, 1, &mut visited, &mut output)?;
    }

    if let Some(furniture) = &doc.furniture {
        output.push_str("furniture\n");
        for child in &furniture.children {
            write_subtree(doc, child, 1, &mut visited, &mut output)?;
        }
    }

    Ok(output)
}

fn write_subtree<'d>(
    doc: &'d Document,
    handle: &'d Handle,
    depth: usize,
    visited: &mut HashSet<&'d Handle>,
    output: &mut String,
) -> Result<()> {
    if !visited.insert(handle) {
        return Err(Error::IntegrityViolation(format!(
            "{} is reachable more than once",
            handle
        )));
    }
    let element = doc
        .element(handle)
        .ok_or_else(|| Error::UnknownHandle(handle.clone()))?;

    output.push_str(&"  ".repeat(depth));
    write_line(element, output);
    output.push('\n');

    for child in &element.children {
        write_subtree(doc, child, depth + 1, visited, output)?;
    }
    Ok(())
}

fn write_line(element: &Element, output: &mut String) {
    // Writing to a String cannot fail
    let _ = write!(output, "{} {}", element.label, element.self_ref);

    if let Some(prov) = element.primary_prov() {
        let b = &prov.bbox;
        let _ = write!(
            output,
            " p{} [{:.1}, {:.1}, {:.1}, {:.1}]",
            prov.page_no, b.l, b.t, b.r, b.b
        );
    }

    let label = element
        .payload
        .text
        .as_deref()
        .or(element.payload.name.as_deref());
    if let Some(text) = label {
        let mut snippet: String = text.chars().take(SNIPPET_LEN).collect();
        if text.chars().count() > SNIPPET_LEN {
            snippet.push_str("...");
        }
        let _ = write!(output, " {:?}", snippet);
    }
}
