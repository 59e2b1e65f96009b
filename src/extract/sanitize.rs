//! Content region selection and attribute-stripping serialization
//!
//! Produces new markup from the parsed tree instead of editing it: noise
//! subtrees are left out and every element keeps only allow-listed
//! attributes.

use super::noise::NoiseSet;
use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashSet;

/// Attributes that survive sanitization
pub const ALLOWED_ATTRIBUTES: &[&str] = &["href", "src", "alt", "title"];

/// Elements serialized without a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Selects the content regions matching `selector`
///
/// Matches nested inside another match, or inside noise, are dropped so the
/// same content is never emitted twice. Results are in document order.
pub fn select_regions<'a>(
    document: &'a Html,
    selector: &Selector,
    noise: &NoiseSet,
) -> Vec<ElementRef<'a>> {
    let matches: Vec<ElementRef<'a>> = document
        .select(selector)
        .filter(|el| !noise.contains(el))
        .collect();

    let ids: HashSet<_> = matches.iter().map(|el| el.id()).collect();

    matches
        .into_iter()
        .filter(|el| !el.ancestors().any(|a| ids.contains(&a.id())))
        .collect()
}

/// Serializes the children of each region, concatenated
///
/// # Arguments
///
/// * `regions` - Region roots from [`select_regions`]
/// * `noise` - Noise subtrees to leave out
/// * `keep_comments` - Whether HTML comments are emitted
pub fn serialize_regions(regions: &[ElementRef<'_>], noise: &NoiseSet, keep_comments: bool) -> String {
    let mut output = String::new();
    for region in regions {
        serialize_children(**region, noise, keep_comments, &mut output);
    }
    output
}

/// Collects the text of each region, skipping noise, trimmed at both ends
pub fn regions_text(regions: &[ElementRef<'_>], noise: &NoiseSet) -> String {
    let mut text = String::new();
    for region in regions {
        collect_text(**region, noise, &mut text);
    }
    text.trim().to_string()
}

fn serialize_children(node: NodeRef<'_, Node>, noise: &NoiseSet, keep_comments: bool, output: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => escape_text(text, output),
            Node::Element(element) => {
                if noise.is_root(child.id()) {
                    continue;
                }

                let name = element.name();
                output.push('<');
                output.push_str(name);

                // Emitted in allow-list order
                for attr in ALLOWED_ATTRIBUTES {
                    if let Some(value) = element.attr(attr) {
                        output.push(' ');
                        output.push_str(attr);
                        output.push_str("=\"");
                        escape_attribute(value, output);
                        output.push('"');
                    }
                }
                output.push('>');

                if VOID_ELEMENTS.contains(&name) {
                    continue;
                }

                serialize_children(child, noise, keep_comments, output);

                output.push_str("</");
                output.push_str(name);
                output.push('>');
            }
            Node::Comment(comment) if keep_comments => {
                output.push_str("<!--");
                output.push_str(comment);
                output.push_str("-->");
            }
            _ => {}
        }
    }
}

fn collect_text(node: NodeRef<'_, Node>, noise: &NoiseSet, output: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => output.push_str(text),
            Node::Element(_) if !noise.is_root(child.id()) => collect_text(child, noise, output),
            _ => {}
        }
    }
}

fn escape_text(text: &str, output: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            c => output.push(c),
        }
    }
}

fn escape_attribute(value: &str, output: &mut String) {
    for ch in value.chars() {
        match ch {
            '"' => output.push_str("&quot;"),
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            c => output.push(c),
        }
    }
}
