use std::fmt::Write as _;

use ego_tree::NodeRef;
use scraper::Node;

const INDENT: &str = "  ";

// Elements that never have children or a closing tag.
const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

// Text below these is written verbatim.
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

// Text below these keeps its whitespace.
const PREFORMATTED_ELEMENTS: [&str; 2] = ["pre", "textarea"];

/// Append `node` and its subtree, one tag or text run per line.
pub(super) fn write_node(out: &mut String, node: NodeRef<'_, Node>, depth: usize) {
    match node.value() {
        Node::Document | Node::Fragment => {
            for child in node.children() {
                write_node(out, child, depth);
            }
        }
        Node::Doctype(doctype) => {
            line(out, depth, &format!("<!DOCTYPE {}>", doctype.name()));
        }
        Node::Comment(comment) => {
            line(out, depth, &format!("<!--{}-->", &**comment));
        }
        Node::Text(text) => {
            let parent = node
                .parent()
                .and_then(|parent| parent.value().as_element().map(|el| el.name()));
            if let Some(rendered) = render_text(parent, text) {
                line(out, depth, &rendered);
            }
        }
        Node::Element(element) => {
            let mut open = format!("<{}", element.name());
            for (name, value) in element.attrs() {
                let _ = write!(open, " {name}=\"{}\"", escape(value, true));
            }
            open.push('>');

            if VOID_ELEMENTS.contains(&element.name()) {
                line(out, depth, &open);
                return;
            }

            // Keep short text-only elements on one line: <p>foo</p>
            let mut children = node.children();
            if let (Some(only), None) = (children.next(), children.next()) {
                if let Some(text) = only.value().as_text() {
                    let content = render_text(Some(element.name()), text).unwrap_or_default();
                    let inline = format!("{open}{content}</{}>", element.name());
                    line(out, depth, &inline);
                    return;
                }
            }

            line(out, depth, &open);
            for child in node.children() {
                write_node(out, child, depth + 1);
            }
            line(out, depth, &format!("</{}>", element.name()));
        }
        _ => {}
    }
}

// None when the text is only layout whitespace.
fn render_text(parent: Option<&str>, text: &str) -> Option<String> {
    let parent = parent.unwrap_or("");
    if PREFORMATTED_ELEMENTS.contains(&parent) {
        return Some(escape(text, false));
    }

    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else if RAW_TEXT_ELEMENTS.contains(&parent) {
        Some(trimmed.to_string())
    } else {
        Some(escape(trimmed, false))
    }
}

fn line(out: &mut String, depth: usize, content: &str) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(content);
    out.push('\n');
}

fn escape(raw: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}
