//! Splits rendered page HTML into top-level body elements.

use html5ever::{
    ParseOpts, parse_document,
    serialize::{SerializeOpts, TraversalScope, serialize},
    tendril::TendrilSink,
};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};
use thiserror::Error;
use tracing::debug;

/// One element child of `<body>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Zero-based position among the body's element children.
    pub offset: usize,
    /// Concatenated text of all descendant text nodes.
    pub text: String,
    /// Outer HTML of the element.
    pub markup: String,
}

#[derive(Debug, Error)]
enum FragmentError {
    #[error("failed to read markup: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialized element is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Parse `markup` as a full document and return the element children of
/// its body, in document order.
///
/// Text nodes, comments and whitespace between elements are skipped.
/// Markup that cannot be processed yields no fragments.
pub fn fragment_html(markup: &str) -> Vec<Fragment> {
    match try_fragment_html(markup) {
        Ok(fragments) => fragments,
        Err(e) => {
            debug!(error = %e, "could not fragment markup");
            Vec::new()
        }
    }
}

fn try_fragment_html(markup: &str) -> Result<Vec<Fragment>, FragmentError> {
    let dom = parse_document(RcDom::default(), ParseOpts::default())
        .from_utf8()
        .read_from(&mut markup.as_bytes())?;

    let Some(body) = find_body(&dom.document) else {
        return Ok(Vec::new());
    };

    let children = body.children.borrow();
    let mut fragments = Vec::new();
    for child in children.iter() {
        if !matches!(child.data, NodeData::Element { .. }) {
            continue;
        }

        let mut text = String::new();
        collect_text(child, &mut text);

        fragments.push(Fragment {
            offset: fragments.len(),
            text,
            markup: outer_html(child)?,
        });
    }

    Ok(fragments)
}

fn element_named(handle: &Handle, local: &str) -> bool {
    match &handle.data {
        NodeData::Element { name, .. } => &*name.local == local,
        _ => false,
    }
}

fn find_body(document: &Handle) -> Option<Handle> {
    let html = document
        .children
        .borrow()
        .iter()
        .find(|child| element_named(child, "html"))
        .cloned()?;

    let body = html
        .children
        .borrow()
        .iter()
        .find(|child| element_named(child, "body"))
        .cloned();
    body
}

fn collect_text(handle: &Handle, out: &mut String) {
    for child in handle.children.borrow().iter() {
        match &child.data {
            NodeData::Text { contents } => out.push_str(&contents.borrow()),
            NodeData::Element { .. } => collect_text(child, out),
            _ => {}
        }
    }
}

fn outer_html(handle: &Handle) -> Result<String, FragmentError> {
    let node: SerializableHandle = handle.clone().into();
    let mut bytes = Vec::new();
    serialize(
        &mut bytes,
        &node,
        SerializeOpts {
            traversal_scope: TraversalScope::IncludeNode,
            ..Default::default()
        },
    )?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_level_elements_in_order() {
        let fragments = fragment_html("<p>Intro text</p><h2>Section</h2>");

        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].offset, 0);
        assert_eq!(fragments[0].text, "Intro text");
        assert_eq!(fragments[0].markup, "<p>Intro text</p>");
        assert_eq!(fragments[1].offset, 1);
        assert_eq!(fragments[1].text, "Section");
        assert_eq!(fragments[1].markup, "<h2>Section</h2>");
    }

    #[test]
    fn test_nested_elements_belong_to_their_parent() {
        let fragments =
            fragment_html("<ul><li>one</li><li>two</li></ul>\n<p>a <em>b</em> c</p>");

        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].text, "onetwo");
        assert_eq!(fragments[0].markup, "<ul><li>one</li><li>two</li></ul>");
        assert_eq!(fragments[1].text, "a b c");
    }

    #[test]
    fn test_text_and_comments_are_not_fragments() {
        let fragments = fragment_html("loose text<!-- note --><p>kept</p>more");
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].offset, 0);
        assert_eq!(fragments[0].text, "kept");
    }

    #[test]
    fn test_attributes_survive_serialization() {
        let fragments = fragment_html(r#"<h2 id="setup">Setup</h2>"#);
        assert_eq!(fragments[0].markup, r#"<h2 id="setup">Setup</h2>"#);
    }

    #[test]
    fn test_plain_text_and_empty_input() {
        assert!(fragment_html("Hello world").is_empty());
        assert!(fragment_html("").is_empty());
    }

    #[test]
    fn test_full_document_uses_body() {
        let html = "<!DOCTYPE html><html><head><title>x</title></head>\
                    <body><main><p>a</p></main><footer>f</footer></body></html>";
        let fragments = fragment_html(html);

        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].markup, "<main><p>a</p></main>");
        assert_eq!(fragments[1].text, "f");
    }
}
