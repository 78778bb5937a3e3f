//! SVG markup parsing into the DOM arena, and serialization back to markup.

use dd_core::DrillError;
use dd_core::DrillResult;
use dd_dom::Display;
use dd_dom::Document;
use dd_dom::Element;
use dd_dom::NodeId;
use dd_dom::NodeKind;
use roxmltree::ParsingOptions;
use tracing::debug;

const XML_NAMESPACE_PREFIX: &str = "xml";

/// Parses SVG/XML markup into a [`Document`].
#[derive(Debug, Default)]
pub struct SvgParser;

impl SvgParser {
    pub fn parse(&self, input: &str) -> DrillResult<Document> {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let xml = roxmltree::Document::parse_with_options(input, options).map_err(|error| {
            DrillError::new("svg.parse.malformed", format!("invalid SVG markup: {error}"))
        })?;

        let mut document = Document::empty();
        append_element(&mut document, Document::ROOT, xml.root_element())?;

        debug!(nodes = document.len(), "parsed svg document");
        Ok(document)
    }
}

fn append_element(
    document: &mut Document,
    parent: NodeId,
    node: roxmltree::Node<'_, '_>,
) -> DrillResult<()> {
    let mut attributes = namespace_declarations(node);
    for attribute in node.attributes() {
        let name = qualified_name(node, attribute.namespace(), attribute.name());
        attributes.push((name, attribute.value().to_owned()));
    }

    let hidden = attributes
        .iter()
        .any(|(name, value)| name == "style" && style_hides(value));
    let tag = qualified_name(node, node.tag_name().namespace(), node.tag_name().name());
    let id = document.append_element(parent, Element::new(tag, attributes))?;
    if hidden {
        document.set_display(id, Display::Hidden);
    }

    for child in node.children() {
        if child.is_element() {
            append_element(document, id, child)?;
            continue;
        }
        // Comments and processing instructions are dropped.
        if child.is_text() {
            document.append_text(id, child.text().unwrap_or_default())?;
        }
    }

    Ok(())
}

/// `xmlns` declarations introduced on `node` itself, as plain attributes.
fn namespace_declarations(node: roxmltree::Node<'_, '_>) -> Vec<(String, String)> {
    let inherited: Vec<(Option<&str>, &str)> = node
        .parent_element()
        .map(|parent| {
            parent
                .namespaces()
                .map(|namespace| (namespace.name(), namespace.uri()))
                .collect()
        })
        .unwrap_or_default();

    node.namespaces()
        .filter(|namespace| namespace.name() != Some(XML_NAMESPACE_PREFIX))
        .filter(|namespace| !inherited.contains(&(namespace.name(), namespace.uri())))
        .map(|namespace| match namespace.name() {
            Some(prefix) => (format!("xmlns:{prefix}"), namespace.uri().to_owned()),
            None => ("xmlns".to_owned(), namespace.uri().to_owned()),
        })
        .collect()
}

/// Rebuilds `prefix:name` from a resolved namespace, so tags like `svg:g` survive.
fn qualified_name(node: roxmltree::Node<'_, '_>, namespace: Option<&str>, name: &str) -> String {
    match namespace.and_then(|uri| node.lookup_prefix(uri)) {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{name}"),
        _ => name.to_owned(),
    }
}

/// Writes the document back as markup. Hidden elements carry `display:none`.
pub fn serialize(document: &Document) -> String {
    let mut out = String::new();
    for child in document.children(Document::ROOT) {
        write_node(document, *child, &mut out);
    }
    out
}

fn write_node(document: &Document, id: NodeId, out: &mut String) {
    let Some(node) = document.node(id) else {
        return;
    };

    let element = match &node.kind {
        NodeKind::Element(element) => element,
        NodeKind::Text(text) => {
            escape_into(out, text, false);
            return;
        }
        NodeKind::Document => return,
    };

    out.push('<');
    out.push_str(&element.tag);

    let mut wrote_style = false;
    for (name, value) in &element.attributes {
        if name == "style" && element.is_hidden() {
            write_attribute(out, name, &with_display_none(value));
            wrote_style = true;
            continue;
        }
        write_attribute(out, name, value);
    }
    if element.is_hidden() && !wrote_style {
        write_attribute(out, "style", "display:none");
    }

    if node.children.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for child in &node.children {
        write_node(document, *child, out);
    }
    out.push_str("</");
    out.push_str(&element.tag);
    out.push('>');
}

fn write_attribute(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    escape_into(out, value, true);
    out.push('"');
}

fn escape_into(out: &mut String, raw: &str, in_attribute: bool) {
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

fn with_display_none(style: &str) -> String {
    if style_hides(style) {
        return style.to_owned();
    }

    let trimmed = style.trim_end();
    if trimmed.is_empty() {
        "display:none".to_owned()
    } else if trimmed.ends_with(';') {
        format!("{trimmed}display:none")
    } else {
        format!("{trimmed};display:none")
    }
}

/// True when an inline style declares `display: none` (last declaration wins).
fn style_hides(style: &str) -> bool {
    style
        .split(';')
        .filter_map(|declaration| declaration.split_once(':'))
        .rev()
        .find(|(property, _)| property.trim().eq_ignore_ascii_case("display"))
        .is_some_and(|(_, value)| value.trim().eq_ignore_ascii_case("none"))
}

#[cfg(test)]
mod tests {
    use super::SvgParser;
    use super::serialize;
    use super::style_hides;
    use dd_dom::Display;
    use dd_dom::Document;
    use dd_dom::ElementRole;

    fn parse(input: &str) -> Document {
        match SvgParser.parse(input) {
            Ok(doc) => doc,
            Err(error) => panic!("{error}"),
        }
    }

    #[test]
    fn builds_nested_tree_with_roles_and_ids() {
        let doc = parse(
            r##"<?xml version="1.0"?>
<svg xmlns="http://www.w3.org/2000/svg"><g id="g1"><a class="obscures" href="#g1"><rect/></a></g></svg>"##,
        );

        let group = match doc.get_element_by_id("g1") {
            Some(id) => id,
            None => panic!("g1 missing"),
        };
        let svg = doc.parent(group);
        assert_eq!(svg, doc.document_element());

        let link = doc.children(group)[0];
        let element = match doc.element(link) {
            Some(element) => element,
            None => panic!("link is not an element"),
        };
        assert_eq!(element.role, ElementRole::OverlayLink);
        assert!(element.has_class("obscures"));
        assert_eq!(element.attribute("href"), Some("#g1"));
        assert_eq!(doc.children(link).len(), 1);
    }

    #[test]
    fn skips_comments_doctype_and_processing_instructions() {
        let doc = parse(
            "<!DOCTYPE svg><!-- <g id=\"ghost\"> --><svg><?pi data?><g id=\"real\"/></svg>",
        );
        assert_eq!(doc.get_element_by_id("ghost"), None);
        assert!(doc.get_element_by_id("real").is_some());
    }

    #[test]
    fn decodes_entities_in_ids_and_classes() {
        let doc = parse(
            r#"<svg><g id="a&amp;b"/><g id="&#x67;1"><a id="c" class="&#111;bscures"/></g></svg>"#,
        );

        assert!(doc.get_element_by_id("a&b").is_some());
        let cover = doc
            .get_element_by_id("g1")
            .and_then(|group| doc.children(group).first().copied())
            .and_then(|link| doc.element(link));
        assert!(cover.is_some_and(|element| element.has_class("obscures")));
    }

    #[test]
    fn keeps_namespace_prefixes_on_tags_and_attributes() {
        let source = r##"<svg:svg xmlns:svg="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"><svg:g id="g1"><svg:a xlink:href="#g1"/></svg:g></svg:svg>"##;
        let doc = parse(source);

        let group = doc.get_element_by_id("g1").and_then(|id| doc.element(id));
        assert!(group.is_some_and(|element| element.role == ElementRole::Group));
        assert_eq!(serialize(&doc), source);
    }

    #[test]
    fn reads_inline_display_none_as_hidden() {
        let doc = parse(r#"<svg><a id="x" style="fill: red; display : none"/><a id="y" style="display:none;display:inline"/></svg>"#);
        let hidden = doc.get_element_by_id("x").is_some_and(|id| doc.is_hidden(id));
        let shown = doc.get_element_by_id("y").is_some_and(|id| doc.is_hidden(id));
        assert!(hidden);
        assert!(!shown);
    }

    #[test]
    fn rejects_malformed_markup() {
        let cases = [
            "<svg><g></svg>",
            "<svg></svg></g>",
            "<svg><g>",
            "<svg><g id=bare></g></svg>",
            "<svg><![CDATA[x</svg>",
            "",
        ];

        for input in cases {
            match SvgParser.parse(input) {
                Err(error) => assert_eq!(error.code, "svg.parse.malformed", "input: {input}"),
                Ok(_) => panic!("accepted malformed input: {input}"),
            }
        }
    }

    #[test]
    fn cdata_content_is_escaped_on_output() {
        let doc = parse("<svg><style><![CDATA[a > b { fill: red }]]></style></svg>");
        let markup = serialize(&doc);
        assert_eq!(markup, "<svg><style>a &gt; b { fill: red }</style></svg>");
        assert_eq!(parse(&markup), doc);
    }

    #[test]
    fn duplicate_ids_surface_dom_error() {
        let result = SvgParser.parse(r#"<svg><g id="a"/><g id="a"/></svg>"#);
        assert!(matches!(result, Err(error) if error.code == "dom.duplicate_id"));
    }

    #[test]
    fn serializes_unmodified_tree_stably() {
        let source = r#"<svg width="10"><g id="g1"><text>Label &amp; more</text><a class="obscures" title="say &quot;hi&quot; &lt;now&gt;"/></g></svg>"#;
        let doc = parse(source);
        assert_eq!(serialize(&doc), source);
        assert_eq!(parse(&serialize(&doc)), doc);
    }

    #[test]
    fn serializes_hidden_elements_with_display_none() {
        let mut doc = parse(r#"<svg><a id="plain"/><a id="styled" style="fill:red"/></svg>"#);
        for id in ["plain", "styled"] {
            if let Some(node) = doc.get_element_by_id(id) {
                doc.set_display(node, Display::Hidden);
            }
        }

        assert_eq!(
            serialize(&doc),
            r#"<svg><a id="plain" style="display:none"/><a id="styled" style="fill:red;display:none"/></svg>"#
        );
        assert_eq!(serialize(&parse(&serialize(&doc))), serialize(&doc));
    }

    #[test]
    fn style_detection_ignores_other_properties() {
        assert!(style_hides("display:none"));
        assert!(style_hides(" DISPLAY : None ;"));
        assert!(!style_hides("visibility:hidden"));
        assert!(!style_hides(""));
    }
}
