//! XML write-side node model.
//!
//! Interchange documents are assembled from these nodes and serialized with
//! a deterministic layout: attributes appear in the order they were added
//! and indentation is emitted through explicit [`Node::Cr`] nodes (one
//! newline plus two spaces per nesting level), so repeated runs over
//! unchanged input are byte-identical and translators see only meaningful
//! diffs.

#[derive(Debug, Clone)]
pub enum Node {
    Tag(Tag),
    Text(Text),
    Declaration(Declaration),
    /// A formatting line break followed by `2 * level` spaces.
    Cr(usize),
}

#[derive(Debug, Clone)]
pub struct Tag {
    pub name: &'static str,
    pub attrs: Vec<(&'static str, String)>,
    pub children: Vec<Node>,
}

impl Tag {
    pub fn new(name: &'static str) -> Self {
        Tag {
            name,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &'static str, unescaped_value: impl Into<String>) -> Self {
        self.attrs.push((name, escape_xml(&unescaped_value.into())));
        self
    }

    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn text_child(self, unescaped_value: impl Into<String>) -> Self {
        self.child(Node::Text(Text::new(unescaped_value)))
    }

    pub fn into_node(self) -> Node {
        Node::Tag(self)
    }
}

#[derive(Debug, Clone)]
pub struct Text {
    pub value: String,
}

impl Text {
    pub fn new(unescaped_value: impl Into<String>) -> Self {
        Text {
            value: escape_xml(&unescaped_value.into()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Declaration {
    pub attrs: Vec<(&'static str, String)>,
}

impl Declaration {
    /// The standard `<?xml version="1.0" encoding="utf-8"?>` header.
    pub fn standard() -> Self {
        Declaration {
            attrs: vec![("version", "1.0".into()), ("encoding", "utf-8".into())],
        }
    }
}

pub fn serialize(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        serialize_node(node, &mut out);
    }
    out
}

fn serialize_node(node: &Node, out: &mut String) {
    match node {
        Node::Tag(tag) => {
            out.push('<');
            out.push_str(tag.name);
            push_attrs(&tag.attrs, out);
            if tag.children.is_empty() {
                out.push_str("/>");
            } else {
                out.push('>');
                for child in &tag.children {
                    serialize_node(child, out);
                }
                out.push_str("</");
                out.push_str(tag.name);
                out.push('>');
            }
        }
        Node::Text(text) => out.push_str(&text.value),
        Node::Declaration(decl) => {
            out.push_str("<?xml");
            push_attrs(&decl.attrs, out);
            out.push_str("?>");
        }
        Node::Cr(level) => {
            out.push('\n');
            for _ in 0..*level {
                out.push_str("  ");
            }
        }
    }
}

fn push_attrs(attrs: &[(&'static str, String)], out: &mut String) {
    for (name, value) in attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(value);
        out.push('"');
    }
}

pub fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
