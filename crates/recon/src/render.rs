//! Format-preserving catalog emission.
//!
//! Entities are written by hand in the catalog convention: one tab before
//! the entity tag, two before each child, children grouped by kind in a
//! fixed order regardless of their order in memory. Attribute order is
//! kept as stored.

use crate::catalog::{Attributes, Child, ChildKind, Entity};

/// Emission order after the text children.
const ELEMENT_ORDER: [ChildKind; 7] = [
    ChildKind::Info,
    ChildKind::Rom,
    ChildKind::Sample,
    ChildKind::Sound,
    ChildKind::Video,
    ChildKind::Input,
    ChildKind::Driver,
];

/// Render one entity block, trailing newline included.
pub fn render_entity(entity: &Entity) -> String {
    let mut out = String::with_capacity(64 * (entity.children.len() + 2));

    out.push('\t');
    open_tag(&mut out, &entity.tag, &entity.attrs);
    out.push_str(">\n");

    for child in entity.children.iter().filter(|c| c.kind.is_text()) {
        text_element(&mut out, child);
    }
    for kind in ELEMENT_ORDER {
        for child in entity.of_kind(kind) {
            out.push_str("\t\t");
            open_tag(&mut out, kind.tag(), &child.attrs);
            out.push_str("/>\n");
        }
    }

    out.push_str("\t</");
    out.push_str(&entity.tag);
    out.push_str(">\n");
    out
}

/// Render a whole catalog: `header`, every entity block in order, then the
/// closing tag of `root`.
pub fn render_catalog(header: &str, root: &str, entities: &[Entity]) -> String {
    let mut out = String::with_capacity(header.len() + entities.len() * 512);
    out.push_str(header);
    for entity in entities {
        out.push_str(&render_entity(entity));
    }
    out.push_str("</");
    out.push_str(root);
    out.push_str(">\n");
    out
}

fn open_tag(out: &mut String, tag: &str, attrs: &Attributes) {
    out.push('<');
    out.push_str(tag);
    for (name, value) in attrs.iter() {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(value);
        out.push('"');
    }
}

fn text_element(out: &mut String, child: &Child) {
    let tag = child.kind.tag();
    out.push_str("\t\t<");
    out.push_str(tag);
    out.push('>');
    out.push_str(child.text.as_deref().unwrap_or(""));
    out.push_str("</");
    out.push_str(tag);
    out.push_str(">\n");
}
