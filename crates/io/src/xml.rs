//! Streaming walk over a catalog document.
//!
//! Collects the root element name, the byte offset where the first entity
//! starts and every `game`/`machine` directly under the root. Attribute
//! values and text content are kept exactly as written in the source.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use gamelist_recon::catalog::{Attributes, Child, ChildKind, Entity};

/// Element names accepted as entities.
pub const ENTITY_TAGS: [&str; 2] = ["game", "machine"];

#[derive(Debug, Default)]
pub struct Document {
    pub root: String,
    /// Offset of the first entity's `<`, if any entity exists.
    pub first_entity: Option<usize>,
    pub entities: Vec<Entity>,
    /// Direct entity children with an unsupported element name.
    pub skipped_children: usize,
}

pub fn parse_document(xml: &str) -> Result<Document, String> {
    let mut reader = Reader::from_str(xml);
    // Whitespace events keep buffer positions on tag boundaries.
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();

    let mut doc = Document::default();
    let mut depth = 0usize;
    let mut current: Option<Entity> = None;
    let mut text_child: Option<Child> = None;

    loop {
        let pos = reader.buffer_position() as usize;
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| format!("at byte {}: {e}", reader.error_position()))?
        {
            Event::Start(ref e) => {
                match depth {
                    0 => doc.root = tag_name(e),
                    1 => {
                        if let Some(entity) = open_entity(e, pos)? {
                            doc.first_entity.get_or_insert(pos);
                            current = Some(entity);
                        }
                    }
                    2 => {
                        if let Some(entity) = current.as_mut() {
                            match ChildKind::from_tag(&tag_name(e)) {
                                Some(kind) if kind.is_text() => {
                                    text_child = Some(Child {
                                        kind,
                                        attrs: attributes(e, pos)?,
                                        text: Some(String::new()),
                                    });
                                }
                                // Nested content of kept elements is not carried.
                                Some(kind) => entity.children.push(Child::element(kind, attributes(e, pos)?)),
                                None => doc.skipped_children += 1,
                            }
                        }
                    }
                    _ => {}
                }
                depth += 1;
            }
            Event::Empty(ref e) => match depth {
                0 => doc.root = tag_name(e),
                1 => {
                    if let Some(entity) = open_entity(e, pos)? {
                        doc.first_entity.get_or_insert(pos);
                        doc.entities.push(entity);
                    }
                }
                2 => {
                    if let Some(entity) = current.as_mut() {
                        match ChildKind::from_tag(&tag_name(e)) {
                            Some(kind) => entity.children.push(Child::element(kind, attributes(e, pos)?)),
                            None => doc.skipped_children += 1,
                        }
                    }
                }
                _ => {}
            },
            Event::Text(ref e) => push_text(&mut text_child, depth, &String::from_utf8_lossy(e.as_ref())),
            Event::GeneralRef(ref e) => {
                let name = String::from_utf8_lossy(e.as_ref());
                push_text(&mut text_child, depth, &format!("&{name};"));
            }
            Event::CData(ref e) => {
                let data = String::from_utf8_lossy(e.as_ref());
                push_text(&mut text_child, depth, &format!("<![CDATA[{data}]]>"));
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                match depth {
                    2 => {
                        if let (Some(child), Some(entity)) = (text_child.take(), current.as_mut()) {
                            entity.children.push(child);
                        }
                    }
                    1 => {
                        if let Some(entity) = current.take() {
                            doc.entities.push(entity);
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => {
                if depth > 0 {
                    return Err(format!("unexpected end of document inside <{}>", doc.root));
                }
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    if doc.root.is_empty() {
        return Err("no root element".to_string());
    }
    Ok(doc)
}

fn open_entity(e: &BytesStart, pos: usize) -> Result<Option<Entity>, String> {
    let tag = tag_name(e);
    if !ENTITY_TAGS.contains(&tag.as_str()) {
        return Ok(None);
    }
    let mut entity = Entity::new(tag);
    entity.attrs = attributes(e, pos)?;
    Ok(Some(entity))
}

fn push_text(target: &mut Option<Child>, depth: usize, raw: &str) {
    if depth != 3 {
        return;
    }
    if let Some(text) = target.as_mut().and_then(|c| c.text.as_mut()) {
        text.push_str(raw);
    }
}

fn tag_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

/// Attributes in source order, values still escaped. Malformed or
/// repeated attributes fail the whole document.
fn attributes(e: &BytesStart, pos: usize) -> Result<Attributes, String> {
    e.attributes()
        .map(|attr| {
            attr.map(|attr| {
                (
                    String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                    String::from_utf8_lossy(&attr.value).into_owned(),
                )
            })
            .map_err(|err| format!("at byte {pos}: <{}>: {err}", tag_name(e)))
        })
        .collect()
}
