//! Primary catalog reader.

use std::path::Path;

use gamelist_recon::{Catalog, ReconError};

use crate::text::{read_file_as_utf8, split_bom};
use crate::xml::parse_document;

#[derive(Debug)]
pub struct CatalogFile {
    pub catalog: Catalog,
    /// Entity children dropped because their element is not carried.
    pub skipped_children: usize,
}

/// Parse catalog text.
///
/// The header is everything before the first entity tag, minus the
/// indentation on that tag's own line, so regenerated entities can supply
/// their own.
pub fn parse_catalog(text: &str) -> Result<CatalogFile, ReconError> {
    let (bom, body) = split_bom(text);
    let doc = parse_document(body).map_err(ReconError::CatalogFormat)?;
    let Some(first) = doc.first_entity else {
        return Err(ReconError::CatalogFormat(format!(
            "no <game> or <machine> element under <{}>",
            doc.root
        )));
    };

    // Verbatim except the first entity's indentation, which `render_entity` emits itself.
    let header = format!("{bom}{}", body[..first].trim_end_matches([' ', '\t']));
    Ok(CatalogFile {
        catalog: Catalog {
            header,
            root: doc.root,
            entities: doc.entities,
        },
        skipped_children: doc.skipped_children,
    })
}

pub fn read_catalog(path: &Path) -> Result<CatalogFile, ReconError> {
    let text = read_file_as_utf8(path)?;
    parse_catalog(&text)
}
