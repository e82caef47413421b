//! Section header and footer text
//!
//! Each `w:sectPr` names its header and footer parts through `r:id`
//! relationships. A section without a primary reference continues the
//! previous section's. Only the first paragraph of each part is kept, and
//! only when it is not blank.

use std::collections::HashMap;
use std::io::{Read, Seek};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;
use zip::ZipArchive;

use crate::docx::parse_story_xml;
use crate::error::ExtractError;
use crate::package::{
    attr_value, namespace_prefix, read_part, relationship_targets, resolve_target, WordTags,
    DOCUMENT_RELS_PART, R_NS,
};
use crate::styles::StyleSheet;

/// Relationship ids of one section's primary header and footer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionRefs {
    pub header: Option<String>,
    pub footer: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionTexts {
    pub headers: Vec<String>,
    pub footers: Vec<String>,
}

fn is_primary(e: &BytesStart, tags: &WordTags) -> Result<bool, ExtractError> {
    Ok(matches!(
        attr_value(e, &tags.type_attr)?.as_deref(),
        None | Some("default")
    ))
}

/// Section references of `word/document.xml` in document order, with
/// unset references inherited from the previous section
pub fn section_refs(xml: &str) -> Result<Vec<SectionRefs>, ExtractError> {
    let tags = WordTags::detect(xml)?;
    let r_id = match namespace_prefix(xml, R_NS)? {
        Some(prefix) if !prefix.is_empty() => format!("{}:id", prefix).into_bytes(),
        _ => b"r:id".to_vec(),
    };

    let mut reader = Reader::from_str(xml);
    let mut sections: Vec<SectionRefs> = Vec::new();
    let mut current: Option<SectionRefs> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == tags.sect_pr.as_slice() => {
                current = Some(SectionRefs::default());
            }
            Event::Empty(e) if e.name().as_ref() == tags.sect_pr.as_slice() => {
                sections.push(SectionRefs::default());
            }
            Event::Start(e) | Event::Empty(e) => {
                let Some(section) = current.as_mut() else {
                    continue;
                };
                let name = e.name();
                let slot = if name.as_ref() == tags.header_reference.as_slice() {
                    &mut section.header
                } else if name.as_ref() == tags.footer_reference.as_slice() {
                    &mut section.footer
                } else {
                    continue;
                };
                if slot.is_none() && is_primary(&e, &tags)? {
                    *slot = attr_value(&e, &r_id)?;
                }
            }
            Event::End(e) if e.name().as_ref() == tags.sect_pr.as_slice() => {
                if let Some(section) = current.take() {
                    sections.push(section);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let mut previous = SectionRefs::default();
    for section in &mut sections {
        if section.header.is_none() {
            section.header = previous.header.clone();
        }
        if section.footer.is_none() {
            section.footer = previous.footer.clone();
        }
        previous = section.clone();
    }
    Ok(sections)
}

fn first_line<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    cache: &mut HashMap<String, Option<String>>,
    part: &str,
    styles: &StyleSheet,
) -> Result<Option<String>, ExtractError> {
    if let Some(text) = cache.get(part) {
        return Ok(text.clone());
    }
    let text = match read_part(archive, part)? {
        Some(xml) => parse_story_xml(&xml, styles)?
            .into_iter()
            .next()
            .filter(|p| p.index == 0)
            .map(|p| p.text),
        None => {
            debug!(part, "referenced header or footer part is missing");
            None
        }
    };
    cache.insert(part.to_string(), text.clone());
    Ok(text)
}

/// Header and footer lines of every section of the document
pub fn section_texts<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    document_xml: &str,
    styles: &StyleSheet,
) -> Result<SectionTexts, ExtractError> {
    let sections = section_refs(document_xml)?;
    let targets = match read_part(archive, DOCUMENT_RELS_PART)? {
        Some(xml) => relationship_targets(&xml)?,
        None => HashMap::new(),
    };

    let mut cache = HashMap::new();
    let mut texts = SectionTexts::default();
    for section in &sections {
        for (id, out) in [
            (&section.header, &mut texts.headers),
            (&section.footer, &mut texts.footers),
        ] {
            let Some(target) = id.as_ref().and_then(|id| targets.get(id)) else {
                continue;
            };
            let part = resolve_target("word", target);
            if let Some(text) = first_line(archive, &mut cache, &part, styles)? {
                out.push(text);
            }
        }
    }
    Ok(texts)
}
