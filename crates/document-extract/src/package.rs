//! OOXML package access
//!
//! A `.docx` file is a zip archive of XML parts. The word-processing parts
//! normally bind the main namespace to the `w` prefix, but nothing requires
//! it, so element names are built from the prefix actually declared on the
//! root element.

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::ExtractError;

/// WordprocessingML main namespace
pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
/// Office document relationships namespace, used for `r:id` references
pub const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

pub const DOCUMENT_PART: &str = "word/document.xml";
pub const STYLES_PART: &str = "word/styles.xml";
pub const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

pub fn open_package(bytes: &[u8]) -> Result<ZipArchive<Cursor<&[u8]>>, ExtractError> {
    Ok(ZipArchive::new(Cursor::new(bytes))?)
}

/// Read a part as UTF-8 text, `None` when the archive has no such entry
pub fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>, ExtractError> {
    match archive.by_name(name) {
        Ok(mut file) => {
            let mut content = String::new();
            file.read_to_string(&mut content)?;
            Ok(Some(content))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Prefix bound to `namespace` on the root element, if any
pub fn namespace_prefix(xml: &str, namespace: &str) -> Result<Option<String>, ExtractError> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                for attr in e.attributes() {
                    let attr = attr?;
                    let key = attr.key.as_ref();
                    if let Some(prefix) = key.strip_prefix(b"xmlns:") {
                        if attr.unescape_value()? == namespace {
                            return Ok(Some(String::from_utf8_lossy(prefix).into_owned()));
                        }
                    }
                }
                return Ok(None);
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

/// Value of attribute `key` (qualified name) on an element
pub fn attr_value(element: &BytesStart, key: &[u8]) -> Result<Option<String>, ExtractError> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Relationship `Id` -> `Target` of a relationships part
pub fn relationship_targets(xml: &str) -> Result<HashMap<String, String>, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut targets = HashMap::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attr_value(&e, b"Id")?, attr_value(&e, b"Target")?) {
                    targets.insert(id, target);
                }
            }
            Event::Eof => return Ok(targets),
            _ => {}
        }
    }
}

/// Resolve a relationship `Target` against the directory of its source part
pub fn resolve_target(source_dir: &str, target: &str) -> String {
    let mut segments: Vec<&str> = if target.starts_with('/') {
        Vec::new()
    } else {
        source_dir.split('/').filter(|s| !s.is_empty()).collect()
    };
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// Qualified WordprocessingML element and attribute names for one prefix
#[derive(Debug, Clone)]
pub struct WordTags {
    pub prefix: String,
    pub body: Vec<u8>,
    pub hdr: Vec<u8>,
    pub ftr: Vec<u8>,
    pub sect_pr: Vec<u8>,
    pub header_reference: Vec<u8>,
    pub footer_reference: Vec<u8>,
    pub p: Vec<u8>,
    pub p_pr: Vec<u8>,
    pub p_style: Vec<u8>,
    pub tbl: Vec<u8>,
    pub tr: Vec<u8>,
    pub tc: Vec<u8>,
    pub t: Vec<u8>,
    pub tab: Vec<u8>,
    pub br: Vec<u8>,
    pub cr: Vec<u8>,
    pub comment: Vec<u8>,
    pub comments: Vec<u8>,
    pub style: Vec<u8>,
    pub name: Vec<u8>,
    pub id_attr: Vec<u8>,
    pub val_attr: Vec<u8>,
    pub type_attr: Vec<u8>,
    skipped: Vec<Vec<u8>>,
}

impl WordTags {
    pub fn new(prefix: &str) -> Self {
        let q = |local: &str| {
            if prefix.is_empty() {
                local.as_bytes().to_vec()
            } else {
                format!("{}:{}", prefix, local).into_bytes()
            }
        };
        Self {
            prefix: prefix.to_string(),
            body: q("body"),
            hdr: q("hdr"),
            ftr: q("ftr"),
            sect_pr: q("sectPr"),
            header_reference: q("headerReference"),
            footer_reference: q("footerReference"),
            p: q("p"),
            p_pr: q("pPr"),
            p_style: q("pStyle"),
            tbl: q("tbl"),
            tr: q("tr"),
            tc: q("tc"),
            t: q("t"),
            tab: q("tab"),
            br: q("br"),
            cr: q("cr"),
            comment: q("comment"),
            comments: q("comments"),
            style: q("style"),
            name: q("name"),
            id_attr: q("id"),
            val_attr: q("val"),
            type_attr: q("type"),
            skipped: vec![q("drawing"), q("pict"), q("object"), q("txbxContent")],
        }
    }

    /// Tags for the prefix declared in `xml`, defaulting to `w`
    pub fn detect(xml: &str) -> Result<Self, ExtractError> {
        let prefix = namespace_prefix(xml, W_NS)?.unwrap_or_else(|| "w".to_string());
        Ok(Self::new(&prefix))
    }

    /// Subtrees whose text is not part of the paragraph's own text
    pub fn is_skipped(&self, name: &[u8]) -> bool {
        self.skipped.iter().any(|s| s.as_slice() == name) || name.ends_with(b"AlternateContent")
    }
}
