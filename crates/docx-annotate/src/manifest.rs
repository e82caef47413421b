//! Package manifests: the document relationships and `[Content_Types].xml`

use document_extract::package::{attr_value, resolve_target};
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::AnnotateError;

pub const COMMENTS_PART: &str = "word/comments.xml";
pub const COMMENTS_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/comments";
pub const COMMENTS_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.comments+xml";

const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const COMMENTS_REL_ID: &str = "rIdComments";

/// Relationships part written when the package has none
pub fn empty_relationships() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{}"></Relationships>"#,
        RELATIONSHIPS_NS
    )
}

/// Insert `content` right before the closing tag of the root element.
///
/// A self-closing root is expanded into a start and end tag pair.
pub fn insert_before_root_end(xml: &str, content: &str) -> Result<String, AnnotateError> {
    let mut reader = Reader::from_str(xml);
    let mut depth = 0usize;

    loop {
        let before = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    let mut out = String::with_capacity(xml.len() + content.len());
                    out.push_str(&xml[..before]);
                    out.push_str(content);
                    out.push_str(&xml[before..]);
                    return Ok(out);
                }
            }
            Event::Empty(e) if depth == 0 => {
                let after = reader.buffer_position() as usize;
                let tag = xml[before..after].trim_end_matches('>').trim_end_matches('/');
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let mut out = String::with_capacity(xml.len() + content.len() + name.len() + 3);
                out.push_str(&xml[..before]);
                out.push_str(tag.trim_end());
                out.push('>');
                out.push_str(content);
                out.push_str(&format!("</{}>", name));
                out.push_str(&xml[after..]);
                return Ok(out);
            }
            Event::Eof => {
                return Err(AnnotateError::Unsupported(
                    "XML part has no root element".to_string(),
                ))
            }
            _ => {}
        }
    }
}

struct Relationship {
    kind: String,
    id: String,
    target: String,
}

fn relationships(xml: &str) -> Result<Vec<Relationship>, AnnotateError> {
    let mut reader = Reader::from_str(xml);
    let mut found = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                found.push(Relationship {
                    kind: attr_value(&e, b"Type")?.unwrap_or_default(),
                    id: attr_value(&e, b"Id")?.unwrap_or_default(),
                    target: attr_value(&e, b"Target")?.unwrap_or_default(),
                });
            }
            Event::Eof => return Ok(found),
            _ => {}
        }
    }
}

/// Package part the document's comments relationship points at, if any
pub fn comments_part(xml: &str) -> Result<Option<String>, AnnotateError> {
    Ok(relationships(xml)?
        .into_iter()
        .find(|rel| rel.kind == COMMENTS_REL_TYPE && !rel.target.is_empty())
        .map(|rel| resolve_target("word", &rel.target)))
}

/// Add the comments relationship unless one already exists.
///
/// Returns `None` when the part needs no change.
pub fn ensure_comments_relationship(xml: &str) -> Result<Option<String>, AnnotateError> {
    let existing = relationships(xml)?;
    if existing.iter().any(|rel| rel.kind == COMMENTS_REL_TYPE) {
        return Ok(None);
    }

    let taken = |id: &str| existing.iter().any(|rel| rel.id == id);
    let mut id = COMMENTS_REL_ID.to_string();
    let mut n = 1;
    while taken(&id) {
        id = format!("{}{}", COMMENTS_REL_ID, n);
        n += 1;
    }

    let element = format!(
        r#"<Relationship Id="{}" Type="{}" Target="comments.xml"/>"#,
        escape(id.as_str()),
        COMMENTS_REL_TYPE
    );
    insert_before_root_end(xml, &element).map(Some)
}

/// Add the content-type override for the comment store at `part` unless
/// present.
///
/// Returns `None` when the part needs no change.
pub fn ensure_comments_override(xml: &str, part: &str) -> Result<Option<String>, AnnotateError> {
    let part = part.trim_start_matches('/');
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Override" => {
                let name = attr_value(&e, b"PartName")?.unwrap_or_default();
                if name.trim_start_matches('/') == part {
                    return Ok(None);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let element = format!(
        r#"<Override PartName="/{}" ContentType="{}"/>"#,
        escape(part),
        COMMENTS_CONTENT_TYPE
    );
    insert_before_root_end(xml, &element).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

    #[test]
    fn test_insert_before_root_end() {
        let out = insert_before_root_end("<a><b/></a>", "<c/>").unwrap();
        assert_eq!(out, "<a><b/><c/></a>");
    }

    #[test]
    fn test_insert_expands_self_closing_root() {
        let out = insert_before_root_end(r#"<?xml version="1.0"?><a x="1" />"#, "<c/>").unwrap();
        assert_eq!(out, r#"<?xml version="1.0"?><a x="1"><c/></a>"#);
    }

    #[test]
    fn test_relationship_added_once() {
        let once = ensure_comments_relationship(RELS).unwrap().unwrap();
        assert!(once.contains(r#"<Relationship Id="rIdComments" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/comments" Target="comments.xml"/></Relationships>"#));
        assert_eq!(ensure_comments_relationship(&once).unwrap(), None);
    }

    #[test]
    fn test_relationship_id_is_unique() {
        let rels = RELS.replace("rId1", "rIdComments");
        let out = ensure_comments_relationship(&rels).unwrap().unwrap();
        assert!(out.contains(r#"Id="rIdComments1""#));
    }

    #[test]
    fn test_relationship_created_from_empty_part() {
        let out = ensure_comments_relationship(&empty_relationships())
            .unwrap()
            .unwrap();
        assert_eq!(relationships(&out).unwrap().len(), 1);
    }

    #[test]
    fn test_override_added_once() {
        let types = r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#;
        let once = ensure_comments_override(types, COMMENTS_PART).unwrap().unwrap();
        assert!(once.ends_with(r#"<Override PartName="/word/comments.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.comments+xml"/></Types>"#));
        assert_eq!(ensure_comments_override(&once, COMMENTS_PART).unwrap(), None);
    }

    #[test]
    fn test_override_without_leading_slash_counts() {
        let types = r#"<Types><Override PartName="word/comments.xml" ContentType="x"/></Types>"#;
        assert_eq!(ensure_comments_override(types, COMMENTS_PART).unwrap(), None);
    }

    #[test]
    fn test_existing_comments_target_is_resolved() {
        let rels = RELS.replace(
            "</Relationships>",
            r#"<Relationship Id="rId9" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/comments" Target="review/notes.xml"/></Relationships>"#,
        );
        assert_eq!(comments_part(&rels).unwrap().as_deref(), Some("word/review/notes.xml"));
        assert_eq!(ensure_comments_relationship(&rels).unwrap(), None);
        assert_eq!(comments_part(RELS).unwrap(), None);
    }

    #[test]
    fn test_override_for_custom_part() {
        let types = r#"<Types><Override PartName="/word/comments.xml" ContentType="x"/></Types>"#;
        let out = ensure_comments_override(types, "word/review/notes.xml").unwrap().unwrap();
        assert!(out.contains(r#"PartName="/word/review/notes.xml""#));
    }
}
