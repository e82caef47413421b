//! The comment store, `word/comments.xml`

use document_extract::package::{attr_value, WordTags, W_NS};
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::AnnotateError;
use crate::manifest::insert_before_root_end;

/// One comment record to append
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRecord {
    pub id: u64,
    pub author: String,
    pub initials: String,
    /// `%Y-%m-%dT%H:%M:%SZ`
    pub date: String,
    pub text: String,
}

impl CommentRecord {
    fn to_xml(&self, tags: &WordTags) -> String {
        let w = &tags.prefix;
        format!(
            concat!(
                r#"<{w}:comment {w}:id="{id}" {w}:author="{author}" {w}:date="{date}" {w}:initials="{initials}">"#,
                r#"<{w}:p><{w}:r><{w}:t xml:space="preserve">{text}</{w}:t></{w}:r></{w}:p>"#,
                "</{w}:comment>"
            ),
            w = w,
            id = self.id,
            author = escape(self.author.as_str()),
            date = escape(self.date.as_str()),
            initials = escape(self.initials.as_str()),
            text = escape(self.text.as_str()),
        )
    }
}

/// Existing comment store, or an empty one
#[derive(Debug, Clone)]
pub struct CommentStore {
    xml: String,
    tags: WordTags,
    next_id: u64,
}

impl CommentStore {
    pub fn empty() -> Self {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:comments xmlns:w="{}"></w:comments>"#,
            W_NS
        );
        Self {
            xml,
            tags: WordTags::new("w"),
            next_id: 0,
        }
    }

    /// Read an existing store; ids that are not integers are ignored
    pub fn parse(xml: &str) -> Result<Self, AnnotateError> {
        let tags = WordTags::detect(xml)?;
        let mut reader = Reader::from_str(xml);
        let mut max_id: Option<u64> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) | Event::Empty(e) if e.name().as_ref() == tags.comment.as_slice() => {
                    let id = attr_value(&e, &tags.id_attr)?.and_then(|v| v.trim().parse::<u64>().ok());
                    if let Some(id) = id {
                        max_id = Some(max_id.map_or(id, |m| m.max(id)));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(Self {
            xml: xml.to_string(),
            tags,
            next_id: max_id.map_or(0, |m| m + 1),
        })
    }

    /// Id the next appended comment will get
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Reserve the next id
    pub fn allocate(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Store text with `records` appended after the existing comments
    pub fn render(&self, records: &[CommentRecord]) -> Result<String, AnnotateError> {
        let appended: String = records.iter().map(|r| r.to_xml(&self.tags)).collect();
        insert_before_root_end(&self.xml, &appended)
    }
}
