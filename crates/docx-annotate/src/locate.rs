//! Byte spans of body-level paragraphs in `word/document.xml`

use document_extract::package::WordTags;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::AnnotateError;

/// Where one body paragraph lives in the document text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphSpan {
    Open {
        /// Offset of `<w:p`
        start: usize,
        /// First offset after the start tag, or after a leading `w:pPr`
        anchor: usize,
        /// Offset of `</w:p>`
        close: usize,
    },
    /// `<w:p/>` occupying `start..end`
    SelfClosing { start: usize, end: usize },
}

/// Locate every direct `w:p` child of `w:body`, in document order.
///
/// The returned positions line up with the paragraph ordinals of the
/// extracted document model, empty paragraphs included.
pub fn body_paragraphs(xml: &str, tags: &WordTags) -> Result<Vec<ParagraphSpan>, AnnotateError> {
    let mut reader = Reader::from_str(xml);
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut body_depth: Option<usize> = None;
    // (start, anchor, paragraph depth) of the paragraph being read
    let mut open: Option<(usize, usize, usize)> = None;

    loop {
        let before = reader.buffer_position() as usize;
        let event = reader.read_event()?;
        let after = reader.buffer_position() as usize;

        match event {
            Event::Start(e) => {
                depth += 1;
                let name = e.name();
                let name = name.as_ref();
                match body_depth {
                    None if name == tags.body.as_slice() => body_depth = Some(depth),
                    Some(b) if depth == b + 1 && name == tags.p.as_slice() => {
                        open = Some((before, after, depth));
                    }
                    _ => {}
                }
            }
            Event::Empty(e) => {
                let name = e.name();
                let name = name.as_ref();
                match (body_depth, open.as_mut()) {
                    (None, _) if name == tags.body.as_slice() => {
                        // `<w:body/>` holds nothing
                        return Ok(spans);
                    }
                    (Some(b), None) if depth == b && name == tags.p.as_slice() => {
                        spans.push(ParagraphSpan::SelfClosing {
                            start: before,
                            end: after,
                        });
                    }
                    (_, Some((_, anchor, p_depth)))
                        if depth == *p_depth && name == tags.p_pr.as_slice() =>
                    {
                        *anchor = after;
                    }
                    _ => {}
                }
            }
            Event::End(e) => {
                let name = e.name();
                let name = name.as_ref();
                if let Some((start, anchor, p_depth)) = open {
                    if depth == p_depth && name == tags.p.as_slice() {
                        spans.push(ParagraphSpan::Open {
                            start,
                            anchor,
                            close: before,
                        });
                        open = None;
                    } else if depth == p_depth + 1 && name == tags.p_pr.as_slice() {
                        open = Some((start, after, p_depth));
                    }
                }
                if body_depth == Some(depth) {
                    return Ok(spans);
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if body_depth.is_some() {
        Ok(spans)
    } else {
        Err(AnnotateError::MissingBody)
    }
}
