//! Comment anchors spliced into the document text

use document_extract::package::WordTags;

use crate::locate::ParagraphSpan;

/// Replace `start..end` with `text`; insertions have `start == end`
#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
    start: usize,
    end: usize,
    /// Orders edits at the same offset: range starts before range ends
    rank: u8,
    text: String,
}

fn range_start(tags: &WordTags, id: u64) -> String {
    format!(r#"<{w}:commentRangeStart {w}:id="{id}"/>"#, w = tags.prefix, id = id)
}

fn range_end(tags: &WordTags, id: u64) -> String {
    format!(
        concat!(
            r#"<{w}:commentRangeEnd {w}:id="{id}"/>"#,
            r#"<{w}:r><{w}:rPr><{w}:rStyle {w}:val="CommentReference"/></{w}:rPr>"#,
            r#"<{w}:commentReference {w}:id="{id}"/></{w}:r>"#
        ),
        w = tags.prefix,
        id = id
    )
}

/// Collects the anchors of every comment, then rewrites the document once
pub struct AnchorPlan<'a> {
    xml: &'a str,
    tags: &'a WordTags,
    spans: &'a [ParagraphSpan],
    /// Comment ids per paragraph, in insertion order
    ids: Vec<Vec<u64>>,
}

impl<'a> AnchorPlan<'a> {
    pub fn new(xml: &'a str, tags: &'a WordTags, spans: &'a [ParagraphSpan]) -> Self {
        Self {
            xml,
            tags,
            spans,
            ids: vec![Vec::new(); spans.len()],
        }
    }

    /// Anchor comment `id` to the whole of paragraph `paragraph`
    pub fn anchor(&mut self, paragraph: usize, id: u64) {
        if let Some(ids) = self.ids.get_mut(paragraph) {
            ids.push(id);
        }
    }

    fn edits(&self) -> Vec<Edit> {
        let mut edits = Vec::new();
        for (span, ids) in self.spans.iter().zip(&self.ids) {
            if ids.is_empty() {
                continue;
            }
            let starts: String = ids.iter().map(|id| range_start(self.tags, *id)).collect();
            let ends: String = ids.iter().map(|id| range_end(self.tags, *id)).collect();

            match *span {
                ParagraphSpan::Open { anchor, close, .. } => {
                    edits.push(Edit {
                        start: anchor,
                        end: anchor,
                        rank: 0,
                        text: starts,
                    });
                    edits.push(Edit {
                        start: close,
                        end: close,
                        rank: 1,
                        text: ends,
                    });
                }
                ParagraphSpan::SelfClosing { start, end } => {
                    let tag = self.xml[start..end]
                        .trim_end_matches('>')
                        .trim_end_matches('/')
                        .trim_end();
                    edits.push(Edit {
                        start,
                        end,
                        rank: 0,
                        text: format!("{}>{}{}</{}:p>", tag, starts, ends, self.tags.prefix),
                    });
                }
            }
        }
        edits.sort_by_key(|e| (e.start, e.rank));
        edits
    }

    /// The document text with every planned anchor in place
    pub fn apply(&self) -> String {
        let edits = self.edits();
        let extra: usize = edits.iter().map(|e| e.text.len()).sum();
        let mut out = String::with_capacity(self.xml.len() + extra);
        let mut cursor = 0;
        for edit in edits {
            out.push_str(&self.xml[cursor..edit.start]);
            out.push_str(&edit.text);
            cursor = edit.end;
        }
        out.push_str(&self.xml[cursor..]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::body_paragraphs;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn body(xml: &str) -> String {
        format!(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            xml
        )
    }

    fn annotate(xml: &str, anchors: &[(usize, u64)]) -> String {
        let tags = WordTags::detect(xml).unwrap();
        let spans = body_paragraphs(xml, &tags).unwrap();
        let mut plan = AnchorPlan::new(xml, &tags, &spans);
        for (p, id) in anchors {
            plan.anchor(*p, *id);
        }
        plan.apply()
    }

    #[test]
    fn test_range_wraps_paragraph_after_properties() {
        let xml = body(r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:t>文</w:t></w:r></w:p>"#);
        let out = annotate(&xml, &[(0, 3)]);
        assert_eq!(
            out,
            body(concat!(
                r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:commentRangeStart w:id="3"/>"#,
                r#"<w:r><w:t>文</w:t></w:r><w:commentRangeEnd w:id="3"/>"#,
                r#"<w:r><w:rPr><w:rStyle w:val="CommentReference"/></w:rPr><w:commentReference w:id="3"/></w:r></w:p>"#
            ))
        );
    }

    #[test]
    fn test_self_closing_paragraph_is_expanded() {
        let xml = body(r#"<w:p w:rsidR="00AB" />"#);
        let out = annotate(&xml, &[(0, 0)]);
        assert!(out.contains(r#"<w:p w:rsidR="00AB"><w:commentRangeStart w:id="0"/><w:commentRangeEnd w:id="0"/>"#));
        assert!(out.contains("</w:r></w:p></w:body>"));
    }

    #[test]
    fn test_starts_precede_ends_in_empty_paragraph() {
        let xml = body("<w:p></w:p>");
        let out = annotate(&xml, &[(0, 1), (0, 2)]);
        let s1 = out.find(r#"commentRangeStart w:id="1""#).unwrap();
        let s2 = out.find(r#"commentRangeStart w:id="2""#).unwrap();
        let e1 = out.find(r#"commentRangeEnd w:id="1""#).unwrap();
        assert!(s1 < s2 && s2 < e1);
    }

    #[test]
    fn test_untouched_paragraphs_are_byte_identical() {
        let xml = body("<w:p><w:r><w:t>一</w:t></w:r></w:p><w:p><w:r><w:t>二</w:t></w:r></w:p>");
        let out = annotate(&xml, &[(1, 0)]);
        let second = xml.find("<w:p><w:r><w:t>二").unwrap();
        assert!(out.starts_with(&xml[..second]));
        assert_eq!(annotate(&xml, &[]), xml);
    }

    proptest! {
        #[test]
        fn prop_every_anchor_lands_once(targets in prop::collection::vec(0usize..4, 0..12)) {
            let xml = body("<w:p><w:r><w:t>一</w:t></w:r></w:p><w:p/><w:p><w:pPr/></w:p><w:p></w:p>");
            let anchors: Vec<(usize, u64)> = targets.iter().enumerate().map(|(i, p)| (*p, i as u64)).collect();
            let out = annotate(&xml, &anchors);

            let tags = WordTags::detect(&out).unwrap();
            prop_assert_eq!(body_paragraphs(&out, &tags).unwrap().len(), 4);
            for (_, id) in &anchors {
                let start = format!(r#"<w:commentRangeStart w:id="{}"/>"#, id);
                let end = format!(r#"<w:commentRangeEnd w:id="{}"/>"#, id);
                prop_assert_eq!(out.matches(start.as_str()).count(), 1);
                prop_assert_eq!(out.matches(end.as_str()).count(), 1);
                prop_assert!(out.find(start.as_str()) < out.find(end.as_str()));
            }
        }
    }
}
