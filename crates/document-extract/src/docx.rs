//! Word (.docx) extraction
//!
//! Walks the direct children of `w:body` in document order. Every body-level
//! paragraph advances the paragraph ordinal, including empty ones that are
//! not returned, so that the ordinal matches the position the annotator sees
//! when it counts body paragraphs. Tables record the ordinal of the last
//! paragraph seen before them.
//!
//! Header and footer parts share the same paragraph model, so the walker is
//! parameterized by the container element it descends into.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use shared_types::{DocumentModel, Paragraph, Table, TablePositions, NO_PRECEDING_PARAGRAPH};
use tracing::debug;

use crate::error::ExtractError;
use crate::package::{attr_value, open_package, read_part, WordTags, DOCUMENT_PART, STYLES_PART};
use crate::sections::section_texts;
use crate::styles::{heading_level, StyleSheet};

/// Extract paragraphs and tables from `.docx` bytes
pub fn extract_docx(bytes: &[u8]) -> Result<DocumentModel, ExtractError> {
    let mut archive = open_package(bytes)?;
    let document_xml = read_part(&mut archive, DOCUMENT_PART)?
        .ok_or_else(|| ExtractError::MissingPart(DOCUMENT_PART.to_string()))?;
    let styles = match read_part(&mut archive, STYLES_PART)? {
        Some(xml) => StyleSheet::parse(&xml)?,
        None => StyleSheet::default(),
    };

    let mut model = parse_document_xml(&document_xml, &styles)?;
    let texts = section_texts(&mut archive, &document_xml, &styles)?;
    if let DocumentModel::Structured {
        paragraphs,
        tables,
        headers,
        footers,
        ..
    } = &mut model
    {
        *headers = texts.headers;
        *footers = texts.footers;
        debug!(
            paragraphs = paragraphs.len(),
            tables = tables.len(),
            headers = headers.len(),
            footers = footers.len(),
            "extracted docx body"
        );
    }
    Ok(model)
}

/// Parse a `word/document.xml` string into a structured model
pub fn parse_document_xml(xml: &str, styles: &StyleSheet) -> Result<DocumentModel, ExtractError> {
    let tags = WordTags::detect(xml)?;
    walk(xml, &tags, &tags.body, styles)
}

/// Paragraphs directly inside the root of a header or footer part.
///
/// Indices count every paragraph of the part, blank ones included.
pub fn parse_story_xml(xml: &str, styles: &StyleSheet) -> Result<Vec<Paragraph>, ExtractError> {
    let tags = WordTags::detect(xml)?;
    let root = if root_name(xml)?.as_deref() == Some(tags.ftr.as_slice()) {
        &tags.ftr
    } else {
        &tags.hdr
    };
    match walk(xml, &tags, root, styles) {
        Ok(model) => Ok(model.paragraphs().to_vec()),
        Err(ExtractError::MissingBody) => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

fn root_name(xml: &str) -> Result<Option<Vec<u8>>, ExtractError> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => return Ok(Some(e.name().as_ref().to_vec())),
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

fn walk(
    xml: &str,
    tags: &WordTags,
    container: &[u8],
    styles: &StyleSheet,
) -> Result<DocumentModel, ExtractError> {
    let mut walker = BodyWalker::new(tags, container, styles);
    let mut reader = Reader::from_str(xml);

    loop {
        match reader.read_event()? {
            Event::Start(e) => walker.open(&e, false)?,
            Event::Empty(e) => walker.open(&e, true)?,
            Event::End(e) => walker.close(e.name().as_ref()),
            Event::Text(t) => {
                if walker.wants_text() {
                    let text = t.unescape()?;
                    walker.push_text(&text);
                }
            }
            Event::CData(t) => {
                if walker.wants_text() {
                    walker.push_text(&String::from_utf8_lossy(&t));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    walker.finish()
}

struct CellBuilder {
    paragraphs: Vec<String>,
    current: Option<String>,
}

struct TableBuilder {
    depth: usize,
    rows: Vec<Vec<String>>,
    row: Option<Vec<String>>,
    cell: Option<CellBuilder>,
}

enum Block {
    Paragraph {
        ordinal: usize,
        text: String,
        style_id: Option<String>,
    },
    Table(TableBuilder),
}

struct BodyWalker<'a> {
    tags: &'a WordTags,
    container: &'a [u8],
    styles: &'a StyleSheet,
    depth: usize,
    body_depth: Option<usize>,
    skip_depth: Option<usize>,
    in_text: bool,
    block: Option<Block>,
    last_paragraph: i64,
    paragraphs: Vec<Paragraph>,
    tables: Vec<Table>,
    table_positions: TablePositions,
}

impl<'a> BodyWalker<'a> {
    fn new(tags: &'a WordTags, container: &'a [u8], styles: &'a StyleSheet) -> Self {
        Self {
            tags,
            container,
            styles,
            depth: 0,
            body_depth: None,
            skip_depth: None,
            in_text: false,
            block: None,
            last_paragraph: NO_PRECEDING_PARAGRAPH,
            paragraphs: Vec::new(),
            tables: Vec::new(),
            table_positions: TablePositions::new(),
        }
    }

    fn wants_text(&self) -> bool {
        self.in_text && self.skip_depth.is_none()
    }

    fn open(&mut self, e: &BytesStart, empty: bool) -> Result<(), ExtractError> {
        self.depth += 1;
        let depth = self.depth;
        let name = e.name();
        let name = name.as_ref();

        if self.skip_depth.is_none() {
            self.enter(e, name, depth, empty)?;
        }

        if empty {
            self.close(name);
        }
        Ok(())
    }

    fn enter(
        &mut self,
        e: &BytesStart,
        name: &[u8],
        depth: usize,
        empty: bool,
    ) -> Result<(), ExtractError> {
        let tags = self.tags;

        if tags.is_skipped(name) {
            if !empty {
                self.skip_depth = Some(depth);
            }
            return Ok(());
        }

        let body_depth = match self.body_depth {
            Some(d) => d,
            None => {
                if name == self.container {
                    self.body_depth = Some(depth);
                }
                return Ok(());
            }
        };

        if depth == body_depth + 1 {
            if name == tags.p.as_slice() {
                self.last_paragraph += 1;
                self.block = Some(Block::Paragraph {
                    ordinal: self.last_paragraph as usize,
                    text: String::new(),
                    style_id: None,
                });
            } else if name == tags.tbl.as_slice() {
                self.table_positions
                    .insert(self.tables.len(), self.last_paragraph);
                self.block = Some(Block::Table(TableBuilder {
                    depth,
                    rows: Vec::new(),
                    row: None,
                    cell: None,
                }));
            }
            return Ok(());
        }

        let is_text = name == tags.t.as_slice();
        let control = if name == tags.tab.as_slice() {
            Some('\t')
        } else if name == tags.br.as_slice() || name == tags.cr.as_slice() {
            Some('\n')
        } else {
            None
        };

        match self.block.as_mut() {
            Some(Block::Paragraph { text, style_id, .. }) => {
                if name == tags.p_style.as_slice() {
                    *style_id = attr_value(e, &tags.val_attr)?;
                } else if let Some(c) = control {
                    text.push(c);
                }
            }
            Some(Block::Table(table)) => {
                if name == tags.tr.as_slice() && depth == table.depth + 1 {
                    table.row = Some(Vec::new());
                } else if name == tags.tc.as_slice() && depth == table.depth + 2 {
                    table.cell = Some(CellBuilder {
                        paragraphs: Vec::new(),
                        current: None,
                    });
                } else if let Some(cell) = table.cell.as_mut() {
                    if name == tags.p.as_slice() {
                        cell.current = Some(String::new());
                    } else if let (Some(c), Some(current)) = (control, cell.current.as_mut()) {
                        current.push(c);
                    }
                }
            }
            None => {}
        }

        if is_text && !empty {
            self.in_text = true;
        }
        Ok(())
    }

    fn push_text(&mut self, s: &str) {
        match self.block.as_mut() {
            Some(Block::Paragraph { text, .. }) => text.push_str(s),
            Some(Block::Table(table)) => {
                if let Some(current) = table.cell.as_mut().and_then(|c| c.current.as_mut()) {
                    current.push_str(s);
                }
            }
            None => {}
        }
    }

    fn close(&mut self, name: &[u8]) {
        let depth = self.depth;
        self.depth = self.depth.saturating_sub(1);

        match self.skip_depth {
            Some(d) if d == depth => {
                self.skip_depth = None;
                return;
            }
            Some(_) => return,
            None => {}
        }

        let tags = self.tags;
        if name == tags.t.as_slice() {
            self.in_text = false;
            return;
        }

        let Some(body_depth) = self.body_depth else {
            return;
        };

        if depth == body_depth + 1 {
            match self.block.take() {
                Some(Block::Paragraph {
                    ordinal,
                    text,
                    style_id,
                }) => {
                    let text = text.trim();
                    if !text.is_empty() {
                        let style_name = self.styles.display_name(style_id.as_deref());
                        self.paragraphs.push(Paragraph {
                            index: ordinal,
                            text: text.to_string(),
                            heading_level: heading_level(&style_name),
                            style_name,
                        });
                    }
                }
                Some(Block::Table(table)) => {
                    self.tables.push(Table {
                        index: self.tables.len(),
                        rows: table.rows,
                    });
                }
                None => {}
            }
            return;
        }

        if let Some(Block::Table(table)) = self.block.as_mut() {
            if name == tags.tc.as_slice() && depth == table.depth + 2 {
                if let (Some(cell), Some(row)) = (table.cell.take(), table.row.as_mut()) {
                    row.push(cell.paragraphs.join("\n").trim().to_string());
                }
            } else if name == tags.tr.as_slice() && depth == table.depth + 1 {
                if let Some(row) = table.row.take() {
                    table.rows.push(row);
                }
            } else if name == tags.p.as_slice() {
                if let Some(cell) = table.cell.as_mut() {
                    if let Some(text) = cell.current.take() {
                        cell.paragraphs.push(text);
                    }
                }
            }
        }
    }

    fn finish(self) -> Result<DocumentModel, ExtractError> {
        if self.body_depth.is_none() {
            return Err(ExtractError::MissingBody);
        }
        Ok(DocumentModel::Structured {
            paragraphs: self.paragraphs,
            tables: self.tables,
            table_positions: self.table_positions,
            headers: Vec::new(),
            footers: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn body(inner: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}<w:sectPr/></w:body></w:document>"#,
            inner
        )
    }

    fn parse(inner: &str) -> DocumentModel {
        parse_document_xml(&body(inner), &StyleSheet::default()).unwrap()
    }

    #[test]
    fn test_empty_paragraphs_keep_their_ordinal_slot() {
        let model = parse(
            r#"<w:p><w:r><w:t>第一段</w:t></w:r></w:p><w:p/><w:p><w:r><w:t xml:space="preserve"> 第三段 </w:t></w:r></w:p>"#,
        );
        let indices: Vec<_> = model.paragraphs().iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![0, 2]);
        assert_eq!(model.paragraphs()[1].text, "第三段");
    }

    #[test]
    fn test_table_position_uses_unfiltered_ordinal() {
        let model = parse(
            r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>A</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
               <w:p><w:r><w:t>表前段落</w:t></w:r></w:p><w:p/>
               <w:tbl><w:tr><w:tc><w:p><w:r><w:t>B</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
        );
        match &model {
            DocumentModel::Structured {
                table_positions, ..
            } => {
                assert_eq!(table_positions.get(&0), Some(&-1));
                assert_eq!(table_positions.get(&1), Some(&1));
            }
            _ => panic!("expected structured model"),
        }
    }

    #[test]
    fn test_table_paragraphs_are_not_body_paragraphs() {
        let model = parse(
            r#"<w:p><w:r><w:t>标题</w:t></w:r></w:p>
               <w:tbl><w:tr><w:tc><w:p><w:r><w:t>用地</w:t></w:r></w:p><w:p><w:r><w:t>名称</w:t></w:r></w:p></w:tc>
               <w:tc><w:p><w:r><w:t>1,234.5</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
               <w:p><w:r><w:t>正文</w:t></w:r></w:p>"#,
        );
        let indices: Vec<_> = model.paragraphs().iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![0, 1]);
        assert_eq!(
            model.tables()[0].rows,
            vec![vec!["用地\n名称".to_string(), "1,234.5".to_string()]]
        );
    }

    #[test]
    fn test_runs_tabs_and_breaks_join_into_text() {
        let model = parse(
            r#"<w:p><w:pPr><w:pStyle w:val="2"/></w:pPr><w:r><w:t>规划</w:t></w:r><w:r><w:tab/><w:t>期限</w:t><w:br/><w:t>2035</w:t></w:r></w:p>"#,
        );
        let para = &model.paragraphs()[0];
        assert_eq!(para.text, "规划\t期限\n2035");
        assert_eq!(para.style_name, "2");
        assert_eq!(para.heading_level, 1);
    }

    #[test]
    fn test_drawing_text_is_ignored() {
        let model = parse(
            r#"<w:p><w:r><w:t>正文</w:t></w:r><w:r><w:drawing><w:txbxContent><w:p><w:r><w:t>文本框</w:t></w:r></w:p></w:txbxContent></w:drawing></w:r></w:p><w:p><w:r><w:t>下一段</w:t></w:r></w:p>"#,
        );
        assert_eq!(model.paragraphs()[0].text, "正文");
        assert_eq!(model.paragraphs()[1].index, 1);
    }

    #[test]
    fn test_story_paragraphs_keep_blank_slots() {
        let xml = r#"<w:ftr xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:p/><w:p><w:r><w:t>第 1 页</w:t></w:r></w:p></w:ftr>"#;
        let paragraphs = parse_story_xml(xml, &StyleSheet::default()).unwrap();
        assert_eq!(paragraphs.len(), 1);
        assert_eq!(paragraphs[0].index, 1);
        assert_eq!(paragraphs[0].text, "第 1 页");
    }

    #[test]
    fn test_missing_body_is_an_error() {
        let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"></w:document>"#;
        let err = parse_document_xml(xml, &StyleSheet::default()).unwrap_err();
        assert!(matches!(err, ExtractError::MissingBody));
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        let xml = r#"<w:document xmlns:w="x"><w:body><w:p></w:body></w:document>"#;
        assert!(parse_document_xml(xml, &StyleSheet::default()).is_err());
    }
}
