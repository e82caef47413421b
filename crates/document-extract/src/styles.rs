//! Paragraph style names and heading levels

use std::collections::HashMap;

use lazy_static::lazy_static;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;

use crate::error::ExtractError;
use crate::package::{attr_value, WordTags};

/// Explicit style name -> heading level table (lowercased, trimmed)
pub const HEADING_STYLES: &[(&str, u8)] = &[
    ("heading 1", 1),
    ("heading 2", 2),
    ("heading 3", 3),
    ("heading 4", 4),
    ("heading 5", 5),
    ("heading 6", 6),
    ("标题 1", 1),
    ("标题 2", 2),
    ("标题 3", 3),
    ("标题1", 1),
    ("标题2", 2),
    ("标题3", 3),
];

lazy_static! {
    static ref DOTTED_LEVEL: Regex = Regex::new(r"^\d+(?:\.\d+)*$").unwrap();
}

/// Infer a heading level from a style name, 0 for body text.
///
/// Custom templates often name outline styles like `0-1`, `0-1.1`,
/// `0-1.1.1`: the part after the last hyphen is a dotted path whose depth is
/// the level.
pub fn heading_level(style_name: &str) -> u8 {
    let normalized = style_name.trim().to_lowercase();
    if let Some((_, level)) = HEADING_STYLES.iter().find(|(name, _)| *name == normalized) {
        return *level;
    }

    let suffix = match style_name.rsplit_once('-') {
        Some((_, tail)) => tail,
        None => style_name,
    };
    if DOTTED_LEVEL.is_match(suffix) {
        let depth = suffix.matches('.').count() + 1;
        return depth.min(u8::MAX as usize) as u8;
    }

    0
}

/// Style id -> display name mapping from `word/styles.xml`
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    names: HashMap<String, String>,
    default_paragraph: Option<String>,
}

impl StyleSheet {
    pub fn parse(xml: &str) -> Result<Self, ExtractError> {
        let tags = WordTags::detect(xml)?;
        let type_attr = format!("{}:type", tags.prefix).into_bytes();
        let style_id_attr = format!("{}:styleId", tags.prefix).into_bytes();
        let default_attr = format!("{}:default", tags.prefix).into_bytes();

        let mut sheet = StyleSheet::default();
        let mut reader = Reader::from_str(xml);
        // (style id, is default paragraph style)
        let mut current: Option<(String, bool)> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) if e.name().as_ref() == tags.style.as_slice() => {
                    let id = attr_value(&e, &style_id_attr)?.unwrap_or_default();
                    let is_paragraph = attr_value(&e, &type_attr)?.as_deref() == Some("paragraph");
                    let is_default = matches!(
                        attr_value(&e, &default_attr)?.as_deref(),
                        Some("1") | Some("true")
                    );
                    current = Some((id, is_paragraph && is_default));
                }
                Event::Empty(e) if e.name().as_ref() == tags.name.as_slice() => {
                    if let (Some((id, is_default)), Some(name)) =
                        (current.as_ref(), attr_value(&e, &tags.val_attr)?)
                    {
                        if *is_default {
                            sheet.default_paragraph = Some(name.clone());
                        }
                        sheet.names.insert(id.clone(), name);
                    }
                }
                Event::End(e) if e.name().as_ref() == tags.style.as_slice() => current = None,
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(sheet)
    }

    /// Display name for a paragraph's style id (or the default style)
    pub fn display_name(&self, style_id: Option<&str>) -> String {
        match style_id {
            Some(id) => self.names.get(id).cloned().unwrap_or_else(|| id.to_string()),
            None => self
                .default_paragraph
                .clone()
                .unwrap_or_else(|| "Normal".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_heading_table() {
        assert_eq!(heading_level("Heading 2"), 2);
        assert_eq!(heading_level(" heading 6 "), 6);
        assert_eq!(heading_level("标题1"), 1);
        assert_eq!(heading_level("标题 3"), 3);
    }

    #[test]
    fn test_dotted_style_suffix() {
        assert_eq!(heading_level("0-1"), 1);
        assert_eq!(heading_level("0-1.1"), 2);
        assert_eq!(heading_level("1.1.1"), 3);
    }

    #[test]
    fn test_body_text_is_level_zero() {
        assert_eq!(heading_level("Normal"), 0);
        assert_eq!(heading_level("Body-Text"), 0);
        assert_eq!(heading_level(""), 0);
    }

    #[test]
    fn test_stylesheet_resolves_ids_and_default() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:default="1" w:styleId="a"><w:name w:val="Normal"/></w:style>
  <w:style w:type="paragraph" w:styleId="1"><w:name w:val="heading 1"/></w:style>
  <w:style w:type="character" w:styleId="a0"><w:name w:val="Default Paragraph Font"/></w:style>
</w:styles>"#;
        let sheet = StyleSheet::parse(xml).unwrap();
        assert_eq!(sheet.display_name(Some("1")), "heading 1");
        assert_eq!(sheet.display_name(None), "Normal");
        assert_eq!(sheet.display_name(Some("missing")), "missing");
    }
}
