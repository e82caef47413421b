//! Budgeted partitioning of paragraphs into review chunks

use std::collections::HashSet;

use shared_types::Paragraph;

/// A contiguous run of paragraphs sent to the reviewer in one call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chunk {
    pub paragraphs: Vec<Paragraph>,
}

impl Chunk {
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// Total text length in characters
    pub fn char_len(&self) -> usize {
        self.paragraphs.iter().map(|p| p.text.chars().count()).sum()
    }

    /// Original indices of the first and last paragraph
    pub fn index_range(&self) -> Option<(usize, usize)> {
        let first = self.paragraphs.first()?;
        let last = self.paragraphs.last()?;
        Some((first.index, last.index))
    }

    pub fn indices(&self) -> HashSet<i64> {
        self.paragraphs.iter().map(|p| p.index as i64).collect()
    }
}

/// Greedily pack paragraphs into chunks of at most `budget` characters.
///
/// A paragraph is never split: one longer than the budget becomes a chunk
/// of its own.
pub fn split_paragraphs(paragraphs: &[Paragraph], budget: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut current = Chunk::default();
    let mut current_len = 0;

    for para in paragraphs {
        let len = para.text.chars().count();
        if !current.is_empty() && current_len + len > budget {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current.paragraphs.push(para.clone());
        current_len += len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn para(index: usize, len: usize) -> Paragraph {
        Paragraph {
            index,
            text: "字".repeat(len),
            style_name: "Normal".to_string(),
            heading_level: 0,
        }
    }

    #[test]
    fn test_packs_until_budget() {
        let paras = vec![para(0, 3), para(1, 3), para(2, 3), para(5, 1)];
        let chunks = split_paragraphs(&paras, 6);
        let ranges: Vec<_> = chunks.iter().map(|c| c.index_range().unwrap()).collect();
        assert_eq!(ranges, vec![(0, 1), (2, 5)]);
    }

    #[test]
    fn test_oversized_paragraph_stands_alone() {
        let paras = vec![para(0, 2), para(1, 50), para(2, 2)];
        let chunks = split_paragraphs(&paras, 10);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1].char_len(), 50);
    }

    #[test]
    fn test_empty_input_has_no_chunks() {
        assert!(split_paragraphs(&[], 100).is_empty());
    }

    fn arb_paragraphs() -> impl Strategy<Value = Vec<Paragraph>> {
        prop::collection::vec(0usize..40, 0..30).prop_map(|lens| {
            lens.into_iter()
                .enumerate()
                .map(|(i, len)| para(i * 2, len))
                .collect()
        })
    }

    proptest! {
        /// Concatenated chunks reproduce the input exactly
        #[test]
        fn chunks_partition_the_input(paras in arb_paragraphs(), budget in 1usize..100) {
            let chunks = split_paragraphs(&paras, budget);
            let rejoined: Vec<Paragraph> = chunks.iter().flat_map(|c| c.paragraphs.clone()).collect();
            prop_assert_eq!(rejoined, paras);
            prop_assert!(chunks.iter().all(|c| !c.is_empty()));
        }

        /// Only single-paragraph chunks may exceed the budget
        #[test]
        fn chunks_respect_the_budget(paras in arb_paragraphs(), budget in 1usize..100) {
            for chunk in split_paragraphs(&paras, budget) {
                prop_assert!(chunk.char_len() <= budget || chunk.paragraphs.len() == 1);
            }
        }
    }
}
