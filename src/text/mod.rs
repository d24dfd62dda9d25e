//! Text layer: key-column concatenation, word segmentation and stopwords.

pub mod stopwords;

use jieba_rs::Jieba;

use crate::data::model::Table;

pub use stopwords::StopwordSet;

/// Dictionary-based word segmenter for Chinese (and mixed) text.
///
/// Loading the dictionary is the expensive part; build one and reuse it.
pub struct Segmenter {
    jieba: Jieba,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Segmenter {
    pub fn new() -> Self {
        Self { jieba: Jieba::new() }
    }

    /// Split `text` into word tokens, HMM enabled for out-of-dictionary words.
    /// Whitespace runs come back as their own tokens.
    pub fn cut<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.jieba.cut(text, true)
    }
}

/// The key column's non-missing values for `rows`, as text, joined with a
/// single space in row order. Unknown columns yield `None`.
pub fn key_text(table: &Table, rows: &[usize], key_column: &str) -> Option<String> {
    let col = table.column_index(key_column)?;
    let parts: Vec<String> = rows
        .iter()
        .filter_map(|&r| table.rows().get(r))
        .filter_map(|row| row[col].to_text())
        .collect();
    Some(parts.join(" "))
}

/// Segment `text` and drop blanks and stopwords.
pub fn tokenize(segmenter: &Segmenter, stopwords: &StopwordSet, text: &str) -> Vec<String> {
    stopwords.retain(&segmenter.cut(text))
}

/// Join tokens with single spaces, the form the cloud renderer consumes.
pub fn join_tokens(tokens: &[String]) -> String {
    tokens.join(" ")
}
