//! Stopword filtering
//!
//! A fixed list of high-frequency Chinese function words (particles,
//! conjunctions, pronouns) plus any extra words from the configuration.

use std::collections::HashSet;

/// Built-in stopwords.
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "的", "了", "和", "是", "在", "就", "都", "而", "及", "与", "着", "或", "一个", "没有",
    "我们", "你们", "他们", "以及", "其", "并", "但", "被", "为", "更", "到", "这", "对", "中",
    "上", "下", "等", "也", "还", "要",
];

/// A set of tokens excluded from analysis.
#[derive(Debug, Clone)]
pub struct StopwordSet {
    words: HashSet<String>,
}

impl Default for StopwordSet {
    fn default() -> Self {
        Self::from_list(DEFAULT_STOPWORDS)
    }
}

impl StopwordSet {
    /// Create a stopword set from a custom list
    pub fn from_list(words: &[&str]) -> Self {
        Self {
            words: words.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Built-in list extended with `extra` words.
    pub fn with_extra<S: AsRef<str>>(extra: &[S]) -> Self {
        let mut set = Self::default();
        for word in extra {
            let word = word.as_ref().trim();
            if !word.is_empty() {
                set.words.insert(word.to_string());
            }
        }
        set
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Drop blank tokens and stopwords, keeping order.
    pub fn retain<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<String> {
        tokens
            .iter()
            .map(|t| t.as_ref())
            .filter(|t| !t.trim().is_empty() && !self.is_stopword(t))
            .map(str::to_string)
            .collect()
    }
}
