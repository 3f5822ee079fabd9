use serde::{Deserialize, Serialize};

/// Number of recommendations returned when nothing else is configured.
pub const DEFAULT_TOP_K: usize = 10;

fn default_top_k() -> usize { DEFAULT_TOP_K }

/// Per-call knobs for the recommendation pipeline.
///
/// The defaults reproduce plain TF-IDF over lowercased tokens with English
/// stopwords removed. Stemming and NFKC folding are opt-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommenderConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Reduce tokens to their English Snowball stem after stopword removal.
    #[serde(default)]
    pub stem: bool,
    /// Apply NFKC normalization before lowercasing.
    #[serde(default)]
    pub normalize_unicode: bool,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self { top_k: DEFAULT_TOP_K, stem: false, normalize_unicode: false }
    }
}

impl RecommenderConfig {
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_stemming(mut self, stem: bool) -> Self {
        self.stem = stem;
        self
    }

    pub fn with_unicode_normalization(mut self, enable: bool) -> Self {
        self.normalize_unicode = enable;
        self
    }
}
