use crate::config::RecommenderConfig;
use crate::corpus::{Corpus, Position};
use crate::tokenizer::Tokenizer;
use std::collections::{BTreeMap, BTreeSet};

pub type TermId = u32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Posting {
    pub position: Position,
    pub weight: f64, // normalized tf-idf weight
}

/// L2-normalized tf-idf weights of one document, sorted by term id.
/// Empty for descriptions without a single vocabulary term.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    pub entries: Vec<(TermId, f64)>,
}

impl SparseVector {
    pub fn is_zero(&self) -> bool { self.entries.is_empty() }

    pub fn nnz(&self) -> usize { self.entries.len() }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    pub fn weight(&self, term: TermId) -> Option<f64> {
        self.entries
            .binary_search_by_key(&term, |(t, _)| *t)
            .ok()
            .map(|i| self.entries[i].1)
    }
}

/// N × |vocabulary| sparse tf-idf matrix.
#[derive(Debug, Clone, Default)]
pub struct TfidfMatrix {
    /// Terms in lexicographic order; the index is the term id.
    pub vocabulary: Vec<String>,
    pub idf: Vec<f64>,
    pub rows: Vec<SparseVector>,
}

impl TfidfMatrix {
    pub fn num_docs(&self) -> usize { self.rows.len() }

    pub fn num_terms(&self) -> usize { self.vocabulary.len() }

    pub fn term_id(&self, term: &str) -> Option<TermId> {
        self.vocabulary
            .binary_search_by(|t| t.as_str().cmp(term))
            .ok()
            .map(|i| i as TermId)
    }

    /// Inverted view: postings per term id, each list sorted by position.
    pub fn postings(&self) -> Vec<Vec<Posting>> {
        let mut postings: Vec<Vec<Posting>> = vec![Vec::new(); self.vocabulary.len()];
        for (position, row) in self.rows.iter().enumerate() {
            for &(tid, weight) in &row.entries {
                postings[tid as usize].push(Posting { position, weight });
            }
        }
        postings
    }
}

/// Smoothed inverse document frequency: ln((1 + n) / (1 + df)) + 1.
pub fn smoothed_idf(num_docs: usize, df: u32) -> f64 {
    ((1.0 + num_docs as f64) / (1.0 + df as f64)).ln() + 1.0
}

/// Fit a vocabulary on the corpus and transform every description.
pub fn fit_transform(corpus: &Corpus, config: &RecommenderConfig) -> TfidfMatrix {
    let tokenizer = Tokenizer::new(config);
    let tokenized: Vec<Vec<String>> = corpus.descriptions().map(|d| tokenizer.tokenize(d)).collect();

    let vocabulary: Vec<String> = tokenized
        .iter()
        .flatten()
        .map(String::as_str)
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(str::to_string)
        .collect();
    let dictionary: BTreeMap<&str, TermId> = vocabulary
        .iter()
        .enumerate()
        .map(|(i, t)| (t.as_str(), i as TermId))
        .collect();

    // Raw term counts per document, plus document frequency per term
    let mut df: Vec<u32> = vec![0; vocabulary.len()];
    let counts: Vec<BTreeMap<TermId, u32>> = tokenized
        .iter()
        .map(|tokens| {
            let mut tf: BTreeMap<TermId, u32> = BTreeMap::new();
            for token in tokens {
                *tf.entry(dictionary[token.as_str()]).or_insert(0) += 1;
            }
            for tid in tf.keys() {
                df[*tid as usize] += 1;
            }
            tf
        })
        .collect();

    let n = corpus.len();
    let idf: Vec<f64> = df.iter().map(|&d| smoothed_idf(n, d)).collect();

    let rows: Vec<SparseVector> = counts
        .into_iter()
        .map(|tf| {
            let mut entries: Vec<(TermId, f64)> = tf
                .into_iter()
                .map(|(tid, count)| (tid, count as f64 * idf[tid as usize]))
                .collect();
            let norm = entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
            if norm > 0.0 {
                for (_, w) in entries.iter_mut() { *w /= norm; }
            } else {
                entries.clear();
            }
            SparseVector { entries }
        })
        .collect();

    tracing::debug!(num_docs = n, num_terms = vocabulary.len(), "built tf-idf matrix");
    TfidfMatrix { vocabulary, idf, rows }
}
