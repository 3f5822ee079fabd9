//! Content-based item recommendations from free-text descriptions.
//!
//! Every call loads its own [`Corpus`], fits a tf-idf vocabulary on it,
//! computes the full cosine similarity matrix and ranks the other items
//! against the reference one. Nothing is cached between calls.

pub mod config;
pub mod corpus;
pub mod error;
pub mod pipeline;
pub mod ranker;
pub mod similarity;
pub mod tokenizer;
pub mod vectorizer;

pub use config::{RecommenderConfig, DEFAULT_TOP_K};
pub use corpus::{Corpus, IndexMap, Item, ItemId, Position};
pub use error::{RecommendError, Result};
pub use pipeline::{recommend, recommend_scored, respond, respond_str, Response, ScoredItem};
pub use ranker::Ranked;
pub use similarity::SimilarityMatrix;
pub use vectorizer::{Posting, SparseVector, TermId, TfidfMatrix};
