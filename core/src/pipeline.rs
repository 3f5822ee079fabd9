use crate::config::RecommenderConfig;
use crate::corpus::{Corpus, ItemId};
use crate::error::{RecommendError, Result};
use crate::ranker::{rank, Ranked};
use crate::similarity::linear_kernel;
use crate::vectorizer::fit_transform;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredItem {
    pub id: ItemId,
    pub score: f64,
}

/// Response body. Success and failure differ only in which key is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Recommendations { recommendations: Vec<ItemId> },
    Scored { recommendations: Vec<ScoredItem> },
    Error { error: String },
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error { error: message.into() }
    }

    pub fn is_error(&self) -> bool { matches!(self, Response::Error { .. }) }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| json!({ "error": format!("failed to encode response: {e}") }).to_string())
    }
}

impl From<RecommendError> for Response {
    fn from(err: RecommendError) -> Self { Response::error(err.to_string()) }
}

/// Translate ranked positions back to item ids, keeping rank order.
pub fn map_to_ids(corpus: &Corpus, ranked: &[Ranked]) -> Result<Vec<ScoredItem>> {
    ranked
        .iter()
        .map(|r| {
            corpus
                .get(r.position)
                .map(|item| ScoredItem { id: item.id, score: r.score })
                .ok_or_else(|| RecommendError::Internal(format!("ranked position {} is outside the corpus", r.position)))
        })
        .collect()
}

/// Run every stage for an already loaded corpus.
pub fn recommend_scored(item_id: ItemId, corpus: &Corpus, config: &RecommenderConfig) -> Result<Vec<ScoredItem>> {
    let query = corpus.index_map().position(item_id).ok_or(RecommendError::ItemNotFound(item_id))?;
    let tfidf = fit_transform(corpus, config);
    let sims = linear_kernel(&tfidf)?;
    let ranked = rank(&sims, query, config.top_k)?;
    map_to_ids(corpus, &ranked)
}

pub fn recommend(item_id: ItemId, items: &Value, config: &RecommenderConfig) -> Result<Vec<ItemId>> {
    let corpus = Corpus::from_json_value(items)?;
    Ok(recommend_scored(item_id, &corpus, config)?.into_iter().map(|s| s.id).collect())
}

/// Pipeline boundary: every failure is rendered into the error body.
pub fn respond(item_id: ItemId, items: &Value, config: &RecommenderConfig, explain: bool) -> Response {
    let result = Corpus::from_json_value(items).and_then(|corpus| recommend_scored(item_id, &corpus, config));
    match result {
        Ok(scored) if explain => Response::Scored { recommendations: scored },
        Ok(scored) => Response::Recommendations { recommendations: scored.into_iter().map(|s| s.id).collect() },
        Err(err) => {
            tracing::debug!(item_id, error = %err, "recommendation failed");
            err.into()
        }
    }
}

/// Same as [`respond`] for a raw JSON payload.
pub fn respond_str(item_id: ItemId, items_json: &str, config: &RecommenderConfig, explain: bool) -> Response {
    match serde_json::from_str::<Value>(items_json) {
        Ok(items) => respond(item_id, &items, config, explain),
        Err(e) => RecommendError::from(e).into(),
    }
}
