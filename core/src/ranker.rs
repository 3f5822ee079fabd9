use crate::corpus::Position;
use crate::error::Result;
use crate::similarity::SimilarityMatrix;
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ranked {
    pub position: Position,
    pub score: f64,
}

/// Descending score, then ascending position.
fn by_score_then_position(a: &Ranked, b: &Ranked) -> Ordering {
    b.score.total_cmp(&a.score).then(a.position.cmp(&b.position))
}

/// Order every position except `query` by similarity to it and keep the first `k`.
///
/// The query is excluded by position, so another item with an identical
/// description (and score) is still returned.
pub fn rank(matrix: &SimilarityMatrix, query: Position, k: usize) -> Result<Vec<Ranked>> {
    let row = matrix.row(query)?;
    let mut scored: Vec<Ranked> = row
        .iter()
        .enumerate()
        .filter(|(position, _)| *position != query)
        .map(|(position, &score)| Ranked { position, score })
        .collect();
    scored.sort_by(by_score_then_position);
    scored.truncate(k);
    Ok(scored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RecommenderConfig;
    use crate::corpus::{Corpus, Item};
    use crate::similarity::linear_kernel;
    use crate::vectorizer::fit_transform;

    fn matrix(descs: &[&str]) -> SimilarityMatrix {
        let corpus = Corpus::new(descs.iter().enumerate().map(|(i, d)| Item::new(i as i64, *d)).collect());
        linear_kernel(&fit_transform(&corpus, &RecommenderConfig::default())).unwrap()
    }

    fn positions(ranked: &[Ranked]) -> Vec<Position> {
        ranked.iter().map(|r| r.position).collect()
    }

    #[test]
    fn ties_break_by_ascending_position() {
        let m = matrix(&["hat", "boots", "scarf", "hat", "gloves"]);
        let ranked = rank(&m, 0, 10).unwrap();
        assert_eq!(positions(&ranked), vec![3, 1, 2, 4]);
    }

    #[test]
    fn excludes_query_by_position_not_score() {
        // Positions 0 and 1 are identical; querying 1 must still return 0 first.
        let m = matrix(&["silk scarf", "silk scarf", "wool coat"]);
        let ranked = rank(&m, 1, 10).unwrap();
        assert_eq!(positions(&ranked), vec![0, 2]);
        assert!((ranked[0].score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn truncates_to_k() {
        let m = matrix(&["a1", "b2", "c3", "d4", "e5"]);
        assert_eq!(rank(&m, 2, 2).unwrap().len(), 2);
        assert!(rank(&m, 2, 0).unwrap().is_empty());
        assert_eq!(rank(&m, 2, 100).unwrap().len(), 4);
    }
}
