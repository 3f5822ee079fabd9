use crate::corpus::Position;
use crate::error::{RecommendError, Result};
use crate::vectorizer::TfidfMatrix;

/// Dense, symmetric N × N cosine similarity matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    n: usize,
    values: Vec<f64>, // row-major
}

impl SimilarityMatrix {
    pub fn len(&self) -> usize { self.n }

    pub fn is_empty(&self) -> bool { self.n == 0 }

    /// `None` when either position is outside the matrix.
    pub fn get(&self, i: Position, j: Position) -> Option<f64> {
        if i < self.n && j < self.n { Some(self.values[i * self.n + j]) } else { None }
    }

    pub fn row(&self, i: Position) -> Result<&[f64]> {
        if i >= self.n {
            return Err(RecommendError::Internal(format!("row {i} out of bounds for {} items", self.n)));
        }
        Ok(&self.values[i * self.n..(i + 1) * self.n])
    }
}

/// Linear kernel over L2-normalized rows, i.e. cosine similarity.
///
/// Accumulated term by term over the postings into the upper triangle and
/// mirrored, so `get(i, j) == get(j, i)` holds exactly. Zero vectors share no
/// postings and keep an all-zero row, including the diagonal.
pub fn linear_kernel(matrix: &TfidfMatrix) -> Result<SimilarityMatrix> {
    let n = matrix.num_docs();
    let cells = n
        .checked_mul(n)
        .ok_or_else(|| RecommendError::Internal(format!("similarity matrix for {n} items is too large")))?;
    let mut values = vec![0.0f64; cells];

    for plist in matrix.postings() {
        for (a, pa) in plist.iter().enumerate() {
            for pb in &plist[a..] {
                values[pa.position * n + pb.position] += pa.weight * pb.weight;
            }
        }
    }

    let mut nonzero = 0usize;
    for i in 0..n {
        for j in i..n {
            let v = values[i * n + j];
            if !v.is_finite() {
                return Err(RecommendError::Internal(format!("non-finite similarity between {i} and {j}")));
            }
            let v = v.clamp(0.0, 1.0);
            if v > 0.0 && i != j { nonzero += 1; }
            values[i * n + j] = v;
            values[j * n + i] = v;
        }
    }

    tracing::debug!(num_docs = n, nonzero_pairs = nonzero, "computed similarity matrix");
    Ok(SimilarityMatrix { n, values })
}
