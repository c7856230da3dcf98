//! The canonical LP-row form every separator emits.

use crate::distance::Distance;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSense {
    LessEq,
    Equal,
    GreaterEq,
}

/// A sparse linear inequality/equality over LP columns (edge variables), plus the LP violation of
/// the current pivot vector against it.
///
/// `indices[i]` is an edge-column index into the live `CoreGraph`/`CoreLP`, `values[i]` its
/// coefficient.
#[derive(Debug, Clone)]
pub struct SparseRow {
    pub indices: Vec<usize>,
    pub values: Vec<i64>,
    pub sense: RowSense,
    pub rhs: i64,
    /// `lhs(x) - rhs` for `<=`/`=` rows, `rhs - lhs(x)` for `>=` rows; positive means violated.
    pub lp_violation: f64,
}

impl SparseRow {
    pub fn new(indices: Vec<usize>, values: Vec<i64>, sense: RowSense, rhs: i64) -> Self {
        assert_eq!(indices.len(), values.len());
        Self {
            indices,
            values,
            sense,
            rhs,
            lp_violation: 0.0,
        }
    }

    /// `lhs(x)` for a dense x-vector indexed the same way as `indices`.
    pub fn lhs(&self, x: &[f64]) -> f64 {
        self.indices
            .iter()
            .zip(self.values.iter())
            .map(|(&idx, &coeff)| coeff as f64 * x[idx])
            .sum()
    }

    /// Whether `lhs(x) {<=,=,>=} rhs` holds within `eps`.
    pub fn is_satisfied(&self, x: &[f64], eps: f64) -> bool {
        let lhs = self.lhs(x);
        match self.sense {
            RowSense::LessEq => lhs <= self.rhs as f64 + eps,
            RowSense::Equal => (lhs - self.rhs as f64).abs() <= eps,
            RowSense::GreaterEq => lhs >= self.rhs as f64 - eps,
        }
    }

    /// Whether `lhs(x) = rhs` exactly within `eps` (tightness, regardless of sense).
    pub fn is_tight(&self, x: &[f64], eps: f64) -> bool {
        (self.lhs(x) - self.rhs as f64).abs() <= eps
    }

    pub fn violation(&self, x: &[f64]) -> f64 {
        let lhs = self.lhs(x);
        match self.sense {
            RowSense::LessEq => lhs - self.rhs as f64,
            RowSense::Equal => (lhs - self.rhs as f64).abs(),
            RowSense::GreaterEq => self.rhs as f64 - lhs,
        }
    }

    /// Builder used by the domino-parity separator: divide every coefficient and the rhs by 2,
    /// flooring. Exact because the aggregated row's coefficients are always twice an integer.
    pub fn halved_floor(indices: Vec<usize>, doubled_values: Vec<i64>, doubled_rhs: i64) -> Self {
        let values = doubled_values
            .into_iter()
            .map(|v| v.div_euclid(2))
            .collect();
        SparseRow::new(indices, values, RowSense::GreaterEq, doubled_rhs.div_euclid(2))
    }
}

/// Tour length helper shared by callers that need `Distance` rather than `f64`.
pub fn rhs_as_distance(rhs: i64) -> Distance {
    Distance(rhs)
}
