use serde::{Deserialize, Serialize};

/// A `{count, total}` completion pair. Computed on read, never stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Progress {
    pub count: u64,
    pub total: u64,
}

impl Progress {
    pub fn new(count: u64, total: u64) -> Self {
        Self { count, total }
    }

    /// Build from signed database aggregates, clamping negatives to zero.
    pub fn from_counts(count: i64, total: i64) -> Self {
        Self::new(count.max(0) as u64, total.max(0) as u64)
    }

    /// Fraction complete in `[0, 1]`; zero when there is nothing to do.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.count as f64 / self.total as f64).min(1.0)
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.count >= self.total
    }
}
