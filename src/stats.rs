use serde::Serialize;

use crate::config::BucketConfiguration;
use crate::models::ScoreResult;

/// Share of faces per bucket over a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeStats {
    rows: Vec<StatsRow>,
    total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsRow {
    pub bucket_id: u32,
    pub label: String,
    pub count: usize,
}

impl AgeStats {
    /// One zeroed row per bucket, youngest first.
    pub fn new(config: &BucketConfiguration) -> Self {
        Self {
            rows: config
                .buckets()
                .map(|b| StatsRow {
                    bucket_id: b.id,
                    label: b.label.clone(),
                    count: 0,
                })
                .collect(),
            total: 0,
        }
    }

    pub fn record(&mut self, result: &ScoreResult) {
        if let Some(row) = self.rows.iter_mut().find(|r| r.bucket_id == result.bucket.id) {
            row.count += 1;
            self.total += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn rows(&self) -> &[StatsRow] {
        &self.rows
    }

    pub fn percentage(&self, row: &StatsRow) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            row.count as f64 * 100.0 / self.total as f64
        }
    }
}

impl<'a> Extend<&'a ScoreResult> for AgeStats {
    fn extend<I: IntoIterator<Item = &'a ScoreResult>>(&mut self, iter: I) {
        for result in iter {
            self.record(result);
        }
    }
}
