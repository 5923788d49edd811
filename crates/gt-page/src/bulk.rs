// bulk.rs - Per-item results of a batch of concurrent API calls.
//
// Goal reset and goal update fan out one request per step. Instead of
// failing the whole batch when any request fails, the outcome keeps which
// items succeeded and which did not, so local state can take the successes
// and the user is told exactly how many failed.

use gt_api::ApiError;

/// Outcome of one call per item, keyed by item id.
#[derive(Debug)]
pub struct BulkOutcome<T> {
    pub succeeded: Vec<(String, T)>,
    pub failed: Vec<(String, ApiError)>,
}

impl<T> BulkOutcome<T> {
    /// Pair ids with their results, in order.
    pub fn collect(
        ids: impl IntoIterator<Item = String>,
        results: impl IntoIterator<Item = Result<T, ApiError>>,
    ) -> Self {
        let mut outcome = Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        };
        for (id, result) in ids.into_iter().zip(results) {
            match result {
                Ok(value) => outcome.succeeded.push((id, value)),
                Err(e) => outcome.failed.push((id, e)),
            }
        }
        outcome
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// No item failed (vacuously true for an empty batch).
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    /// Every item failed and there was at least one.
    pub fn all_failed(&self) -> bool {
        self.succeeded.is_empty() && !self.failed.is_empty()
    }

    pub fn succeeded_ids(&self) -> impl Iterator<Item = &str> {
        self.succeeded.iter().map(|(id, _)| id.as_str())
    }

    pub fn value_for(&self, id: &str) -> Option<&T> {
        self.succeeded
            .iter()
            .find(|(item, _)| item == id)
            .map(|(_, v)| v)
    }

    /// "3 of 4 steps" style summary of the successes.
    pub fn summary(&self, noun: &str) -> String {
        format!("{} of {} {}", self.succeeded.len(), self.total(), noun)
    }
}
