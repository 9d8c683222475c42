/// Outcome of a write broadcast, one entry per tier in chain order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    results: Vec<bool>,
}

impl BroadcastReport {
    pub(crate) fn with_capacity(tiers: usize) -> Self {
        Self {
            results: Vec::with_capacity(tiers),
        }
    }

    pub(crate) fn push(&mut self, ok: bool) {
        self.results.push(ok);
    }

    /// True when every tier reported success
    ///
    /// A chain without tiers succeeds vacuously.
    pub fn succeeded(&self) -> bool {
        self.results.iter().all(|ok| *ok)
    }

    /// Per-tier results
    pub fn results(&self) -> &[bool] {
        &self.results
    }

    /// Indexes of the tiers that reported failure
    pub fn failed_tiers(&self) -> Vec<usize> {
        self.results
            .iter()
            .enumerate()
            .filter(|(_, ok)| !**ok)
            .map(|(index, _)| index)
            .collect()
    }
}

impl From<Vec<bool>> for BroadcastReport {
    fn from(results: Vec<bool>) -> Self {
        Self { results }
    }
}
