//! Cache statistics

/// Statistics reported by a backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Seconds the backend has been up
    pub uptime_secs: u64,
    /// Approximate memory usage in bytes
    pub memory_usage: u64,
    /// Memory still available in bytes, if the backend has a limit
    pub memory_available: Option<u64>,
}

impl CacheStats {
    /// Calculate hit ratio (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Calculate miss ratio (0.0 to 1.0)
    pub fn miss_ratio(&self) -> f64 {
        1.0 - self.hit_ratio()
    }

    /// Total requests (hits + misses)
    pub fn total_requests(&self) -> u64 {
        self.hits + self.misses
    }

    /// Merge stats from another backend
    ///
    /// Counters and memory are summed, uptime is the longest of the two.
    pub fn merge(&mut self, other: &CacheStats) {
        self.hits += other.hits;
        self.misses += other.misses;
        self.uptime_secs = self.uptime_secs.max(other.uptime_secs);
        self.memory_usage += other.memory_usage;
        self.memory_available = match (self.memory_available, other.memory_available) {
            (Some(a), Some(b)) => Some(a + b),
            (a, b) => a.or(b),
        };
    }
}
