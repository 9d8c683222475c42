//! Namespace and version bookkeeping
//!
//! Every raw key is stored as `<namespace>[<key>][<version>]`. The version
//! lives in the backend under `NamespaceCacheKey[<namespace>]` and is bumped
//! to invalidate a whole namespace at once.

use parking_lot::Mutex;

/// Format of the key holding a namespace's version counter
pub const NAMESPACE_CACHE_KEY: &str = "NamespaceCacheKey[{}]";

/// Version used when no counter has been stored yet
pub const DEFAULT_VERSION: u64 = 1;

/// A namespace name plus its lazily resolved version
///
/// The version is remembered for the lifetime of the value once resolved.
/// Bumps made by other processes or other `Namespace` values are not seen
/// until [`Namespace::invalidate`] is called or the namespace is renamed.
#[derive(Debug, Default)]
pub struct Namespace {
    name: String,
    version: Mutex<Option<u64>>,
}

impl Namespace {
    /// Create a namespace with no resolved version
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: Mutex::new(None),
        }
    }

    /// The namespace name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the namespace and forget the resolved version
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        *self.version.get_mut() = None;
    }

    /// Key under which this namespace's version counter is stored
    pub fn version_key(&self) -> String {
        NAMESPACE_CACHE_KEY.replace("{}", &self.name)
    }

    /// Composite key for `key` at `version`
    pub fn composite(&self, key: &str, version: u64) -> String {
        format!("{}[{}][{}]", self.name, key, version)
    }

    /// Version resolved earlier, if any
    pub fn cached_version(&self) -> Option<u64> {
        *self.version.lock()
    }

    /// Remember a resolved version
    pub fn remember(&self, version: u64) {
        *self.version.lock() = Some(version);
    }

    /// Forget the resolved version so the next access reads it again
    pub fn invalidate(&self) {
        *self.version.lock() = None;
    }

    /// Decode a stored version counter
    ///
    /// Missing, unreadable and zero counters all mean [`DEFAULT_VERSION`].
    pub fn parse_version(raw: Option<&[u8]>) -> u64 {
        raw.and_then(|bytes| std::str::from_utf8(bytes).ok())
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|v| *v != 0)
            .unwrap_or(DEFAULT_VERSION)
    }

    /// Encode a version counter for storage
    pub fn encode_version(version: u64) -> Vec<u8> {
        version.to_string().into_bytes()
    }
}

impl Clone for Namespace {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            version: Mutex::new(self.cached_version()),
        }
    }
}
