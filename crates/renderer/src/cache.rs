//! At-most-once program compilation keyed by configuration fingerprint.

use std::collections::HashMap;

/// Cache of compiled programs. Entries live for the process lifetime; the
/// user-reachable configuration space per session is small enough that
/// eviction buys nothing.
pub struct ProgramCache<P> {
    entries: HashMap<String, P>,
    builds: usize,
}

impl<P> Default for ProgramCache<P> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            builds: 0,
        }
    }
}

impl<P> ProgramCache<P> {
    /// Returns the cached program for `fingerprint`, building it via
    /// `build` on first use. A failed build leaves the cache untouched.
    pub fn get_or_create<F, E>(&mut self, fingerprint: &str, build: F) -> Result<&P, E>
    where
        F: FnOnce() -> Result<P, E>,
    {
        if !self.entries.contains_key(fingerprint) {
            let program = build()?;
            self.builds += 1;
            self.entries.insert(fingerprint.to_string(), program);
            tracing::debug!(fingerprint, builds = self.builds, "program compiled and cached");
        }
        Ok(&self.entries[fingerprint])
    }

    pub fn get(&self, fingerprint: &str) -> Option<&P> {
        self.entries.get(fingerprint)
    }

    pub fn contains(&self, fingerprint: &str) -> bool {
        self.entries.contains_key(fingerprint)
    }

    /// Number of successful builds so far; drives the cache-correctness
    /// tests.
    pub fn build_count(&self) -> usize {
        self.builds
    }
}
