// Content-addressed memoization of normalization results.
use crate::data::source::SourceFormat;
use crate::services::normalizer::{Normalized, NormalizerOptions};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Results keyed by a digest of the raw source bytes, so identical uploads
/// within one session skip re-parsing. Correctness never depends on it.
#[derive(Debug, Default)]
pub struct NormalizationCache {
    entries: HashMap<String, Normalized>,
}

impl NormalizationCache {
    pub fn new() -> Self {
        NormalizationCache {
            entries: HashMap::new(),
        }
    }

    /// Digest over the format, both sources, the options that shape the
    /// output and any reader parameters (encodings, delimiter). The open
    /// length is hashed so the (open, closed) boundary is unambiguous.
    pub fn key(
        format: SourceFormat,
        open: &[u8],
        closed: &[u8],
        options: &NormalizerOptions,
        read_params: &[&str],
    ) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format.tag().as_bytes());
        hasher.update((open.len() as u64).to_le_bytes());
        hasher.update(open);
        hasher.update(closed);
        for part in [
            options.null_sentinel.as_str(),
            options.not_informed.as_str(),
            options.datetime_format.as_str(),
        ]
        .into_iter()
        .chain(read_params.iter().copied())
        {
            hasher.update((part.len() as u64).to_le_bytes());
            hasher.update(part.as_bytes());
        }
        hex::encode(hasher.finalize())
    }

    pub fn get(&self, key: &str) -> Option<&Normalized> {
        let hit = self.entries.get(key);
        tracing::debug!(key, hit = hit.is_some(), "Normalization cache lookup");
        hit
    }

    pub fn insert(&mut self, key: String, value: Normalized) {
        self.entries.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
