use std::collections::{HashMap, HashSet};

use crate::manifest::Manifest;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub files_replaced: usize,
    pub files_added: usize,
    pub chunks_added: usize,
}

impl Manifest {
    /// Fold a newer `delta` manifest into `self`.
    ///
    /// A delta file replaces the base file with the same path, in place;
    /// delta files with new paths are appended in delta order. Chunks are
    /// unioned by identifier and never replaced. Header, metadata and custom
    /// fields of `self` are kept.
    pub fn apply_delta(&mut self, delta: &Manifest) -> MergeStats {
        let mut by_path: HashMap<&str, usize> = HashMap::with_capacity(delta.files.files.len());
        for (i, f) in delta.files.files.iter().enumerate() {
            by_path.entry(f.filename.as_str()).or_insert(i);
        }

        let mut stats = MergeStats::default();
        let mut resolved: HashSet<&str> = HashSet::new();
        for file in &mut self.files.files {
            if let Some(&i) = by_path.get(file.filename.as_str()) {
                let newer = &delta.files.files[i];
                *file = newer.clone();
                resolved.insert(newer.filename.as_str());
                stats.files_replaced += 1;
            }
        }
        for newer in &delta.files.files {
            if !resolved.contains(newer.filename.as_str()) {
                self.files.files.push(newer.clone());
                stats.files_added += 1;
            }
        }

        for chunk in delta.chunks.iter() {
            if self.chunks.push(chunk.clone()) {
                stats.chunks_added += 1;
            }
        }

        log::debug!(
            "delta {}: {} files replaced, {} added, {} chunks added",
            delta.meta.build_version,
            stats.files_replaced,
            stats.files_added,
            stats.chunks_added
        );
        stats
    }
}

/// Merge `delta` into `base` and return the result.
pub fn merge(mut base: Manifest, delta: &Manifest) -> Manifest {
    base.apply_delta(delta);
    base
}
