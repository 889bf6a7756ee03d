use std::collections::BTreeMap;
use std::fs;

use rayon::prelude::*;

use super::SnapshotStore;
use super::layout::{list_files, parse_snapshot_name};
use crate::models::RecoveryStatistics;

impl SnapshotStore {
    /// Totals over the whole recovery directory.
    ///
    /// Version counts are accumulated per filename across every session before the
    /// largest file is picked; on a tie the alphabetically first filename wins.
    pub fn statistics(&self) -> RecoveryStatistics {
        let recovered = self.recovered_dirs();
        let copies: Vec<u64> = recovered
            .par_iter()
            .flat_map_iter(|dir| {
                list_files(&dir.path)
                    .into_iter()
                    .map(|(_, path)| fs::metadata(&path).map(|meta| meta.len()).unwrap_or(0))
            })
            .collect();

        let snapshot_names: Vec<Vec<String>> = self
            .version_dirs()
            .par_iter()
            .map(|dir| {
                list_files(&dir.path)
                    .into_iter()
                    .filter_map(|(name, _)| {
                        parse_snapshot_name(&name).map(|(filename, _, _)| filename.to_string())
                    })
                    .collect()
            })
            .collect();

        let mut per_file: BTreeMap<String, usize> = BTreeMap::new();
        let mut total_versions = 0;
        for filename in snapshot_names.into_iter().flatten() {
            total_versions += 1;
            *per_file.entry(filename).or_default() += 1;
        }

        let mut largest_file = None;
        let mut largest_file_edits = 0;
        for (filename, count) in &per_file {
            if *count > largest_file_edits {
                largest_file_edits = *count;
                largest_file = Some(filename.clone());
            }
        }

        let avg_versions_per_file = if per_file.is_empty() {
            0.0
        } else {
            total_versions as f64 / per_file.len() as f64
        };

        RecoveryStatistics {
            total_sessions: recovered.len(),
            total_files: copies.len(),
            total_versions,
            total_size_bytes: copies.iter().sum(),
            largest_file,
            largest_file_edits,
            avg_versions_per_file,
        }
    }
}
