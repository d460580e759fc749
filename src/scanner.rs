//! Scan orchestration: resolve roots, locate manifests, parse and classify.
//!
//! The per-platform scans are independent and run as concurrent blocking
//! tasks; nothing is shared until the results are joined for classification,
//! so a wedged or failed platform never stalls the others.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::classify::{self, ClassifyRules};
use crate::config::Config;
use crate::locator;
use crate::parser::{self, CandidateRecord};
use crate::paths;
use crate::platform::Platform;

pub struct Scanner {
    config: Config,
}

impl Scanner {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Scan the requested platforms and return the classified candidate batch.
    pub async fn scan(&self, filter: Option<Platform>) -> Vec<CandidateRecord> {
        let platforms: Vec<Platform> = match filter {
            Some(p) => vec![p],
            None => Platform::ALL.to_vec(),
        };

        let mut tasks = Vec::new();
        for platform in platforms {
            let override_root = self
                .config
                .root_override(platform)
                .map(|p| p.to_path_buf());
            tasks.push(tokio::task::spawn_blocking(move || {
                scan_platform(platform, override_root.as_deref())
            }));
        }

        let mut candidates = Vec::new();
        for task in tasks {
            match task.await {
                Ok(mut batch) => candidates.append(&mut batch),
                Err(err) => debug!("platform scan task failed: {}", err),
            }
        }

        let rules = ClassifyRules::with_overrides(
            &self.config.classify.extra_denylist,
            self.config.classify.low_id_threshold,
            &self.config.classify.low_id_allowlist,
        );
        classify_batch(candidates, &rules)
    }
}

/// One platform, synchronously: resolve roots, locate, parse, dedup.
pub fn scan_platform(platform: Platform, override_root: Option<&Path>) -> Vec<CandidateRecord> {
    let roots = paths::resolve_roots(platform, override_root);
    collect_candidates(platform, &roots)
}

pub fn collect_candidates(platform: Platform, roots: &[PathBuf]) -> Vec<CandidateRecord> {
    let handles = locator::locate_manifests(platform, roots);
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for handle in &handles {
        if let Some(record) = parser::parse(handle) {
            // Overlapping roots can surface the same manifest twice.
            if seen.insert((record.platform, record.external_id.clone())) {
                records.push(record);
            }
        }
    }

    info!(
        "{}: {} manifests, {} candidates",
        platform,
        handles.len(),
        records.len()
    );
    records
}

/// Drop candidates the heuristic filter flags as non-titles, then order the
/// batch for stable presentation.
pub fn classify_batch(
    candidates: Vec<CandidateRecord>,
    rules: &ClassifyRules,
) -> Vec<CandidateRecord> {
    let mut kept = Vec::new();
    for candidate in candidates {
        if classify::is_genuine_title(
            &candidate.title,
            candidate.platform,
            &candidate.external_id,
            rules,
        ) {
            kept.push(candidate);
        } else {
            debug!(
                "filtered {} [{}] ({})",
                candidate.title, candidate.platform, candidate.external_id
            );
        }
    }
    kept.sort_by(|a, b| {
        a.platform
            .cmp(&b.platform)
            .then_with(|| a.title.cmp(&b.title))
    });
    kept
}
