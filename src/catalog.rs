//! The persisted catalog of confirmed titles.
//!
//! Owns identity assignment, deduplication by `(platform, external_id)`,
//! legacy migration and aggregate statistics. Every mutation is serialized
//! behind one mutex and saved atomically (write temp, then rename) so a crash
//! mid-save never corrupts the previous valid state.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{QuestlogError, Result};
use crate::legacy;
use crate::parser::CandidateRecord;
use crate::platform::Platform;

pub const SCHEMA_VERSION: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    AutoDetected,
    Manual,
    Migrated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Monotonically increasing, never reused, immutable once assigned.
    pub catalog_id: u64,
    pub title: String,
    pub platform: Platform,
    pub external_id: String,
    pub launch_uri: String,
    pub store_url: String,
    pub added_at: DateTime<Utc>,
    pub last_launched_at: Option<DateTime<Utc>>,
    pub launch_count: u64,
    pub provenance: Provenance,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total: usize,
    pub per_platform: BTreeMap<String, usize>,
    pub auto_detected: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct CatalogState {
    schema_version: u32,
    next_id: u64,
    entries: BTreeMap<u64, CatalogEntry>,
    #[serde(default)]
    stats: CatalogStats,
}

impl CatalogState {
    fn fresh() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            next_id: 1,
            entries: BTreeMap::new(),
            stats: CatalogStats::default(),
        }
    }

    fn find_by_key(&self, platform: Platform, external_id: &str) -> Option<&CatalogEntry> {
        self.entries
            .values()
            .find(|e| e.platform == platform && e.external_id == external_id)
    }
}

pub struct Catalog {
    path: PathBuf,
    state: Mutex<CatalogState>,
}

impl Catalog {
    /// Open (or create) the catalog at `path`.
    ///
    /// A missing or corrupt file degrades to an empty store. The one condition
    /// surfaced as a hard error is a catalog whose directory cannot be written,
    /// since every later save would silently fail.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
            if path.exists() {
                check_writable(parent)?;
            }
        }

        let state = load_state(&path);
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    /// Merge one candidate. Returns the existing id instead of creating a
    /// duplicate when the `(platform, external_id)` key is already present.
    pub fn add(&self, candidate: &CandidateRecord, provenance: Provenance) -> Result<u64> {
        let mut state = self.state.lock().unwrap();

        if let Some(existing) = state.find_by_key(candidate.platform, &candidate.external_id) {
            debug!(
                "{} [{}] already in catalog as #{}",
                candidate.title, candidate.platform, existing.catalog_id
            );
            return Ok(existing.catalog_id);
        }

        let id = state.next_id;
        state.next_id += 1;
        state.entries.insert(
            id,
            CatalogEntry {
                catalog_id: id,
                title: candidate.title.clone(),
                platform: candidate.platform,
                external_id: candidate.external_id.clone(),
                launch_uri: candidate.platform.launch_uri(&candidate.external_id),
                store_url: candidate.platform.store_url(&candidate.external_id),
                added_at: Utc::now(),
                last_launched_at: None,
                launch_count: 0,
                provenance,
            },
        );
        self.persist(&mut state)?;
        Ok(id)
    }

    /// Merge a confirmed scan batch, one candidate at a time. Batching is the
    /// caller's responsibility; by the time this runs the selection is final.
    pub fn confirm_additions(&self, batch: &[CandidateRecord]) -> Result<Vec<u64>> {
        batch
            .iter()
            .map(|candidate| self.add(candidate, Provenance::AutoDetected))
            .collect()
    }

    pub fn add_manual(&self, title: &str, platform: Platform, external_id: &str) -> Result<u64> {
        let candidate = CandidateRecord {
            title: title.to_string(),
            platform,
            external_id: external_id.to_string(),
            source_hint: "manual".to_string(),
            raw_fields: BTreeMap::new(),
        };
        self.add(&candidate, Provenance::Manual)
    }

    pub fn remove(&self, catalog_id: u64) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        if state.entries.remove(&catalog_id).is_none() {
            return Ok(false);
        }
        self.persist(&mut state)?;
        Ok(true)
    }

    /// Record a successful launch attempt. A missing id is a no-op rather than
    /// an error, tolerating races with a concurrent removal.
    pub fn record_launch(&self, catalog_id: u64) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        match state.entries.get_mut(&catalog_id) {
            Some(entry) => {
                entry.launch_count += 1;
                entry.last_launched_at = Some(Utc::now());
            }
            None => {
                debug!("record_launch for missing entry #{}", catalog_id);
                return Ok(());
            }
        }
        self.persist(&mut state)?;
        Ok(())
    }

    pub fn list(&self) -> Vec<CatalogEntry> {
        self.state.lock().unwrap().entries.values().cloned().collect()
    }

    pub fn launch_uri_for(&self, catalog_id: u64) -> Result<String> {
        self.state
            .lock()
            .unwrap()
            .entries
            .get(&catalog_id)
            .map(|e| e.launch_uri.clone())
            .ok_or(QuestlogError::EntryNotFound(catalog_id))
    }

    pub fn stats(&self) -> CatalogStats {
        compute_stats(&self.state.lock().unwrap().entries)
    }

    /// One-time merge of entries scanned out of a legacy data file.
    ///
    /// Idempotent by dedup key: a record whose `(platform, external_id)` is
    /// already present is skipped, so re-running on the same source merges
    /// nothing new. Returns the number of entries merged.
    pub fn migrate_legacy(&self, legacy_source: &str) -> Result<usize> {
        let records = legacy::scan_legacy_source(legacy_source);
        let mut state = self.state.lock().unwrap();
        let mut merged = 0;

        for record in records {
            if state.find_by_key(record.platform, &record.external_id).is_some() {
                continue;
            }
            let id = state.next_id;
            state.next_id += 1;
            state.entries.insert(
                id,
                CatalogEntry {
                    catalog_id: id,
                    title: record.title,
                    platform: record.platform,
                    external_id: record.external_id.clone(),
                    launch_uri: record.platform.launch_uri(&record.external_id),
                    store_url: record.platform.store_url(&record.external_id),
                    added_at: Utc::now(),
                    last_launched_at: None,
                    launch_count: 0,
                    provenance: Provenance::Migrated,
                },
            );
            merged += 1;
        }

        if merged > 0 {
            self.persist(&mut state)?;
        }
        Ok(merged)
    }

    /// Recompute stats and save the whole document atomically.
    fn persist(&self, state: &mut CatalogState) -> Result<()> {
        state.stats = compute_stats(&state.entries);
        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn compute_stats(entries: &BTreeMap<u64, CatalogEntry>) -> CatalogStats {
    let mut per_platform = BTreeMap::new();
    let mut auto_detected = 0;
    for entry in entries.values() {
        *per_platform
            .entry(entry.platform.name().to_string())
            .or_insert(0) += 1;
        if entry.provenance == Provenance::AutoDetected {
            auto_detected += 1;
        }
    }
    CatalogStats {
        total: entries.len(),
        per_platform,
        auto_detected,
    }
}

fn load_state(path: &Path) -> CatalogState {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!("cannot read catalog {}: {}", path.display(), err);
            }
            return CatalogState::fresh();
        }
    };

    match serde_json::from_slice::<CatalogState>(&bytes) {
        Ok(mut state) => {
            if state.schema_version > SCHEMA_VERSION {
                warn!(
                    "catalog {} has schema {} but {} is the newest supported, starting with an empty store",
                    path.display(),
                    state.schema_version,
                    SCHEMA_VERSION
                );
                return CatalogState::fresh();
            }
            // Older same-shape documents are upgraded in place on the next save.
            state.schema_version = SCHEMA_VERSION;
            state
        }
        Err(err) => {
            warn!(
                "catalog {} is corrupt ({}), starting with an empty store",
                path.display(),
                err
            );
            CatalogState::fresh()
        }
    }
}

fn check_writable(dir: &Path) -> Result<()> {
    let probe = dir.join(format!(".questlog-probe-{}", std::process::id()));
    match fs::write(&probe, b"probe") {
        Ok(()) => {
            let _ = fs::remove_file(&probe);
            Ok(())
        }
        Err(_) => Err(QuestlogError::CatalogNotWritable(
            dir.display().to_string(),
        )),
    }
}
