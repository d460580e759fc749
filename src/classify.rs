//! Heuristic filter separating real titles from redistributables, runtimes
//! and tooling that platforms install alongside them.
//!
//! Biased toward rejection: a real title dropped here can still be added
//! manually, while an accepted utility pollutes the catalog.

use crate::platform::Platform;

/// Keywords that mark a manifest as infrastructure rather than a title.
const DEFAULT_DENYLIST: &[&str] = &[
    "redistributable",
    "redist",
    "runtime",
    "framework",
    "driver",
    "sdk",
    "controller config",
    "plugin",
    "launcher",
    "uninstall",
    "settings",
    "media player",
    "benchmark",
    "dedicated server",
    "soundtrack",
    "proton",
    "compatibility tool",
];

/// Steam app ids below this are historically reserved for Valve's own
/// infrastructure, except for the long-standing titles on the allowlist
/// that predate the numbering convention.
const DEFAULT_LOW_ID_THRESHOLD: u32 = 1000;

const DEFAULT_LOW_ID_ALLOWLIST: &[&str] = &[
    "counter-strike",
    "counter-strike: condition zero",
    "counter-strike: source",
    "counter-strike: global offensive",
    "day of defeat",
    "day of defeat: source",
    "deathmatch classic",
    "half-life",
    "half-life 2",
    "half-life 2: episode one",
    "half-life 2: episode two",
    "half-life 2: lost coast",
    "half-life: blue shift",
    "half-life: opposing force",
    "left 4 dead",
    "left 4 dead 2",
    "portal",
    "portal 2",
    "ricochet",
    "team fortress 2",
    "team fortress classic",
    "dota 2",
    "garry's mod",
];

/// Classification table. Built-in defaults plus whatever the config adds;
/// the thresholds are best-effort heuristics, not correctness guarantees,
/// so they stay externally tunable.
#[derive(Debug, Clone)]
pub struct ClassifyRules {
    denylist: Vec<String>,
    low_id_threshold: u32,
    low_id_allowlist: Vec<String>,
}

impl Default for ClassifyRules {
    fn default() -> Self {
        Self {
            denylist: DEFAULT_DENYLIST.iter().map(|s| s.to_string()).collect(),
            low_id_threshold: DEFAULT_LOW_ID_THRESHOLD,
            low_id_allowlist: DEFAULT_LOW_ID_ALLOWLIST
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ClassifyRules {
    pub fn with_overrides(
        extra_denylist: &[String],
        threshold: Option<u32>,
        extra_allowlist: &[String],
    ) -> Self {
        let mut rules = Self::default();
        rules
            .denylist
            .extend(extra_denylist.iter().map(|s| s.to_lowercase()));
        if let Some(threshold) = threshold {
            rules.low_id_threshold = threshold;
        }
        rules
            .low_id_allowlist
            .extend(extra_allowlist.iter().map(|s| s.to_lowercase()));
        rules
    }
}

/// Decide whether a candidate looks like a genuine entertainment title.
pub fn is_genuine_title(
    title: &str,
    platform: Platform,
    external_id: &str,
    rules: &ClassifyRules,
) -> bool {
    let lowered = title.to_lowercase();

    if rules.denylist.iter().any(|word| lowered.contains(word)) {
        return false;
    }

    // Low numeric ids are Valve's own infrastructure unless the title is a
    // known low-numbered classic.
    if platform == Platform::Steam {
        if let Ok(id) = external_id.parse::<u32>() {
            if id < rules.low_id_threshold
                && !rules.low_id_allowlist.iter().any(|t| t == &lowered)
            {
                return false;
            }
        }
    }

    true
}
