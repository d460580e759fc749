//! Scanner for the legacy library format: launch entries pattern-matched out
//! of an older program's own source text. Read-only; the legacy file is never
//! rewritten.

use regex::Regex;

use crate::platform::Platform;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyRecord {
    pub title: String,
    pub platform: Platform,
    pub external_id: String,
}

/// Scan legacy text for the two launch-URI shapes the old tool embedded:
/// quoted title/steam-run pairs and quoted title/epic-apps pairs.
/// Duplicate `(platform, id)` pairs within one source collapse to the first.
pub fn scan_legacy_source(text: &str) -> Vec<LegacyRecord> {
    let mut records: Vec<LegacyRecord> = Vec::new();

    if let Ok(steam) = Regex::new(r#""([^"]+)"\s*[:=]\s*"steam://run/(\d+)/?""#) {
        for cap in steam.captures_iter(text) {
            push_unique(
                &mut records,
                LegacyRecord {
                    title: cap[1].to_string(),
                    platform: Platform::Steam,
                    external_id: cap[2].to_string(),
                },
            );
        }
    }

    if let Ok(epic) =
        Regex::new(r#""([^"]+)"\s*[:=]\s*"com\.epicgames\.launcher://apps/([^"?/]+)[^"]*""#)
    {
        for cap in epic.captures_iter(text) {
            push_unique(
                &mut records,
                LegacyRecord {
                    title: cap[1].to_string(),
                    platform: Platform::Epic,
                    external_id: cap[2].to_string(),
                },
            );
        }
    }

    records
}

fn push_unique(records: &mut Vec<LegacyRecord>, record: LegacyRecord) {
    let duplicate = records
        .iter()
        .any(|r| r.platform == record.platform && r.external_id == record.external_id);
    if !duplicate {
        records.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LEGACY_SOURCE: &str = r#"
# old launcher script
GAMES = {
    "Portal": "steam://run/400",
    "The Talos Principle": "steam://run/257510",
    "Rocket League": "com.epicgames.launcher://apps/Sugar?action=launch&silent=true",
    "Portal": "steam://run/400",
}
OTHER = "not a game entry"
"#;

    #[test]
    fn test_scan_finds_both_uri_shapes() {
        let records = scan_legacy_source(LEGACY_SOURCE);
        assert_eq!(
            records,
            vec![
                LegacyRecord {
                    title: "Portal".to_string(),
                    platform: Platform::Steam,
                    external_id: "400".to_string(),
                },
                LegacyRecord {
                    title: "The Talos Principle".to_string(),
                    platform: Platform::Steam,
                    external_id: "257510".to_string(),
                },
                LegacyRecord {
                    title: "Rocket League".to_string(),
                    platform: Platform::Epic,
                    external_id: "Sugar".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_scan_of_unrelated_text_is_empty() {
        assert!(scan_legacy_source("nothing to see here").is_empty());
        assert!(scan_legacy_source("").is_empty());
    }

    #[test]
    fn test_epic_id_stops_at_query_string() {
        let records = scan_legacy_source(
            r#""Fortnite" = "com.epicgames.launcher://apps/Fortnite?action=launch""#,
        );
        assert_eq!(records[0].external_id, "Fortnite");
    }
}
