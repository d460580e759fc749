//! Format parsers - one raw manifest in, one candidate record (or nothing) out.
//!
//! Each parse call is a pure function of a single manifest. A missing required
//! field rejects the whole manifest; partial records are never produced.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::locator::{ManifestHandle, ManifestSource};
use crate::platform::Platform;

/// An unconfirmed discovery result, produced per scan and discarded after the
/// merge decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub title: String,
    pub platform: Platform,
    /// Platform-native identifier; unique only within its own platform.
    pub external_id: String,
    pub source_hint: String,
    pub raw_fields: BTreeMap<String, String>,
}

pub fn parse(handle: &ManifestHandle) -> Option<CandidateRecord> {
    let record = match (&handle.source, handle.platform) {
        (ManifestSource::File(path), Platform::Steam) => parse_steam_acf(path, &handle.source_hint),
        (ManifestSource::File(path), Platform::Epic) => parse_epic_item(path, &handle.source_hint),
        (ManifestSource::RegistryKey { subkey, values }, Platform::Ubisoft) => {
            parse_ubisoft_key(subkey, values, &handle.source_hint)
        }
        (ManifestSource::RegistryKey { subkey, values }, Platform::Gog) => {
            parse_gog_key(subkey, values, &handle.source_hint)
        }
        _ => None,
    };

    if record.is_none() {
        debug!("rejected manifest {}", handle.source_hint);
    }
    record
}

fn read_lossy(path: &Path) -> Option<String> {
    match fs::read(path) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(err) => {
            debug!("unreadable manifest {}: {}", path.display(), err);
            None
        }
    }
}

/// Extract one `"key"  "value"` pair from a Valve key/value text blob.
/// Fields may appear in any order; unknown fields are ignored.
fn extract_vdf_value(content: &str, key: &str) -> Option<String> {
    let pattern = format!(r#""{}"\s+"([^"]+)""#, regex::escape(key));
    let re = Regex::new(&pattern).ok()?;
    re.captures(content)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

fn parse_steam_acf(path: &Path, hint: &str) -> Option<CandidateRecord> {
    let content = read_lossy(path)?;

    let app_id = extract_vdf_value(&content, "appid")?;
    let name = extract_vdf_value(&content, "name")?;

    let mut raw_fields = BTreeMap::new();
    if let Some(install_dir) = extract_vdf_value(&content, "installdir") {
        raw_fields.insert("installdir".to_string(), install_dir);
    }

    Some(CandidateRecord {
        title: name,
        platform: Platform::Steam,
        external_id: app_id,
        source_hint: hint.to_string(),
        raw_fields,
    })
}

fn parse_epic_item(path: &Path, hint: &str) -> Option<CandidateRecord> {
    let content = read_lossy(path)?;
    let doc: serde_json::Value = serde_json::from_str(&content).ok()?;

    // Both fields must be present and string-typed; anything else rejects
    // the manifest.
    let display_name = doc.get("DisplayName")?.as_str()?;
    let app_name = doc.get("AppName")?.as_str()?;

    let mut raw_fields = BTreeMap::new();
    for key in ["InstallLocation", "CatalogNamespace", "CatalogItemId"] {
        if let Some(value) = doc.get(key).and_then(|v| v.as_str()) {
            raw_fields.insert(key.to_string(), value.to_string());
        }
    }

    Some(CandidateRecord {
        title: display_name.to_string(),
        platform: Platform::Epic,
        external_id: app_name.to_string(),
        source_hint: hint.to_string(),
        raw_fields,
    })
}

fn parse_ubisoft_key(
    subkey: &str,
    values: &BTreeMap<String, String>,
    hint: &str,
) -> Option<CandidateRecord> {
    let install_dir = values.get("InstallDir").filter(|v| !v.is_empty())?;

    // Ubisoft install keys carry no display name; the install directory's
    // final component is the closest thing to one.
    let title = install_dir
        .trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty())?
        .to_string();

    Some(CandidateRecord {
        title,
        platform: Platform::Ubisoft,
        external_id: subkey.to_string(),
        source_hint: hint.to_string(),
        raw_fields: values.clone(),
    })
}

fn parse_gog_key(
    subkey: &str,
    values: &BTreeMap<String, String>,
    hint: &str,
) -> Option<CandidateRecord> {
    let name = values.get("gameName").filter(|v| !v.is_empty())?;

    Some(CandidateRecord {
        title: name.clone(),
        platform: Platform::Gog,
        external_id: subkey.to_string(),
        source_hint: hint.to_string(),
        raw_fields: values.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn file_handle(platform: Platform, path: &Path) -> ManifestHandle {
        ManifestHandle {
            platform,
            source_hint: format!("test:{}", path.display()),
            source: ManifestSource::File(path.to_path_buf()),
        }
    }

    fn registry_handle(
        platform: Platform,
        subkey: &str,
        values: &[(&str, &str)],
    ) -> ManifestHandle {
        ManifestHandle {
            platform,
            source_hint: format!("test:{}", subkey),
            source: ManifestSource::RegistryKey {
                subkey: subkey.to_string(),
                values: values
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            },
        }
    }

    #[test]
    fn test_steam_acf_fields_in_any_order_with_extras() {
        let dir = tempfile::tempdir().unwrap();
        let acf = dir.path().join("appmanifest_620.acf");
        fs::write(
            &acf,
            r#""AppState"
{
    "Universe"      "1"
    "installdir"        "Portal 2"
    "StateFlags"        "4"
    "name"      "Portal 2"
    "appid"     "620"
    "buildid"       "1234567"
}
"#,
        )
        .unwrap();

        let record = parse(&file_handle(Platform::Steam, &acf)).unwrap();
        assert_eq!(record.title, "Portal 2");
        assert_eq!(record.external_id, "620");
        assert_eq!(record.raw_fields.get("installdir").unwrap(), "Portal 2");
    }

    #[test]
    fn test_steam_acf_missing_required_field_rejects_whole_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let acf = dir.path().join("appmanifest_0.acf");
        fs::write(&acf, "\"AppState\"\n{\n\t\"appid\"\t\t\"400\"\n}\n").unwrap();

        assert!(parse(&file_handle(Platform::Steam, &acf)).is_none());
    }

    #[test]
    fn test_steam_acf_invalid_utf8_is_decoded_lossily() {
        let dir = tempfile::tempdir().unwrap();
        let acf = dir.path().join("appmanifest_10.acf");
        let mut bytes = b"\"appid\"\t\"10\"\n\"name\"\t\"Counter-Strike\"\n".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, 0xfd]);
        fs::write(&acf, bytes).unwrap();

        let record = parse(&file_handle(Platform::Steam, &acf)).unwrap();
        assert_eq!(record.title, "Counter-Strike");
    }

    #[test]
    fn test_epic_item_requires_both_string_fields() {
        let dir = tempfile::tempdir().unwrap();

        let good = dir.path().join("good.item");
        fs::write(
            &good,
            r#"{"DisplayName": "Rocket League", "AppName": "Sugar", "InstallLocation": "C:\\Games\\RL", "FormatVersion": 0}"#,
        )
        .unwrap();
        let record = parse(&file_handle(Platform::Epic, &good)).unwrap();
        assert_eq!(record.title, "Rocket League");
        assert_eq!(record.external_id, "Sugar");
        assert_eq!(record.raw_fields.get("InstallLocation").unwrap(), "C:\\Games\\RL");

        let missing = dir.path().join("missing.item");
        fs::write(&missing, r#"{"DisplayName": "Rocket League"}"#).unwrap();
        assert!(parse(&file_handle(Platform::Epic, &missing)).is_none());

        let wrong_type = dir.path().join("wrong.item");
        fs::write(&wrong_type, r#"{"DisplayName": "X", "AppName": 42}"#).unwrap();
        assert!(parse(&file_handle(Platform::Epic, &wrong_type)).is_none());

        let not_json = dir.path().join("broken.item");
        fs::write(&not_json, "{ not json").unwrap();
        assert!(parse(&file_handle(Platform::Epic, &not_json)).is_none());
    }

    #[test]
    fn test_ubisoft_key_title_from_install_dir() {
        let handle = registry_handle(
            Platform::Ubisoft,
            "635",
            &[("InstallDir", r"C:/Program Files (x86)/Ubisoft/Ubisoft Game Launcher/games/Rayman Legends/")],
        );
        let record = parse(&handle).unwrap();
        assert_eq!(record.title, "Rayman Legends");
        assert_eq!(record.external_id, "635");
    }

    #[test]
    fn test_ubisoft_key_without_install_dir_is_rejected() {
        assert!(parse(&registry_handle(Platform::Ubisoft, "635", &[])).is_none());
        assert!(parse(&registry_handle(Platform::Ubisoft, "635", &[("InstallDir", "")])).is_none());
    }

    #[test]
    fn test_gog_key_requires_game_name() {
        let record = parse(&registry_handle(
            Platform::Gog,
            "1207658924",
            &[("gameName", "The Witcher 3"), ("path", r"C:\GOG Games\The Witcher 3")],
        ))
        .unwrap();
        assert_eq!(record.title, "The Witcher 3");
        assert_eq!(record.external_id, "1207658924");

        assert!(parse(&registry_handle(Platform::Gog, "1", &[("path", "C:\\x")])).is_none());
    }
}
