//! Manifest locators - enumerate candidate manifests under resolved roots.
//!
//! Steam and Epic are file-backed; Ubisoft Connect and GOG Galaxy live in the
//! Windows registry. Per-manifest I/O errors are logged and skipped so one bad
//! library never aborts the rest of a scan.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;

use crate::platform::Platform;
use crate::registry;

#[derive(Debug, Clone)]
pub struct ManifestHandle {
    pub platform: Platform,
    pub source_hint: String,
    pub source: ManifestSource,
}

#[derive(Debug, Clone)]
pub enum ManifestSource {
    File(PathBuf),
    RegistryKey {
        subkey: String,
        values: BTreeMap<String, String>,
    },
}

pub fn locate_manifests(platform: Platform, roots: &[PathBuf]) -> Vec<ManifestHandle> {
    match platform {
        Platform::Steam => locate_steam(roots),
        Platform::Epic => locate_epic(roots),
        Platform::Ubisoft => locate_registry(platform, registry::UBISOFT_INSTALLS),
        Platform::Gog => locate_registry(platform, registry::GOG_GAMES),
    }
}

fn locate_steam(roots: &[PathBuf]) -> Vec<ManifestHandle> {
    let mut handles = Vec::new();
    let mut visited: HashSet<PathBuf> = HashSet::new();

    for root in roots {
        if !visited.insert(root.clone()) {
            continue;
        }
        collect_acf_manifests(root, &mut handles);

        // libraryfolders.vdf can point at sibling libraries the path resolver
        // does not know about. Indexes found inside those siblings are not
        // followed, bounding the indirection to one level.
        for extra in extra_library_roots(root) {
            if visited.insert(extra.clone()) {
                collect_acf_manifests(&extra, &mut handles);
            }
        }
    }
    handles
}

fn collect_acf_manifests(root: &Path, handles: &mut Vec<ManifestHandle>) {
    let steamapps = root.join("steamapps");
    let entries = match fs::read_dir(&steamapps) {
        Ok(entries) => entries,
        Err(err) => {
            debug!("skipping steam library {}: {}", steamapps.display(), err);
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with("appmanifest_")
            && path.extension().and_then(|s| s.to_str()) == Some("acf")
        {
            handles.push(ManifestHandle {
                platform: Platform::Steam,
                source_hint: format!("steam:{}", path.display()),
                source: ManifestSource::File(path),
            });
        }
    }
}

fn extra_library_roots(root: &Path) -> Vec<PathBuf> {
    let vdf = root.join("steamapps/libraryfolders.vdf");
    let content = match fs::read(&vdf) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => return Vec::new(),
    };
    parse_library_index(&content)
}

/// Pull the "path" entries out of a libraryfolders.vdf blob.
fn parse_library_index(content: &str) -> Vec<PathBuf> {
    let re = match Regex::new(r#""path"\s+"([^"]+)""#) {
        Ok(re) => re,
        Err(_) => return Vec::new(),
    };
    re.captures_iter(content)
        .filter_map(|cap| cap.get(1))
        .map(|m| PathBuf::from(m.as_str()))
        .collect()
}

fn locate_epic(roots: &[PathBuf]) -> Vec<ManifestHandle> {
    let mut handles = Vec::new();
    for root in roots {
        let manifests = root.join("Manifests");
        let entries = match fs::read_dir(&manifests) {
            Ok(entries) => entries,
            Err(err) => {
                debug!("skipping epic manifests {}: {}", manifests.display(), err);
                continue;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("item") {
                handles.push(ManifestHandle {
                    platform: Platform::Epic,
                    source_hint: format!("epic:{}", path.display()),
                    source: ManifestSource::File(path),
                });
            }
        }
    }
    handles
}

fn locate_registry(platform: Platform, subpath: &str) -> Vec<ManifestHandle> {
    registry::enumerate_install_keys(subpath)
        .into_iter()
        .map(|(subkey, values)| ManifestHandle {
            platform,
            source_hint: format!(r"registry:HKLM\{}\{}", subpath, subkey),
            source: ManifestSource::RegistryKey { subkey, values },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn write_acf(root: &Path, appid: &str) {
        let steamapps = root.join("steamapps");
        fs::create_dir_all(&steamapps).unwrap();
        fs::write(
            steamapps.join(format!("appmanifest_{}.acf", appid)),
            format!(
                "\"AppState\"\n{{\n\t\"appid\"\t\t\"{}\"\n\t\"name\"\t\t\"Game {}\"\n}}\n",
                appid, appid
            ),
        )
        .unwrap();
    }

    #[test]
    fn test_steam_locator_globs_appmanifests() {
        let dir = tempfile::tempdir().unwrap();
        write_acf(dir.path(), "400");
        write_acf(dir.path(), "620");
        fs::write(dir.path().join("steamapps/readme.txt"), "not a manifest").unwrap();

        let handles = locate_manifests(Platform::Steam, &[dir.path().to_path_buf()]);
        assert_eq!(handles.len(), 2);
        assert!(handles.iter().all(|h| h.platform == Platform::Steam));
    }

    #[test]
    fn test_missing_root_is_silently_empty() {
        let handles =
            locate_manifests(Platform::Steam, &[PathBuf::from("/nonexistent/steam/root")]);
        assert!(handles.is_empty());
    }

    #[test]
    fn test_library_index_discovers_sibling_roots_one_level_deep() {
        let primary = tempfile::tempdir().unwrap();
        let sibling = tempfile::tempdir().unwrap();
        let cousin = tempfile::tempdir().unwrap();

        write_acf(primary.path(), "400");
        write_acf(sibling.path(), "620");
        write_acf(cousin.path(), "730");

        // primary -> sibling, sibling -> cousin; the second hop must not be taken
        fs::write(
            primary.path().join("steamapps/libraryfolders.vdf"),
            format!(
                "\"libraryfolders\"\n{{\n\t\"1\"\n\t{{\n\t\t\"path\"\t\t\"{}\"\n\t}}\n}}\n",
                sibling.path().display()
            ),
        )
        .unwrap();
        fs::write(
            sibling.path().join("steamapps/libraryfolders.vdf"),
            format!(
                "\"libraryfolders\"\n{{\n\t\"1\"\n\t{{\n\t\t\"path\"\t\t\"{}\"\n\t}}\n}}\n",
                cousin.path().display()
            ),
        )
        .unwrap();

        let handles = locate_manifests(Platform::Steam, &[primary.path().to_path_buf()]);
        let hints: Vec<_> = handles.iter().map(|h| h.source_hint.clone()).collect();
        assert_eq!(handles.len(), 2, "hints: {:?}", hints);
    }

    #[test]
    fn test_epic_locator_finds_item_manifests() {
        let dir = tempfile::tempdir().unwrap();
        let manifests = dir.path().join("Manifests");
        fs::create_dir_all(&manifests).unwrap();
        fs::write(
            manifests.join("ABC123.item"),
            r#"{"DisplayName": "Rocket League", "AppName": "Sugar"}"#,
        )
        .unwrap();
        fs::write(manifests.join("notes.txt"), "ignore me").unwrap();

        let handles = locate_manifests(Platform::Epic, &[dir.path().to_path_buf()]);
        assert_eq!(handles.len(), 1);
        assert_eq!(handles[0].platform, Platform::Epic);
    }

    #[test]
    fn test_parse_library_index_extracts_paths() {
        let content = r#"
"libraryfolders"
{
    "0"
    {
        "path"      "/home/user/.local/share/Steam"
    }
    "1"
    {
        "path"      "/mnt/games/SteamLibrary"
        "label"     ""
    }
}
"#;
        let paths = parse_library_index(content);
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/home/user/.local/share/Steam"),
                PathBuf::from("/mnt/games/SteamLibrary"),
            ]
        );
    }
}
