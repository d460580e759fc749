use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::platform::Platform;

/// Environment variable consulted before any conventional location.
pub fn env_override_key(platform: Platform) -> &'static str {
    match platform {
        Platform::Steam => "QUESTLOG_STEAM_ROOT",
        Platform::Epic => "QUESTLOG_EPIC_ROOT",
        Platform::Ubisoft => "QUESTLOG_UBISOFT_ROOT",
        Platform::Gog => "QUESTLOG_GOG_ROOT",
    }
}

/// Produce the ordered list of candidate installation roots for a platform.
///
/// Priority: environment override, then config override, then the
/// OS-conventional defaults. Paths are candidates only - existence is checked
/// by the locators, so this never fails. An empty result means the platform
/// has no filesystem roots on this OS (the registry platforms, off Windows).
pub fn resolve_roots(platform: Platform, config_override: Option<&Path>) -> Vec<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(dir) = std::env::var(env_override_key(platform)) {
        if !dir.is_empty() {
            roots.push(PathBuf::from(dir));
        }
    }

    if let Some(dir) = config_override {
        roots.push(dir.to_path_buf());
    }

    roots.extend(default_roots(std::env::consts::OS, platform));
    dedup_preserving_order(roots)
}

/// OS-conventional roots, keyed by `std::env::consts::OS` strings so the
/// tables stay testable from any host.
fn default_roots(os: &str, platform: Platform) -> Vec<PathBuf> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"));

    match (platform, os) {
        (Platform::Steam, "linux") => vec![
            home.join(".local/share/Steam"),
            home.join(".steam/steam"),
            home.join(".var/app/com.valvesoftware.Steam/.local/share/Steam"),
            PathBuf::from("/usr/share/steam"),
            PathBuf::from("/opt/steam"),
        ],
        (Platform::Steam, "windows") => vec![
            PathBuf::from(r"C:\Program Files (x86)\Steam"),
            PathBuf::from(r"C:\Program Files\Steam"),
        ],
        (Platform::Steam, "macos") => vec![home.join("Library/Application Support/Steam")],

        // The Epic root is the launcher Data directory that holds Manifests/.
        (Platform::Epic, "linux") => vec![
            home.join(".wine/drive_c/ProgramData/Epic/EpicGamesLauncher/Data"),
            home.join("Games/epic-games-store/drive_c/ProgramData/Epic/EpicGamesLauncher/Data"),
        ],
        (Platform::Epic, "windows") => {
            vec![PathBuf::from(r"C:\ProgramData\Epic\EpicGamesLauncher\Data")]
        }
        (Platform::Epic, "macos") => {
            vec![home.join("Library/Application Support/Epic/EpicGamesLauncher/Data")]
        }

        // Ubisoft Connect and GOG Galaxy are discovered through the Windows
        // registry, not filesystem roots.
        (Platform::Ubisoft | Platform::Gog, _) => Vec::new(),

        _ => Vec::new(),
    }
}

fn dedup_preserving_order(roots: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    roots.into_iter().filter(|p| seen.insert(p.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_linux_steam_roots_prefer_home_library() {
        let roots = default_roots("linux", Platform::Steam);
        assert!(!roots.is_empty());
        assert!(roots[0].ends_with(".local/share/Steam"));
        assert!(roots.contains(&PathBuf::from("/opt/steam")));
    }

    #[test]
    fn test_windows_steam_roots() {
        let roots = default_roots("windows", Platform::Steam);
        assert_eq!(
            roots,
            vec![
                PathBuf::from(r"C:\Program Files (x86)\Steam"),
                PathBuf::from(r"C:\Program Files\Steam"),
            ]
        );
    }

    #[test]
    fn test_registry_platforms_have_no_filesystem_roots() {
        for os in ["linux", "windows", "macos"] {
            assert!(default_roots(os, Platform::Ubisoft).is_empty());
            assert!(default_roots(os, Platform::Gog).is_empty());
        }
    }

    #[test]
    fn test_unknown_os_yields_empty() {
        assert!(default_roots("freebsd", Platform::Steam).is_empty());
    }

    #[test]
    fn test_config_override_comes_first() {
        let override_root = PathBuf::from("/tmp/my-steam");
        let roots = resolve_roots(Platform::Steam, Some(&override_root));
        assert_eq!(roots[0], override_root);
    }

    #[test]
    fn test_dedup_preserves_priority_order() {
        let roots = dedup_preserving_order(vec![
            PathBuf::from("/a"),
            PathBuf::from("/b"),
            PathBuf::from("/a"),
            PathBuf::from("/c"),
        ]);
        assert_eq!(
            roots,
            vec![
                PathBuf::from("/a"),
                PathBuf::from("/b"),
                PathBuf::from("/c"),
            ]
        );
    }
}
