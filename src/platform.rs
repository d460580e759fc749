use serde::{Deserialize, Serialize};
use std::fmt;

/// The four distribution platforms the scanner understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Platform {
    Steam,
    Epic,
    Ubisoft,
    Gog,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Steam,
        Platform::Epic,
        Platform::Ubisoft,
        Platform::Gog,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Steam => "Steam",
            Platform::Epic => "Epic",
            Platform::Ubisoft => "Ubisoft",
            Platform::Gog => "GOG",
        }
    }

    pub fn from_name(name: &str) -> Option<Platform> {
        match name.trim().to_lowercase().as_str() {
            "steam" => Some(Platform::Steam),
            "epic" | "egl" | "epic games" => Some(Platform::Epic),
            "ubisoft" | "uplay" | "ubisoft connect" => Some(Platform::Ubisoft),
            "gog" | "gog galaxy" => Some(Platform::Gog),
            _ => None,
        }
    }

    /// Protocol URI understood by the platform's own client.
    pub fn launch_uri(&self, external_id: &str) -> String {
        match self {
            Platform::Steam => format!("steam://run/{}", external_id),
            Platform::Epic => format!(
                "com.epicgames.launcher://apps/{}?action=launch&silent=true",
                external_id
            ),
            Platform::Ubisoft => format!("uplay://launch/{}/0", external_id),
            Platform::Gog => format!("goggalaxy://openGameView/{}", external_id),
        }
    }

    /// Best-effort store page link; empty when the id does not map to a web URL.
    pub fn store_url(&self, external_id: &str) -> String {
        match self {
            Platform::Steam => format!("https://store.steampowered.com/app/{}", external_id),
            Platform::Gog => format!("https://www.gog.com/game/{}", external_id),
            Platform::Epic | Platform::Ubisoft => String::new(),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Build a launch URI from a platform name, tolerating any casing.
/// Unrecognized platforms fall back to the id unchanged.
pub fn build_uri(platform: &str, external_id: &str) -> String {
    match Platform::from_name(platform) {
        Some(p) => p.launch_uri(external_id),
        None => external_id.to_string(),
    }
}
