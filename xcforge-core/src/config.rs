//! Build configuration (`xcforge.json`)
//!
//! Defines the validated project manifest that drives generation. Every
//! operation declares the subset of keys it needs up front, so a missing
//! key fails before any file-system mutation occurs.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

use crate::filetree::FileTree;

/// Supported source extensions
pub const SOURCE_EXT: &[&str] = &["cpp", "c", "cc", "cxx", "m", "mm", "asm", "asmx", "swift"];

/// Whether a file name carries a recognized source-code extension.
pub fn is_source_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXT.contains(&ext))
}

/// Error types for configuration handling
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required configuration key: {0}")]
    MissingKey(&'static str),

    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The default orientation for a mobile build.
///
/// Eight named settings; anything unrecognized falls back to
/// landscape-right, matching the template's own default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    Portrait,
    #[default]
    Landscape,
    PortraitFlipped,
    LandscapeFlipped,
    PortraitEither,
    LandscapeEither,
    Multidirectional,
    Omnidirectional,
}

impl Orientation {
    /// Resolve a configuration name, falling back to landscape-right.
    pub fn from_name(name: &str) -> Orientation {
        match name {
            "portrait" => Orientation::Portrait,
            "landscape" => Orientation::Landscape,
            "portrait-flipped" => Orientation::PortraitFlipped,
            "landscape-flipped" => Orientation::LandscapeFlipped,
            "portrait-either" => Orientation::PortraitEither,
            "landscape-either" => Orientation::LandscapeEither,
            "multidirectional" => Orientation::Multidirectional,
            "omnidirectional" => Orientation::Omnidirectional,
            _ => Orientation::Landscape,
        }
    }

    /// The Info.plist orientation constant(s) for this setting.
    pub fn plist_value(self) -> &'static str {
        match self {
            Orientation::Portrait => "UIInterfaceOrientationPortrait",
            Orientation::Landscape => "UIInterfaceOrientationLandscapeRight",
            Orientation::PortraitFlipped => "UIInterfaceOrientationPortraitUpsideDown",
            Orientation::LandscapeFlipped => "UIInterfaceOrientationLandscapeLeft",
            Orientation::PortraitEither => {
                "\"UIInterfaceOrientationPortrait UIInterfaceOrientationPortraitUpsideDown\""
            }
            Orientation::LandscapeEither => {
                "\"UIInterfaceOrientationLandscapeRight UIInterfaceOrientationLandscapeLeft\""
            }
            Orientation::Multidirectional => {
                "\"UIInterfaceOrientationPortrait UIInterfaceOrientationLandscapeRight\""
            }
            Orientation::Omnidirectional => {
                "\"UIInterfaceOrientationPortrait UIInterfaceOrientationLandscapeRight UIInterfaceOrientationLandscapeLeft UIInterfaceOrientationPortraitUpsideDown\""
            }
        }
    }
}

impl<'de> Deserialize<'de> for Orientation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(Orientation::from_name(&name))
    }
}

/// Whether an asset entry is a single file or a folder added by reference.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AssetKind {
    #[default]
    File,
    Folder,
}

/// One top-level entry under the configured asset root.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetEntry {
    /// Path relative to the asset directory
    pub path: String,
    #[serde(default)]
    pub kind: AssetKind,
}

/// The main project configuration file (xcforge.json)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildConfig {
    /// Display name of the application
    pub name: Option<String>,

    /// Short project name, lowercased for target and scheme names
    pub short: Option<String>,

    /// CamelCase project name used for the generated bundle directory
    pub camel: Option<String>,

    /// Bundle/application identifier
    pub appid: Option<String>,

    /// Default device orientation for mobile builds
    pub orientation: Option<Orientation>,

    /// Project root directory
    pub root: Option<PathBuf>,

    /// Build output directory
    pub build: Option<PathBuf>,

    /// Engine distribution directory (templates and frameworks)
    pub engine: Option<PathBuf>,

    /// Asset directory, relative to the project root
    pub assets: Option<PathBuf>,

    /// Relative path from the build directory back to the project root
    pub build_to_root: Option<PathBuf>,

    /// Relative path from the build directory to the engine distribution
    pub build_to_engine: Option<PathBuf>,

    /// Platform targets to generate (e.g. "apple")
    #[serde(default)]
    pub targets: Vec<String>,

    /// Extra include directories, keyed by platform category
    #[serde(default)]
    pub include_dict: IndexMap<String, Vec<String>>,

    /// Top-level asset entries to add to the project
    #[serde(default)]
    pub asset_list: Vec<AssetEntry>,

    /// Source hierarchy with per-file category tags
    pub source_tree: Option<IndexMap<String, FileTree>>,
}

impl BuildConfig {
    /// Load and parse a configuration file.
    pub fn load(path: &Path) -> Result<BuildConfig, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Check that all of the given keys are present.
    ///
    /// Each operation calls this with its own required subset before
    /// touching the file system.
    pub fn require(&self, keys: &[&'static str]) -> Result<(), ConfigError> {
        for &key in keys {
            if !self.has(key) {
                return Err(ConfigError::MissingKey(key));
            }
        }
        Ok(())
    }

    fn has(&self, key: &str) -> bool {
        match key {
            "name" => self.name.is_some(),
            "short" => self.short.is_some(),
            "camel" => self.camel.is_some(),
            "appid" => self.appid.is_some(),
            "orientation" => self.orientation.is_some(),
            "root" => self.root.is_some(),
            "build" => self.build.is_some(),
            "engine" => self.engine.is_some(),
            "assets" => self.assets.is_some(),
            "build_to_root" => self.build_to_root.is_some(),
            "build_to_engine" => self.build_to_engine.is_some(),
            "source_tree" => self.source_tree.is_some(),
            "targets" | "include_dict" | "asset_list" => true,
            _ => false,
        }
    }

    pub fn name(&self) -> Result<&str, ConfigError> {
        self.name.as_deref().ok_or(ConfigError::MissingKey("name"))
    }

    pub fn short(&self) -> Result<&str, ConfigError> {
        self.short.as_deref().ok_or(ConfigError::MissingKey("short"))
    }

    pub fn camel(&self) -> Result<&str, ConfigError> {
        self.camel.as_deref().ok_or(ConfigError::MissingKey("camel"))
    }

    pub fn appid(&self) -> Result<&str, ConfigError> {
        self.appid.as_deref().ok_or(ConfigError::MissingKey("appid"))
    }

    pub fn orientation(&self) -> Result<Orientation, ConfigError> {
        self.orientation.ok_or(ConfigError::MissingKey("orientation"))
    }

    pub fn build(&self) -> Result<&Path, ConfigError> {
        self.build.as_deref().ok_or(ConfigError::MissingKey("build"))
    }

    pub fn engine(&self) -> Result<&Path, ConfigError> {
        self.engine.as_deref().ok_or(ConfigError::MissingKey("engine"))
    }

    pub fn assets(&self) -> Result<&Path, ConfigError> {
        self.assets.as_deref().ok_or(ConfigError::MissingKey("assets"))
    }

    pub fn build_to_root(&self) -> Result<&Path, ConfigError> {
        self.build_to_root
            .as_deref()
            .ok_or(ConfigError::MissingKey("build_to_root"))
    }

    pub fn build_to_engine(&self) -> Result<&Path, ConfigError> {
        self.build_to_engine
            .as_deref()
            .ok_or(ConfigError::MissingKey("build_to_engine"))
    }

    pub fn source_tree(&self) -> Result<&IndexMap<String, FileTree>, ConfigError> {
        self.source_tree
            .as_ref()
            .ok_or(ConfigError::MissingKey("source_tree"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_reports_missing_key() {
        let config = BuildConfig {
            name: Some("Demo Game".to_string()),
            ..Default::default()
        };
        assert!(config.require(&["name"]).is_ok());

        let err = config.require(&["name", "appid"]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey("appid")));
    }

    #[test]
    fn test_orientation_mapping() {
        let cases = [
            ("portrait", "UIInterfaceOrientationPortrait"),
            ("landscape", "UIInterfaceOrientationLandscapeRight"),
            ("portrait-flipped", "UIInterfaceOrientationPortraitUpsideDown"),
            ("landscape-flipped", "UIInterfaceOrientationLandscapeLeft"),
            (
                "portrait-either",
                "\"UIInterfaceOrientationPortrait UIInterfaceOrientationPortraitUpsideDown\"",
            ),
            (
                "landscape-either",
                "\"UIInterfaceOrientationLandscapeRight UIInterfaceOrientationLandscapeLeft\"",
            ),
            (
                "multidirectional",
                "\"UIInterfaceOrientationPortrait UIInterfaceOrientationLandscapeRight\"",
            ),
            (
                "omnidirectional",
                "\"UIInterfaceOrientationPortrait UIInterfaceOrientationLandscapeRight UIInterfaceOrientationLandscapeLeft UIInterfaceOrientationPortraitUpsideDown\"",
            ),
        ];
        for (name, expected) in cases {
            assert_eq!(Orientation::from_name(name).plist_value(), expected);
        }
    }

    #[test]
    fn test_orientation_unknown_falls_back_to_landscape() {
        assert_eq!(
            Orientation::from_name("diagonal").plist_value(),
            "UIInterfaceOrientationLandscapeRight"
        );
    }

    #[test]
    fn test_config_deserialization() {
        let json = r#"{
            "name": "Demo Game",
            "short": "Demo",
            "camel": "DemoGame",
            "appid": "com.example.demo",
            "orientation": "portrait",
            "assets": "assets",
            "asset_list": [
                { "path": "textures", "kind": "folder" },
                { "path": "icon.png" }
            ],
            "source_tree": { "src": { "main.cpp": "all" } }
        }"#;

        let config: BuildConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.name().unwrap(), "Demo Game");
        assert_eq!(config.orientation().unwrap(), Orientation::Portrait);
        assert_eq!(config.asset_list.len(), 2);
        assert_eq!(config.asset_list[0].kind, AssetKind::Folder);
        assert_eq!(config.asset_list[1].kind, AssetKind::File);
        assert!(config.source_tree().unwrap().contains_key("src"));
    }

    #[test]
    fn test_is_source_file() {
        assert!(is_source_file("main.cpp"));
        assert!(is_source_file("bridge.mm"));
        assert!(!is_source_file("header.h"));
        assert!(!is_source_file("notes.txt"));
        assert!(!is_source_file("Makefile"));
    }
}
