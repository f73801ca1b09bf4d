//! Scheme file patching
//!
//! Schemes are separate XML files inside the project bundle, not part of
//! the descriptor. They are patched by plain text substitution and renamed
//! to match the configured application name.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::BuildConfig;

/// Replace every occurrence of each token in a text file.
pub fn file_replace(path: &Path, context: &[(&str, &str)]) -> Result<()> {
    let mut text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    for (token, value) in context {
        text = text.replace(token, value);
    }
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Update the shared schemes to match the new application name.
///
/// The scheme management plist always gets the renamed target. The scheme
/// itself is renamed and patched when Apple is among the configured
/// targets, and removed otherwise.
pub fn update_schemes(config: &BuildConfig, project: &Path) -> Result<()> {
    config.require(&["short", "name", "camel"])?;

    let schemes = project.join("xcshareddata").join("xcschemes");
    let short = config.short()?.to_lowercase();

    let management = schemes.join("xcschememanagement.plist");
    file_replace(&management, &[("main-app", &short)])?;

    let src = schemes.join("app.xcscheme");
    if config.targets.iter().any(|t| t == "apple") {
        let dst = schemes.join(format!("{short}.xcscheme"));
        fs::rename(&src, &dst).context("Failed to rename scheme")?;
        let container = format!("container:{}.xcodeproj", config.camel()?);
        file_replace(
            &dst,
            &[
                ("__DISPLAY_NAME__", config.name()?),
                ("main-app", &short),
                ("container:app.xcodeproj", &container),
            ],
        )?;
    } else {
        fs::remove_file(&src).context("Failed to remove scheme")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn scheme_skeleton(project: &Path) {
        let schemes = project.join("xcshareddata").join("xcschemes");
        fs::create_dir_all(&schemes).unwrap();
        fs::write(
            schemes.join("xcschememanagement.plist"),
            "<key>main-app.xcscheme</key>",
        )
        .unwrap();
        fs::write(
            schemes.join("app.xcscheme"),
            "BuildableName = \"__DISPLAY_NAME__.app\" ReferencedContainer = \"container:app.xcodeproj\" BlueprintName = \"main-app\"",
        )
        .unwrap();
    }

    fn config() -> BuildConfig {
        let mut config = BuildConfig::default();
        config.name = Some("Demo Game".to_string());
        config.short = Some("Demo".to_string());
        config.camel = Some("DemoGame".to_string());
        config.targets = vec!["apple".to_string()];
        config
    }

    #[test]
    fn test_update_schemes_renames_and_patches() {
        let temp = TempDir::new().unwrap();
        scheme_skeleton(temp.path());

        update_schemes(&config(), temp.path()).unwrap();

        let schemes = temp.path().join("xcshareddata").join("xcschemes");
        assert!(!schemes.join("app.xcscheme").exists());
        let patched = fs::read_to_string(schemes.join("demo.xcscheme")).unwrap();
        assert!(patched.contains("Demo Game.app"));
        assert!(patched.contains("container:DemoGame.xcodeproj"));
        assert!(patched.contains("BlueprintName = \"demo\""));

        let management =
            fs::read_to_string(schemes.join("xcschememanagement.plist")).unwrap();
        assert!(management.contains("demo.xcscheme"));
    }

    #[test]
    fn test_update_schemes_removes_unused_scheme() {
        let temp = TempDir::new().unwrap();
        scheme_skeleton(temp.path());

        let mut config = config();
        config.targets = vec!["macos".to_string()];
        update_schemes(&config, temp.path()).unwrap();

        let schemes = temp.path().join("xcshareddata").join("xcschemes");
        assert!(!schemes.join("app.xcscheme").exists());
        assert!(!schemes.join("demo.xcscheme").exists());
    }

    #[test]
    fn test_file_replace() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("file.txt");
        fs::write(&path, "one two one").unwrap();

        file_replace(&path, &[("one", "1"), ("two", "2")]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "1 2 1");
    }
}
