//! Project skeleton staging
//!
//! Copies the engine's Xcode template, resource folder and framework
//! bundles into the build directory before the descriptor is rewritten.
//! Framework bundles contain symbolic links, so the copy preserves them
//! rather than following them.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::BuildConfig;

/// The sub-build folder for Apple projects.
pub const MAKE_DIR: &str = "apple";

/// Stage the Xcode project skeleton in the build directory.
///
/// Clears any previous Apple sub-build, then copies the template project
/// (renamed to the configured camel-case name), the shared resources, and
/// the engine's Apple frameworks. Returns the project bundle directory.
pub fn stage_project(config: &BuildConfig) -> Result<PathBuf> {
    config.require(&["root", "build", "camel", "engine"])?;

    let build = config.build()?;
    if !build.exists() {
        fs::create_dir_all(build).context("Failed to create build directory")?;
    }
    let build = remake_dir(build, MAKE_DIR)?;

    let engine = config.engine()?;
    let template = engine.join("templates").join("apple").join("app.xcodeproj");
    let project = build.join(format!("{}.xcodeproj", config.camel()?));
    copy_tree(&template, &project).context("Failed to copy project template")?;

    let resources = engine.join("templates").join("apple").join("Resources");
    copy_tree(&resources, &build.join("Resources")).context("Failed to copy resources")?;

    let frameworks = engine.join("vulkan").join("apple");
    copy_tree(&frameworks, &build.join("Frameworks")).context("Failed to copy frameworks")?;

    Ok(project)
}

/// Clear and recreate a subdirectory of `parent`.
pub fn remake_dir(parent: &Path, name: &str) -> Result<PathBuf> {
    let dir = parent.join(name);
    if dir.exists() {
        fs::remove_dir_all(&dir)
            .with_context(|| format!("Failed to clear {}", dir.display()))?;
    }
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    Ok(dir)
}

/// Recursively copy a directory tree, preserving symbolic links.
fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)
        .with_context(|| format!("Failed to create {}", dst.display()))?;

    for entry in fs::read_dir(src).with_context(|| format!("Failed to read {}", src.display()))? {
        let entry = entry?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        let kind = entry.file_type()?;

        if kind.is_symlink() {
            copy_link(&from, &to)?;
        } else if kind.is_dir() {
            copy_tree(&from, &to)?;
        } else {
            fs::copy(&from, &to)
                .with_context(|| format!("Failed to copy {}", from.display()))?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_link(from: &Path, to: &Path) -> Result<()> {
    let target = fs::read_link(from)
        .with_context(|| format!("Failed to read link {}", from.display()))?;
    std::os::unix::fs::symlink(&target, to)
        .with_context(|| format!("Failed to link {}", to.display()))?;
    Ok(())
}

#[cfg(not(unix))]
fn copy_link(from: &Path, to: &Path) -> Result<()> {
    // No symlink support; fall back to copying the link target's content
    fs::copy(from, to).with_context(|| format!("Failed to copy {}", from.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use tempfile::TempDir;

    fn engine_skeleton(dir: &Path) {
        let template = dir.join("templates").join("apple").join("app.xcodeproj");
        fs::create_dir_all(&template).unwrap();
        fs::write(template.join("project.pbxproj"), "// !$*UTF8*$!\n").unwrap();

        let schemes = template.join("xcshareddata").join("xcschemes");
        fs::create_dir_all(&schemes).unwrap();
        fs::write(schemes.join("app.xcscheme"), "<Scheme/>").unwrap();

        fs::create_dir_all(dir.join("templates").join("apple").join("Resources")).unwrap();
        fs::create_dir_all(dir.join("vulkan").join("apple")).unwrap();
    }

    fn config(root: &Path) -> BuildConfig {
        let mut config = BuildConfig::default();
        config.root = Some(root.to_path_buf());
        config.build = Some(root.join("build"));
        config.camel = Some("DemoGame".to_string());
        config.engine = Some(root.join("engine"));
        config
    }

    #[test]
    fn test_stage_project_copies_skeleton() {
        let temp = TempDir::new().unwrap();
        engine_skeleton(&temp.path().join("engine"));

        let config = config(temp.path());
        let project = stage_project(&config).unwrap();

        assert_eq!(
            project,
            temp.path().join("build").join("apple").join("DemoGame.xcodeproj")
        );
        assert!(project.join("project.pbxproj").is_file());
        assert!(temp.path().join("build").join("apple").join("Resources").is_dir());
        assert!(temp.path().join("build").join("apple").join("Frameworks").is_dir());
    }

    #[test]
    fn test_stage_project_clears_previous_build() {
        let temp = TempDir::new().unwrap();
        engine_skeleton(&temp.path().join("engine"));

        let stale = temp.path().join("build").join("apple").join("stale.txt");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "old").unwrap();

        let config = config(temp.path());
        stage_project(&config).unwrap();
        assert!(!stale.exists());
    }

    #[test]
    fn test_stage_project_requires_keys() {
        let temp = TempDir::new().unwrap();
        let mut config = config(temp.path());
        config.camel = None;

        let err = stage_project(&config).unwrap_err();
        let config_err = err.downcast_ref::<ConfigError>().unwrap();
        assert!(matches!(config_err, ConfigError::MissingKey("camel")));
        // Nothing was created before the validation failed
        assert!(!temp.path().join("build").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_tree_preserves_symlinks() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("real.txt"), "content").unwrap();
        std::os::unix::fs::symlink("real.txt", src.join("link.txt")).unwrap();

        let dst = temp.path().join("dst");
        copy_tree(&src, &dst).unwrap();

        let link = dst.join("link.txt");
        assert!(link.symlink_metadata().unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&link).unwrap(), PathBuf::from("real.txt"));
    }
}
