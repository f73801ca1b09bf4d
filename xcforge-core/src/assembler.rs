//! Cross-reference assembly for the project descriptor
//!
//! One logical file appears, consistently identified, in up to four
//! descriptor sections: its file reference, its parent group's child list,
//! a build-file entry, and a build phase's file list. This module performs
//! the coordinated edits that keep those sections consistent: placeholder
//! retargeting, orientation assignment, and asset/source population.
//!
//! Edits are anchor-driven text rewrites on opaque object blocks. A missing
//! splice anchor is a soft failure: the splice is skipped with a warning and
//! the rest of the assembly proceeds, since optional platform targets may
//! legitimately lack certain build phases. Placeholder tokens absent from an
//! object are plain no-ops.

use tracing::warn;

use crate::config::{is_source_file, AssetKind, BuildConfig, ConfigError};
use crate::filetree::{build_groups, ChildKind, ChildRef, FileTree};
use crate::path_utils::{path_to_posix, to_posix};
use crate::pbxproj::{insert_entries, Pbxproj, Section};
use crate::uuids::UuidService;

/// Native target identifier unique to the shipped template project.
pub const TARGET_ID: &str = "EB0F3C9527FB9DCB0037CC66";

/// Internal tag naming the template's application target.
const TARGET_TAG: &str = "main-app";

/// File name of the engine sub-project referenced by the template.
const ENGINE_PROJECT: &str = "engineapp.xcodeproj";

/// Path from the engine root to its prebuilt Apple project.
const ENGINE_PROJECT_DIR: &str = "buildfiles/apple";

/// Indentation of build-setting list entries.
const SETTING_INDENT: &str = "\t\t\t\t\t";

/// Applies the configuration to a parsed descriptor.
pub struct Assembler<'a> {
    config: &'a BuildConfig,
    uuids: UuidService,
}

impl<'a> Assembler<'a> {
    pub fn new(config: &'a BuildConfig, uuids: UuidService) -> Self {
        Self { config, uuids }
    }

    /// Replace the template's placeholder tokens with configured values.
    ///
    /// The placeholders are mostly directories that must reflect the build
    /// location, plus the bundle identifier, display name and internal
    /// target tag. One token table is applied across all sections; a token
    /// absent from an object is left untouched.
    pub fn retarget(&self, pbx: &mut Pbxproj) -> Result<(), ConfigError> {
        self.config.require(&[
            "name",
            "short",
            "appid",
            "assets",
            "build_to_root",
            "build_to_engine",
            "source_tree",
        ])?;

        let table = self.token_table()?;
        for section in Section::ALL {
            for obj in pbx.section_mut(section) {
                for (token, value) in &table {
                    if obj.contains(token.as_str()) {
                        *obj = obj.replace(token.as_str(), value);
                    }
                }
            }
        }

        self.retarget_engine_project(pbx)?;

        // The target tag doubles as ordinary text elsewhere, so its
        // replacement is restricted to the sections that define the target.
        let short = self.config.short()?.to_lowercase();
        for section in [Section::Project, Section::ConfigurationList, Section::NativeTarget] {
            for obj in pbx.section_mut(section) {
                if obj.contains(TARGET_TAG) {
                    *obj = obj.replace(TARGET_TAG, &short);
                }
            }
        }
        Ok(())
    }

    /// The ordered (token, replacement) table for this configuration.
    ///
    /// `__DISPLAY_NAME__.app` precedes the bare token so the suffixed form
    /// wins where both could match.
    fn token_table(&self) -> Result<Vec<(String, String)>, ConfigError> {
        let engine_dir = format!("../{}", path_to_posix(self.config.build_to_engine()?));
        let root_dir = format!("../{}", path_to_posix(self.config.build_to_root()?));
        let asset_dir = format!("{root_dir}/{}", path_to_posix(self.config.assets()?));
        let source_dir = self.source_dir(&root_dir)?;
        let name = self.config.name()?;

        let apple_token = format!("{SETTING_INDENT}__APPLE_INCLUDE__,\n");
        let apple_value: String = self
            .apple_includes()
            .iter()
            .map(|dir| format!("{SETTING_INDENT}\"$(SRCROOT)/../../{}\",\n", to_posix(dir)))
            .collect();

        Ok(vec![
            ("__ASSET_DIR__".to_string(), format!("\"{asset_dir}\"")),
            ("__SOURCE_DIR__".to_string(), format!("\"{source_dir}\"")),
            (
                "__ENGINE_INCLUDE__".to_string(),
                format!("\"$(SRCROOT)/{engine_dir}/include\""),
            ),
            (
                "__VULKAN_INCLUDE__".to_string(),
                format!("\"$(SRCROOT)/{engine_dir}/vulkan/include\""),
            ),
            (apple_token, apple_value),
            ("__APP_ID__".to_string(), self.config.appid()?.to_string()),
            (
                "__DISPLAY_NAME__.app".to_string(),
                format!("\"{name}.app\""),
            ),
            ("__DISPLAY_NAME__".to_string(), format!("\"{name}\"")),
        ])
    }

    /// Include directories that apply to Apple builds.
    fn apple_includes(&self) -> Vec<String> {
        let mut dirs = Vec::new();
        for category in ["all", "apple"] {
            if let Some(extra) = self.config.include_dict.get(category) {
                dirs.extend(extra.iter().cloned());
            }
        }
        dirs
    }

    /// The directory displayed as the root of the source group.
    ///
    /// A source tree with a single top-level folder collapses into it, so
    /// the project does not show one redundant nesting level.
    fn source_dir(&self, root_dir: &str) -> Result<String, ConfigError> {
        let tree = self.config.source_tree()?;
        if tree.len() == 1 {
            if let Some((name, FileTree::Dir(_))) = tree.first() {
                return Ok(format!("{root_dir}/{}", to_posix(name)));
            }
        }
        Ok(root_dir.to_string())
    }

    /// Rewrite the engine sub-project reference to the configured location.
    fn retarget_engine_project(&self, pbx: &mut Pbxproj) -> Result<(), ConfigError> {
        let engine_dir = format!("../{}", path_to_posix(self.config.build_to_engine()?));
        for obj in pbx.section_mut(Section::FileReference) {
            if !obj.contains(ENGINE_PROJECT) {
                continue;
            }
            let Some(start) = obj.find("path") else {
                continue;
            };
            let Some(end) = obj[start..].find(';').map(|p| start + p) else {
                continue;
            };
            *obj = format!(
                "{}path = {engine_dir}/{ENGINE_PROJECT_DIR}/{ENGINE_PROJECT}{}",
                &obj[..start],
                &obj[end..]
            );
        }
        Ok(())
    }

    /// Assign the default orientation for mobile builds.
    ///
    /// Tablet and phone builds receive the same orientation. The launch
    /// and main storyboards switch to their portrait variants whenever the
    /// resolved orientation includes portrait.
    pub fn assign_orientation(&self, pbx: &mut Pbxproj) -> Result<(), ConfigError> {
        self.config.require(&["orientation"])?;
        let orientation = self.config.orientation()?.plist_value();
        let portrait = orientation.contains("Portrait");

        for obj in pbx.section_mut(Section::BuildConfiguration) {
            let mut changed = false;
            let lines: Vec<String> = obj
                .split('\n')
                .map(|line| {
                    if portrait && line.contains("INFOPLIST_KEY_UILaunchStoryboardName") {
                        changed = true;
                        "\t\t\t\tINFOPLIST_KEY_UILaunchStoryboardName = Portrait;".to_string()
                    } else if portrait && line.contains("INFOPLIST_KEY_UIMainStoryboardFile") {
                        changed = true;
                        "\t\t\t\tINFOPLIST_KEY_UIMainStoryboardFile = Portrait;".to_string()
                    } else if line.contains("INFOPLIST_KEY_UISupportedInterfaceOrientations_iPad") {
                        changed = true;
                        format!(
                            "\t\t\t\tINFOPLIST_KEY_UISupportedInterfaceOrientations_iPad = {orientation};"
                        )
                    } else if line.contains("INFOPLIST_KEY_UISupportedInterfaceOrientations_iPhone")
                    {
                        changed = true;
                        format!(
                            "\t\t\t\tINFOPLIST_KEY_UISupportedInterfaceOrientations_iPhone = {orientation};"
                        )
                    } else if line.contains("INFOPLIST_KEY_UISupportedInterfaceOrientations") {
                        changed = true;
                        format!(
                            "\t\t\t\tINFOPLIST_KEY_UISupportedInterfaceOrientations = {orientation};"
                        )
                    } else {
                        line.to_string()
                    }
                })
                .collect();
            if changed {
                *obj = lines.join("\n");
            }
        }
        Ok(())
    }

    /// Add the configured assets to the project.
    ///
    /// The asset folder itself is not added; its top-level entries are.
    /// Files are added directly, subfolders by reference. Each entry gets a
    /// file reference and a resources build-file, spliced into the asset
    /// group and the application target's resources build phase.
    pub fn populate_assets(&self, pbx: &mut Pbxproj) -> Result<(), ConfigError> {
        let resources_phase = find_phase_id(pbx, "/* Resources */");

        let mut children = Vec::new();
        let mut refs = Vec::new();
        for asset in &self.config.asset_list {
            let id = UuidService::apply_prefix(
                "AA",
                &self.uuids.get_uuid(&format!("ASSET://{}", asset.path)),
            );
            let posix = to_posix(&asset.path);
            children.push(format!("{id} /* {} */,", asset.path));
            let entry = match asset.kind {
                AssetKind::File => format!(
                    "\t\t{id} /* {posix} */ = {{isa = PBXFileReference; path = {posix}; sourceTree = \"<group>\"; }};\n"
                ),
                AssetKind::Folder => format!(
                    "\t\t{id} /* {posix} */ = {{isa = PBXFileReference; lastKnownFileType = folder; path = {posix}; sourceTree = \"<group>\"; }};\n"
                ),
            };
            pbx.section_mut(Section::FileReference).push(entry);

            let build_id =
                UuidService::apply_prefix("AB", &self.uuids.get_uuid(&format!("BUILD://{id}")));
            pbx.section_mut(Section::BuildFile).push(format!(
                "\t\t{build_id} /* {posix} in Resources */ = {{isa = PBXBuildFile; fileRef = {id} /* {posix} */; }};\n"
            ));
            refs.push(format!("{build_id} /* {} in Resources */,", asset.path));
        }

        splice_group(pbx, "/* Assets */ =", &children);
        splice_phase(pbx, Section::ResourcesBuildPhase, resources_phase, &refs);
        Ok(())
    }

    /// Add the configured source tree to the project.
    ///
    /// Subdirectories become explicit groups. Leaves with a recognized
    /// source extension whose category tag covers Apple builds also get a
    /// sources build-file wired into the application target.
    pub fn populate_sources(&self, pbx: &mut Pbxproj) -> Result<(), ConfigError> {
        self.config.require(&["source_tree", "build_to_root"])?;
        let sources_phase = find_phase_id(pbx, "/* Sources */");

        let root_dir = format!("../{}", path_to_posix(self.config.build_to_root()?));
        let mut source_dir = root_dir;
        let mut tree = self.config.source_tree()?;
        if tree.len() == 1 {
            if let Some((name, FileTree::Dir(sub))) = tree.first() {
                source_dir = format!("{source_dir}/{}", to_posix(name));
                tree = sub;
            }
        }

        let (root_id, table) = build_groups(&source_dir, tree, &self.uuids);

        // Top-level children splice into the template's Source group
        let mut files: Vec<ChildRef> = Vec::new();
        let mut entries = Vec::new();
        for child in &table[&root_id].children {
            if child.kind != ChildKind::Group {
                files.push(child.clone());
            }
            entries.push(format!("{} /* {} */,", child.id, to_posix(&child.name)));
        }
        splice_group(pbx, "/* Source */ =", &entries);

        // Every non-root node becomes a new group object
        for (id, node) in &table {
            if id == &root_id {
                continue;
            }
            let mut text = format!(
                "\t\t{id} /* {} */ = {{\n\t\t\tisa = PBXGroup;\n\t\t\tchildren = (\n",
                node.label
            );
            for child in &node.children {
                if child.kind != ChildKind::Group {
                    files.push(child.clone());
                }
                text.push_str(&format!(
                    "\t\t\t\t{} /* {} */,\n",
                    child.id,
                    to_posix(&child.name)
                ));
            }
            text.push_str(&format!(
                "\t\t\t);\n\t\t\tpath = {};\n\t\t\tsourceTree = \"<group>\";\n\t\t}};\n",
                to_posix(&node.label)
            ));
            pbx.section_mut(Section::Group).push(text);
        }

        // File references for every leaf; build files for compiled sources
        let mut refs = Vec::new();
        for item in &files {
            let posix = to_posix(&item.name);
            pbx.section_mut(Section::FileReference).push(format!(
                "\t\t{} /* {posix} */ = {{isa = PBXFileReference; fileEncoding = 4; path = {posix}; sourceTree = \"<group>\"; }};\n",
                item.id
            ));

            let compiled = is_source_file(&item.name)
                && matches!(&item.kind, ChildKind::Tag(tag) if tag == "all" || tag == "apple");
            if compiled {
                let build_id = UuidService::apply_prefix(
                    "BB",
                    &self.uuids.get_uuid(&format!("BUILD://{}", item.id)),
                );
                pbx.section_mut(Section::BuildFile).push(format!(
                    "\t\t{build_id} /* {posix} in Sources */ = {{isa = PBXBuildFile; fileRef = {} /* {posix} */; }};\n",
                    item.id
                ));
                refs.push(format!("{build_id} /* {posix} in Sources */,"));
            }
        }

        splice_phase(pbx, Section::SourcesBuildPhase, sources_phase, &refs);
        Ok(())
    }
}

/// Scrape a build-phase identifier out of the application target's object.
///
/// The phase list inside a native target names each phase with a trailing
/// comment; the identifier is the token on the same line.
fn find_phase_id(pbx: &Pbxproj, marker: &str) -> Option<String> {
    for obj in pbx.section(Section::NativeTarget) {
        if !obj.contains(TARGET_ID) {
            continue;
        }
        if let Some(end) = obj.find(marker) {
            if let Some(start) = obj[..end].rfind('\n') {
                return Some(obj[start..end].trim().to_string());
            }
        }
    }
    None
}

/// Splice entries into the children of the group matching `anchor`.
fn splice_group(pbx: &mut Pbxproj, anchor: &str, entries: &[String]) {
    let mut spliced = false;
    for obj in pbx.section_mut(Section::Group) {
        if obj.contains(anchor) {
            *obj = insert_entries(obj, "children", entries);
            spliced = true;
        }
    }
    if !spliced {
        warn!(anchor, "group anchor not found; skipping splice");
    }
}

/// Splice entries into the file list of the build phase with the given id.
fn splice_phase(pbx: &mut Pbxproj, section: Section, phase: Option<String>, entries: &[String]) {
    let Some(phase) = phase else {
        warn!(
            section = section.marker_name(),
            "build phase missing for target; skipping splice"
        );
        return;
    };
    for obj in pbx.section_mut(section) {
        if obj.contains(&phase) {
            *obj = insert_entries(obj, "files", entries);
        }
    }
}
