//! XCForge Core Library
//!
//! This crate provides the core functionality for XCForge:
//! - Xcode project descriptor object model (parse, edit, re-serialize)
//! - Deterministic identifier generation
//! - Group-tree construction from configured file trees
//! - Cross-reference assembly (retargeting, orientation, population)
//! - Project skeleton staging and scheme patching

pub mod assembler;
pub mod config;
pub mod filetree;
pub mod path_utils;
pub mod pbxproj;
pub mod schemes;
pub mod skeleton;
pub mod uuids;

// Re-export commonly used types
pub use assembler::{Assembler, TARGET_ID};
pub use config::{
    is_source_file, AssetEntry, AssetKind, BuildConfig, ConfigError, Orientation, SOURCE_EXT,
};
pub use filetree::{build_groups, ChildKind, ChildRef, FileTree, GroupNode, GroupTable};
pub use path_utils::{path_to_posix, to_posix};
pub use pbxproj::{brace_parity, insert_entries, PbxError, Pbxproj, Section};
pub use schemes::{file_replace, update_schemes};
pub use skeleton::{remake_dir, stage_project};
pub use uuids::UuidService;
