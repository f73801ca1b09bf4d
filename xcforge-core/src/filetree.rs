//! Source/asset tree representation and group construction
//!
//! Xcode displays files inside virtual directories called groups. Each group
//! needs a unique identifier and a child list wiring it into a tree. This
//! module converts the configured file tree into a flat table of group and
//! file nodes connected by deterministic identifiers, which the assembler
//! then folds into new descriptor objects.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::uuids::UuidService;

/// One node of the configured source or asset hierarchy.
///
/// Folders map path segment names to sub-trees; leaves carry a category tag
/// naming which build target(s) the file belongs to (`all`, `apple`,
/// `macos`, ...). The tree is read-only input and preserves the order its
/// entries were written in.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FileTree {
    /// Category tag for a leaf file
    Leaf(String),
    /// Sub-tree for a folder
    Dir(IndexMap<String, FileTree>),
}

/// What a child reference points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildKind {
    /// A nested group
    Group,
    /// A leaf file, annotated with its category tag
    Tag(String),
}

/// One child of a group node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildRef {
    /// Identifier of the child object
    pub id: String,
    /// Display name (one path segment)
    pub name: String,
    pub kind: ChildKind,
}

/// A group and its ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupNode {
    /// Group label; empty for the root until the caller relabels it
    pub label: String,
    pub children: Vec<ChildRef>,
}

/// Flat table of groups keyed by identifier, in insertion order.
///
/// The table is embedded verbatim into generated descriptor text, so its
/// iteration order is part of the determinism guarantee.
pub type GroupTable = IndexMap<String, GroupNode>;

/// Build the group table for a file tree rooted at `path`.
///
/// Returns the root group's identifier together with the table. Folder
/// identifiers derive from `GROUP://<sub-path>` with a `CD` tag, file
/// identifiers from `FILE://<full-path>` with a `BA` tag. Child order
/// preserves the tree's own iteration order; no sorting is performed, so
/// two invocations with identical inputs yield a byte-identical table.
pub fn build_groups(
    path: &str,
    tree: &IndexMap<String, FileTree>,
    uuids: &UuidService,
) -> (String, GroupTable) {
    let root = UuidService::apply_prefix("CD", &uuids.get_uuid(&format!("GROUP://{path}")));

    let mut children = Vec::new();
    let mut table = GroupTable::new();
    // Reserve the root slot first so descendants follow it in order
    table.insert(
        root.clone(),
        GroupNode {
            label: String::new(),
            children: Vec::new(),
        },
    );

    for (name, node) in tree {
        match node {
            FileTree::Dir(sub) => {
                let (sub_root, sub_table) = build_groups(&format!("{path}/{name}"), sub, uuids);
                children.push(ChildRef {
                    id: sub_root.clone(),
                    name: name.clone(),
                    kind: ChildKind::Group,
                });
                for (key, mut entry) in sub_table {
                    // The sub-table's own root gets its label here; its
                    // descendants are carried over untouched.
                    if key == sub_root {
                        entry.label = name.clone();
                    }
                    table.insert(key, entry);
                }
            }
            FileTree::Leaf(tag) => {
                let id = UuidService::apply_prefix(
                    "BA",
                    &uuids.get_uuid(&format!("FILE://{path}/{name}")),
                );
                children.push(ChildRef {
                    id,
                    name: name.clone(),
                    kind: ChildKind::Tag(tag.clone()),
                });
            }
        }
    }

    if let Some(node) = table.get_mut(&root) {
        node.children = children;
    }
    (root, table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(json: &str) -> IndexMap<String, FileTree> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_filetree_deserialization() {
        let tree = tree(r#"{ "src": { "a.cpp": "all", "lib": { "b.cpp": "apple" } } }"#);
        let FileTree::Dir(src) = &tree["src"] else {
            panic!("src should be a folder");
        };
        assert!(matches!(&src["a.cpp"], FileTree::Leaf(tag) if tag == "all"));
        assert!(matches!(&src["lib"], FileTree::Dir(_)));
    }

    #[test]
    fn test_build_groups_structure() {
        let uuids = UuidService::new("test");
        let tree = tree(r#"{ "a.cpp": "all", "lib": { "b.cpp": "apple" }, "c.cpp": "macos" }"#);
        let (root, table) = build_groups("../../src", &tree, &uuids);

        // One root plus one group per folder
        assert_eq!(table.len(), 2);
        let root_node = &table[&root];
        assert_eq!(root_node.children.len(), 3);
        assert_eq!(root_node.children[0].kind, ChildKind::Tag("all".to_string()));
        assert_eq!(root_node.children[1].kind, ChildKind::Group);
        assert_eq!(root_node.children[2].kind, ChildKind::Tag("macos".to_string()));

        // The sub-group is relabeled with its folder name and keeps its leaf
        let lib_id = &root_node.children[1].id;
        assert_eq!(table[lib_id].label, "lib");
        assert_eq!(table[lib_id].children.len(), 1);
        assert_eq!(table[lib_id].children[0].name, "b.cpp");
    }

    #[test]
    fn test_build_groups_counts() {
        // N leaves and M non-root folders yield N file refs and M group refs
        let uuids = UuidService::new("test");
        let tree = tree(
            r#"{ "a.cpp": "all", "sub": { "b.cpp": "all", "deep": { "c.cpp": "all" } }, "d.h": "all" }"#,
        );
        let (root, table) = build_groups("src", &tree, &uuids);

        let mut files = 0;
        let mut groups = 0;
        for node in table.values() {
            for child in &node.children {
                match child.kind {
                    ChildKind::Group => groups += 1,
                    ChildKind::Tag(_) => files += 1,
                }
            }
        }
        assert_eq!(files, 4);
        assert_eq!(groups, 2);

        // Every non-root group appears exactly once as a key and once as a child
        for key in table.keys() {
            if key == &root {
                continue;
            }
            let referenced = table
                .values()
                .flat_map(|n| &n.children)
                .filter(|c| &c.id == key)
                .count();
            assert_eq!(referenced, 1, "group {key} should have one parent");
        }
    }

    #[test]
    fn test_build_groups_identifier_prefixes() {
        let uuids = UuidService::new("test");
        let tree = tree(r#"{ "lib": { "b.cpp": "apple" } }"#);
        let (root, table) = build_groups("src", &tree, &uuids);

        assert!(root.starts_with("CD"));
        for (key, node) in &table {
            assert!(key.starts_with("CD"));
            for child in &node.children {
                match child.kind {
                    ChildKind::Group => assert!(child.id.starts_with("CD")),
                    ChildKind::Tag(_) => assert!(child.id.starts_with("BA")),
                }
            }
        }
    }

    #[test]
    fn test_build_groups_deterministic() {
        let json = r#"{ "a.cpp": "all", "lib": { "b.cpp": "apple", "c.cpp": "all" } }"#;
        let first = build_groups("src", &tree(json), &UuidService::new("salt"));
        let second = build_groups("src", &tree(json), &UuidService::new("salt"));
        assert_eq!(first, second);
    }
}
