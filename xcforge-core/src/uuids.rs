//! Deterministic identifier generation
//!
//! Xcode cross-references every object in a project descriptor by a
//! 24-character hex identifier. Because generated identifiers are embedded
//! verbatim in the descriptor text, regenerating a project must reproduce
//! them byte for byte. Identifiers are therefore content-addressed: a
//! UUIDv5 over (key, per-run salt) rather than anything random or
//! time-based.

use uuid::Uuid;

/// Identifier generator seeded with a per-run salt.
///
/// The same (salt, key) pair always yields the same identifier, across
/// calls and across process restarts.
#[derive(Debug, Clone)]
pub struct UuidService {
    namespace: Uuid,
}

impl UuidService {
    /// Create a service whose identifiers are namespaced by `salt`.
    pub fn new(salt: &str) -> Self {
        Self {
            namespace: Uuid::new_v5(&Uuid::NAMESPACE_OID, salt.as_bytes()),
        }
    }

    /// Return the 24-character uppercase hex identifier for `key`.
    pub fn get_uuid(&self, key: &str) -> String {
        let id = Uuid::new_v5(&self.namespace, key.as_bytes());
        let mut hex = id.simple().to_string().to_uppercase();
        hex.truncate(24);
        hex
    }

    /// Replace the two leading characters of `id` with a namespace tag.
    ///
    /// Tags keep identifiers of different kinds (groups, file references,
    /// build files) from colliding even if their keys ever did.
    pub fn apply_prefix(prefix: &str, id: &str) -> String {
        debug_assert_eq!(prefix.len(), 2, "prefix must be exactly two characters");
        format!("{}{}", prefix, &id[prefix.len()..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_uuid_shape() {
        let svc = UuidService::new("com.example.demo");
        let id = svc.get_uuid("FILE://src/main.cpp");
        assert_eq!(id.len(), 24);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn test_uuid_idempotent() {
        let svc = UuidService::new("com.example.demo");
        assert_eq!(svc.get_uuid("GROUP://src"), svc.get_uuid("GROUP://src"));

        // A fresh service with the same salt reproduces the identifier
        let other = UuidService::new("com.example.demo");
        assert_eq!(svc.get_uuid("GROUP://src"), other.get_uuid("GROUP://src"));
    }

    #[test]
    fn test_uuid_distinct_keys() {
        let svc = UuidService::new("com.example.demo");
        let keys = [
            "FILE://src/a.cpp",
            "FILE://src/b.cpp",
            "FILE://src/lib/a.cpp",
            "GROUP://src",
            "GROUP://src/lib",
            "ASSET://textures",
        ];
        let ids: HashSet<String> = keys.iter().map(|k| svc.get_uuid(k)).collect();
        assert_eq!(ids.len(), keys.len());
    }

    #[test]
    fn test_salt_changes_identifiers() {
        let a = UuidService::new("com.example.demo");
        let b = UuidService::new("com.example.other");
        assert_ne!(a.get_uuid("FILE://src/a.cpp"), b.get_uuid("FILE://src/a.cpp"));
    }

    #[test]
    fn test_apply_prefix() {
        let svc = UuidService::new("salt");
        let id = svc.get_uuid("GROUP://src");
        let tagged = UuidService::apply_prefix("CD", &id);
        assert_eq!(tagged.len(), 24);
        assert!(tagged.starts_with("CD"));
        assert_eq!(&tagged[2..], &id[2..]);
    }
}
