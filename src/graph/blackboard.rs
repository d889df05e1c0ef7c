//! Insertion-ordered name-to-handle map passes use to exchange handles without
//! threading them through shared state by hand.

use crate::graph::handle::ResourceHandle;

/// Frame-lifetime, write-once-with-overwrite map from resource name to
/// [`ResourceHandle`]. A later `add` for a name already present overwrites the
/// handle but keeps the name's original insertion position, so iteration order
/// reflects first-write order regardless of how many times a name is updated.
#[derive(Debug, Default)]
pub struct Blackboard {
    entries: Vec<(u64, String, ResourceHandle)>,
}

impl Blackboard {
    pub fn new() -> Self {
        Blackboard {
            entries: Vec::new(),
        }
    }

    /// Hash used to key entries, exposed so callers can check for accidental
    /// collisions between distinct names.
    pub fn hash_name(name: &str) -> u64 {
        // FNV-1a 64-bit.
        let mut hash: u64 = 0xcbf29ce484222325;
        for byte in name.as_bytes() {
            hash ^= *byte as u64;
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
        }
        hash
    }

    /// Record `handle` under `name`, overwriting any previous handle for that
    /// name.
    pub fn add(&mut self, name: &str, handle: ResourceHandle) {
        let key = Self::hash_name(name);
        match self.entries.iter_mut().find(|(existing, _, _)| *existing == key) {
            Some(entry) => entry.2 = handle,
            None => self.entries.push((key, name.to_string(), handle)),
        }
    }

    /// Look up the handle last recorded under `name`.
    pub fn get(&self, name: &str) -> Option<ResourceHandle> {
        let key = Self::hash_name(name);
        self.entries.iter().find(|(existing, _, _)| *existing == key).map(|(_, _, handle)| *handle)
    }

    /// Clear every entry. Called when the owning graph is reset for the next frame.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate entries in first-write order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ResourceHandle)> {
        self.entries.iter().map(|(_, name, handle)| (name.as_str(), *handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::handle::ResourceId;

    fn handle(id: usize) -> ResourceHandle {
        ResourceHandle::new(ResourceId(id))
    }

    #[test]
    fn overwrite_keeps_insertion_order() {
        let mut board = Blackboard::new();
        board.add("scene_color", handle(0));
        board.add("scene_depth", handle(1));
        board.add("scene_color", handle(2));

        let names: Vec<&str> = board.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["scene_color", "scene_depth"]);
        assert_eq!(board.get("scene_color"), Some(handle(2)));
    }

    #[test]
    fn unknown_name_resolves_to_nothing() {
        let board = Blackboard::new();
        assert_eq!(board.get("nope"), None);
    }

    #[test]
    fn distinct_names_do_not_collide() {
        let names = ["scene_color", "scene_depth", "gbuffer_normal", "gbuffer_albedo", "shadow_map", "ao_buffer"];
        let mut hashes: Vec<u64> = names.iter().map(|name| Blackboard::hash_name(name)).collect();
        hashes.sort_unstable();
        hashes.dedup();
        assert_eq!(hashes.len(), names.len());
    }
}
