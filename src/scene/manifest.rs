use crate::scene::registry::{ComponentRegistry, PropertySchema};
use serde::Serialize;
use siphasher::sip::SipHasher24;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::Path;
use thiserror::Error;

const STABLE_HASH_KEY_0: u64 = 0x5eed_0f0a_7e1e_c0de;
const STABLE_HASH_KEY_1: u64 = 0x0b5e_55ed_ba11_f00d;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to write manifest: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize manifest: {0}")]
    Json(#[from] serde_json::Error),
    #[error("components '{first}' and '{second}' share stable hash {hash:#018x}")]
    HashCollision {
        first: String,
        second: String,
        hash: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentManifestEntry {
    pub name: String,
    pub stable_hash: u64,
    pub properties: Vec<PropertySchema>,
}

impl ComponentManifestEntry {
    pub fn new(name: &str, properties: &[PropertySchema]) -> Self {
        Self {
            name: name.to_owned(),
            stable_hash: stable_component_hash(name),
            properties: properties.to_vec(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ComponentManifest {
    components: Vec<ComponentManifestEntry>,
}

/// One entry per registered component, sorted by name.
pub fn manifest_entries(registry: &ComponentRegistry) -> Vec<ComponentManifestEntry> {
    registry
        .iter()
        .map(|(name, definition)| ComponentManifestEntry::new(name, definition.schema()))
        .collect()
}

pub fn write_manifest_json(registry: &ComponentRegistry, path: &Path) -> Result<(), ManifestError> {
    let manifest = ComponentManifest {
        components: manifest_entries(registry),
    };
    let json = serde_json::to_vec_pretty(&manifest)?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)?;
    Ok(())
}

/// SipHash-2-4 of the component name with fixed keys, stable across builds.
pub fn stable_component_hash(name: &str) -> u64 {
    let mut hasher = SipHasher24::new_with_keys(STABLE_HASH_KEY_0, STABLE_HASH_KEY_1);
    name.hash(&mut hasher);
    hasher.finish()
}

pub fn check_hash_collisions(registry: &ComponentRegistry) -> Result<(), ManifestError> {
    let mut seen: HashMap<u64, String> = HashMap::new();
    for entry in manifest_entries(registry) {
        if let Some(first) = seen.get(&entry.stable_hash) {
            return Err(ManifestError::HashCollision {
                first: first.clone(),
                second: entry.name,
                hash: entry.stable_hash,
            });
        }
        seen.insert(entry.stable_hash, entry.name);
    }
    Ok(())
}
