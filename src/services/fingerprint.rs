use sha2::{Digest, Sha256};

/// Identity of a forest's inputs. Equal fingerprints mean the forest can be reused.
pub fn forest_inputs(group_id: &str, set_names: &[String]) -> String {
    let mut hasher = Sha256::new();
    // Length prefixes keep ["ab"] and ["a", "b"] apart.
    hasher.update((group_id.len() as u64).to_le_bytes());
    hasher.update(group_id.as_bytes());
    for name in set_names {
        hasher.update((name.len() as u64).to_le_bytes());
        hasher.update(name.as_bytes());
    }
    hex::encode(hasher.finalize())
}
