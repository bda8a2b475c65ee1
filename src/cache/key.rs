//! Cache key generation using SHA-256 hashes

use sha2::{Digest, Sha256};

/// Generate a deterministic cache key from an endpoint and its parameters.
///
/// The key is a SHA-256 hash of the endpoint and the sorted parameters, so
/// parameter order does not matter. Each endpoint gets its own key space.
/// Every field is length-prefixed, so no key or value can be confused with
/// its neighbours whatever characters it contains.
pub fn cache_key(endpoint: &str, params: &[(&str, &str)]) -> String {
    let mut hasher = Sha256::new();

    update_field(&mut hasher, endpoint);

    let mut sorted_params: Vec<_> = params.iter().collect();
    sorted_params.sort_by_key(|(k, _)| *k);

    for (k, v) in sorted_params {
        update_field(&mut hasher, k);
        update_field(&mut hasher, v);
    }

    format!("{}:{:x}", endpoint, hasher.finalize())
}

fn update_field(hasher: &mut Sha256, field: &str) {
    hasher.update((field.len() as u64).to_le_bytes());
    hasher.update(field.as_bytes());
}
