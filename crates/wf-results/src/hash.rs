//! Content fingerprints for requests and results.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::ResultsResult;

/// SHA-256 of the compact JSON encoding, as lowercase hex.
///
/// Maps in the solve types are ordered, so equal values hash equally.
pub fn fingerprint<T: Serialize + ?Sized>(value: &T) -> ResultsResult<String> {
    let bytes = serde_json::to_vec(value)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn stable_and_sensitive() {
        let mut a = BTreeMap::new();
        a.insert("M1", 1.5);
        a.insert("P1", 3.0);
        let mut b = BTreeMap::new();
        b.insert("P1", 3.0);
        b.insert("M1", 1.5);

        let ha = fingerprint(&a).unwrap();
        assert_eq!(ha, fingerprint(&b).unwrap());
        assert_eq!(ha.len(), 64);

        b.insert("P1", 3.1);
        assert_ne!(ha, fingerprint(&b).unwrap());
    }
}
