// Memory-pool response record
use serde::{Deserialize, Serialize};

use lattice_core::Hash256;

/// Contents of the node's memory pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMemPool {
    pub height: u32,
    pub verified: Vec<Hash256>,
    #[serde(default)]
    pub unverified: Vec<Hash256>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_emit() {
        let json = r#"{
            "height": 5882071,
            "verified": [
                "0x0c65fbfd2598aee5f30cd18f1264b458f1db137c4a460f4a174facb3f2d59d06"
            ],
            "unverified": []
        }"#;
        let pool: RawMemPool = crate::models::parse(json).unwrap();
        assert_eq!(pool.height, 5_882_071);
        assert_eq!(pool.verified.len(), 1);
        assert!(pool.unverified.is_empty());

        let emitted = crate::models::emit(&pool).unwrap();
        let reparsed: RawMemPool = crate::models::parse(&emitted).unwrap();
        assert_eq!(reparsed, pool);
    }

    #[test]
    fn test_unverified_defaults_empty() {
        let json = r#"{"height": 1, "verified": []}"#;
        let pool: RawMemPool = crate::models::parse(json).unwrap();
        assert!(pool.unverified.is_empty());
    }

    #[test]
    fn test_malformed_hash_rejected() {
        let json = r#"{"height": 1, "verified": ["zz"]}"#;
        assert!(crate::models::parse::<RawMemPool>(json).is_err());
    }
}
