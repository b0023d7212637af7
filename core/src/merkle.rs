// Merkle root over transaction hashes
use crate::hash::Hash256;

use lattice_crypto::hash::sha256d;

/// Combine two nodes: `sha256d(left ‖ right)`.
fn combine(left: &Hash256, right: &Hash256) -> Hash256 {
    let mut buffer = [0u8; 64];
    buffer[..32].copy_from_slice(left.as_bytes());
    buffer[32..].copy_from_slice(right.as_bytes());
    Hash256(sha256d(&buffer))
}

/// Compute the Merkle root of an ordered hash list.
///
/// Pairs adjacent hashes left to right; a level with an odd count
/// duplicates its last element before pairing. The empty list maps to the
/// zero hash and a single hash is its own root.
pub fn merkle_root(hashes: &[Hash256]) -> Hash256 {
    if hashes.is_empty() {
        return Hash256::zero();
    }
    let mut level = hashes.to_vec();
    while level.len() > 1 {
        if level.len() % 2 != 0 {
            level.push(*level.last().unwrap());
        }
        level = level
            .chunks(2)
            .map(|pair| combine(&pair[0], &pair[1]))
            .collect();
    }
    level[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(byte: u8) -> Hash256 {
        Hash256([byte; 32])
    }

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(merkle_root(&[]), Hash256::zero());
    }

    #[test]
    fn test_single_hash_is_root() {
        assert_eq!(merkle_root(&[h(1)]), h(1));
    }

    #[test]
    fn test_pair_combines_once() {
        let mut h1 = [0u8; 32];
        h1[31] = 0x01;
        let mut h2 = [0u8; 32];
        h2[31] = 0x02;
        let root = merkle_root(&[Hash256(h1), Hash256(h2)]);

        let mut concat = [0u8; 64];
        concat[..32].copy_from_slice(&h1);
        concat[32..].copy_from_slice(&h2);
        assert_eq!(root, Hash256(sha256d(&concat)));
    }

    #[test]
    fn test_odd_count_duplicates_last() {
        // the last level entry pairs with itself
        assert_eq!(merkle_root(&[h(1), h(2), h(3)]), merkle_root(&[h(1), h(2), h(3), h(3)]));
    }

    #[test]
    fn test_duplication_is_per_level_not_global() {
        // appending the last element again changes a four-leaf tree
        assert_ne!(
            merkle_root(&[h(1), h(2), h(3), h(4)]),
            merkle_root(&[h(1), h(2), h(3), h(4), h(4)])
        );
    }

    #[test]
    fn test_order_matters() {
        assert_ne!(merkle_root(&[h(1), h(2)]), merkle_root(&[h(2), h(1)]));
    }

    #[test]
    fn test_two_identical_leaves() {
        let root = merkle_root(&[h(7), h(7)]);
        assert_eq!(root, combine(&h(7), &h(7)));
    }
}
