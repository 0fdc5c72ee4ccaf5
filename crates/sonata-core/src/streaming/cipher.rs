//! Block cipher seam for the stripe cipher (§4.5, §1 non-goal: "the
//! block-cipher decryption primitive ... treated as a streaming filter with
//! a fixed block pattern"). [`PlaceholderCipher`] is a documented stand-in a
//! real external crypto adapter replaces; the stripe bookkeeping in
//! [`super::stripe`] doesn't change when it does.

use sha2::{Digest, Sha256};

/// Decrypts a single fixed-size block given the track id the stream belongs
/// to. A real adapter derives a genuine content key from the catalog's key
/// material; this seam only needs to be deterministic per track id.
pub trait BlockCipher: Send + Sync {
    fn decrypt_block(&self, track_catalog_id: &str, block_index: u64, block: &mut [u8]);
}

/// Keystream XOR cipher keyed by SHA-256(track_catalog_id || block_index),
/// re-derived per block so seeking to an arbitrary block doesn't require
/// replaying every prior block's keystream.
pub struct PlaceholderCipher;

impl BlockCipher for PlaceholderCipher {
    fn decrypt_block(&self, track_catalog_id: &str, block_index: u64, block: &mut [u8]) {
        let keystream = derive_keystream(track_catalog_id, block_index, block.len());
        for (b, k) in block.iter_mut().zip(keystream.iter()) {
            *b ^= k;
        }
    }
}

/// Derives `len` bytes of keystream by repeatedly hashing
/// `SHA-256(track_catalog_id || block_index || counter)`, concatenating
/// digests until there's enough keystream for the block.
fn derive_keystream(track_catalog_id: &str, block_index: u64, len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len + Sha256::output_size());
    let mut counter: u32 = 0;
    while out.len() < len {
        let mut hasher = Sha256::new();
        hasher.update(track_catalog_id.as_bytes());
        hasher.update(block_index.to_be_bytes());
        hasher.update(counter.to_be_bytes());
        out.extend_from_slice(&hasher.finalize());
        counter += 1;
    }
    out.truncate(len);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decrypt_is_its_own_inverse() {
        let cipher = PlaceholderCipher;
        let original = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
        let mut block = original.clone();
        cipher.decrypt_block("3135556", 0, &mut block);
        assert_ne!(block, original);
        cipher.decrypt_block("3135556", 0, &mut block);
        assert_eq!(block, original);
    }

    #[test]
    fn different_track_ids_yield_different_keystreams() {
        let cipher = PlaceholderCipher;
        let mut a = vec![0u8; 16];
        let mut b = vec![0u8; 16];
        cipher.decrypt_block("track_a", 0, &mut a);
        cipher.decrypt_block("track_b", 0, &mut b);
        assert_ne!(a, b);
    }

    #[test]
    fn different_block_indices_yield_different_keystreams() {
        let cipher = PlaceholderCipher;
        let mut a = vec![0u8; 16];
        let mut b = vec![0u8; 16];
        cipher.decrypt_block("track_a", 0, &mut a);
        cipher.decrypt_block("track_a", 1, &mut b);
        assert_ne!(a, b);
    }

    #[test]
    fn is_deterministic_given_the_same_track_id_and_block_index() {
        let cipher = PlaceholderCipher;
        let mut a = vec![9u8; 32];
        let mut b = vec![9u8; 32];
        cipher.decrypt_block("3135556", 5, &mut a);
        cipher.decrypt_block("3135556", 5, &mut b);
        assert_eq!(a, b);
    }
}
