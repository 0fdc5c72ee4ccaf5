//! Stripe block bookkeeping (§4.5, glossary: "the partial-block encryption
//! scheme where only every K-th block is encrypted"). This is the part of
//! the streaming contract that's fully in scope: the block size and
//! every-K-th-block pattern never change regardless of which [`super::cipher::BlockCipher`]
//! is plugged in.

use super::cipher::BlockCipher;

/// Fixed block size the stream is divided into.
pub const BLOCK_SIZE: usize = 2048;

/// Every `STRIPE`-th block (0-indexed: blocks `STRIPE - 1`, `2*STRIPE - 1`, ...)
/// is encrypted; the rest pass through unchanged.
pub const STRIPE: u64 = 3;

/// Whether `block_index` (0-based) is one of the encrypted blocks.
pub fn is_encrypted_block(block_index: u64) -> bool {
    (block_index + 1) % STRIPE == 0
}

/// Decrypts `block` in place if it's a stripe-encrypted block, else leaves it
/// untouched. `block` may be shorter than [`BLOCK_SIZE`] for the final block
/// of a stream.
pub fn process_block(cipher: &dyn BlockCipher, track_catalog_id: &str, block_index: u64, block: &mut [u8]) {
    if is_encrypted_block(block_index) {
        cipher.decrypt_block(track_catalog_id, block_index, block);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streaming::cipher::PlaceholderCipher;

    #[test]
    fn every_third_block_is_encrypted() {
        let expected = [false, false, true, false, false, true, false, false, true];
        for (i, exp) in expected.iter().enumerate() {
            assert_eq!(is_encrypted_block(i as u64), *exp, "block {i}");
        }
    }

    #[test]
    fn passthrough_blocks_are_untouched() {
        let cipher = PlaceholderCipher;
        let original = vec![42u8; BLOCK_SIZE];
        let mut block = original.clone();
        process_block(&cipher, "3135556", 0, &mut block);
        assert_eq!(block, original);
    }

    #[test]
    fn encrypted_blocks_are_transformed() {
        let cipher = PlaceholderCipher;
        let original = vec![42u8; BLOCK_SIZE];
        let mut block = original.clone();
        process_block(&cipher, "3135556", 2, &mut block);
        assert_ne!(block, original);
    }

    #[test]
    fn final_short_block_is_handled() {
        let cipher = PlaceholderCipher;
        let mut block = vec![1u8; 17];
        process_block(&cipher, "3135556", 2, &mut block);
        assert_eq!(block.len(), 17);
    }
}
