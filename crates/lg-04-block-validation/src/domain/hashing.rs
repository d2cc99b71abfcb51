//! # Block Hashing and Signing
//!
//! Hash: SHA-256 hex of [`Block::canonical_content`].
//! Signature: Ed25519 over the same bytes, hex-encoded.

use shared_crypto::{sha256_hex, Ed25519KeyPair};
use shared_types::Block;

/// Recompute the hash of `block` from its content.
pub fn compute_block_hash(block: &Block) -> String {
    sha256_hex(block.canonical_content().as_bytes())
}

/// Fill in `hash`, `signer_public_key` and `signature` for `block`.
pub fn seal_block(block: &mut Block, keypair: &Ed25519KeyPair) {
    block.signer_public_key = keypair.public_key().to_hex();
    let content = block.canonical_content();
    block.hash = sha256_hex(content.as_bytes());
    block.signature = keypair.sign(content.as_bytes()).to_hex();
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use shared_crypto::signatures::verify_hex;

    fn unsigned(number: u64) -> Block {
        Block {
            block_number: number,
            timestamp: DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
            previous_hash: "0".into(),
            data: "payload".into(),
            hash: String::new(),
            signature: String::new(),
            signer_public_key: String::new(),
            is_encrypted: false,
            manual_keywords: vec![],
            auto_keywords: vec![],
            content_category: None,
            off_chain_data: None,
        }
    }

    #[test]
    fn test_seal_produces_verifiable_signature() {
        let keypair = Ed25519KeyPair::from_seed([3u8; 32]);
        let mut block = unsigned(1);
        seal_block(&mut block, &keypair);

        assert_eq!(block.hash.len(), 64);
        assert_eq!(block.hash, compute_block_hash(&block));
        assert!(verify_hex(
            &block.signer_public_key,
            block.canonical_content().as_bytes(),
            &block.signature
        )
        .is_ok());
    }

    #[test]
    fn test_hash_covers_every_field() {
        let keypair = Ed25519KeyPair::from_seed([3u8; 32]);
        let mut block = unsigned(1);
        seal_block(&mut block, &keypair);
        let original = block.hash.clone();

        let mut changed = block.clone();
        changed.data.push('!');
        assert_ne!(compute_block_hash(&changed), original);

        let mut changed = block.clone();
        changed.block_number = 2;
        assert_ne!(compute_block_hash(&changed), original);

        let mut changed = block.clone();
        changed.timestamp = DateTime::from_timestamp_millis(1_700_000_000_001).unwrap();
        assert_ne!(compute_block_hash(&changed), original);

        let mut changed = block;
        changed.previous_hash = "1".into();
        assert_ne!(compute_block_hash(&changed), original);
    }
}
