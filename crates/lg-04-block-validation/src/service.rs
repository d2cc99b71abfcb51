//! # Standard Block Validator
//!
//! Implements [`BlockValidator`] against a [`KeyRegistry`]. Every check is
//! computed independently; the error message names the first failure.

use crate::domain::hashing::compute_block_hash;
use crate::domain::result::{BlockValidationResult, SignerStatus};
use crate::ports::inbound::BlockValidator;
use lg_02_key_registry::KeyRegistry;
use shared_crypto::signatures::verify_hex;
use shared_types::{Block, GENESIS_NUMBER, GENESIS_PREVIOUS_HASH, GENESIS_SIGNER};
use std::sync::Arc;

/// Validator backed by the signer registry.
pub struct StandardBlockValidator {
    registry: Arc<dyn KeyRegistry>,
}

impl StandardBlockValidator {
    pub fn new(registry: Arc<dyn KeyRegistry>) -> Self {
        Self { registry }
    }

    fn signer_status(&self, block: &Block) -> SignerStatus {
        if is_genesis_signer(block) {
            return SignerStatus::Genesis;
        }
        match self.registry.find_by_public_key(&block.signer_public_key) {
            Ok(Some(key)) if key.active => SignerStatus::Active {
                owner: key.owner_name,
            },
            Ok(Some(key)) => SignerStatus::Revoked {
                owner: key.owner_name,
            },
            Ok(None) => SignerStatus::Unknown,
            Err(e) => {
                tracing::warn!(
                    "[lg-04] Registry lookup failed for block {}: {}",
                    block.block_number,
                    e
                );
                SignerStatus::LookupFailed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// Genesis carries the sentinel signer and no signature.
fn is_genesis_signer(block: &Block) -> bool {
    block.block_number == GENESIS_NUMBER
        && block.signer_public_key == GENESIS_SIGNER
        && block.signature.is_empty()
}

impl BlockValidator for StandardBlockValidator {
    fn validate_block(&self, block: &Block, previous: Option<&Block>) -> BlockValidationResult {
        let mut messages: Vec<String> = Vec::new();

        let previous_hash_valid = match previous {
            Some(prev) => block.previous_hash == prev.hash,
            None => block.previous_hash == GENESIS_PREVIOUS_HASH,
        };
        if !previous_hash_valid {
            let expected = previous.map_or(GENESIS_PREVIOUS_HASH, |p| p.hash.as_str());
            messages.push(format!(
                "previous hash mismatch: expected {}, found {}",
                expected, block.previous_hash
            ));
        }

        let expected_number = previous.map_or(Some(GENESIS_NUMBER), |p| p.block_number.checked_add(1));
        let block_number_valid = expected_number == Some(block.block_number);
        if !block_number_valid {
            messages.push(format!(
                "block number mismatch: expected {}, found {}",
                expected_number.map_or_else(|| "none".to_string(), |n| n.to_string()),
                block.block_number
            ));
        }

        let hash_integrity_valid = compute_block_hash(block) == block.hash;
        if !hash_integrity_valid {
            messages.push("hash does not match block content".to_string());
        }

        let signature_valid = is_genesis_signer(block)
            || verify_hex(
                &block.signer_public_key,
                block.canonical_content().as_bytes(),
                &block.signature,
            )
            .is_ok();
        if !signature_valid {
            messages.push("signature does not verify against signer key".to_string());
        }

        let signer_status = self.signer_status(block);
        let authorized_key_valid =
            matches!(signer_status, SignerStatus::Genesis | SignerStatus::Active { .. });
        if !authorized_key_valid {
            messages.push(match &signer_status {
                SignerStatus::Revoked { owner } => format!("signer '{}' has been revoked", owner),
                SignerStatus::LookupFailed { reason } => format!("signer lookup failed: {}", reason),
                _ => "signer is not an authorized key".to_string(),
            });
        }

        let result = BlockValidationResult {
            block_number: block.block_number,
            previous_hash_valid,
            block_number_valid,
            hash_integrity_valid,
            signature_valid,
            authorized_key_valid,
            signer_status,
            error_message: messages.into_iter().next(),
        };

        if !result.is_valid() {
            tracing::debug!(
                "[lg-04] Block {} failed {:?}",
                block.block_number,
                result.failed_checks()
            );
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::hashing::seal_block;
    use chrono::{DateTime, Duration};
    use lg_02_key_registry::KvKeyRegistry;
    use shared_crypto::Ed25519KeyPair;
    use shared_storage::testing::FaultyKVStore;
    use shared_types::ValidationCheck;

    struct Fixture {
        registry: Arc<KvKeyRegistry>,
        validator: StandardBlockValidator,
        alice: Ed25519KeyPair,
        chain: Vec<Arc<Block>>,
    }

    fn genesis() -> Block {
        let mut block = Block {
            block_number: 0,
            timestamp: DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
            previous_hash: GENESIS_PREVIOUS_HASH.into(),
            data: String::new(),
            hash: String::new(),
            signature: String::new(),
            signer_public_key: GENESIS_SIGNER.into(),
            is_encrypted: false,
            manual_keywords: vec![],
            auto_keywords: vec![],
            content_category: None,
            off_chain_data: None,
        };
        block.hash = compute_block_hash(&block);
        block
    }

    fn next_block(prev: &Block, data: &str, signer: &Ed25519KeyPair) -> Block {
        let mut block = Block {
            block_number: prev.block_number + 1,
            timestamp: prev.timestamp + Duration::seconds(1),
            previous_hash: prev.hash.clone(),
            data: data.into(),
            ..genesis()
        };
        seal_block(&mut block, signer);
        block
    }

    fn fixture(blocks: usize) -> Fixture {
        let registry = Arc::new(KvKeyRegistry::new_in_memory());
        let alice = Ed25519KeyPair::from_seed([1u8; 32]);
        registry.add_key(&alice.public_key().to_hex(), "alice");

        let mut chain = vec![Arc::new(genesis())];
        for i in 0..blocks {
            let prev = Arc::clone(chain.last().unwrap());
            chain.push(Arc::new(next_block(&prev, &format!("entry {}", i), &alice)));
        }

        Fixture {
            validator: StandardBlockValidator::new(registry.clone()),
            registry,
            alice,
            chain,
        }
    }

    #[test]
    fn test_genesis_passes_all_checks() {
        let f = fixture(0);
        let result = f.validator.validate_block(&f.chain[0], None);
        assert!(result.is_valid(), "{:?}", result);
        assert_eq!(result.signer_status, SignerStatus::Genesis);
    }

    #[test]
    fn test_valid_chain_is_fully_compliant() {
        let f = fixture(3);
        let report = f.validator.validate_chain(&f.chain);

        assert!(report.is_structurally_intact);
        assert!(report.is_fully_compliant);
        assert_eq!(report.summary.total_blocks, 4);
        assert_eq!(report.summary.valid_blocks, 4);
    }

    #[test]
    fn test_every_check_is_reported_independently() {
        let f = fixture(1);
        let mut forged = (*f.chain[1]).clone();
        forged.previous_hash = "ff".repeat(32);
        forged.block_number = 7;

        let result = f.validator.validate_block(&forged, Some(&f.chain[0]));

        assert!(!result.previous_hash_valid);
        assert!(!result.block_number_valid);
        assert!(!result.hash_integrity_valid);
        assert!(!result.signature_valid);
        assert!(result.authorized_key_valid);
        assert_eq!(result.first_failure(), Some(ValidationCheck::PreviousHash));
        assert!(result.error_message.unwrap().contains("previous hash"));
    }

    #[test]
    fn test_resealed_tampering_breaks_signature_only_for_wrong_key() {
        let f = fixture(1);
        let mallory = Ed25519KeyPair::from_seed([9u8; 32]);

        let mut forged = (*f.chain[1]).clone();
        forged.data = "rewritten".into();
        seal_block(&mut forged, &mallory);
        let result = f.validator.validate_block(&forged, Some(&f.chain[0]));

        assert!(result.is_structurally_valid());
        assert!(result.signature_valid);
        assert!(!result.authorized_key_valid);
        assert_eq!(result.signer_status, SignerStatus::Unknown);
    }

    #[test]
    fn test_signature_from_other_key_fails() {
        let f = fixture(1);
        let mallory = Ed25519KeyPair::from_seed([9u8; 32]);

        let mut forged = (*f.chain[1]).clone();
        forged.signature = mallory.sign(forged.canonical_content().as_bytes()).to_hex();

        let result = f.validator.validate_block(&forged, Some(&f.chain[0]));
        assert!(result.hash_integrity_valid);
        assert!(!result.signature_valid);
    }

    #[test]
    fn test_malformed_signature_is_invalid_not_panic() {
        let f = fixture(1);
        let mut forged = (*f.chain[1]).clone();
        forged.signature = "not-hex".into();

        let result = f.validator.validate_block(&forged, Some(&f.chain[0]));
        assert!(!result.signature_valid);
    }

    #[test]
    fn test_revocation_keeps_structure_breaks_compliance() {
        let f = fixture(3);
        f.registry.revoke("alice");

        let report = f.validator.validate_chain(&f.chain);

        assert!(report.is_structurally_intact);
        assert!(!report.is_fully_compliant);
        assert_eq!(report.revoked_blocks, vec![1, 2, 3]);
        assert!(report.invalid_blocks.is_empty());
    }

    #[test]
    fn test_compliance_is_per_block() {
        let f = fixture(1);
        let bob = Ed25519KeyPair::from_seed([2u8; 32]);
        f.registry.add_key(&bob.public_key().to_hex(), "bob");

        let mut chain = f.chain.clone();
        let by_bob = next_block(&chain[1], "bob entry", &bob);
        chain.push(Arc::new(by_bob));
        let after = next_block(&chain[2], "alice again", &f.alice);
        chain.push(Arc::new(after));

        f.registry.revoke("bob");
        let report = f.validator.validate_chain(&chain);

        assert_eq!(report.revoked_blocks, vec![2]);
        assert_eq!(report.summary.valid_blocks, 3);
    }

    #[test]
    fn test_registry_failure_is_lookup_failed_not_unknown() {
        let (kv, switch) = FaultyKVStore::new();
        let registry = Arc::new(KvKeyRegistry::new(Box::new(kv)));
        let alice = Ed25519KeyPair::from_seed([1u8; 32]);
        registry.add_key(&alice.public_key().to_hex(), "alice");
        let validator = StandardBlockValidator::new(registry);

        let first = genesis();
        let block = next_block(&first, "entry", &alice);
        switch.arm_reads();
        let result = validator.validate_block(&block, Some(&first));

        assert!(result.is_structurally_valid());
        assert!(!result.authorized_key_valid);
        assert!(matches!(result.signer_status, SignerStatus::LookupFailed { .. }));
        let report = validator.validate_chain(&[Arc::new(first), Arc::new(block)]);
        assert!(report.unauthorized_blocks.is_empty());
        assert_eq!(report.lookup_failed_blocks, vec![1]);
    }

    #[test]
    fn test_genesis_sentinel_not_accepted_above_height_zero() {
        let f = fixture(0);
        let mut fake = Block {
            block_number: 1,
            previous_hash: f.chain[0].hash.clone(),
            ..genesis()
        };
        fake.hash = compute_block_hash(&fake);

        let result = f.validator.validate_block(&fake, Some(&f.chain[0]));
        assert!(result.is_structurally_valid());
        assert!(!result.signature_valid);
        assert!(!result.authorized_key_valid);
    }
}
