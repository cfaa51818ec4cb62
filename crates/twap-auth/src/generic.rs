//! Generic (non conditional order) signature checks.
//!
//! When a signature payload is not a conditional order, the wallet falls back
//! to its ordinary owner signature check. [`EcdsaSignatureVerifier`] implements
//! the plain-ECDSA subset of a threshold multisig check: `threshold` 65-byte
//! signatures over the hash, from distinct owners, ordered by ascending owner
//! address.

use alloy::primitives::{Address, PrimitiveSignature, B256};
use tracing::debug;

/// Length of one `r || s || v` signature.
pub const ECDSA_SIGNATURE_LENGTH: usize = 65;

/// Schedule-agnostic signature check.
#[cfg_attr(test, mockall::automock)]
pub trait GenericSignatureVerifier: Send + Sync {
    /// Whether `signature` is a valid wallet signature over `hash`.
    fn is_valid_signature(&self, hash: B256, signature: &[u8]) -> bool;
}

/// Threshold ECDSA owner check.
#[derive(Debug, Clone)]
pub struct EcdsaSignatureVerifier {
    owners: Vec<Address>,
    threshold: usize,
}

impl EcdsaSignatureVerifier {
    /// Returns `None` if `threshold` is zero or exceeds the number of distinct owners.
    pub fn new(mut owners: Vec<Address>, threshold: usize) -> Option<Self> {
        owners.sort_unstable();
        owners.dedup();
        if threshold == 0 || threshold > owners.len() {
            return None;
        }
        Some(Self { owners, threshold })
    }

    /// Single-owner wallet.
    pub fn single(owner: Address) -> Self {
        Self {
            owners: vec![owner],
            threshold: 1,
        }
    }

    pub fn owners(&self) -> &[Address] {
        &self.owners
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    fn recover(hash: B256, chunk: &[u8]) -> Option<Address> {
        let signature = PrimitiveSignature::try_from(chunk).ok()?;
        signature.recover_address_from_prehash(&hash).ok()
    }
}

impl GenericSignatureVerifier for EcdsaSignatureVerifier {
    fn is_valid_signature(&self, hash: B256, signature: &[u8]) -> bool {
        let required = self.threshold * ECDSA_SIGNATURE_LENGTH;
        if signature.len() < required {
            debug!(
                len = signature.len(),
                required, "Signature too short for threshold"
            );
            return false;
        }

        let mut last_owner = Address::ZERO;
        for chunk in signature[..required].chunks_exact(ECDSA_SIGNATURE_LENGTH) {
            let Some(signer) = Self::recover(hash, chunk) else {
                debug!("Signature recovery failed");
                return false;
            };
            // Strictly ascending rules out duplicates
            if signer <= last_owner || self.owners.binary_search(&signer).is_err() {
                debug!(%signer, "Signer rejected");
                return false;
            }
            last_owner = signer;
        }

        true
    }
}
