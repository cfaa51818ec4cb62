//! Authorization oracle: the wallet's signed-message ledger.
//!
//! The wallet owns the ledger and serializes every write to it. This crate
//! only reads it through [`AuthorizationOracle`].

use std::collections::HashSet;

use alloy::primitives::{Address, B256};
use alloy::sol_types::Eip712Domain;
use parking_lot::RwLock;
use tracing::debug;

use crate::digest::{wallet_domain, wallet_message_hash};

/// Read-only view of a wallet's signed-message ledger.
#[cfg_attr(test, mockall::automock)]
pub trait AuthorizationOracle: Send + Sync {
    /// Address of the wallet that owns the ledger.
    fn wallet(&self) -> Address;

    /// The wallet's own hash for "I have signed `digest`".
    fn message_hash(&self, digest: B256) -> B256;

    /// Whether `message_hash` is recorded as signed.
    fn is_signed(&self, message_hash: B256) -> bool;
}

/// In-process signed-message ledger.
///
/// Stands in for the wallet in tests and simulations. [`InMemoryLedger::sign_message`]
/// is the wallet-side write; verifiers only ever see the
/// [`AuthorizationOracle`] impl.
#[derive(Debug)]
pub struct InMemoryLedger {
    wallet: Address,
    domain: Eip712Domain,
    signed: RwLock<HashSet<B256>>,
}

impl InMemoryLedger {
    pub fn new(chain_id: u64, wallet: Address) -> Self {
        Self {
            wallet,
            domain: wallet_domain(chain_id, wallet),
            signed: RwLock::new(HashSet::new()),
        }
    }

    /// Record `digest` as signed by the wallet. Returns the stored message hash.
    ///
    /// Signing twice is a no-op; there is no way to unsign.
    pub fn sign_message(&self, digest: B256) -> B256 {
        let message_hash = wallet_message_hash(&self.domain, digest);
        let inserted = self.signed.write().insert(message_hash);
        debug!(wallet = %self.wallet, %digest, %message_hash, inserted, "Message signed");
        message_hash
    }

    /// Number of signed messages.
    pub fn len(&self) -> usize {
        self.signed.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.signed.read().is_empty()
    }
}

impl AuthorizationOracle for InMemoryLedger {
    fn wallet(&self) -> Address {
        self.wallet
    }

    fn message_hash(&self, digest: B256) -> B256 {
        wallet_message_hash(&self.domain, digest)
    }

    fn is_signed(&self, message_hash: B256) -> bool {
        self.signed.read().contains(&message_hash)
    }
}
