//! Authorization verification for conditional orders.
//!
//! Every query follows the same two lookups against the wallet ledger:
//! 1. Is the creation digest signed? If not -> `AuthorizationMissing`
//! 2. Is the cancellation digest signed? If so -> `AuthorizationRevoked`
//!
//! Cancellation is just "the wallet signed the cancellation digest", so no
//! cancellation registry exists on this side.

use std::fmt;
use std::sync::Arc;

use alloy::primitives::{Address, B256};
use tracing::debug;
use twap_core::{Result, TwapError};

use crate::digest::{cancellation_digest, creation_digest};
use crate::oracle::AuthorizationOracle;

/// Authorization state of a conditional order, as the ledger currently shows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthorizationStatus {
    /// Creation digest not signed.
    Unauthorized,
    /// Creation digest signed, cancellation digest not signed.
    Authorized,
    /// Cancellation digest signed. Terminal.
    Cancelled,
}

impl fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::Authorized => write!(f, "authorized"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Checks conditional order payloads against a wallet's signed-message ledger.
#[derive(Clone)]
pub struct AuthorizationVerifier {
    oracle: Arc<dyn AuthorizationOracle>,
    domain_separator: B256,
}

impl AuthorizationVerifier {
    /// `domain_separator` is the settlement domain the digests are bound to.
    pub fn new(oracle: Arc<dyn AuthorizationOracle>, domain_separator: B256) -> Self {
        Self {
            oracle,
            domain_separator,
        }
    }

    /// Wallet that owns the ledger.
    pub fn owner(&self) -> Address {
        self.oracle.wallet()
    }

    pub fn domain_separator(&self) -> B256 {
        self.domain_separator
    }

    pub fn creation_digest(&self, payload: &[u8]) -> B256 {
        creation_digest(payload, self.domain_separator)
    }

    pub fn cancellation_digest(&self, creation_digest: B256) -> B256 {
        cancellation_digest(creation_digest, self.domain_separator)
    }

    /// Whether the wallet has signed `digest`.
    pub fn is_authorized(&self, digest: B256) -> bool {
        self.oracle.is_signed(self.oracle.message_hash(digest))
    }

    /// Whether the wallet has signed the cancellation of `creation_digest`.
    pub fn is_cancelled(&self, creation_digest: B256) -> bool {
        self.is_authorized(self.cancellation_digest(creation_digest))
    }

    /// Require the payload to be authorized and not cancelled.
    ///
    /// Returns the creation digest on success.
    ///
    /// # Errors
    /// - `TwapError::AuthorizationMissing` if the creation digest is not signed
    /// - `TwapError::AuthorizationRevoked` if the cancellation digest is signed
    pub fn only_signed_and_not_cancelled(&self, payload: &[u8]) -> Result<B256> {
        let digest = self.creation_digest(payload);

        if !self.is_authorized(digest) {
            debug!(owner = %self.owner(), %digest, "Conditional order not signed");
            return Err(TwapError::AuthorizationMissing);
        }
        if self.is_cancelled(digest) {
            debug!(owner = %self.owner(), %digest, "Conditional order cancelled");
            return Err(TwapError::AuthorizationRevoked);
        }

        Ok(digest)
    }

    /// Classify the payload without failing.
    pub fn status(&self, payload: &[u8]) -> AuthorizationStatus {
        match self.only_signed_and_not_cancelled(payload) {
            Ok(_) => AuthorizationStatus::Authorized,
            Err(TwapError::AuthorizationRevoked) => AuthorizationStatus::Cancelled,
            Err(_) => AuthorizationStatus::Unauthorized,
        }
    }
}

impl fmt::Debug for AuthorizationVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationVerifier")
            .field("owner", &self.owner())
            .field("domain_separator", &self.domain_separator)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{InMemoryLedger, MockAuthorizationOracle};
    use mockall::predicate::eq;

    const SEPARATOR: B256 = B256::repeat_byte(0x42);

    fn ledger_verifier() -> (Arc<InMemoryLedger>, AuthorizationVerifier) {
        let ledger = Arc::new(InMemoryLedger::new(1, Address::repeat_byte(0x5a)));
        let verifier = AuthorizationVerifier::new(ledger.clone(), SEPARATOR);
        (ledger, verifier)
    }

    #[test]
    fn test_unsigned_payload_is_missing() {
        let (_, verifier) = ledger_verifier();
        assert_eq!(
            verifier.only_signed_and_not_cancelled(&[1u8; 288]),
            Err(TwapError::AuthorizationMissing)
        );
        assert_eq!(verifier.status(&[1u8; 288]), AuthorizationStatus::Unauthorized);
    }

    #[test]
    fn test_signed_payload_passes() {
        let (ledger, verifier) = ledger_verifier();
        let payload = [1u8; 288];
        let digest = verifier.creation_digest(&payload);
        ledger.sign_message(digest);

        assert_eq!(verifier.only_signed_and_not_cancelled(&payload), Ok(digest));
        assert!(verifier.is_authorized(digest));
        assert!(!verifier.is_cancelled(digest));
        assert_eq!(verifier.status(&payload), AuthorizationStatus::Authorized);
    }

    #[test]
    fn test_cancelled_payload_is_revoked() {
        let (ledger, verifier) = ledger_verifier();
        let payload = [1u8; 288];
        let digest = verifier.creation_digest(&payload);
        ledger.sign_message(digest);
        ledger.sign_message(verifier.cancellation_digest(digest));

        assert_eq!(
            verifier.only_signed_and_not_cancelled(&payload),
            Err(TwapError::AuthorizationRevoked)
        );
        assert!(verifier.is_cancelled(digest));
        assert_eq!(verifier.status(&payload), AuthorizationStatus::Cancelled);
    }

    #[test]
    fn test_cancellation_without_creation_is_missing() {
        // A pre-emptive cancel does not make an unsigned order look cancelled.
        let (ledger, verifier) = ledger_verifier();
        let payload = [1u8; 288];
        let digest = verifier.creation_digest(&payload);
        ledger.sign_message(verifier.cancellation_digest(digest));

        assert_eq!(
            verifier.only_signed_and_not_cancelled(&payload),
            Err(TwapError::AuthorizationMissing)
        );
    }

    #[test]
    fn test_cancelling_one_order_leaves_others() {
        let (ledger, verifier) = ledger_verifier();
        let a = [1u8; 288];
        let b = [2u8; 288];
        let digest_a = verifier.creation_digest(&a);
        let digest_b = verifier.creation_digest(&b);
        ledger.sign_message(digest_a);
        ledger.sign_message(digest_b);
        ledger.sign_message(verifier.cancellation_digest(digest_a));

        assert_eq!(
            verifier.only_signed_and_not_cancelled(&a),
            Err(TwapError::AuthorizationRevoked)
        );
        assert_eq!(verifier.only_signed_and_not_cancelled(&b), Ok(digest_b));
    }

    #[test]
    fn test_oracle_queried_with_wallet_message_hash() {
        let payload = [3u8; 288];
        let creation = creation_digest(&payload, SEPARATOR);
        let cancel = cancellation_digest(creation, SEPARATOR);
        let creation_msg = B256::repeat_byte(0xc1);
        let cancel_msg = B256::repeat_byte(0xc2);

        let mut oracle = MockAuthorizationOracle::new();
        oracle
            .expect_message_hash()
            .with(eq(creation))
            .return_const(creation_msg);
        oracle
            .expect_message_hash()
            .with(eq(cancel))
            .return_const(cancel_msg);
        oracle
            .expect_is_signed()
            .with(eq(creation_msg))
            .times(1)
            .return_const(true);
        oracle
            .expect_is_signed()
            .with(eq(cancel_msg))
            .times(1)
            .return_const(false);
        oracle.expect_wallet().return_const(Address::repeat_byte(0x5a));

        let verifier = AuthorizationVerifier::new(Arc::new(oracle), SEPARATOR);
        assert_eq!(verifier.only_signed_and_not_cancelled(&payload), Ok(creation));
    }

    #[test]
    fn test_missing_short_circuits_cancel_lookup() {
        let mut oracle = MockAuthorizationOracle::new();
        oracle.expect_message_hash().times(1).returning(|digest| digest);
        oracle.expect_is_signed().times(1).return_const(false);
        oracle.expect_wallet().return_const(Address::ZERO);

        let verifier = AuthorizationVerifier::new(Arc::new(oracle), SEPARATOR);
        assert_eq!(
            verifier.only_signed_and_not_cancelled(&[0u8; 288]),
            Err(TwapError::AuthorizationMissing)
        );
    }
}
