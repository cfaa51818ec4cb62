//! Lifecycle controller for conditional orders.
//!
//! Three entry points, all `&self` and free of persistent state:
//! - [`LifecycleController::dispatch`]: validate, verify, announce
//! - [`LifecycleController::get_tradeable_order`]: verify, materialize for "now"
//! - [`LifecycleController::is_valid_signature`]: settlement-layer signature check
//!
//! # Observed state machine
//!
//! ```text
//! Unauthorized --(wallet signs creation digest)--> Authorized(active)
//! Authorized(active) --(clock passes t0 + n*t)--> Authorized(expired)
//! Authorized(*) --(wallet signs cancellation digest)--> Cancelled (terminal)
//! ```
//!
//! Nothing here records a transition. [`LifecycleController::schedule_state`]
//! derives the current state from the ledger and the clock on every call.

use std::fmt;
use std::sync::Arc;

use alloy::primitives::{Address, Bytes, B256};
use alloy::sol_types::Eip712Domain;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use twap_auth::{
    AuthorizationOracle, AuthorizationStatus, AuthorizationVerifier, GenericSignatureVerifier,
};
use twap_core::{
    ConditionalOrder, ConditionalOrderData, NotValidReason, OrderDescriptor, Result, TwapError,
};

use crate::clock::Clock;
use crate::config::ControllerConfig;
use crate::error::ControllerResult;
use crate::events::{Notifier, OrderCreated};

/// Validity of the order at the queried instant, for an active schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SliceState {
    /// An order is tradeable until `valid_to` (inclusive).
    Valid { valid_to: u32 },
    /// No order right now; `retry_at` is when the next one becomes valid.
    NotValid {
        reason: NotValidReason,
        retry_at: Option<u64>,
    },
}

/// Externally observed schedule state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScheduleState {
    Unauthorized,
    Active(SliceState),
    Expired,
    Cancelled,
}

impl ScheduleState {
    /// Whether no future query can yield an order.
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Expired | Self::Cancelled => true,
            Self::Active(SliceState::NotValid { retry_at, .. }) => retry_at.is_none(),
            Self::Active(SliceState::Valid { .. }) | Self::Unauthorized => false,
        }
    }
}

impl fmt::Display for ScheduleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::Active(SliceState::Valid { valid_to }) => {
                write!(f, "active (valid to {valid_to})")
            }
            Self::Active(SliceState::NotValid { reason, .. }) => write!(f, "active ({reason})"),
            Self::Expired => write!(f, "expired"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Orchestrates validation, authorization and materialization for one wallet.
pub struct LifecycleController {
    verifier: AuthorizationVerifier,
    fallback: Arc<dyn GenericSignatureVerifier>,
    clock: Arc<dyn Clock>,
    settlement_domain: Eip712Domain,
    notifier: Notifier,
}

impl LifecycleController {
    /// Create a controller for the wallet behind `oracle`.
    ///
    /// `fallback` handles signatures whose payload is not a conditional order.
    ///
    /// # Errors
    /// Returns `ControllerError::Config` if `config` does not validate.
    pub fn new(
        config: &ControllerConfig,
        oracle: Arc<dyn AuthorizationOracle>,
        fallback: Arc<dyn GenericSignatureVerifier>,
        clock: Arc<dyn Clock>,
    ) -> ControllerResult<Self> {
        config.validate()?;

        let settlement_domain = config.settlement_domain();
        let verifier = AuthorizationVerifier::new(oracle, settlement_domain.hash_struct());

        info!(
            owner = %verifier.owner(),
            chain_id = config.chain_id,
            settlement = %config.settlement_contract,
            "Lifecycle controller created"
        );

        Ok(Self {
            verifier,
            fallback,
            clock,
            settlement_domain,
            notifier: Notifier::new(config.notification_capacity),
        })
    }

    /// Wallet that owns the orders checked here.
    pub fn owner(&self) -> Address {
        self.verifier.owner()
    }

    pub fn verifier(&self) -> &AuthorizationVerifier {
        &self.verifier
    }

    pub fn settlement_domain(&self) -> &Eip712Domain {
        &self.settlement_domain
    }

    /// Receive [`OrderCreated`] notifications from later `dispatch` calls.
    pub fn subscribe(&self) -> broadcast::Receiver<OrderCreated> {
        self.notifier.subscribe()
    }

    /// Validate, verify and announce a conditional order.
    ///
    /// Idempotent: calling again re-verifies and re-announces, nothing else.
    /// Returns the creation digest.
    ///
    /// # Errors
    /// - `MalformedPayload` / `ScheduleInvalid` before any ledger lookup
    /// - `AuthorizationMissing` / `AuthorizationRevoked` from the ledger
    pub fn dispatch(&self, payload: &[u8]) -> Result<B256> {
        let order = ConditionalOrder::from_payload(payload).map_err(|e| {
            warn!(owner = %self.owner(), error = %e, "Rejected conditional order");
            e
        })?;

        let digest = self
            .verifier
            .only_signed_and_not_cancelled(payload)
            .map_err(|e| {
                warn!(owner = %self.owner(), error = %e, "Conditional order not dispatchable");
                e
            })?;

        let receivers = self.notifier.emit(OrderCreated {
            owner: self.owner(),
            payload: Bytes::copy_from_slice(payload),
        });

        info!(
            owner = %self.owner(),
            kind = order.kind().name(),
            %digest,
            receivers,
            "Conditional order created"
        );

        Ok(digest)
    }

    /// The order tradeable at `current_time`.
    ///
    /// Authorization is checked before the payload is decoded.
    ///
    /// # Errors
    /// Every typed failure propagates unchanged.
    pub fn get_tradeable_order(
        &self,
        payload: &[u8],
        current_time: u64,
    ) -> Result<OrderDescriptor> {
        self.verifier.only_signed_and_not_cancelled(payload)?;
        ConditionalOrder::from_payload(payload)?.materialize(current_time)
    }

    /// Settlement-layer signature check for `hash`.
    ///
    /// If `signature` decodes as a conditional order, the order tradeable now
    /// is recomputed and its settlement digest must equal `hash`. An order
    /// that is not yet authorized yields `Ok(false)`; every other failure
    /// propagates. Any other signature goes to the generic verifier.
    ///
    /// # Errors
    /// Temporal, schedule and revocation failures of the decoded order.
    pub fn is_valid_signature(&self, hash: B256, signature: &[u8]) -> Result<bool> {
        if ConditionalOrderData::decode(signature).is_err() {
            let valid = self.fallback.is_valid_signature(hash, signature);
            debug!(%hash, len = signature.len(), valid, "Generic signature check");
            return Ok(valid);
        }

        let now = self.clock.now();
        match self.get_tradeable_order(signature, now) {
            Ok(order) => {
                let valid = order.digest(&self.settlement_domain) == hash;
                debug!(
                    %hash,
                    valid_to = order.valid_to,
                    valid,
                    "Conditional order signature check"
                );
                Ok(valid)
            }
            Err(TwapError::AuthorizationMissing) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Derive the schedule's current state.
    ///
    /// Cancellation dominates expiry.
    ///
    /// # Errors
    /// `MalformedPayload` / `ScheduleInvalid` for an authorized payload that
    /// is not a valid conditional order.
    pub fn schedule_state(&self, payload: &[u8], current_time: u64) -> Result<ScheduleState> {
        match self.verifier.status(payload) {
            AuthorizationStatus::Unauthorized => return Ok(ScheduleState::Unauthorized),
            AuthorizationStatus::Cancelled => return Ok(ScheduleState::Cancelled),
            AuthorizationStatus::Authorized => {}
        }

        match ConditionalOrder::from_payload(payload)?.materialize(current_time) {
            Ok(order) => Ok(ScheduleState::Active(SliceState::Valid {
                valid_to: order.valid_to,
            })),
            Err(TwapError::TemporalInvalid { reason, retry_at }) => {
                Ok(ScheduleState::Active(SliceState::NotValid { reason, retry_at }))
            }
            Err(TwapError::TemporalExpired) => Ok(ScheduleState::Expired),
            Err(e) => Err(e),
        }
    }
}

impl fmt::Debug for LifecycleController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleController")
            .field("verifier", &self.verifier)
            .field("settlement_domain", &self.settlement_domain)
            .finish_non_exhaustive()
    }
}
