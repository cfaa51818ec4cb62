//! Controller wired to an in-memory ledger and a manual clock.

use std::sync::Arc;

use alloy::primitives::{address, Address, Bytes, B256, U256};
use twap_auth::{EcdsaSignatureVerifier, InMemoryLedger};
use twap_controller::{init_logging, ControllerConfig, LifecycleController, ManualClock};
use twap_core::TwapData;

pub const WALLET: Address = address!("5afe5afe5afe5afe5afe5afe5afe5afe5afe5afe");
pub const SETTLEMENT: Address = address!("9008d19f58aabd9ed0d60971565aa8510560ab41");

pub const T0: u32 = 1000;
pub const N: u32 = 10;
pub const FREQUENCY: u32 = 86_400;

pub struct Fixture {
    pub ledger: Arc<InMemoryLedger>,
    pub clock: Arc<ManualClock>,
    pub controller: LifecycleController,
}

impl Fixture {
    pub fn new() -> Self {
        // Another test may have installed the subscriber already
        let _ = init_logging("debug");

        let config = ControllerConfig::from_toml_str(&format!(
            r#"
            chain_id = 1
            settlement_contract = "{SETTLEMENT}"
            notification_capacity = 16
            "#
        ))
        .expect("valid config");

        let ledger = Arc::new(InMemoryLedger::new(config.chain_id, WALLET));
        let clock = Arc::new(ManualClock::new(u64::from(T0)));
        let controller = LifecycleController::new(
            &config,
            ledger.clone(),
            Arc::new(EcdsaSignatureVerifier::single(WALLET)),
            clock.clone(),
        )
        .expect("controller from validated config");

        Self {
            ledger,
            clock,
            controller,
        }
    }

    /// Wallet signs the creation digest of `payload`.
    pub fn authorize(&self, payload: &[u8]) -> B256 {
        let digest = self.controller.verifier().creation_digest(payload);
        self.ledger.sign_message(digest);
        digest
    }

    /// Wallet signs the cancellation digest for `creation_digest`.
    pub fn cancel(&self, creation_digest: B256) {
        let digest = self.controller.verifier().cancellation_digest(creation_digest);
        self.ledger.sign_message(digest);
    }
}

/// Ten daily slices of 1000 units starting at `T0`.
pub fn schedule(span: u32) -> TwapData {
    TwapData {
        sellToken: address!("6b175474e89094c44da98b954eedeac495271d0f"),
        buyToken: address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"),
        receiver: Address::ZERO,
        partSellAmount: U256::from(1_000u32),
        minPartLimit: U256::from(250u32),
        t0: U256::from(T0),
        n: U256::from(N),
        t: U256::from(FREQUENCY),
        span: U256::from(span),
    }
}

pub fn payload(span: u32) -> Bytes {
    schedule(span).to_payload()
}
