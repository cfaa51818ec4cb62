//! Tradeable order descriptors.
//!
//! An [`OrderDescriptor`] mirrors the settlement layer's canonical order
//! record. Each slice of a schedule materializes a descriptor that differs
//! only in `valid_to`, which is what makes every slice a distinct order
//! downstream even though the schedule was authorized once.

use std::fmt;

use alloy::primitives::{keccak256, Address, B256, U256};
use alloy::sol_types::{eip712_domain, Eip712Domain, SolStruct};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schedule::TwapSchedule;

/// Preimage of the application tag carried by every TWAP order.
pub const TWAP_APP_DATA_TAG: &str = "conditionalorder.twap";

/// `keccak256("conditionalorder.twap")`.
pub static TWAP_APP_DATA: Lazy<B256> = Lazy::new(|| keccak256(TWAP_APP_DATA_TAG));

/// Settlement layer EIP-712 domain name.
pub const SETTLEMENT_DOMAIN_NAME: &str = "Gnosis Protocol";
/// Settlement layer EIP-712 domain version.
pub const SETTLEMENT_DOMAIN_VERSION: &str = "v2";

mod eip712 {
    alloy::sol! {
        /// Settlement layer order struct. The type string is consensus data.
        #[derive(Debug)]
        struct Order {
            address sellToken;
            address buyToken;
            address receiver;
            uint256 sellAmount;
            uint256 buyAmount;
            uint32 validTo;
            bytes32 appData;
            uint256 feeAmount;
            string kind;
            bool partiallyFillable;
            string sellTokenBalance;
            string buyTokenBalance;
        }
    }
}

/// Build the settlement layer's EIP-712 domain.
pub fn settlement_domain(chain_id: u64, settlement_contract: Address) -> Eip712Domain {
    eip712_domain! {
        name: SETTLEMENT_DOMAIN_NAME,
        version: SETTLEMENT_DOMAIN_VERSION,
        chain_id: chain_id,
        verifying_contract: settlement_contract,
    }
}

/// Order kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    Sell,
    Buy,
}

impl OrderKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sell => "sell",
            Self::Buy => "buy",
        }
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Balance accounting mode for one leg of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenBalance {
    /// Standard token balance and allowance.
    #[default]
    Erc20,
    /// Settlement vault balance, pulled through an external relayer.
    External,
    /// Settlement vault internal balance.
    Internal,
}

impl TokenBalance {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Erc20 => "erc20",
            Self::External => "external",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for TokenBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete tradeable order.
///
/// Serializes with the settlement API's camelCase field names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDescriptor {
    pub sell_token: Address,
    pub buy_token: Address,
    pub receiver: Address,
    pub sell_amount: U256,
    pub buy_amount: U256,
    /// Unix seconds, inclusive.
    pub valid_to: u32,
    pub app_data: B256,
    pub fee_amount: U256,
    pub kind: OrderKind,
    pub partially_fillable: bool,
    pub sell_token_balance: TokenBalance,
    pub buy_token_balance: TokenBalance,
}

impl OrderDescriptor {
    /// EIP-712 signing hash of this order in the settlement domain.
    ///
    /// This is the digest the settlement layer asks the wallet to accept.
    pub fn digest(&self, settlement_domain: &Eip712Domain) -> B256 {
        self.to_eip712().eip712_signing_hash(settlement_domain)
    }

    /// EIP-712 struct hash (without domain).
    pub fn struct_hash(&self) -> B256 {
        self.to_eip712().eip712_hash_struct()
    }

    fn to_eip712(&self) -> eip712::Order {
        eip712::Order {
            sellToken: self.sell_token,
            buyToken: self.buy_token,
            receiver: self.receiver,
            sellAmount: self.sell_amount,
            buyAmount: self.buy_amount,
            validTo: self.valid_to,
            appData: self.app_data,
            feeAmount: self.fee_amount,
            kind: self.kind.as_str().to_string(),
            partiallyFillable: self.partially_fillable,
            sellTokenBalance: self.sell_token_balance.as_str().to_string(),
            buyTokenBalance: self.buy_token_balance.as_str().to_string(),
        }
    }
}

/// Materialize the order for the slice active at `current_time`.
///
/// Pure: identical inputs give identical descriptors.
///
/// # Errors
/// Propagates time-slice failures unchanged (`TemporalInvalid`,
/// `TemporalExpired`).
pub fn order_for(schedule: &TwapSchedule, current_time: u64) -> Result<OrderDescriptor> {
    let valid_to = schedule.valid_to(current_time)?;

    Ok(OrderDescriptor {
        sell_token: schedule.sell_token(),
        buy_token: schedule.buy_token(),
        receiver: schedule.receiver(),
        sell_amount: schedule.part_sell_amount(),
        buy_amount: schedule.min_part_limit(),
        valid_to,
        app_data: *TWAP_APP_DATA,
        fee_amount: U256::ZERO,
        kind: OrderKind::Sell,
        partially_fillable: false,
        sell_token_balance: TokenBalance::Erc20,
        buy_token_balance: TokenBalance::Erc20,
    })
}
