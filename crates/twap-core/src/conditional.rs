//! Closed set of conditional order types.
//!
//! A payload is routed to its order type by its encoded length, then decoded
//! ([`ConditionalOrderData`]) and validated ([`ConditionalOrder`]). Adding an
//! order type means adding a variant to each enum below; the compiler then
//! points at every match that needs a new arm.

use alloy::primitives::Bytes;

use crate::error::{Result, ScheduleError, TwapError};
use crate::order::{order_for, OrderDescriptor};
use crate::schedule::{TwapData, TwapSchedule, TWAP_ORDER_BYTES_LENGTH};

/// Conditional order type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionalOrderKind {
    Twap,
}

impl ConditionalOrderKind {
    pub const ALL: [Self; 1] = [Self::Twap];

    /// Fixed payload length of this order type.
    pub const fn encoded_length(&self) -> usize {
        match self {
            Self::Twap => TWAP_ORDER_BYTES_LENGTH,
        }
    }

    /// Select an order type by payload length.
    pub fn from_payload_len(len: usize) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.encoded_length() == len)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Twap => "twap",
        }
    }
}

/// Decoded, not yet validated, conditional order payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionalOrderData {
    Twap(TwapData),
}

impl ConditionalOrderData {
    /// Decode a payload into the order type its length selects.
    ///
    /// # Errors
    /// Returns `TwapError::MalformedPayload` if no order type has this
    /// length or the bytes do not decode.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        let kind = ConditionalOrderKind::from_payload_len(payload.len()).ok_or_else(|| {
            TwapError::MalformedPayload(format!(
                "no conditional order type is {} bytes long",
                payload.len()
            ))
        })?;

        match kind {
            ConditionalOrderKind::Twap => TwapData::from_payload(payload).map(Self::Twap),
        }
    }

    pub fn kind(&self) -> ConditionalOrderKind {
        match self {
            Self::Twap(_) => ConditionalOrderKind::Twap,
        }
    }

    /// Run the order type's static checks.
    ///
    /// # Errors
    /// Returns the first violated [`ScheduleError`].
    pub fn validate(&self) -> std::result::Result<ConditionalOrder, ScheduleError> {
        match self {
            Self::Twap(data) => data.validate().map(ConditionalOrder::Twap),
        }
    }
}

/// A validated conditional order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionalOrder {
    Twap(TwapSchedule),
}

impl ConditionalOrder {
    /// Decode and validate in one step.
    ///
    /// # Errors
    /// `MalformedPayload` if decoding fails, `ScheduleInvalid` if validation fails.
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        Ok(ConditionalOrderData::decode(payload)?.validate()?)
    }

    pub fn kind(&self) -> ConditionalOrderKind {
        match self {
            Self::Twap(_) => ConditionalOrderKind::Twap,
        }
    }

    pub fn encoded_length(&self) -> usize {
        self.kind().encoded_length()
    }

    /// Materialize the order tradeable at `current_time`.
    ///
    /// # Errors
    /// Propagates the order type's temporal failures.
    pub fn materialize(&self, current_time: u64) -> Result<OrderDescriptor> {
        match self {
            Self::Twap(schedule) => order_for(schedule, current_time),
        }
    }

    /// Canonical payload bytes.
    pub fn to_payload(&self) -> Bytes {
        match self {
            Self::Twap(schedule) => schedule.to_payload(),
        }
    }
}

impl From<TwapSchedule> for ConditionalOrder {
    fn from(schedule: TwapSchedule) -> Self {
        Self::Twap(schedule)
    }
}
