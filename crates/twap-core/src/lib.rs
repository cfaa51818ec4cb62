//! Core domain types for TWAP conditional orders.
//!
//! This crate provides the pure, time-dependent half of the system:
//! - `TwapData` / `TwapSchedule`: schedule wire payload and its validated form
//! - `calculate_valid_to`: overflow-free slicing of time into validity windows
//! - `OrderDescriptor`: the settlement-layer order materialized for "now"
//! - `ConditionalOrder`: closed set of order types, selected by payload length
//!
//! Nothing here performs I/O or holds state.

pub mod conditional;
pub mod error;
pub mod order;
pub mod schedule;
pub mod slice;

pub use conditional::{ConditionalOrder, ConditionalOrderData, ConditionalOrderKind};
pub use error::{NotValidReason, Result, ScheduleError, TwapError};
pub use order::{
    order_for, settlement_domain, OrderDescriptor, OrderKind, TokenBalance, TWAP_APP_DATA,
    TWAP_APP_DATA_TAG,
};
pub use schedule::{TwapData, TwapSchedule, MAX_FREQUENCY, TWAP_ORDER_BYTES_LENGTH};
pub use slice::{calculate_valid_to, next_valid_at, part_index, slice_window, SliceWindow};
