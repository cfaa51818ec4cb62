//! Integration tests for twap-controller.
//!
//! These tests drive the controller through its public surface only:
//! - Schedule slicing as seen by `get_tradeable_order`
//! - Creation and cancellation through the wallet ledger
//! - Settlement signature checks

pub mod common;
