//! Lifecycle controller for TWAP conditional orders.
//!
//! Ties the pure schedule logic of `twap-core` to the wallet authorization
//! checks of `twap-auth`, reading "now" from an injected [`Clock`].
//!
//! # Key Components
//!
//! - [`LifecycleController`]: dispatch, tradeable order, signature check
//! - [`ControllerConfig`]: chain, settlement contract, logging defaults
//! - [`Notifier`]: `OrderCreated` fan-out
//! - [`init_logging`]: tracing subscriber setup

pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod logging;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ControllerConfig;
pub use controller::{LifecycleController, ScheduleState, SliceState};
pub use error::{ControllerError, ControllerResult};
pub use events::{Notifier, OrderCreated};
pub use logging::init_logging;
