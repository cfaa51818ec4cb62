//! Shared fixtures for controller integration tests.

pub mod fixture;
