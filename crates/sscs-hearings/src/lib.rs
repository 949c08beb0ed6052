//! Hearings API for the social security and child support tribunal.
//!
//! Listens for hearing notifications from the hearings management platform,
//! reconciles them into the case store, turns tribunal hearing requests into
//! platform calls and serves the platform's `serviceHearingValues` callback.

pub mod config;
pub mod error;
pub mod hearings;
pub mod telemetry;
