//! Rooftop PV sizing and 25-year financial simulation engine.
//!
//! A pure, synchronous computation: a single immutable input snapshot
//! (bills, tariff, seasonal factors, system and battery parameters) goes
//! in; a sizing result, a 25-year cash-flow forecast, and environmental
//! figures come out. No I/O, no clock, no shared state: the whole
//! pipeline is cheap enough to re-run on every input change.

pub mod bills;
pub mod config;
pub mod impact;
pub mod io;
pub mod production;
/// Forecast engine, credit ledger, and battery dispatch.
pub mod sim;
pub mod sizing;
pub mod tariff;
