/// Daily solar/battery/grid dispatch (self-consumption regime).
pub mod battery;
pub mod engine;
/// FIFO export-credit ledger (net-metering regime).
pub mod ledger;
pub mod types;
