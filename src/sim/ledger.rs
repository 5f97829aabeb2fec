//! FIFO export-credit ledger for the net-metering regime.
//!
//! State lives only for the duration of one forecast run. Months must be
//! processed in strict chronological order: both FIFO draw order and
//! age-based expiry are defined relative to that order.

use std::collections::VecDeque;

/// One banked export credit.
#[derive(Debug, Clone, PartialEq)]
pub struct CreditEntry {
    /// Absolute month index of the export (`year_index * 12 + month_index`).
    pub origin_month: usize,
    /// Undrawn energy remaining on the credit (kWh, never negative).
    pub kwh_remaining: f64,
}

/// Energy flows of one simulated month under net metering.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MonthOutcome {
    /// Production consumed directly by the daytime load (kWh).
    pub direct_use_kwh: f64,
    /// Production exported and banked as a new credit (kWh).
    pub exported_kwh: f64,
    /// Credits that aged out this month before drawing (kWh).
    pub expired_kwh: f64,
    /// Credits drawn (oldest first) against this month's deficit (kWh).
    pub drawn_kwh: f64,
    /// Deficit left to bill at the tiered rate after drawing (kWh).
    pub residual_deficit_kwh: f64,
}

/// FIFO credit bank with age-based expiry.
#[derive(Debug, Clone)]
pub struct CreditLedger {
    entries: VecDeque<CreditEntry>,
    expiry_months: u32,
}

impl CreditLedger {
    /// Creates an empty ledger whose credits expire once their age in
    /// months reaches `expiry_months`.
    pub fn new(expiry_months: u32) -> Self {
        Self {
            entries: VecDeque::new(),
            expiry_months,
        }
    }

    /// Total undrawn energy currently banked (kWh).
    pub fn total_kwh(&self) -> f64 {
        self.entries.iter().map(|e| e.kwh_remaining).sum()
    }

    /// Processes one month in chronological order.
    ///
    /// Sequence: self-consume, bank the export (visible to this same
    /// month's draw), expire aged credits, draw oldest-first against the
    /// deficit, report the residual for tiered billing.
    pub fn process_month(
        &mut self,
        month_index: usize,
        production_kwh: f64,
        daytime_load_kwh: f64,
        nighttime_load_kwh: f64,
    ) -> MonthOutcome {
        let direct_use_kwh = production_kwh.min(daytime_load_kwh).max(0.0);

        let exported_kwh = (production_kwh - daytime_load_kwh).max(0.0);
        if exported_kwh > 0.0 {
            self.entries.push_back(CreditEntry {
                origin_month: month_index,
                kwh_remaining: exported_kwh,
            });
        }

        let deficit_kwh = nighttime_load_kwh + (daytime_load_kwh - production_kwh).max(0.0);

        let expired_kwh = self.expire(month_index);
        let drawn_kwh = self.draw(deficit_kwh);

        MonthOutcome {
            direct_use_kwh,
            exported_kwh,
            expired_kwh,
            drawn_kwh,
            residual_deficit_kwh: deficit_kwh - drawn_kwh,
        }
    }

    /// Removes entries whose age has reached the expiry window and
    /// returns the energy lost.
    fn expire(&mut self, month_index: usize) -> f64 {
        let expiry = self.expiry_months as usize;
        let mut expired = 0.0;
        // Entries are origin-ordered, so expired ones sit at the front.
        while let Some(front) = self.entries.front() {
            if month_index.saturating_sub(front.origin_month) >= expiry {
                expired += front.kwh_remaining;
                self.entries.pop_front();
            } else {
                break;
            }
        }
        expired
    }

    /// Draws up to `deficit_kwh` oldest-first, removing exhausted entries.
    fn draw(&mut self, deficit_kwh: f64) -> f64 {
        let mut remaining = deficit_kwh.max(0.0);
        let mut drawn = 0.0;
        while remaining > 0.0 {
            let Some(front) = self.entries.front_mut() else {
                break;
            };
            let take = front.kwh_remaining.min(remaining);
            front.kwh_remaining -= take;
            remaining -= take;
            drawn += take;
            if front.kwh_remaining <= 0.0 {
                self.entries.pop_front();
            }
        }
        drawn
    }
}
