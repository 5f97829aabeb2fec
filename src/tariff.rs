//! Progressive tiered utility billing with annual rate escalation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One consumption band of a progressive tariff.
///
/// Bounds are inclusive kWh values; `to_kwh = None` marks the final,
/// unbounded band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffTier {
    /// First kWh covered by this band (inclusive).
    pub from_kwh: u32,
    /// Last kWh covered by this band (inclusive), `None` = unbounded.
    pub to_kwh: Option<u32>,
    /// Price per kWh within this band.
    pub rate_per_kwh: f64,
}

impl TariffTier {
    /// Band capacity in kWh, or `None` for the unbounded tier.
    pub fn capacity_kwh(&self) -> Option<f64> {
        self.to_kwh.map(|to| f64::from(to - self.from_kwh + 1))
    }
}

/// A utility tariff: ordered tier list plus flat per-kWh and fixed charges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffConfig {
    /// Consumption bands, ascending and contiguous; last one unbounded.
    pub tiers: Vec<TariffTier>,
    /// Flat surcharge applied to every consumed kWh.
    pub fuel_surcharge_per_kwh: f64,
    /// Fixed meter charge per billing month. Never escalated.
    pub fixed_monthly_charge: f64,
}

/// Tier-shape violations. Callers are expected to repair the tariff
/// (e.g. reset to a known-good default) rather than run the engine on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TariffConfigError {
    /// The tier list is empty.
    Empty,
    /// The first tier does not start at 1 kWh.
    FirstTierNotAtOne,
    /// Adjacent tiers leave a gap or overlap; holds the offending index.
    NotContiguous(usize),
    /// A bounded tier has `to_kwh < from_kwh`; holds the offending index.
    EmptyBand(usize),
    /// An unbounded tier appears before the last position.
    UnboundedTierNotLast(usize),
    /// The final tier is bounded.
    MissingUnboundedTier,
}

impl fmt::Display for TariffConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "tariff has no tiers"),
            Self::FirstTierNotAtOne => write!(f, "first tier must start at 1 kWh"),
            Self::NotContiguous(i) => {
                write!(f, "tier {i} does not start at previous tier's end + 1")
            }
            Self::EmptyBand(i) => write!(f, "tier {i} ends before it starts"),
            Self::UnboundedTierNotLast(i) => {
                write!(f, "tier {i} is unbounded but not last")
            }
            Self::MissingUnboundedTier => write!(f, "last tier must be unbounded"),
        }
    }
}

impl std::error::Error for TariffConfigError {}

impl TariffConfig {
    /// Checks the tier invariants: ascending, contiguous, first tier at
    /// 1 kWh, exactly one unbounded tier in the last position.
    ///
    /// # Errors
    ///
    /// Returns the first violation found, scanning front to back.
    pub fn validate(&self) -> Result<(), TariffConfigError> {
        if self.tiers.is_empty() {
            return Err(TariffConfigError::Empty);
        }
        if self.tiers[0].from_kwh != 1 {
            return Err(TariffConfigError::FirstTierNotAtOne);
        }
        let last = self.tiers.len() - 1;
        for (i, tier) in self.tiers.iter().enumerate() {
            match tier.to_kwh {
                Some(to) => {
                    if to < tier.from_kwh {
                        return Err(TariffConfigError::EmptyBand(i));
                    }
                    if i == last {
                        return Err(TariffConfigError::MissingUnboundedTier);
                    }
                    if self.tiers[i + 1].from_kwh != to + 1 {
                        return Err(TariffConfigError::NotContiguous(i + 1));
                    }
                }
                None => {
                    if i != last {
                        return Err(TariffConfigError::UnboundedTierNotLast(i));
                    }
                }
            }
        }
        Ok(())
    }

    /// Rate of the top (unbounded) tier, used to value rollover credits.
    ///
    /// Returns 0.0 for an empty tier list.
    pub fn top_tier_rate(&self) -> f64 {
        self.tiers.last().map_or(0.0, |t| t.rate_per_kwh)
    }
}

/// Escalation context for a simulated year.
///
/// Tier rates are always scaled by `factor`; the fuel surcharge only when
/// `escalate_fuel_surcharge` is set. The fixed monthly charge is never
/// escalated.
#[derive(Debug, Clone, Copy)]
pub struct Escalation {
    /// Multiplier applied to tier rates: `(1 + rate)^(year - 1)`.
    pub factor: f64,
    /// Whether the fuel surcharge escalates with the tier rates.
    pub escalate_fuel_surcharge: bool,
}

impl Escalation {
    /// No escalation: year-1 rates as configured.
    pub fn none() -> Self {
        Self {
            factor: 1.0,
            escalate_fuel_surcharge: false,
        }
    }

    /// Escalation for simulation year `year` (1-based) at `annual_rate`.
    pub fn for_year(year: u32, annual_rate: f64, escalate_fuel_surcharge: bool) -> Self {
        Self {
            factor: (1.0 + annual_rate).powi(year as i32 - 1),
            escalate_fuel_surcharge,
        }
    }
}

/// Computes one monthly bill by walking the tiers in ascending order.
///
/// Each tier consumes `min(remaining, capacity)` kWh at its (escalated)
/// rate; the fuel surcharge applies to the full consumption; the fixed
/// monthly charge is added last. Consumption <= 0 bills exactly 0; the
/// fixed charge is waived on an empty account.
pub fn bill_amount(consumption_kwh: f64, tariff: &TariffConfig, escalation: Escalation) -> f64 {
    if consumption_kwh <= 0.0 {
        return 0.0;
    }

    let mut remaining = consumption_kwh;
    let mut amount = 0.0;
    for tier in &tariff.tiers {
        let taken = match tier.capacity_kwh() {
            Some(capacity) => remaining.min(capacity),
            None => remaining,
        };
        amount += taken * tier.rate_per_kwh * escalation.factor;
        remaining -= taken;
        if remaining <= 0.0 {
            break;
        }
    }

    let surcharge_factor = if escalation.escalate_fuel_surcharge {
        escalation.factor
    } else {
        1.0
    };
    amount += consumption_kwh * tariff.fuel_surcharge_per_kwh * surcharge_factor;
    amount + tariff.fixed_monthly_charge
}

/// Rate of the tier containing `consumption_kwh`.
///
/// Returns the first tier's rate for consumption <= 0 and the last tier's
/// rate when consumption exceeds every bounded band.
pub fn marginal_rate(consumption_kwh: f64, tariff: &TariffConfig) -> f64 {
    for tier in &tariff.tiers {
        match tier.to_kwh {
            Some(to) if consumption_kwh <= f64::from(to) => return tier.rate_per_kwh,
            Some(_) => {}
            None => return tier.rate_per_kwh,
        }
    }
    0.0
}
