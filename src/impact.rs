//! Environmental-equivalence figures derived from lifetime production.
//!
//! The tree and car equivalences are fixed published conversion constants
//! (EPA greenhouse-gas equivalencies), not derived quantities.

use serde::Serialize;

use crate::sim::types::{HORIZON_YEARS, RoiParams};

/// Default grid CO2 intensity (kg per kWh displaced).
pub const DEFAULT_EMISSION_FACTOR_KG_PER_KWH: f64 = 0.7;

/// CO2 sequestered by one tree seedling grown for 10 years (kg).
pub const KG_CO2_PER_TREE_SEEDLING: f64 = 60.0;

/// CO2 emitted by one passenger car driven for one year (tonnes).
pub const TONNES_CO2_PER_CAR_YEAR: f64 = 4.6;

/// Environmental outcome of the 25-year horizon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnvironmentalImpact {
    /// Total production over the horizon, degradation applied (kWh).
    pub lifetime_production_kwh: f64,
    /// CO2 displaced over the horizon (tonnes).
    pub co2_saved_tonnes: f64,
    /// Equivalent tree seedlings grown for 10 years.
    pub tree_seedlings_equivalent: f64,
    /// Equivalent passenger cars taken off the road for one year.
    pub cars_off_road_equivalent: f64,
}

impl EnvironmentalImpact {
    /// Computes the impact figures for a system producing
    /// `annual_production_kwh` in year 1, degraded per `roi` over the
    /// full horizon.
    pub fn from_annual_production(
        annual_production_kwh: f64,
        roi: &RoiParams,
        emission_factor_kg_per_kwh: f64,
    ) -> Self {
        let lifetime_production_kwh = lifetime_production_kwh(annual_production_kwh, roi);
        let co2_saved_tonnes = lifetime_production_kwh * emission_factor_kg_per_kwh / 1000.0;
        Self {
            lifetime_production_kwh,
            co2_saved_tonnes,
            tree_seedlings_equivalent: co2_saved_tonnes * 1000.0 / KG_CO2_PER_TREE_SEEDLING,
            cars_off_road_equivalent: co2_saved_tonnes / TONNES_CO2_PER_CAR_YEAR,
        }
    }
}

/// Sum of degraded annual production over the horizon (kWh).
pub fn lifetime_production_kwh(annual_production_kwh: f64, roi: &RoiParams) -> f64 {
    (1..=HORIZON_YEARS)
        .map(|year| annual_production_kwh * roi.degradation_factor(year))
        .sum()
}

impl std::fmt::Display for EnvironmentalImpact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "--- Environmental Impact ---")?;
        writeln!(
            f,
            "Lifetime production: {:.0} kWh",
            self.lifetime_production_kwh
        )?;
        writeln!(f, "CO2 saved:           {:.1} t", self.co2_saved_tonnes)?;
        writeln!(
            f,
            "Tree seedlings:      {:.0}",
            self.tree_seedlings_equivalent
        )?;
        write!(
            f,
            "Cars off the road:   {:.1}",
            self.cars_off_road_equivalent
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_degradation() -> RoiParams {
        RoiParams {
            first_year_degradation: 0.0,
            annual_degradation_rate: 0.0,
            ..RoiParams::default()
        }
    }

    #[test]
    fn worked_example_first_year_co2() {
        // 20,000 kWh × 0.7 kg/kWh = 14,000 kg = 14 t in one year.
        let roi = no_degradation();
        let lifetime = lifetime_production_kwh(20_000.0, &roi);
        let first_year_tonnes = (lifetime / 25.0) * 0.7 / 1000.0;
        assert!((first_year_tonnes - 14.0).abs() < 1e-9);
    }

    #[test]
    fn lifetime_without_degradation_is_25_annual_outputs() {
        let roi = no_degradation();
        assert!((lifetime_production_kwh(10_000.0, &roi) - 250_000.0).abs() < 1e-6);
    }

    #[test]
    fn degradation_reduces_lifetime_production() {
        let degraded = RoiParams {
            first_year_degradation: 0.02,
            annual_degradation_rate: 0.005,
            ..RoiParams::default()
        };
        let with = lifetime_production_kwh(10_000.0, &degraded);
        let without = lifetime_production_kwh(10_000.0, &no_degradation());
        assert!(with < without);
        // All 25 years still produce something.
        assert!(with > 0.9 * without * 0.9);
    }

    #[test]
    fn equivalences_are_linear_in_co2() {
        let impact =
            EnvironmentalImpact::from_annual_production(20_000.0, &no_degradation(), 0.7);
        assert!((impact.co2_saved_tonnes - 350.0).abs() < 1e-9);
        assert!(
            (impact.tree_seedlings_equivalent
                - impact.co2_saved_tonnes * 1000.0 / KG_CO2_PER_TREE_SEEDLING)
                .abs()
                < 1e-9
        );
        assert!(
            (impact.cars_off_road_equivalent
                - impact.co2_saved_tonnes / TONNES_CO2_PER_CAR_YEAR)
                .abs()
                < 1e-9
        );
    }

    #[test]
    fn zero_production_yields_zero_impact() {
        let impact =
            EnvironmentalImpact::from_annual_production(0.0, &RoiParams::default(), 0.7);
        assert_eq!(impact.lifetime_production_kwh, 0.0);
        assert_eq!(impact.co2_saved_tonnes, 0.0);
        assert_eq!(impact.tree_seedlings_equivalent, 0.0);
        assert_eq!(impact.cars_off_road_equivalent, 0.0);
    }
}
