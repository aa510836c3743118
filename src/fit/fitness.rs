//! Weighted Gaussian fitness of a crop for observed conditions.
//!
//! For readings `s`, a crop's optimum `o`, sigmas `σ` and weights `w`:
//!
//! ```text
//! exponent = Σ_d  w_d * (s_d − o_d)² / (2 σ_d²)     d ∈ {T, H, P, T_avg, AP, pH}
//! fitness  = exp(−exponent)
//! ```
//!
//! Two optima are not taken from the dataset:
//! - pressure uses standard atmospheric pressure ([`OPTIMAL_PRESSURE_HPA`])
//! - the monthly-average temperature optimum reuses the crop's temperature optimum
//!
//! Fitness is in `(0, 1]` and equals 1 only when every weighted dimension sits
//! exactly on its optimum.

use crate::domain::{Dimension, OptimalProfile, ScoringParameters, SensorReadings};

/// Standard atmospheric pressure (hPa), used as every crop's pressure optimum.
pub const OPTIMAL_PRESSURE_HPA: f64 = 1013.0;

/// The optimum of `dim` for a crop.
pub fn optimum(profile: &OptimalProfile, dim: Dimension) -> f64 {
    match dim {
        Dimension::Temperature | Dimension::AvgTemperature => profile.temperature,
        Dimension::Humidity => profile.humidity,
        Dimension::Pressure => OPTIMAL_PRESSURE_HPA,
        Dimension::Precipitation => profile.rainfall,
        Dimension::SoilPh => profile.ph,
    }
}

/// Weighted contribution of one dimension to the exponent.
pub fn exponent_term(
    readings: &SensorReadings,
    profile: &OptimalProfile,
    params: &ScoringParameters,
    dim: Dimension,
) -> f64 {
    let weight = params.weights.get(dim);
    if weight == 0.0 {
        // A zero-weighted dimension contributes nothing, even if its optimum is unknown.
        return 0.0;
    }
    let sigma = params.sigmas.get(dim);
    let diff = readings.get(dim) - optimum(profile, dim);
    weight * diff * diff / (2.0 * sigma * sigma)
}

/// Gaussian fitness in `(0, 1]`.
///
/// A profile with an unknown (`NaN`) optimum in a weighted dimension scores 0.
pub fn plant_fitness(
    readings: &SensorReadings,
    profile: &OptimalProfile,
    params: &ScoringParameters,
) -> f64 {
    let exponent: f64 = Dimension::ALL
        .into_iter()
        .map(|dim| exponent_term(readings, profile, params, dim))
        .sum();
    let score = (-exponent).exp();
    if score.is_nan() { 0.0 } else { score }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::domain::DimensionTable;

    fn profile() -> OptimalProfile {
        OptimalProfile {
            temperature: 25.0,
            humidity: 70.0,
            ph: 6.5,
            rainfall: 150.0,
        }
    }

    fn on_optimum() -> SensorReadings {
        SensorReadings {
            temperature: 25.0,
            humidity: 70.0,
            pressure: OPTIMAL_PRESSURE_HPA,
            avg_temperature: 25.0,
            precipitation: 150.0,
            soil_ph: 6.5,
        }
    }

    fn temperature_only() -> ScoringParameters {
        let mut weights = DimensionTable::uniform(0.0);
        weights.temperature = 1.0;
        let mut sigmas = DimensionTable::uniform(1.0);
        sigmas.temperature = 2.0;
        ScoringParameters { sigmas, weights }
    }

    #[test]
    fn exact_match_scores_one() {
        let params = ScoringParameters::default();
        assert_relative_eq!(plant_fitness(&on_optimum(), &profile(), &params), 1.0);
    }

    #[test]
    fn temperature_only_score_decreases_with_distance() {
        let params = temperature_only();
        let mut s = on_optimum();
        // Other dimensions are far off but zero-weighted.
        s.humidity = 5.0;
        s.pressure = 950.0;
        assert_relative_eq!(plant_fitness(&s, &profile(), &params), 1.0);

        let mut last = 1.0;
        for delta in [0.5, 1.0, 2.0, 4.0, 8.0] {
            s.temperature = 25.0 + delta;
            let score = plant_fitness(&s, &profile(), &params);
            assert!(score < last, "delta {delta}: {score} !< {last}");
            assert!(score > 0.0);
            last = score;
        }

        // One sigma away: exp(-1/2).
        s.temperature = 27.0;
        assert_relative_eq!(
            plant_fitness(&s, &profile(), &params),
            (-0.5f64).exp(),
            epsilon = 1e-12
        );
        s.temperature = 23.0;
        assert_relative_eq!(
            plant_fitness(&s, &profile(), &params),
            (-0.5f64).exp(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn larger_sigma_is_more_tolerant() {
        let tight = temperature_only();
        let mut loose = tight;
        loose.sigmas.temperature = 6.0;

        let mut s = on_optimum();
        s.temperature = 30.0;
        assert!(plant_fitness(&s, &profile(), &loose) > plant_fitness(&s, &profile(), &tight));
    }

    #[test]
    fn pressure_and_average_temperature_use_fixed_optima() {
        let p = profile();
        assert_eq!(optimum(&p, Dimension::Pressure), 1013.0);
        assert_eq!(optimum(&p, Dimension::AvgTemperature), p.temperature);
        assert_eq!(optimum(&p, Dimension::Precipitation), p.rainfall);
    }

    #[test]
    fn unknown_optimum_scores_zero_only_when_weighted() {
        let mut p = profile();
        p.rainfall = f64::NAN;
        assert_eq!(
            plant_fitness(&on_optimum(), &p, &ScoringParameters::default()),
            0.0
        );
        assert_relative_eq!(plant_fitness(&on_optimum(), &p, &temperature_only()), 1.0);
    }
}
