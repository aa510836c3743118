//! Crop selection: score every profile and pick the best.
//!
//! Scores are computed in parallel but collected into a `BTreeMap`, so the
//! result never depends on thread scheduling. The best crop is the first
//! maximum in identifier order: on an exact tie the lexicographically smallest
//! identifier wins.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::debug;

use crate::domain::{ProfileSet, ScoringParameters, SensorVector};
use crate::error::ScoreError;
use crate::fit::fitness::plant_fitness;

/// Outcome of scoring a profile set.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub best_crop: String,
    pub best_score: f64,
    /// Every crop's score, keyed by identifier.
    pub scores: BTreeMap<String, f64>,
}

/// Score all crops and return the best.
///
/// The sensor vector must be complete; an absent reading is a
/// [`ScoreError::MissingDimension`].
pub fn recommend_crop(
    sensor: &SensorVector,
    profiles: &ProfileSet,
    params: &ScoringParameters,
) -> Result<Recommendation, ScoreError> {
    params.validate()?;
    let readings = sensor.complete()?;
    if profiles.is_empty() {
        return Err(ScoreError::NoProfiles);
    }

    let scores: BTreeMap<String, f64> = profiles
        .par_iter()
        .map(|(crop, profile)| (crop.clone(), plant_fitness(&readings, profile, params)))
        .collect();

    let (best_crop, best_score) = pick_best(&scores).ok_or(ScoreError::NoProfiles)?;
    debug!(crop = %best_crop, score = best_score, "best crop selected");

    Ok(Recommendation {
        best_crop: best_crop.to_string(),
        best_score,
        scores,
    })
}

/// First maximum in iteration order; later equal scores do not replace it.
fn pick_best(scores: &BTreeMap<String, f64>) -> Option<(&str, f64)> {
    let mut best: Option<(&str, f64)> = None;
    for (crop, &score) in scores {
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((crop.as_str(), score)),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Dimension, DimensionTable, OptimalProfile};

    fn sensor(t: f64) -> SensorVector {
        SensorVector {
            temperature: Some(t),
            humidity: Some(50.0),
            pressure: Some(1013.0),
            avg_temperature: Some(t),
            precipitation: Some(100.0),
            soil_ph: Some(6.5),
        }
    }

    fn crop(t: f64) -> OptimalProfile {
        OptimalProfile {
            temperature: t,
            humidity: 50.0,
            ph: 6.5,
            rainfall: 100.0,
        }
    }

    fn temperature_only() -> ScoringParameters {
        let mut weights = DimensionTable::uniform(0.0);
        weights.temperature = 1.0;
        ScoringParameters {
            sigmas: DimensionTable::uniform(2.0),
            weights,
        }
    }

    #[test]
    fn picks_highest_score() {
        // exp(-w d²/2σ²) with σ=2: d≈0.918 → 0.9, d≈2.022 → 0.6.
        let d_hi = (2.0 * 4.0 * (1.0f64 / 0.9).ln()).sqrt();
        let d_lo = (2.0 * 4.0 * (1.0f64 / 0.6).ln()).sqrt();
        let profiles = ProfileSet::from([
            ("alpha".to_string(), crop(20.0 + d_lo)),
            ("beta".to_string(), crop(20.0 + d_hi)),
        ]);

        let rec = recommend_crop(&sensor(20.0), &profiles, &temperature_only()).unwrap();
        assert_eq!(rec.best_crop, "beta");
        assert!((rec.best_score - 0.9).abs() < 1e-9);
        assert!((rec.scores["alpha"] - 0.6).abs() < 1e-9);
        assert_eq!(rec.scores.len(), 2);
    }

    #[test]
    fn tied_scores_go_to_first_identifier_every_time() {
        let profiles = ProfileSet::from([
            ("sorghum".to_string(), crop(22.0)),
            ("barley".to_string(), crop(18.0)),
            ("millet".to_string(), crop(22.0)),
            ("oats".to_string(), crop(18.0)),
        ]);
        // All four sit 2° from the reading, so their scores are identical.
        for _ in 0..20 {
            let rec = recommend_crop(&sensor(20.0), &profiles, &temperature_only()).unwrap();
            assert_eq!(rec.best_crop, "barley");
        }
    }

    #[test]
    fn incomplete_sensor_is_rejected() {
        let mut s = sensor(20.0);
        s.soil_ph = None;
        let profiles = ProfileSet::from([("rice".to_string(), crop(20.0))]);
        assert_eq!(
            recommend_crop(&s, &profiles, &ScoringParameters::default()).unwrap_err(),
            ScoreError::MissingDimension(Dimension::SoilPh)
        );
    }

    #[test]
    fn empty_profile_set_is_an_error() {
        assert_eq!(
            recommend_crop(&sensor(20.0), &ProfileSet::new(), &ScoringParameters::default())
                .unwrap_err(),
            ScoreError::NoProfiles
        );
    }

    #[test]
    fn unscorable_profile_never_wins() {
        let mut broken = crop(20.0);
        broken.humidity = f64::NAN;
        let profiles = ProfileSet::from([
            ("aaa".to_string(), broken),
            ("zzz".to_string(), crop(35.0)),
        ]);
        let rec = recommend_crop(&sensor(20.0), &profiles, &ScoringParameters::default()).unwrap();
        assert_eq!(rec.scores["aaa"], 0.0);
        assert_eq!(rec.best_crop, "zzz");
    }
}
