//! Reporting utilities: score rankings and formatted terminal output.

pub mod format;

pub use format::*;

use crate::fit::Recommendation;

/// One ranked crop.
#[derive(Debug, Clone, PartialEq)]
pub struct CropScore {
    pub crop: String,
    pub score: f64,
}

/// Crops ordered best first; equal scores keep identifier order.
pub fn rank_scores(rec: &Recommendation, top_n: usize) -> Vec<CropScore> {
    let mut ranked: Vec<CropScore> = rec
        .scores
        .iter()
        .map(|(crop, &score)| CropScore {
            crop: crop.clone(),
            score,
        })
        .collect();
    // Stable sort over identifier order preserves the selection tie-break.
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(top_n);
    ranked
}
