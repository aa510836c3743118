//! ASCII bar chart of crop scores.
//!
//! This is intentionally "dumb" (fixed-width bars), optimized for:
//! - quick visual comparison in a terminal
//! - deterministic output (helpful for golden tests)

use crate::report::CropScore;
use crate::report::format::truncate;

const NAME_WIDTH: usize = 20;

/// One line per crop: name, `#` bar proportional to score in `[0, 1]`, score.
pub fn render_score_bars(ranked: &[CropScore], width: usize) -> String {
    let width = width.max(10);
    let mut out = String::new();
    out.push_str(&format!("{:<NAME_WIDTH$} {:<width$} {:>8}\n", "crop", "fitness", "score"));
    for (rank, row) in ranked.iter().enumerate() {
        let filled = bar_len(row.score, width);
        let bar = format!("{}{}", "#".repeat(filled), ".".repeat(width - filled));
        out.push_str(&format!(
            "{:<NAME_WIDTH$} {bar} {:>8.4}{}\n",
            truncate(&row.crop, NAME_WIDTH),
            row.score,
            if rank == 0 { "  *" } else { "" }
        ));
    }
    out
}

fn bar_len(score: f64, width: usize) -> usize {
    if !score.is_finite() {
        return 0;
    }
    let clamped = score.clamp(0.0, 1.0);
    ((clamped * width as f64).round() as usize).min(width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bars_scale_with_score_and_mark_the_best() {
        let ranked = vec![
            CropScore { crop: "rice".into(), score: 1.0 },
            CropScore { crop: "maize".into(), score: 0.5 },
            CropScore { crop: "cotton".into(), score: 0.0 },
        ];
        let text = render_score_bars(&ranked, 10);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("##########"));
        assert!(lines[1].ends_with('*'));
        assert!(lines[2].contains("#####....."));
        assert!(lines[3].contains(".........."));
    }

    #[test]
    fn bar_len_handles_out_of_range_scores() {
        assert_eq!(bar_len(f64::NAN, 10), 0);
        assert_eq!(bar_len(2.0, 10), 10);
        assert_eq!(bar_len(-1.0, 10), 0);
    }
}
