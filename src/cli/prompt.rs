//! Interactive completion of missing sensor readings.
//!
//! Kept separate from clap parsing:
//! - clap handles readings given up front as flags
//! - the prompt asks only for what is still missing after the report
//!
//! Each entered value is range-checked and re-asked until it is valid.

use std::io::{self, BufRead, Write};

use crate::domain::{Dimension, SensorVector};
use crate::error::AppError;

/// Ask on stdin for every reading `sensor` is missing.
pub fn prompt_for_missing(sensor: &mut SensorVector) -> Result<(), AppError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    prompt_missing_with(sensor, &mut stdin.lock(), &mut stdout.lock())
}

/// Prompt loop over arbitrary input/output streams.
///
/// Behavior:
/// - one question per missing dimension, in dimension order
/// - values outside the dimension's valid range are rejected and re-asked
/// - `q` cancels, end of input is an error
pub fn prompt_missing_with<R: BufRead, W: Write>(
    sensor: &mut SensorVector,
    input: &mut R,
    output: &mut W,
) -> Result<(), AppError> {
    let write_err = |e: io::Error| AppError::new(2, format!("Failed to write prompt: {e}"));

    for dim in sensor.missing() {
        let (lo, hi) = dim.valid_range();
        loop {
            write!(output, "Enter {} [{}..{}] (q to quit): ", dim.display_name(), lo, hi)
                .map_err(write_err)?;
            output.flush().map_err(write_err)?;

            let mut line = String::new();
            let bytes = input
                .read_line(&mut line)
                .map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;
            if bytes == 0 {
                return Err(AppError::new(
                    2,
                    format!("No input received for {}. Pass it with --{}.", dim.key(), flag_name(dim)),
                ));
            }

            let line = line.trim();
            if line.eq_ignore_ascii_case("q") {
                return Err(AppError::new(2, "Canceled."));
            }

            match parse_reading(dim, line) {
                Ok(v) => {
                    sensor.set(dim, Some(v));
                    break;
                }
                Err(msg) => writeln!(output, "{msg}").map_err(write_err)?,
            }
        }
    }
    Ok(())
}

/// Parse and range-check one manually entered reading.
pub fn parse_reading(dim: Dimension, text: &str) -> Result<f64, String> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| format!("Not a number: '{}'.", text.trim()))?;
    let (lo, hi) = dim.valid_range();
    if !value.is_finite() || value < lo || value > hi {
        return Err(format!("Value {value} outside {lo}..{hi} for {}.", dim.display_name()));
    }
    Ok(value)
}

/// CLI flag that supplies `dim` directly.
pub fn flag_name(dim: Dimension) -> &'static str {
    match dim {
        Dimension::Temperature => "temperature",
        Dimension::Humidity => "humidity",
        Dimension::Pressure => "pressure",
        Dimension::AvgTemperature => "avg-temperature",
        Dimension::Precipitation => "precipitation",
        Dimension::SoilPh => "ph",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_but(dim: Dimension) -> SensorVector {
        let mut s = SensorVector::default();
        for d in Dimension::ALL {
            s.set(d, Some(1000.0));
        }
        s.set(Dimension::SoilPh, Some(6.0));
        s.set(dim, None);
        s
    }

    #[test]
    fn asks_only_for_missing_and_retries_out_of_range() {
        let mut sensor = complete_but(Dimension::SoilPh);
        let mut input = "abc\n15\n6.8\n".as_bytes();
        let mut output = Vec::new();
        prompt_missing_with(&mut sensor, &mut input, &mut output).unwrap();

        assert_eq!(sensor.soil_ph, Some(6.8));
        let shown = String::from_utf8(output).unwrap();
        assert_eq!(shown.matches("Enter ").count(), 3);
        assert!(shown.contains("Not a number"));
        assert!(shown.contains("outside"));
        assert!(!shown.contains("humidity"));
    }

    #[test]
    fn end_of_input_names_the_flag() {
        let mut sensor = complete_but(Dimension::AvgTemperature);
        let err = prompt_missing_with(&mut sensor, &mut "".as_bytes(), &mut Vec::new()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("--avg-temperature"));
    }

    #[test]
    fn quit_cancels() {
        let mut sensor = complete_but(Dimension::Humidity);
        let err = prompt_missing_with(&mut sensor, &mut "q\n".as_bytes(), &mut Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "Canceled.");
        assert_eq!(sensor.humidity, None);
    }

    #[test]
    fn range_bounds_are_inclusive() {
        assert_eq!(parse_reading(Dimension::Humidity, "100"), Ok(100.0));
        assert_eq!(parse_reading(Dimension::Pressure, " 900 "), Ok(900.0));
        assert!(parse_reading(Dimension::Temperature, "-50.5").is_err());
        assert!(parse_reading(Dimension::Precipitation, "NaN").is_err());
    }
}
