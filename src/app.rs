//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and installs logging
//! - resolves settings into a `Session`
//! - runs the report/recommendation pipeline
//! - prints results and writes optional exports

use chrono::{Datelike, Local, NaiveDate};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, CropsArgs, LocationArgs, RecommendArgs, ReportArgs};
use crate::config::{Session, Settings, load_parameters};
use crate::data::{Dispatch, HttpSource};
use crate::domain::{ClimateQuery, SensorVector};
use crate::error::{AppError, ScoreError};

pub mod pipeline;

/// Entry point for the `cropfit` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    init_logging(cli.verbose);

    let settings = Settings::from_env()?;
    let today = Local::now().date_naive();

    match cli.command {
        Command::Recommend(args) => handle_recommend(args, settings, today),
        Command::Report(args) => handle_report(args, settings, today),
        Command::Crops(args) => handle_crops(args, settings),
    }
}

/// Logs go to stderr so stdout stays clean for reports.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "cropfit=info",
        1 => "cropfit=debug",
        _ => "cropfit=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A second init (e.g. from tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_recommend(args: RecommendArgs, settings: Settings, today: NaiveDate) -> Result<(), AppError> {
    let mut session = session_from(settings, &args.location);
    if let Some(dir) = &args.dataset {
        session.settings.dataset_dir = dir.clone();
    }
    if let Some(path) = &args.params {
        session.params = load_parameters(path)?;
    }
    session.selection = args
        .crops
        .iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();

    let overrides = args.sensor.to_sensor();
    let no_prompt = args.no_prompt;
    let complete = |sensor: &mut SensorVector| -> Result<(), AppError> {
        if no_prompt {
            let missing = sensor.missing();
            return match missing.first() {
                Some(dim) => Err(ScoreError::MissingDimension(*dim).into()),
                None => Ok(()),
            };
        }
        println!("{}", crate::report::format_sensor(sensor));
        crate::cli::prompt::prompt_for_missing(sensor)
    };

    let (model, run) = match &args.from_report {
        Some(path) => {
            let report = crate::io::read_report_csv(path)?;
            info!(path = %path.display(), "scoring saved report");
            let model = pipeline::load_crop_model(&session)?;
            let run = pipeline::recommend_from_report(
                &session, &model, report, &overrides, complete, args.top,
            )?;
            (model, run)
        }
        None => {
            let query = query_from(&args.location, &session, today)?;
            let source = HttpSource::new(session.settings.http_timeout)?;
            pipeline::run_recommend(&session, &source, query, today, &overrides, complete, args.top)?
        }
    };

    if args.show_report {
        println!("{}", crate::report::format_report(&run.report));
    }
    println!("{}", crate::report::format_sensor(&run.sensor));
    println!(
        "{}",
        crate::report::format_recommendation(&run.recommendation, &run.ranked, args.width)
    );

    if let Some(path) = &args.save_report {
        crate::io::write_report_csv(path, &run.report)?;
        info!(path = %path.display(), "report saved");
    }
    if let Some(path) = &args.export {
        crate::io::write_scores_csv(path, &run.ranked)?;
        info!(path = %path.display(), "scores exported");
    }
    if let Some(path) = &args.counts {
        crate::io::write_plant_counts(path, model.total_rows, &model.counts)?;
        info!(path = %path.display(), "plant counts written");
    }
    Ok(())
}

fn handle_report(args: ReportArgs, settings: Settings, today: NaiveDate) -> Result<(), AppError> {
    let session = session_from(settings, &args.location);
    let query = query_from(&args.location, &session, today)?;
    let source = HttpSource::new(session.settings.http_timeout)?;

    let report = pipeline::collect_report(&session, &source, query, today);
    println!("{}", crate::report::format_report(&report));
    println!("{}", crate::report::format_sensor(&report.sensor_vector()));

    if let Some(path) = &args.save {
        crate::io::write_report_csv(path, &report)?;
        info!(path = %path.display(), "report saved");
    }
    Ok(())
}

fn handle_crops(args: CropsArgs, settings: Settings) -> Result<(), AppError> {
    let mut session = Session::new(settings);
    if let Some(dir) = &args.dataset {
        session.settings.dataset_dir = dir.clone();
    }
    let model = pipeline::load_crop_model(&session)?;

    if let Some(query) = &args.search {
        let needle = query.to_lowercase();
        let hits: Vec<&String> = model
            .profiles
            .keys()
            .filter(|crop| crop.to_lowercase().contains(&needle))
            .collect();
        if hits.is_empty() {
            println!("No crops match '{query}'.");
        }
        for crop in hits {
            println!("{crop}");
        }
        return Ok(());
    }

    if args.profiles {
        println!("{}", crate::report::format_profiles(&model.profiles));
    } else {
        println!(
            "{}",
            crate::report::format_counts(model.total_rows, &model.counts, model.table.files())
        );
    }
    if let Some(path) = &args.counts {
        crate::io::write_plant_counts(path, model.total_rows, &model.counts)?;
        info!(path = %path.display(), "plant counts written");
    }
    Ok(())
}

fn session_from(settings: Settings, location: &LocationArgs) -> Session {
    let mut session = Session::new(settings);
    if let Some(n) = location.max_years_back {
        session.settings.max_years_back = n;
    }
    if location.sequential {
        session.dispatch = Dispatch::Sequential;
    }
    session
}

fn query_from(location: &LocationArgs, session: &Session, today: NaiveDate) -> Result<ClimateQuery, AppError> {
    let (Some(lat), Some(lon), Some(month)) = (location.lat, location.lon, location.month) else {
        return Err(AppError::new(
            2,
            "A location needs --lat, --lon and --month (or use --from-report).",
        ));
    };
    ClimateQuery::new(
        lat,
        lon,
        month,
        location.year.unwrap_or(today.year()),
        session.settings.max_years_back,
    )
}
