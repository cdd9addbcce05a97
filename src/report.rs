use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;

use crate::data::{load_records, PositionRecord};
use crate::propagation::{
    Footprint, GroundStation, GroundTrackPoint, GroundTrackPropagator, OrbitBranch, Pass,
    PassWindow, PlaneModel, PredictionSettings, SemiMajorAxisModel, DEFAULT_HORIZON_MINUTES,
    DEFAULT_MIN_ELEVATION_DEG, DEFAULT_PASS_DAYS, DEFAULT_STEPS, MAX_STEPS,
};

#[derive(Args, Debug, Clone)]
pub struct PredictArgs {
    /// JSON state sample document (single sample, array, or API envelope; `-` for stdin)
    pub input: PathBuf,
    /// Output JSON file path (stdout when omitted)
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Prediction horizon in minutes (negative predicts backwards)
    #[arg(long, default_value_t = DEFAULT_HORIZON_MINUTES, allow_negative_numbers = true)]
    pub minutes: f64,
    /// Number of propagation steps (the track holds steps + 1 points)
    #[arg(
        long,
        default_value_t = DEFAULT_STEPS,
        value_parser = clap::value_parser!(u32).range(0..=MAX_STEPS as i64)
    )]
    pub steps: u32,
    /// Semi-major axis model used for the orbital period
    #[arg(long, value_enum, default_value_t = SemiMajorAxisModel::AltitudeProxy)]
    pub semi_major_axis: SemiMajorAxisModel,
    /// Orbital plane orientation
    #[arg(long, value_enum, default_value_t = PlaneModel::Equatorial)]
    pub plane: PlaneModel,
    /// Reject non-finite or zero-position samples instead of propagating NaN
    #[arg(long)]
    pub validate: bool,
}

impl PredictArgs {
    pub fn settings(&self) -> PredictionSettings {
        PredictionSettings::default()
            .with_horizon(self.minutes, self.steps)
            .with_semi_major_axis(self.semi_major_axis)
            .with_plane(self.plane)
    }
}

#[derive(Args, Debug, Clone)]
pub struct PassesArgs {
    /// JSON state sample document (single sample, array, or API envelope; `-` for stdin)
    pub input: PathBuf,
    /// Output JSON file path (stdout when omitted)
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Station latitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,
    /// Station longitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lon: f64,
    /// Station height above the mean Earth radius in meters
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub alt: f64,
    /// Search window in days
    #[arg(long, default_value_t = DEFAULT_PASS_DAYS)]
    pub days: f64,
    /// Elevation mask in degrees
    #[arg(long, default_value_t = DEFAULT_MIN_ELEVATION_DEG, allow_negative_numbers = true)]
    pub min_elevation: f64,
    /// Semi-major axis model used for the orbital period
    #[arg(long, value_enum, default_value_t = SemiMajorAxisModel::AltitudeProxy)]
    pub semi_major_axis: SemiMajorAxisModel,
    /// Orbital plane orientation
    #[arg(long, value_enum, default_value_t = PlaneModel::Equatorial)]
    pub plane: PlaneModel,
}

impl PassesArgs {
    pub fn settings(&self) -> PredictionSettings {
        PredictionSettings::default()
            .with_semi_major_axis(self.semi_major_axis)
            .with_plane(self.plane)
    }

    pub fn station(&self) -> GroundStation {
        GroundStation::new(self.lat, self.lon, self.alt)
    }

    pub fn window(&self) -> PassWindow {
        PassWindow::new(self.days, self.min_elevation)
    }
}

#[derive(Args, Debug, Clone)]
pub struct FootprintArgs {
    /// Altitude above the mean Earth radius in kilometers
    pub altitude_km: f64,
    /// Circle centre latitude in degrees
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub latitude: f64,
    /// Circle centre longitude in degrees
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub longitude: f64,
    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct PredictionReport {
    pub generated_at: String,
    pub settings: PredictionSettings,
    pub predictions: Vec<SamplePrediction>,
}

#[derive(Debug, Serialize)]
pub struct SamplePrediction {
    pub timestamp: Option<String>,
    pub branch: OrbitBranch,
    pub eccentricity: f64,
    pub semi_major_axis_m: f64,
    pub period_s: f64,
    pub speed_km_s: f64,
    pub footprint: Footprint,
    pub track: Vec<TrackPoint>,
}

#[derive(Debug, Serialize)]
pub struct TrackPoint {
    #[serde(flatten)]
    pub point: GroundTrackPoint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_utc: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PassReport {
    pub generated_at: String,
    pub settings: PredictionSettings,
    pub station: GroundStation,
    pub window: PassWindow,
    pub samples: Vec<SamplePasses>,
}

#[derive(Debug, Serialize)]
pub struct SamplePasses {
    pub timestamp: Option<String>,
    pub branch: OrbitBranch,
    pub period_s: f64,
    pub passes: Vec<PassEntry>,
}

#[derive(Debug, Serialize)]
pub struct PassEntry {
    #[serde(flatten)]
    pub pass: Pass,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aos_utc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_elevation_utc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub los_utc: Option<String>,
}

/// `epoch + seconds` as RFC 3339, or `None` outside chrono's representable range
fn offset_utc(epoch: DateTime<Utc>, seconds: f64) -> Option<String> {
    let millis = (seconds * 1000.0).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    let offset = chrono::Duration::try_milliseconds(millis as i64)?;
    epoch.checked_add_signed(offset).map(|t| t.to_rfc3339())
}

fn write_json<T: Serialize>(output: Option<&Path>, value: &T) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create report file: {:?}", path))?;
            serde_json::to_writer_pretty(file, value)?;
            log::info!("Wrote report to {:?}", path);
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn log_models(settings: &PredictionSettings) {
    log::info!(
        "{}: {}",
        settings.semi_major_axis.name(),
        settings.semi_major_axis.description()
    );
    log::info!("{}: {}", settings.plane.name(), settings.plane.description());
}

pub fn run_predict(args: PredictArgs) -> Result<()> {
    if !args.minutes.is_finite() {
        return Err(anyhow!("minutes must be a finite number"));
    }

    let records = load_records(&args.input)?;
    let settings = args.settings();

    log::info!(
        "Predicting {} sample(s): {} min, {} steps",
        records.len(),
        settings.horizon_minutes,
        settings.steps
    );
    log_models(&settings);

    let report = build_report(&records, settings, args.validate)?;
    write_json(args.output.as_deref(), &report)
}

pub fn build_report(
    records: &[PositionRecord],
    settings: PredictionSettings,
    validate: bool,
) -> Result<PredictionReport> {
    let propagator = GroundTrackPropagator::with_settings(settings);
    let mut predictions = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let result = if validate {
            propagator
                .predict_checked(&record.state)
                .with_context(|| format!("Sample {} rejected", index))?
        } else {
            propagator.predict(&record.state)
        };

        let epoch = record.timestamp_utc();
        let mut out_of_range = 0usize;
        let track: Vec<TrackPoint> = result
            .track
            .into_iter()
            .map(|point| {
                let time_utc = epoch.and_then(|t0| offset_utc(t0, point.elapsed_seconds));
                if epoch.is_some() && time_utc.is_none() {
                    out_of_range += 1;
                }
                TrackPoint { point, time_utc }
            })
            .collect();

        if out_of_range > 0 {
            log::warn!(
                "Sample {}: {} track point(s) fall outside the representable date range",
                index,
                out_of_range
            );
        }

        log::debug!(
            "Sample {}: {} branch, |e| = {:.5}, T = {:.1} s",
            index,
            result.branch.name(),
            result.derived.eccentricity,
            result.derived.period
        );

        predictions.push(SamplePrediction {
            timestamp: record.timestamp.clone(),
            branch: result.branch,
            eccentricity: result.derived.eccentricity,
            semi_major_axis_m: result.derived.semi_major_axis,
            period_s: result.derived.period,
            speed_km_s: record.speed_km_s(),
            footprint: result.footprint,
            track,
        });
    }

    Ok(PredictionReport {
        generated_at: Utc::now().to_rfc3339(),
        settings,
        predictions,
    })
}

pub fn run_passes(args: PassesArgs) -> Result<()> {
    let records = load_records(&args.input)?;
    let settings = args.settings();
    let station = args.station();
    let window = args.window();

    log::info!(
        "Searching passes of {} sample(s) over ({}, {}) for {} day(s) above {}°",
        records.len(),
        station.latitude,
        station.longitude,
        args.days,
        window.min_elevation
    );
    log_models(&settings);

    let report = build_pass_report(&records, settings, station, window)?;
    write_json(args.output.as_deref(), &report)
}

pub fn build_pass_report(
    records: &[PositionRecord],
    settings: PredictionSettings,
    station: GroundStation,
    window: PassWindow,
) -> Result<PassReport> {
    let propagator = GroundTrackPropagator::with_settings(settings);
    let mut samples = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let derived = propagator.derive(&record.state);
        let passes = propagator
            .find_passes(&record.state, &station, &window)
            .with_context(|| format!("Pass search failed for sample {}", index))?;

        log::debug!("Sample {}: {} pass(es)", index, passes.len());

        let epoch = record.timestamp_utc();
        let at = |seconds: f64| epoch.and_then(|t0| offset_utc(t0, seconds));
        let passes = passes
            .into_iter()
            .map(|pass| PassEntry {
                aos_utc: at(pass.aos_seconds),
                max_elevation_utc: at(pass.max_elevation_seconds),
                los_utc: at(pass.los_seconds),
                pass,
            })
            .collect();

        samples.push(SamplePasses {
            timestamp: record.timestamp.clone(),
            branch: derived.branch(),
            period_s: derived.period,
            passes,
        });
    }

    Ok(PassReport {
        generated_at: Utc::now().to_rfc3339(),
        settings,
        station,
        window,
        samples,
    })
}

pub fn run_footprint(args: FootprintArgs) -> Result<()> {
    if !args.altitude_km.is_finite() || args.altitude_km < 0.0 {
        return Err(anyhow!("altitude must be a non-negative number of kilometers"));
    }

    let footprint = Footprint::at(args.altitude_km, args.latitude, args.longitude);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&footprint)?);
    } else {
        println!("Altitude:      {:.1} km", args.altitude_km);
        println!(
            "Centre:        {:.4}, {:.4}",
            footprint.center_latitude, footprint.center_longitude
        );
        println!("Central angle: {:.4} rad", footprint.central_angle);
        println!("Radius:        {:.1} km", footprint.radius_km);
        println!("Radius:        {:.2} deg", footprint.radius_deg);
        println!("Map radius:    {:.0} m", footprint.radius_m);
    }

    Ok(())
}
