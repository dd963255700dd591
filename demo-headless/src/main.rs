mod study;
mod synthetic;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use study::Study;
use tracing_subscriber::EnvFilter;
use wind_site_core::{flattest_area, BoundingBox, WindSiteEngine};

/// Wind farm site study on a synthetic station archive
#[derive(Parser, Debug)]
#[command(name = "wind-site-demo")]
#[command(about = "Wind resource aggregation and wind farm site selection", long_about = None)]
struct Args {
    /// Study description (YAML)
    #[arg(default_value = "demo-headless/study.yaml")]
    study: PathBuf,

    /// Log filter, overridden by RUST_LOG
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Seed of the synthetic station archive
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Fit Weibull factors with the method of moments instead of maximum likelihood
    #[arg(long)]
    moments: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let study = Study::load(&args.study)?;
    println!("=== Wind Farm Site Study ===\n");
    println!(
        "Area: lon {:.3}..{:.3}, lat {:.3}..{:.3} ({}x{} points)",
        study.lon_min,
        study.lon_max,
        study.lat_min,
        study.lat_max,
        study.precision_lon,
        study.precision_lat
    );
    println!("Years: {:?}, altitude: {:?} m\n", study.study_years, study.study_alt);

    let (inventory, archive) = synthetic::build_archive(&study, args.seed)?;

    let mut config = study.engine_config();
    if args.moments {
        config.fit_method = wind_site_core::FitMethod::Moments;
    }
    let engine = WindSiteEngine::new(study.grid()?, config)?;
    let mut stations = engine.nearby_stations(&inventory, 10, 5.0);
    println!("Using {} stations around the study area", stations.len());

    let history = engine
        .aggregate(&mut stations, &archive, &study.study_years, study.study_alt)
        .context("aggregating wind history")?;
    let mean = history.wind_mean();
    println!(
        "Mean wind speed: {:.2} m/s (min {:.2}, max {:.2})",
        mean.mean(),
        mean.min(),
        mean.max()
    );

    let weibull = engine.fit(&history);
    println!("Fitted Weibull factors in {} cells", weibull.valid_cells());

    let mut farm = study.wind_farm()?;
    let selection = engine.select(&weibull, &farm)?;
    println!(
        "Farm power: {:.0} W peak for a target of {:.0} W\n",
        selection.power.max(),
        farm.target_power()
    );

    if selection.is_empty() {
        println!("No area of the study reaches the target power.");
        return Ok(());
    }

    println!("Areas of interest:");
    for (index, area) in selection.areas.iter().enumerate() {
        println!("  {}: {} | {:.0} W", index, describe(&area.bounds), area.score);
    }

    let boxes: Vec<BoundingBox> = selection.areas.iter().map(|area| area.bounds).collect();
    let terrain = synthetic::terrain(study.synthetic.relief_m, study.lat_min);
    let flattest = flattest_area(
        &boxes,
        &terrain,
        study.precision_lat_elevation,
        study.precision_lon_elevation,
    )?
    .context("no area to score")?;
    println!(
        "\nFlattest area is {} with a flatness score of {:.1}",
        flattest.index, flattest.score
    );

    let layout = engine.place(&mut farm, &boxes[flattest.index])?;
    println!("\nTurbine locations [lat, lon]:");
    for point in &layout {
        println!("  [{:.5}, {:.5}]", point.lat, point.lon);
    }
    println!(
        "\nExpected power of the placed farm: {:.0} W",
        farm.placed_power(&weibull, engine.grid())
    );
    Ok(())
}

fn describe(bounds: &BoundingBox) -> String {
    format!(
        "lat {:.4}..{:.4}, lon {:.4}..{:.4}",
        bounds.lat_min, bounds.lat_max, bounds.lon_min, bounds.lon_max
    )
}
