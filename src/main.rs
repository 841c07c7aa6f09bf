extern crate log;
pub mod error;
pub mod geofile;
pub mod geometry;
pub mod nfz;
use crate::geometry::circle::{CircleParams, RadiusUnit, DEFAULT_CIRCLE_RESOLUTION};
use crate::nfz::filter::{filter_by_localtype_file, FilterParams};
use crate::nfz::normalize::normalize_zones_file;
use anyhow::anyhow;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::PathBuf;
use std::{fs::read_to_string, path::Path};

/// Convert no-fly-zone datasets into clean GeoJSON.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to an optional YAML config file overriding paths and parameters.
    #[arg(short, long)]
    config_filepath: Option<String>,

    #[command(subcommand)]
    procedure: Procedure,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq)]
enum Procedure {
    /// Convert the open-category zone dataset to a GeoJSON FeatureCollection.
    NormalizeZones,
    /// Keep only the features of one localtype and recompute the collection counters.
    FilterLocaltype,
}

#[derive(Deserialize, Debug, PartialEq)]
#[serde(default)]
struct ZoneNormalizerConfig {
    input_filepath: PathBuf,
    output_filepath: PathBuf,
    circle_resolution: usize,
    radius_unit: RadiusUnit,
}

impl Default for ZoneNormalizerConfig {
    fn default() -> Self {
        Self {
            input_filepath: PathBuf::from("public/data/nfz/rijksoverheid/open-category.json"),
            output_filepath: PathBuf::from("public/data/nfz/rijksoverheid/open-category.geojson"),
            circle_resolution: DEFAULT_CIRCLE_RESOLUTION,
            radius_unit: RadiusUnit::CoordinateUnits,
        }
    }
}

impl ZoneNormalizerConfig {
    fn circle_params(&self) -> CircleParams {
        CircleParams {
            resolution: self.circle_resolution,
            radius_unit: self.radius_unit,
        }
    }
}

#[derive(Deserialize, Debug, PartialEq)]
#[serde(default)]
struct TypeFilterConfig {
    input_filepath: PathBuf,
    output_filepath: PathBuf,
    #[serde(flatten)]
    params: FilterParams,
}

impl Default for TypeFilterConfig {
    fn default() -> Self {
        Self {
            input_filepath: PathBuf::from(
                "public/data/nfz/pdok/luchtvaartgebieden-zonder-natura-2000.geojson",
            ),
            output_filepath: PathBuf::from(
                "public/data/nfz/pdok/luchtvaartgebieden-zonder-natura-2000-cleaned.geojson",
            ),
            params: FilterParams::default(),
        }
    }
}

#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(default)]
struct Config {
    zone_normalizer: ZoneNormalizerConfig,
    type_filter: TypeFilterConfig,
}

fn read_config(config_filepath: Option<&str>) -> anyhow::Result<Config> {
    let config_filepath = match config_filepath {
        Some(config_filepath) => config_filepath,
        None => return Ok(Config::default()),
    };
    if !Path::new(config_filepath).exists() {
        return Err(anyhow!("Config file {} not found", config_filepath));
    }
    let config_contents = read_to_string(config_filepath)?;
    Ok(serde_yaml::from_str(&config_contents)?)
}

fn run_procedure(procedure: Procedure, config: &Config) -> anyhow::Result<()> {
    match procedure {
        Procedure::NormalizeZones => {
            let zone_config = &config.zone_normalizer;
            normalize_zones_file(
                &zone_config.input_filepath,
                &zone_config.output_filepath,
                &zone_config.circle_params(),
            )
        }
        Procedure::FilterLocaltype => {
            let filter_config = &config.type_filter;
            let report = filter_by_localtype_file(
                &filter_config.input_filepath,
                &filter_config.output_filepath,
                &filter_config.params,
            )?;
            log::debug!("{:?}", report);
            Ok(())
        }
    }
}

fn try_main() -> anyhow::Result<()> {
    let args = Args::try_parse()?;
    let config = read_config(args.config_filepath.as_deref())?;
    run_procedure(args.procedure, &config)
}

fn main() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    env_logger::init();
    if let Err(e) = try_main() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1)
    }
}
