use std::process::ExitCode;

use serde::Serialize;
use tracing::error;
use tracing_subscriber::EnvFilter;

use route_builder::assemble::assemble;
use route_builder::config::Settings;
use route_builder::domain::{CodeWaypoint, Route, Station, StationCode, TracePoint};
use route_builder::geocode::{GeoMatcher, PhotonClient, RateLimited};
use route_builder::input::InputBundle;
use route_builder::pipeline::Reconstructor;

/// Printed to stdout as JSON.
#[derive(Serialize)]
struct Output<'a> {
    waypoints: &'a [CodeWaypoint],
    legs: Vec<LegOutput<'a>>,
    route: Route,
    stations: Vec<&'a Station>,
}

#[derive(Serialize)]
struct LegOutput<'a> {
    station: &'a StationCode,
    points: Vec<&'a TracePoint>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .ok_or("usage: route-builder <bundle.json>")?;

    let settings = Settings::from_env()?;
    let mut parts = InputBundle::load(&path)?.into_parts()?;

    let client = PhotonClient::new(&settings.geocoder)?;
    let geocoder = RateLimited::new(client, settings.rate_limit.clone());
    let reconstructor = Reconstructor::new(
        GeoMatcher::new(geocoder, settings.geocoder.clone()),
        settings.reconstruction.clone(),
    );

    let reconstruction = reconstructor
        .reconstruct(&parts.trace, &parts.hints, &mut parts.stations)
        .await?;

    // Explicit waypoints carry route numbers; the trace's own don't
    let along = parts
        .waypoints
        .as_deref()
        .unwrap_or(&reconstruction.waypoints);
    let route = assemble(along, &parts.stations, &parts.paths);

    let output = Output {
        waypoints: &reconstruction.waypoints,
        legs: reconstruction
            .legs
            .iter()
            .map(|leg| LegOutput {
                station: leg.station.primary_code(),
                points: leg.points.clone(),
            })
            .collect(),
        route,
        stations: parts.stations.iter().map(|(_, station)| station).collect(),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
