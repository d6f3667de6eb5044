use std::path::{Path, PathBuf};

use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::{bail, Context, Result};
use cellscout::{
    export::to_feature_collection,
    select_best_with,
    source::{self, OpenCellIdClient, TowerSource},
    GeoPoint,
};
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod api;
mod config;

use api::{select::SelectionResponse, signal::SignalReport, AppState};
use config::Config;

#[derive(Debug, Parser)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve { port: Option<u16> },
    /// Rank the towers around a position
    Select {
        #[arg(allow_hyphen_values = true)]
        position: GeoPoint,
        /// Preferred operator (MNC), overrides the config
        #[arg(short, long)]
        network: Option<u16>,
        /// Consider other operators when the preferred one has no tower, overrides the config
        #[arg(long)]
        roaming: Option<bool>,
        /// Print GeoJSON instead of the ranked list
        #[arg(long)]
        geojson: bool,
    },
    /// Estimate signal strength and suggest a better spot
    Signal {
        #[arg(allow_hyphen_values = true)]
        position: GeoPoint,
    },
    /// Check how a piece of coordinate text is understood
    Parse {
        #[arg(allow_hyphen_values = true)]
        text: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Command::Parse { text } => {
            let p: GeoPoint = text.parse()?;
            println!("{}, {}", p.lat(), p.lon());
        }

        Command::Serve { port } => {
            let (config, tower_source) = setup(cli.config.as_deref())?;
            let port = port.unwrap_or(config.http_port);
            let state = web::Data::new(AppState {
                source: tower_source,
                preferred_network: config.preferred_network,
                allow_roaming: config.allow_roaming,
                search_radius: config.search_radius_km * 1000.0,
                nearest_limit: config.nearest_limit,
                weights: config.weights,
                traffic_areas: config.traffic_areas,
            });

            info!(port, "listening");
            HttpServer::new(move || {
                App::new()
                    .app_data(state.clone())
                    .wrap(Logger::default())
                    .service(api::towers::nearby)
                    .service(api::select::recommend)
                    .service(api::select::select)
                    .service(api::signal::service)
            })
            .bind(("0.0.0.0", port))?
            .run()
            .await?;
        }

        Command::Select {
            position,
            network,
            roaming,
            geojson,
        } => {
            let (config, tower_source) = setup(cli.config.as_deref())?;
            let towers = tower_source
                .towers_near(position, config.search_radius_km * 1000.0)
                .await?;
            let network = network.or(config.preferred_network);
            let roaming = roaming.unwrap_or(config.allow_roaming);
            let selection = select_best_with(&config.weights, position, &towers, network, roaming);

            if geojson {
                let collection = to_feature_collection(position, &selection);
                println!("{}", serde_json::to_string_pretty(&collection)?);
            } else if let Some(body) = SelectionResponse::new(position, &selection) {
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("No eligible tower on the preferred network, try again with --roaming true");
            }
        }

        Command::Signal { position } => {
            let (config, tower_source) = setup(cli.config.as_deref())?;
            let towers = tower_source
                .towers_near(position, config.search_radius_km * 1000.0)
                .await?;
            let time = Local::now().time();
            let report = SignalReport::new(position, &towers, &config.traffic_areas, time);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    };

    Ok(())
}

/// Loads the config, starts logging and opens the tower source.
fn setup(path: Option<&Path>) -> Result<(Config, TowerSource)> {
    let path = path.unwrap_or(Path::new("config.toml"));
    let config = config::load(path)?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let tower_source = tower_source(&config)?;
    Ok((config, tower_source))
}

fn tower_source(config: &Config) -> Result<TowerSource> {
    if let Some(path) = &config.towers {
        let towers = source::load_file(path)
            .with_context(|| format!("Failed to load towers from {}", path.display()))?;
        return Ok(TowerSource::Static(towers));
    }
    if let Some(opencellid) = &config.opencellid {
        let client = OpenCellIdClient::new(opencellid.clone())?;
        return Ok(TowerSource::OpenCellId(client));
    }
    bail!("No tower source configured, set `towers` or add an [opencellid] section")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roaming_flag_overrides_config_both_ways() {
        let roaming = |args: &[&str]| match Cli::try_parse_from(args.iter().copied()).unwrap().command {
            Command::Select { roaming, .. } => roaming,
            other => panic!("unexpected command {other:?}"),
        };

        assert_eq!(roaming(&["cellscout", "select", "-33.93,18.63"]), None);
        assert_eq!(
            roaming(&["cellscout", "select", "-33.93,18.63", "--roaming", "false"]),
            Some(false)
        );
        assert_eq!(
            roaming(&["cellscout", "select", "-33.93,18.63", "--roaming", "true"]),
            Some(true)
        );
    }
}
