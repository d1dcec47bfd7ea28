use clap::{Parser, Subcommand};
use georcoder::{AggregatorConfig, GeoFeature, GeocodeError, Georcoder, RequestParams};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Georcoder: geocoding aggregator
///
/// Queries the configured primary providers in order, enriches the result
/// with every extender and prints GeoJSON features.
///
/// Examples:
///   georcoder geocode "Alexanderplatz 1, Berlin"
///   georcoder reverse 13.4482975,52.4743293
///   georcoder --config ./georcoder.json serve --port 3000
#[derive(Parser)]
#[command(name = "georcoder", version, about, long_about = None)]
struct Cli {
    /// Config file (JSON). Defaults to ~/.georcoder/config.json.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Geocode an address.
    Geocode {
        address: String,

        /// Maximum number of locations requested from the provider.
        #[arg(long, default_value_t = 1)]
        max_locations: u32,

        /// Preferred result language (e.g. de, en).
        #[arg(long)]
        lang: Option<String>,
    },

    /// Reverse geocode a "lon,lat" pair.
    Reverse {
        #[arg(allow_hyphen_values = true)]
        coords: String,

        #[arg(long)]
        lang: Option<String>,
    },

    /// Serve the HTTP API.
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(long, short = 'p', default_value_t = 3000)]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose { "debug" } else { "info" })
    });
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // ── Build aggregator ────────────────────────────────────────

    let config = AggregatorConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let aggregator = Georcoder::new(&config).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    // ── Dispatch ────────────────────────────────────────────────

    match cli.command {
        Command::Geocode { address, max_locations, lang } => {
            let params = RequestParams { max_locations, language: lang };
            print_result(aggregator.geocode(&address, &params).await);
        }
        Command::Reverse { coords, lang } => {
            let params = RequestParams { language: lang, ..RequestParams::default() };
            print_result(aggregator.reverse(&coords, &params).await);
        }
        Command::Serve { host, port } => {
            if let Err(e) = georcoder::server::start(aggregator, &host, port).await {
                eprintln!("Server error: {}", e);
                std::process::exit(1);
            }
        }
    }
}

/// Features as JSON on stdout; `{code, msg}` on stderr with a non-zero exit.
fn print_result(result: Result<Vec<GeoFeature>, GeocodeError>) {
    match result {
        Ok(features) => match serde_json::to_string_pretty(&features) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: cannot serialize result: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            let body = e.body();
            eprintln!(
                "{}",
                serde_json::to_string(&body).unwrap_or_else(|_| body.msg.clone())
            );
            std::process::exit(1);
        }
    }
}
