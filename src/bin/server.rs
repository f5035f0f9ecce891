use std::{fs, net::SocketAddr, path::PathBuf, process::ExitCode};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use remitview::{AppState, Transaction, build_router, graceful_shutdown, parse_transactions};

/// The web server for remitview.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The port to serve the app from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The canonical name of the timezone used to group transactions into
    /// months, e.g. "Asia/Seoul".
    #[arg(long, default_value = "Asia/Seoul")]
    timezone: String,

    /// A JSON file of transactions to show before anything is uploaded.
    #[arg(long)]
    data_file: Option<PathBuf>,

    /// The directory with the static files (scripts, styles).
    #[arg(long, default_value = "static/")]
    static_dir: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();

    let args = Args::parse();

    let transactions = match &args.data_file {
        Some(path) => match load_data_file(path) {
            Ok(transactions) => transactions,
            Err(error) => {
                tracing::error!("Could not load {}: {error}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => Vec::new(),
    };

    let state = match AppState::new(&args.timezone, transactions) {
        Ok(state) => state,
        Err(error) => {
            tracing::error!("Could not start the server: {error}");
            return ExitCode::FAILURE;
        }
    };

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(state, &args.static_dir));

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    tracing::info!("HTTP server listening on {}", addr);
    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server error: {error}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn load_data_file(path: &PathBuf) -> Result<Vec<Transaction>, String> {
    let text = fs::read_to_string(path).map_err(|error| error.to_string())?;
    let transactions = parse_transactions(&text).map_err(|error| error.to_string())?;

    tracing::info!(
        "Loaded {} transactions from {}",
        transactions.len(),
        path.display()
    );

    Ok(transactions)
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
