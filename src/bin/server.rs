use std::{
    env::{self},
    fs::OpenOptions,
    net::SocketAddr,
    process::exit,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use fintrack::{
    AppState, CurrencyNormalizer, HttpRateProvider, Scheduler, SqlUserSource, SystemClock,
    build_router, graceful_shutdown, logging_middleware,
};

/// The REST API server for fintrack.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The canonical timezone that decides the current date, e.g. "Pacific/Auckland".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,

    /// The base URL of the exchange rate API.
    #[arg(long, default_value = "https://open.er-api.com/v6/latest")]
    exchange_rate_url: String,

    /// How often, in minutes, to check whether the daily sweep of recurring
    /// transactions and notifications is due.
    #[arg(long, default_value_t = 60)]
    sweep_interval_minutes: u64,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let secret = env::var("SECRET").expect("The environment variable 'SECRET' must be set");

    let clock = match SystemClock::new(&args.timezone) {
        Ok(clock) => Arc::new(clock),
        Err(error) => {
            tracing::error!("{error}");
            exit(1);
        }
    };

    let conn = Connection::open(&args.db_path).expect("Could not open database file.");
    let conn = Arc::new(Mutex::new(conn));
    let normalizer =
        CurrencyNormalizer::new(Arc::new(HttpRateProvider::new(&args.exchange_rate_url)));
    let app_state = AppState::new(conn.clone(), &secret, normalizer, clock.clone())
        .expect("Could not initialize the database.");

    Scheduler::new(conn.clone(), clock, Arc::new(SqlUserSource::new(conn)))
        .with_check_interval(Duration::from_secs(args.sweep_interval_minutes.max(1) * 60))
        .spawn();

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(app_state))
        .layer(middleware::from_fn(logging_middleware));

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("Could not start server.");
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
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
