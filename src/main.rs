//! Pokedex web server.
//!
//! Reads its configuration from the environment (or a `.env` file), connects to the database and
//! serves the API built by the [lib crate](pokedex). See `README.md` for the variables it reads.

use actix_web::HttpServer;
use anyhow::Context;
use env_logger::Env;
use log::info;
use pokedex::auth::session::SessionKeys;
use pokedex::db::get_pool;
use pokedex::helpers::env::{load_optional_dotenv, optional_env_var, optional_int_env_var};
use pokedex::repositories::Repositories;
use pokedex::service_env::ServiceEnv;
use pokedex::{pokedex_app, AppState};
use rustc_version_runtime::version;

const DEFAULT_HTTP_ADDR: &str = "127.0.0.1";
const DEFAULT_HTTP_PORT: u16 = 8080;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let env_file_loaded = load_optional_dotenv().with_context(|| "failed to load `.env` file")?;

    env_logger::init_from_env(Env::default().default_filter_or("info"));

    if !env_file_loaded {
        info!(".env file not found; using process environment only");
    }

    let service_env = ServiceEnv::current();
    let (address, port) = listen_address()?;

    info!("Creating DB connection pool");
    let pool = get_pool().with_context(|| "failed to create DB connection pool")?;

    let session_keys = SessionKeys::from_env().with_context(|| "failed to load session keys")?;
    info!("Sessions last {}", session_keys.ttl());

    let state = AppState::new(Repositories::postgres(pool), session_keys);

    let server = HttpServer::new(move || pokedex_app!(state))
        .bind((address.as_str(), port))
        .with_context(|| format!("failed to bind to {}:{}", address, port))?
        .run();

    info!("Pokedex listening on {}:{} ({} environment)", address, port, service_env);
    info!("Built with Rust {}", version());
    if service_env.is_development() {
        info!("Backtrace support: {}", backtrace_support());
    }

    Ok(server.await?)
}

/// Address and port to listen on, from `HTTP_ADDR` and `HTTP_PORT`.
///
/// Set `HTTP_ADDR` to `0.0.0.0` when running in a container.
fn listen_address() -> anyhow::Result<(String, u16)> {
    let address = optional_env_var("HTTP_ADDR")?.unwrap_or_else(|| DEFAULT_HTTP_ADDR.into());
    let port = optional_int_env_var("HTTP_PORT")?.unwrap_or(DEFAULT_HTTP_PORT);

    Ok((address, port))
}

fn backtrace_support() -> &'static str {
    #[cfg(backtrace_support)]
    match std::backtrace::Backtrace::capture().status() {
        std::backtrace::BacktraceStatus::Captured => "enabled",
        std::backtrace::BacktraceStatus::Disabled => "disabled (set RUST_BACKTRACE=1)",
        _ => "unsupported",
    }

    #[cfg(not(backtrace_support))]
    "unavailable on this toolchain"
}
