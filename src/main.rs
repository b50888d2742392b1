//! # Work Dispatcher - Entry Point
//! src/main.rs
//!
//! Arranca el dispatcher y el servidor HTTP que lo alimenta. Cualquier error
//! de arranque (configuración inválida, puerto ocupado) termina el proceso
//! con código 1.

use std::process;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use work_dispatcher::config::Config;
use work_dispatcher::jobs::handlers::{self, WorkSettings};
use work_dispatcher::jobs::Dispatcher;
use work_dispatcher::router::Router;
use work_dispatcher::server::Server;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_thread_names(true)
        .init();

    let config = Config::new();

    if let Err(e) = run(config) {
        error!("fatal: {}", e);
        process::exit(1);
    }
}

fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;
    config.log_summary();

    let dispatcher = Arc::new(Dispatcher::new(config.dispatcher_config())?);
    dispatcher.start()?;

    let settings = WorkSettings {
        default_duration: config.job_duration(),
        codec: config.codec()?,
    };

    let mut router = Router::new();
    handlers::register_routes(&mut router, Arc::clone(&dispatcher), settings);

    let server = Server::bind(&config.address(), router)?;
    info!("ready, POST or GET /work to submit jobs");

    // Bloquea hasta que el proceso termine
    server.run()?;
    Ok(())
}
