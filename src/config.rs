//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración del proceso vía argumentos CLI y variables de entorno.
//! Se construye una sola vez al arrancar y se pasa explícitamente al
//! dispatcher y al servidor; no hay estado global.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./work_dispatcher --port 8787 \
//!   --max-workers 20 \
//!   --max-queue-size 100
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! MAX_WORKERS=4 MAX_QUEUE_SIZE=0 PORT=9000 ./work_dispatcher
//! ```

use crate::compression::Codec;
use crate::jobs::{DispatcherConfig, ExecutionMode};
use clap::Parser;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Errores de validación de la configuración
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max workers must be >= 1")]
    InvalidWorkers,

    #[error("port must be > 0")]
    InvalidPort,

    #[error("unknown codec '{0}' (expected 'gzip' or 'none')")]
    UnknownCodec(String),
}

/// Configuración del dispatcher HTTP
#[derive(Debug, Clone, Parser)]
#[command(name = "work_dispatcher")]
#[command(about = "Dispatcher de jobs con pool de workers acotado y backpressure")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "8787", env = "PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HOST")]
    pub host: String,

    // === Dispatcher ===

    /// Capacidad máxima de la cola de jobs (0 = entrega directa sin buffer)
    #[arg(long = "max-queue-size", default_value = "100", env = "MAX_QUEUE_SIZE")]
    pub max_queue_size: usize,

    /// Número de workers del pool
    #[arg(long = "max-workers", default_value = "20", env = "MAX_WORKERS")]
    pub max_workers: usize,

    /// Ejecutar cada job en su propio thread (concurrencia no acotada)
    #[arg(long = "detached-jobs", default_value_t = false, env = "DETACHED_JOBS")]
    pub detached_jobs: bool,

    // === Jobs ===

    /// Duración simulada de un job de /work sin `ms`, en milisegundos
    #[arg(long = "job-duration-ms", default_value = "1000", env = "JOB_DURATION_MS")]
    pub job_duration_ms: u64,

    /// Codec para el body de /work (gzip o none)
    #[arg(long, default_value = "gzip", env = "CODEC")]
    pub codec: String,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use work_dispatcher::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:8787");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_workers == 0 {
            return Err(ConfigError::InvalidWorkers);
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        self.codec()?;

        Ok(())
    }

    /// Codec configurado
    pub fn codec(&self) -> Result<Codec, ConfigError> {
        Codec::from_name(&self.codec).map_err(|_| ConfigError::UnknownCodec(self.codec.clone()))
    }

    /// Duración por defecto de un job
    pub fn job_duration(&self) -> Duration {
        Duration::from_millis(self.job_duration_ms)
    }

    /// Configuración explícita para el dispatcher
    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            max_workers: self.max_workers,
            max_queue_size: self.max_queue_size,
            mode: if self.detached_jobs {
                ExecutionMode::Detached
            } else {
                ExecutionMode::Inline
            },
        }
    }

    /// Registra un resumen de la configuración
    pub fn log_summary(&self) {
        info!(address = %self.address(), "network");
        info!(
            max_workers = self.max_workers,
            max_queue_size = self.max_queue_size,
            detached = self.detached_jobs,
            "dispatcher"
        );
        info!(
            job_duration_ms = self.job_duration_ms,
            codec = %self.codec,
            "jobs"
        );
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 8787,
            host: "127.0.0.1".to_string(),
            max_queue_size: 100,
            max_workers: 20,
            detached_jobs: false,
            job_duration_ms: 1000,
            codec: "gzip".to_string(),
        }
    }
}
