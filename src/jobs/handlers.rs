//! # Handlers HTTP para Jobs
//! src/jobs/handlers.rs
//!
//! Admission boundary: convierte cada request en un [`Job`] y lo entrega al
//! dispatcher. El thread de la conexión queda bloqueado mientras la cola
//! esté llena; esa es la backpressure que ve el cliente.

use crate::compression::Codec;
use crate::http::{Request, Response, StatusCode};
use crate::jobs::{DispatchError, Dispatcher, Job};
use crate::router::Router;
use serde_json::json;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

/// Duración máxima que un request puede pedir con `ms`
pub const MAX_JOB_DURATION_MS: u64 = 60_000;

/// Parámetros de los jobs creados desde HTTP
#[derive(Debug, Clone, Copy)]
pub struct WorkSettings {
    /// Duración cuando el request no trae `ms`
    pub default_duration: Duration,

    /// Codec aplicado al body del request
    pub codec: Codec,
}

impl Default for WorkSettings {
    fn default() -> Self {
        Self {
            default_duration: Duration::from_secs(1),
            codec: Codec::Gzip,
        }
    }
}

/// Registra `/work`, `/stats` y `/health`
pub fn register_routes(router: &mut Router, dispatcher: Arc<Dispatcher>, settings: WorkSettings) {
    {
        let dispatcher = Arc::clone(&dispatcher);
        router.register("/work", move |req: &Request| work_handler(req, &dispatcher, &settings));
    }
    router.register("/stats", move |_req: &Request| stats_handler(&dispatcher));
    router.register("/health", |_req: &Request| {
        Response::json(StatusCode::Ok, &json!({ "status": "ok" }))
    });
}

/// Handler para /work?name=NAME&ms=MILLIS
///
/// Encola un job que simula `ms` milisegundos de trabajo. Si el request
/// trae body, el job además lo comprime con el codec configurado.
///
/// # Query parameters
/// - `name`: Nombre del job (opcional, default: el path del request)
/// - `ms`: Duración en milisegundos (opcional, max: 60000)
///
/// # Ejemplo de response
/// ```json
/// {"job": "resize", "status": "queued"}
/// ```
pub fn work_handler(req: &Request, dispatcher: &Dispatcher, settings: &WorkSettings) -> Response {
    let name = req.query_param("name").unwrap_or(req.path()).to_string();

    let duration = match req.query_param("ms") {
        Some(ms) => match ms.parse::<u64>() {
            Ok(ms) if ms <= MAX_JOB_DURATION_MS => Duration::from_millis(ms),
            _ => {
                return Response::error(
                    StatusCode::BadRequest,
                    &format!("Parameter 'ms' must be between 0 and {}", MAX_JOB_DURATION_MS),
                );
            }
        },
        None => settings.default_duration,
    };

    let job = if req.body().is_empty() {
        Job::sleep(name.clone(), duration)
    } else {
        compress_job(name.clone(), duration, req.body().to_vec(), settings.codec)
    };

    match dispatcher.submit(job) {
        Ok(()) => Response::json(StatusCode::Accepted, &json!({ "job": name, "status": "queued" })),
        Err(e @ DispatchError::Closed(_)) => {
            Response::error(StatusCode::ServiceUnavailable, &e.to_string())
        }
        Err(e) => Response::error(StatusCode::InternalServerError, &e.to_string()),
    }
}

/// Handler para /stats
///
/// # Ejemplo de response
/// ```json
/// {"max_workers": 20, "max_queue_size": 100, "mode": "inline", "running": true,
///  "submitted": 42, "queued": 3, "started": 39, "completed": 35, "panicked": 0, "in_flight": 4}
/// ```
pub fn stats_handler(dispatcher: &Dispatcher) -> Response {
    match serde_json::to_value(dispatcher.stats()) {
        Ok(stats) => Response::json(StatusCode::Ok, &stats),
        Err(e) => Response::error(StatusCode::InternalServerError, &e.to_string()),
    }
}

/// Job que simula trabajo y luego comprime el payload
fn compress_job(name: String, duration: Duration, payload: Vec<u8>, codec: Codec) -> Job {
    let job_name = name.clone();

    Job::from_fn(name, move || {
        thread::sleep(duration);

        match codec.compress(&payload) {
            Ok(out) => info!(
                job = %job_name,
                codec = %codec,
                original = payload.len(),
                compressed = out.len(),
                "payload compressed"
            ),
            Err(e) => warn!(job = %job_name, error = %e, "payload compression failed"),
        }
    })
}
