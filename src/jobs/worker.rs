//! # Worker
//! src/jobs/worker.rs
//!
//! Loop de un worker: toma un job de la cola, lo ejecuta, repite. Termina
//! solo cuando la cola se cierra y queda vacía.

use crate::jobs::job::Job;
use crate::jobs::queue::JobQueue;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Cómo ejecuta un worker los jobs que desencola
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// El job corre en el thread del worker. Nunca hay más de `max_workers`
    /// jobs ejecutándose a la vez.
    #[default]
    Inline,

    /// Cada job corre en un thread nuevo y el worker vuelve inmediatamente a
    /// la cola. La concurrencia deja de estar acotada: el pool solo limita el
    /// ritmo de desencolado.
    Detached,
}

impl ExecutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Inline => "inline",
            ExecutionMode::Detached => "detached",
        }
    }
}

/// Contadores compartidos entre dispatcher y workers
#[derive(Debug, Default)]
pub struct JobCounters {
    pub submitted: AtomicUsize,
    pub started: AtomicUsize,
    pub completed: AtomicUsize,
    pub panicked: AtomicUsize,
    pub in_flight: AtomicUsize,
}

/// Un worker del pool
pub struct Worker {
    id: usize,
    queue: JobQueue,
    counters: Arc<JobCounters>,
    mode: ExecutionMode,
}

impl Worker {
    pub fn new(id: usize, queue: JobQueue, counters: Arc<JobCounters>, mode: ExecutionMode) -> Self {
        Self {
            id,
            queue,
            counters,
            mode,
        }
    }

    /// Loop principal del worker
    pub fn run(self) {
        debug!(worker = self.id, "worker started");

        while let Some(job) = self.queue.dequeue() {
            match self.mode {
                ExecutionMode::Inline => execute(self.id, job, &self.counters),
                ExecutionMode::Detached => self.detach(job),
            }
        }

        debug!(worker = self.id, "queue closed, worker stopped");
    }

    fn detach(&self, job: Job) {
        let id = self.id;
        let counters = Arc::clone(&self.counters);
        let name = job.name().to_string();

        // El nombre del job viene del cliente y puede traer NUL
        let spawned = thread::Builder::new()
            .name(format!("job-w{}", id))
            .spawn(move || execute(id, job, &counters));

        if let Err(e) = spawned {
            error!(worker = id, job = %name, error = %e, "failed to spawn detached job thread, job dropped");
        }
    }
}

/// Ejecuta un job en el thread actual, emitiendo los eventos de inicio y fin.
///
/// Un panic dentro del job se captura para que el worker siga sirviendo.
fn execute(worker: usize, job: Job, counters: &JobCounters) {
    let name = job.name().to_string();

    counters.started.fetch_add(1, Ordering::SeqCst);
    counters.in_flight.fetch_add(1, Ordering::SeqCst);
    info!(worker, job = %name, "started job");

    let start = Instant::now();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| job.run()));
    let elapsed_ms = start.elapsed().as_millis() as u64;

    counters.in_flight.fetch_sub(1, Ordering::SeqCst);

    match outcome {
        Ok(()) => {
            counters.completed.fetch_add(1, Ordering::SeqCst);
            info!(worker, job = %name, elapsed_ms, "finished job");
        }
        Err(_) => {
            counters.panicked.fetch_add(1, Ordering::SeqCst);
            warn!(worker, job = %name, elapsed_ms, "job panicked");
        }
    }
}
