//! # Dispatcher
//! src/jobs/dispatcher.rs
//!
//! Dueño de la cola acotada y del pool de workers. Expone el contrato de
//! admisión: `submit` encola o bloquea, nunca rechaza mientras el
//! dispatcher esté vivo.
//!
//! ```text
//! submit ──► JobQueue (cap = max_queue_size) ──► Worker × max_workers
//! ```

use crate::jobs::error::DispatchError;
use crate::jobs::job::{Job, JobHandle};
use crate::jobs::queue::JobQueue;
use crate::jobs::worker::{ExecutionMode, JobCounters, Worker};
use serde::Serialize;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

/// Configuración del dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Número de workers del pool (> 0)
    pub max_workers: usize,

    /// Capacidad de la cola. 0 = rendezvous, sin buffer.
    pub max_queue_size: usize,

    /// Cómo ejecutan los workers cada job
    pub mode: ExecutionMode,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_workers: 20,
            max_queue_size: 100,
            mode: ExecutionMode::Inline,
        }
    }
}

/// Snapshot de estadísticas del dispatcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatcherStats {
    pub max_workers: usize,
    pub max_queue_size: usize,
    pub mode: &'static str,
    pub running: bool,
    pub submitted: usize,
    pub queued: usize,
    pub started: usize,
    pub completed: usize,
    pub panicked: usize,
    pub in_flight: usize,
}

/// Dispatcher de jobs con pool de workers de tamaño fijo
pub struct Dispatcher {
    config: DispatcherConfig,
    queue: JobQueue,
    counters: Arc<JobCounters>,
    started: AtomicBool,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl Dispatcher {
    /// Crea un dispatcher con la cola vacía. No lanza workers todavía.
    ///
    /// # Ejemplo
    /// ```
    /// use work_dispatcher::jobs::{Dispatcher, DispatcherConfig};
    ///
    /// let dispatcher = Dispatcher::new(DispatcherConfig {
    ///     max_workers: 4,
    ///     max_queue_size: 16,
    ///     ..Default::default()
    /// }).unwrap();
    /// dispatcher.start().unwrap();
    /// ```
    pub fn new(config: DispatcherConfig) -> Result<Self, DispatchError> {
        if config.max_workers == 0 {
            return Err(DispatchError::InvalidConfig(
                "max_workers must be >= 1".to_string(),
            ));
        }

        Ok(Self {
            config,
            queue: JobQueue::new(config.max_queue_size),
            counters: Arc::new(JobCounters::default()),
            started: AtomicBool::new(false),
            workers: Mutex::new(Vec::with_capacity(config.max_workers)),
        })
    }

    /// Lanza exactamente `max_workers` workers.
    ///
    /// Una segunda llamada falla con `AlreadyStarted` y no lanza nada. Si el
    /// sistema no puede crear un thread, los workers ya lanzados siguen
    /// consumiendo la cola y un nuevo `start` lanza solo los que faltan.
    pub fn start(&self) -> Result<(), DispatchError> {
        self.start_with(|id, worker| {
            thread::Builder::new()
                .name(format!("worker-{}", id))
                .spawn(move || worker.run())
        })
    }

    fn start_with<F>(&self, mut spawn: F) -> Result<(), DispatchError>
    where
        F: FnMut(usize, Worker) -> io::Result<JoinHandle<()>>,
    {
        if self.queue.is_closed() {
            return Err(DispatchError::Closed("<start>".to_string()));
        }
        if self
            .started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(DispatchError::AlreadyStarted);
        }

        if self.config.mode == ExecutionMode::Detached {
            warn!("detached execution enabled: concurrent jobs are not bounded by max_workers");
        }

        let mut workers = self.workers.lock().unwrap_or_else(|e| e.into_inner());
        for id in workers.len()..self.config.max_workers {
            let worker = Worker::new(
                id,
                self.queue.clone(),
                Arc::clone(&self.counters),
                self.config.mode,
            );

            match spawn(id, worker) {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    self.started.store(false, Ordering::SeqCst);
                    error!(
                        worker = id,
                        running = workers.len(),
                        error = %e,
                        "failed to spawn worker thread"
                    );
                    return Err(DispatchError::Spawn(e));
                }
            }
        }

        info!(
            workers = self.config.max_workers,
            queue_size = self.config.max_queue_size,
            mode = self.config.mode.as_str(),
            "dispatcher started"
        );

        Ok(())
    }

    /// Encola un job.
    ///
    /// Retorna en cuanto el job entra a la cola. Si la cola está llena
    /// bloquea al llamador hasta que un worker libere un lugar. Solo falla
    /// después de `shutdown`.
    pub fn submit(&self, job: Job) -> Result<(), DispatchError> {
        debug!(job = %job.name(), "submitting job");

        self.queue
            .enqueue(job)
            .map_err(|job| DispatchError::Closed(job.name().to_string()))?;

        self.counters.submitted.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Como `submit`, pero devuelve un handle para esperar la finalización
    pub fn submit_tracked(&self, job: Job) -> Result<JobHandle, DispatchError> {
        let (job, handle) = job.tracked();
        self.submit(job)?;
        Ok(handle)
    }

    /// Cierra la cola y espera a que los workers terminen.
    ///
    /// Los jobs ya encolados se ejecutan antes de que los workers salgan. En
    /// modo `Detached` los threads de cada job no se esperan.
    pub fn shutdown(&self) {
        self.queue.close();

        let handles: Vec<_> = {
            let mut workers = self.workers.lock().unwrap_or_else(|e| e.into_inner());
            workers.drain(..).collect()
        };

        for handle in handles {
            if handle.join().is_err() {
                warn!("worker thread exited with a panic");
            }
        }

        info!("dispatcher shut down");
    }

    /// Configuración con la que se creó el dispatcher
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Verifica si `start` ya fue llamado
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Estadísticas actuales
    pub fn stats(&self) -> DispatcherStats {
        let submitted = self.counters.submitted.load(Ordering::SeqCst);
        let started = self.counters.started.load(Ordering::SeqCst);

        DispatcherStats {
            max_workers: self.config.max_workers,
            max_queue_size: self.config.max_queue_size,
            mode: self.config.mode.as_str(),
            running: self.is_started() && !self.queue.is_closed(),
            submitted,
            queued: submitted.saturating_sub(started),
            started,
            completed: self.counters.completed.load(Ordering::SeqCst),
            panicked: self.counters.panicked.load(Ordering::SeqCst),
            in_flight: self.counters.in_flight.load(Ordering::SeqCst),
        }
    }
}
