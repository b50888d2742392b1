//! # Cola acotada de Jobs
//! src/jobs/queue.rs
//!
//! Cola FIFO de capacidad fija construida sobre `mpsc::sync_channel`.
//! Es el único punto de sincronización entre submitters y workers:
//!
//! - `enqueue` bloquea cuando la cola está llena (backpressure).
//! - `dequeue` bloquea mientras la cola está vacía.
//! - Con capacidad 0 el canal es un rendezvous: el submitter espera a que un
//!   worker tome el job en mano.
//!
//! El `Receiver` de std es de un solo consumidor, así que los workers lo
//! comparten detrás de un `Mutex`. Solo uno a la vez puede estar esperando en
//! `recv`, lo que garantiza que cada job llega a exactamente un worker.

use crate::jobs::job::Job;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::{Arc, Mutex, MutexGuard};

/// Cola acotada thread-safe
pub struct JobQueue {
    /// Extremo de envío. `None` una vez cerrada la cola.
    sender: Arc<Mutex<Option<SyncSender<Job>>>>,

    /// Extremo de recepción compartido entre workers
    receiver: Arc<Mutex<Receiver<Job>>>,

    /// Capacidad máxima de la cola
    capacity: usize,
}

impl JobQueue {
    /// Crea una nueva cola con la capacidad indicada
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::sync_channel(capacity);
        Self {
            sender: Arc::new(Mutex::new(Some(tx))),
            receiver: Arc::new(Mutex::new(rx)),
            capacity,
        }
    }

    /// Encola un job, bloqueando mientras la cola esté llena.
    ///
    /// Retorna el job de vuelta si la cola ya fue cerrada.
    pub fn enqueue(&self, job: Job) -> Result<(), Job> {
        // Clonar el sender y soltar el lock antes de bloquear en `send`,
        // si no un submitter bloqueado frenaría a todos los demás
        let sender = match lock(&self.sender).as_ref() {
            Some(tx) => tx.clone(),
            None => return Err(job),
        };

        sender.send(job).map_err(|err| err.0)
    }

    /// Desencola el siguiente job en orden FIFO.
    ///
    /// Bloquea hasta que haya un job disponible. Retorna `None` cuando la
    /// cola está cerrada y ya no quedan jobs pendientes.
    pub fn dequeue(&self) -> Option<Job> {
        let receiver = lock(&self.receiver);
        receiver.recv().ok()
    }

    /// Cierra la cola. Los jobs ya encolados siguen disponibles para
    /// `dequeue`; los `enqueue` posteriores fallan.
    pub fn close(&self) {
        lock(&self.sender).take();
    }

    /// Verifica si la cola fue cerrada
    pub fn is_closed(&self) -> bool {
        lock(&self.sender).is_none()
    }

    /// Retorna la capacidad máxima
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Clone for JobQueue {
    fn clone(&self) -> Self {
        Self {
            sender: Arc::clone(&self.sender),
            receiver: Arc::clone(&self.receiver),
            capacity: self.capacity,
        }
    }
}

/// Toma el lock ignorando el envenenamiento: los datos protegidos son
/// extremos de canal, que siguen siendo válidos tras un panic
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
