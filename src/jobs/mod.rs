//! # Sistema de Jobs
//!
//! Dispatcher con pool de workers acotado y backpressure.
//!
//! - `job`: el valor inmutable que describe una unidad de trabajo
//! - `queue`: cola FIFO de capacidad fija
//! - `worker`: loop que desencola y ejecuta
//! - `dispatcher`: dueño de la cola y del pool, expone `start` y `submit`
//! - `handlers`: endpoints HTTP que convierten requests en jobs
//!
//! ## Endpoints
//!
//! - `/work?name=NAME&ms=MILLIS` - Encolar job (bloquea si la cola está llena)
//! - `/stats` - Estadísticas del dispatcher

pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod job;
pub mod queue;
pub mod worker;

pub use dispatcher::{Dispatcher, DispatcherConfig, DispatcherStats};
pub use error::DispatchError;
pub use job::{Job, JobHandle, Work};
pub use queue::JobQueue;
pub use worker::ExecutionMode;
