//! # Work Dispatcher
//! src/lib.rs
//!
//! Dispatcher de jobs con control de admisión: un pool de workers de tamaño
//! fijo consume una cola FIFO acotada. Cuando la cola se llena, quien envía
//! queda bloqueado (backpressure) en lugar de recibir un rechazo.
//!
//! ## Arquitectura
//!
//! - `jobs`: Job, cola acotada, workers y dispatcher (el núcleo)
//! - `compression`: codecs `gzip` / `none` que un job puede usar
//! - `config`: configuración CLI / variables de entorno
//! - `http`: parsing y construcción de mensajes HTTP/1.0
//! - `router`: mapeo de paths a handlers
//! - `server`: servidor TCP, admission boundary del dispatcher
//!
//! ## Ejemplo de uso
//!
//! ```
//! use std::time::Duration;
//! use work_dispatcher::jobs::{Dispatcher, DispatcherConfig, Job};
//!
//! let dispatcher = Dispatcher::new(DispatcherConfig {
//!     max_workers: 2,
//!     max_queue_size: 1,
//!     ..Default::default()
//! }).unwrap();
//! dispatcher.start().unwrap();
//!
//! let handle = dispatcher.submit_tracked(Job::sleep("demo", Duration::from_millis(10))).unwrap();
//! assert!(handle.wait());
//! dispatcher.shutdown();
//! ```

pub mod compression;
pub mod config;
pub mod http;
pub mod jobs;
pub mod router;
pub mod server;
