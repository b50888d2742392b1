//! Errores del dispatcher

use thiserror::Error;

/// Errores que puede devolver el [`Dispatcher`](crate::jobs::Dispatcher)
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Configuración inválida al construir el dispatcher
    #[error("invalid dispatcher config: {0}")]
    InvalidConfig(String),

    /// `start` ya fue llamado
    #[error("dispatcher already started")]
    AlreadyStarted,

    /// La cola fue cerrada con `shutdown`
    #[error("dispatcher is shut down, job '{0}' was not accepted")]
    Closed(String),

    /// El sistema operativo no pudo crear un thread de worker
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}
