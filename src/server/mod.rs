//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Servidor TCP que:
//! 1. Escucha en un puerto
//! 2. Acepta conexiones entrantes (un thread por conexión)
//! 3. Lee y parsea requests HTTP/1.0
//! 4. Enruta al handler y envía la respuesta

pub mod tcp;

pub use tcp::Server;
