//! # Módulo HTTP
//!
//! Implementación mínima de HTTP/1.0 (RFC 1945) para el admission boundary:
//!
//! - Parsing de requests (request line, query params, headers, body)
//! - Construcción de responses
//! - Status codes
//!
//! No hay conexiones persistentes: una request por conexión.

pub mod request;
pub mod response;
pub mod status;

pub use request::{Method, ParseError, Request};
pub use response::Response;
pub use status::StatusCode;
