//! # Construcción de Respuestas HTTP
//!
//! Respuestas HTTP/1.0 armadas en memoria y serializadas a bytes para el
//! socket. Los bodies JSON se generan con `serde_json` para que los mensajes
//! queden bien escapados.
//!
//! ```
//! use work_dispatcher::http::{Response, StatusCode};
//!
//! let response = Response::json(StatusCode::Accepted, &serde_json::json!({"job": "/work"}));
//! assert!(response.to_bytes().starts_with(b"HTTP/1.0 202 Accepted\r\n"));
//! ```

use super::StatusCode;
use std::collections::BTreeMap;

/// Respuesta HTTP/1.0
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,

    /// Ordenados por nombre para que la salida sea determinista
    headers: BTreeMap<String, String>,

    body: Vec<u8>,
}

impl Response {
    /// Respuesta vacía con el código indicado
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: Vec::new(),
        }
    }

    /// Agrega (o reemplaza) un header, estilo builder
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Agrega (o reemplaza) un header
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name.to_string(), value.to_string());
    }

    /// Establece el body y su `Content-Length`
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.headers
            .insert("Content-Length".to_string(), body.len().to_string());
        self.body = body;
        self
    }

    /// Respuesta JSON con el código indicado
    pub fn json(status: StatusCode, value: &serde_json::Value) -> Self {
        Self::new(status)
            .with_header("Content-Type", "application/json")
            .with_body(value.to_string().into_bytes())
    }

    /// Respuesta de error: `{"error": "mensaje"}`
    pub fn error(status: StatusCode, message: &str) -> Self {
        Self::json(status, &serde_json::json!({ "error": message }))
    }

    /// Serializa la respuesta completa: status line, headers, línea vacía, body
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = format!("HTTP/1.0 {}\r\n", self.status).into_bytes();

        for (name, value) in &self.headers {
            out.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }

        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&self.body);
        out
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|s| s.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
