//! # Parsing de Requests HTTP/1.0
//! src/http/request.rs
//!
//! ## Formato de un Request HTTP/1.0
//!
//! ```text
//! POST /work?name=resize&ms=250 HTTP/1.0\r\n
//! Content-Length: 5\r\n
//! \r\n
//! hello
//! ```
//!
//! La request line y los headers deben ser UTF-8; el body se guarda como
//! bytes crudos porque puede ser cualquier payload.

use std::collections::HashMap;
use thiserror::Error;

/// Métodos HTTP soportados
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    GET,
    HEAD,
    POST,
}

impl Method {
    fn parse(s: &str) -> Result<Self, ParseError> {
        match s {
            "GET" => Ok(Method::GET),
            "HEAD" => Ok(Method::HEAD),
            "POST" => Ok(Method::POST),
            _ => Err(ParseError::UnsupportedMethod(s.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
        }
    }
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Empty request")]
    EmptyRequest,

    #[error("Invalid request line format")]
    InvalidRequestLine,

    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("Invalid HTTP version: {0}")]
    InvalidHttpVersion(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Llegaron menos bytes de body que los declarados en `Content-Length`
    #[error("Incomplete body: expected {expected} bytes, received {received}")]
    IncompleteBody { expected: usize, received: usize },
}

/// Request HTTP/1.0 parseado
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    query_params: HashMap<String, String>,
    /// Nombres normalizados a minúsculas
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl Request {
    /// Parsea un request desde bytes
    ///
    /// ```
    /// use work_dispatcher::http::Request;
    ///
    /// let request = Request::parse(b"GET /work?ms=10 HTTP/1.0\r\n\r\n").unwrap();
    /// assert_eq!(request.path(), "/work");
    /// assert_eq!(request.query_param("ms"), Some("10"));
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        let (head, body) = split_head(buffer);

        let head = std::str::from_utf8(head).map_err(|_| ParseError::InvalidRequestLine)?;
        if head.trim().is_empty() {
            return Err(ParseError::EmptyRequest);
        }

        let mut lines = head.split("\r\n");
        let request_line = lines.next().ok_or(ParseError::EmptyRequest)?;
        let (method, path, query_params) = parse_request_line(request_line)?;
        let headers = parse_headers(lines)?;

        // Respetar Content-Length si viene; si no, todo lo que sigue es body
        let body = match headers.get("content-length") {
            Some(value) => {
                let len: usize = value
                    .parse()
                    .map_err(|_| ParseError::InvalidHeader(format!("content-length: {}", value)))?;
                if body.len() < len {
                    return Err(ParseError::IncompleteBody {
                        expected: len,
                        received: body.len(),
                    });
                }
                body[..len].to_vec()
            }
            None => body.to_vec(),
        };

        Ok(Request {
            method,
            path,
            query_params,
            headers,
            body,
        })
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query_params
    }

    /// Obtiene un query parameter específico
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(|s| s.as_str())
    }

    /// Obtiene un header (sin distinguir mayúsculas)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(|s| s.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

/// Separa headers y body en el primer `\r\n\r\n`
fn split_head(buffer: &[u8]) -> (&[u8], &[u8]) {
    match find_subsequence(buffer, b"\r\n\r\n") {
        Some(pos) => (&buffer[..pos], &buffer[pos + 4..]),
        None => (buffer, &[]),
    }
}

/// Posición de `needle` dentro de `haystack`
pub(crate) fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Formato: `GET /path?query HTTP/1.0`
fn parse_request_line(line: &str) -> Result<(Method, String, HashMap<String, String>), ParseError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(ParseError::InvalidRequestLine);
    }

    let method = Method::parse(parts[0])?;

    let version = parts[2];
    if version != "HTTP/1.0" && version != "HTTP/1.1" {
        return Err(ParseError::InvalidHttpVersion(version.to_string()));
    }

    let (path, query_params) = match parts[1].split_once('?') {
        Some((path, query)) => (path.to_string(), parse_query_string(query)),
        None => (parts[1].to_string(), HashMap::new()),
    };

    Ok((method, path, query_params))
}

/// "ms=10&name=a" → {"ms": "10", "name": "a"}
fn parse_query_string(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|param| !param.is_empty())
        .map(|param| match param.split_once('=') {
            Some((key, value)) => (key.to_string(), url_decode(value)),
            None => (param.to_string(), String::new()),
        })
        .collect()
}

/// Decodificación básica de `%XX` y `+`
fn url_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
                match hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                    Some(b) => {
                        out.push(b);
                        i += 2;
                    }
                    None => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn parse_headers<'a>(lines: impl Iterator<Item = &'a str>) -> Result<HashMap<String, String>, ParseError> {
    let mut headers = HashMap::new();

    for line in lines {
        if line.trim().is_empty() {
            break;
        }
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| ParseError::InvalidHeader(line.to_string()))?;
        headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
    }

    Ok(headers)
}
