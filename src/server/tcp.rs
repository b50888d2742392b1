//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Acepta conexiones y procesa cada una en su propio thread. El thread de la
//! conexión es el "submitter": si la cola del dispatcher está llena, queda
//! bloqueado dentro del handler de `/work` hasta que haya lugar.

use crate::http::request::find_subsequence;
use crate::http::{Request, Response, StatusCode};
use crate::router::Router;
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Tamaño máximo aceptado para un request completo (headers + body)
pub const MAX_REQUEST_BYTES: usize = 1024 * 1024 + 8192;

/// Tiempo máximo esperando datos del cliente
const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Servidor HTTP/1.0, un thread por conexión
pub struct Server {
    router: Arc<Router>,
    listener: TcpListener,
}

impl Server {
    /// Hace bind en `address`. Con puerto 0 el sistema elige uno libre.
    pub fn bind(address: &str, router: Router) -> io::Result<Self> {
        let listener = TcpListener::bind(address)?;
        info!(address = %listener.local_addr()?, "server listening");

        Ok(Self {
            router: Arc::new(router),
            listener,
        })
    }

    /// Dirección real en la que escucha
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Acepta conexiones para siempre
    pub fn run(&self) -> io::Result<()> {
        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    let router = Arc::clone(&self.router);
                    let spawned = thread::Builder::new()
                        .name("http-conn".to_string())
                        .spawn(move || {
                            if let Err(e) = handle_connection(stream, &router) {
                                warn!(error = %e, "connection error");
                            }
                        });

                    if let Err(e) = spawned {
                        error!(error = %e, "failed to spawn connection thread");
                    }
                }
                Err(e) => {
                    warn!(error = %e, "failed to accept connection");
                }
            }
        }

        Ok(())
    }
}

/// Lee un request, lo enruta y escribe la respuesta
fn handle_connection(mut stream: TcpStream, router: &Router) -> io::Result<()> {
    let start = Instant::now();
    stream.set_read_timeout(Some(READ_TIMEOUT))?;

    let response = match read_request(&mut stream)? {
        Incoming::Empty => {
            debug!("connection closed without data");
            return Ok(());
        }
        Incoming::TooLarge => {
            warn!("request rejected, declared body exceeds limit");
            Response::error(
                StatusCode::PayloadTooLarge,
                &format!("Request exceeds {} bytes", MAX_REQUEST_BYTES),
            )
        }
        Incoming::Raw(raw) => match Request::parse(&raw) {
            Ok(request) => {
                debug!(method = request.method().as_str(), path = request.path(), "request");
                router.route(&request)
            }
            Err(e) => Response::error(StatusCode::BadRequest, &format!("Invalid: {}", e)),
        },
    };

    stream.write_all(&response.to_bytes())?;
    stream.flush()?;

    debug!(
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "response sent"
    );

    Ok(())
}

/// Lo leído de una conexión
#[derive(Debug, PartialEq, Eq)]
enum Incoming {
    /// El cliente cerró sin enviar nada
    Empty,

    /// Headers más `Content-Length` superan `MAX_REQUEST_BYTES`; el body no se lee
    TooLarge,

    /// Bytes crudos del request. Si el cliente cerró antes de tiempo el body
    /// queda corto y el parser lo rechaza.
    Raw(Vec<u8>),
}

/// Lee headers completos y, si hay `Content-Length`, el body.
///
/// Sin `\r\n\r\n` corta en `MAX_REQUEST_BYTES` o cuando el cliente cierra
/// su lado.
fn read_request(stream: &mut impl Read) -> io::Result<Incoming> {
    let mut raw = Vec::new();
    let mut chunk = [0u8; 8192];
    let mut expected: Option<usize> = None;

    loop {
        match expected {
            Some(total) if raw.len() >= total => break,
            None if raw.len() >= MAX_REQUEST_BYTES => break,
            _ => {}
        }

        let n = stream.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        raw.extend_from_slice(&chunk[..n]);

        if expected.is_none() {
            if let Some(head_end) = find_subsequence(&raw, b"\r\n\r\n") {
                let body_len = content_length(&raw[..head_end]).unwrap_or(0);
                match (head_end + 4).checked_add(body_len) {
                    Some(total) if total <= MAX_REQUEST_BYTES => expected = Some(total),
                    _ => return Ok(Incoming::TooLarge),
                }
            }
        }
    }

    if raw.is_empty() {
        Ok(Incoming::Empty)
    } else {
        Ok(Incoming::Raw(raw))
    }
}

/// Valor de `Content-Length` dentro de un bloque de headers
fn content_length(head: &[u8]) -> Option<usize> {
    let head = std::str::from_utf8(head).ok()?;
    head.split("\r\n").skip(1).find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if name.trim().eq_ignore_ascii_case("content-length") {
            value.trim().parse().ok()
        } else {
            None
        }
    })
}
