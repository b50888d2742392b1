//! # Sistema de Routing
//! src/router/mod.rs
//!
//! ```text
//! Request → Router → Handler → Response
//! ```
//!
//! Los handlers son closures para que puedan capturar estado compartido
//! (por ejemplo un `Arc<Dispatcher>`). Si ningún path coincide se responde
//! 404 Not Found.

use crate::http::{Request, Response, StatusCode};

/// Handler: recibe un Request y retorna una Response
pub type Handler = Box<dyn Fn(&Request) -> Response + Send + Sync>;

/// Router que mapea paths exactos a handlers
#[derive(Default)]
pub struct Router {
    routes: Vec<(String, Handler)>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra una ruta con su handler
    ///
    /// ```
    /// use work_dispatcher::router::Router;
    /// use work_dispatcher::http::{Request, Response, StatusCode};
    ///
    /// let mut router = Router::new();
    /// router.register("/hello", |_req: &Request| Response::new(StatusCode::Ok));
    /// ```
    pub fn register<F>(&mut self, path: &str, handler: F)
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.routes.push((path.to_string(), Box::new(handler)));
    }

    /// Ejecuta el handler correspondiente al path del request
    pub fn route(&self, request: &Request) -> Response {
        let path = request.path();

        let mut response = match self.routes.iter().find(|(route, _)| route == path) {
            Some((_, handler)) => handler(request),
            None => Response::error(StatusCode::NotFound, &format!("Route not found: {}", path)),
        };

        response.add_header("Server", "work-dispatcher/0.1");
        response.add_header("Connection", "close");
        response
    }
}
