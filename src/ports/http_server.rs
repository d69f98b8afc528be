use std::{future::Future, net::SocketAddr};

use axum::body::Body as AxumBody;
use eyre::Result;
use hyper::Response;

/// HttpServer defines the port (interface) for the listening side
pub trait HttpServer: Send + Sync + 'static {
    /// Run the HTTP server
    ///
    /// # Returns
    /// A future that resolves when the server shuts down or encounters an
    /// unrecoverable error
    fn run(&self) -> impl Future<Output = Result<()>> + Send;
}

/// RequestHandler defines the port for answering one explorer request
pub trait RequestHandler: Send + Sync + 'static {
    /// Handle a request target (path and query) received from `peer`
    ///
    /// Always produces a response; failures are mapped to status codes. A
    /// response carrying `Connection: close` ends the connection.
    fn handle_request(
        &self,
        target: &str,
        peer: SocketAddr,
    ) -> impl Future<Output = Response<AxumBody>> + Send;
}
