pub mod http_handler;
pub mod http_server;
pub mod upstream;

/// Re-export commonly used types from adapters
pub use http_handler::ExplorerHandler;
pub use http_server::{ExplorerServer, ServerSettings};
pub use upstream::UpstreamAdapter;
