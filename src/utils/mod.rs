pub mod connection_table;
pub mod graceful_shutdown;

pub use connection_table::{ClosedConnection, ConnectionTable};
pub use graceful_shutdown::GracefulShutdown;
