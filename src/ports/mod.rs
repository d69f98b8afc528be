pub mod adapter;
pub mod http_server;
#[cfg(test)]
pub(crate) mod mock;
