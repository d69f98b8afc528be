//! Live connection bookkeeping for the accept loop.
//!
//! The table is owned by a single task. Connection tasks never touch it; they
//! report their end over a channel and the owner calls
//! [`ConnectionTable::unregister`]. Each peer address has at most one entry: a
//! new connection from the same address evicts and closes the old one.
use std::{
    collections::HashMap,
    net::SocketAddr,
    time::{Duration, Instant},
};

use tokio_util::sync::CancellationToken;

/// Monotonic id distinguishing successive connections from one peer address.
pub type ConnectionSerial = u64;

/// A registered connection.
#[derive(Debug)]
pub struct ConnectionEntry {
    pub serial: ConnectionSerial,
    pub remote_addr: SocketAddr,
    pub established_at: Instant,
    close: CancellationToken,
}

impl ConnectionEntry {
    pub fn age(&self) -> Duration {
        self.established_at.elapsed()
    }

    /// Ask the connection task to shut the connection down.
    pub fn close(&self) {
        self.close.cancel();
    }
}

/// Notification sent by a connection task when it finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosedConnection {
    pub remote_addr: SocketAddr,
    pub serial: ConnectionSerial,
}

#[derive(Debug, Default)]
pub struct ConnectionTable {
    connections: HashMap<SocketAddr, ConnectionEntry>,
    next_serial: ConnectionSerial,
}

impl ConnectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection from `remote_addr`.
    ///
    /// Returns the serial and the token the connection task must watch. A
    /// previous entry for the same address is closed and dropped.
    pub fn register(&mut self, remote_addr: SocketAddr) -> (ConnectionSerial, CancellationToken) {
        self.next_serial += 1;
        let serial = self.next_serial;
        let close = CancellationToken::new();

        let entry = ConnectionEntry {
            serial,
            remote_addr,
            established_at: Instant::now(),
            close: close.clone(),
        };

        if let Some(evicted) = self.connections.insert(remote_addr, entry) {
            tracing::debug!(
                peer = %remote_addr,
                serial = evicted.serial,
                "evicting connection with duplicate peer address"
            );
            evicted.close();
        }

        tracing::debug!(
            peer = %remote_addr,
            serial,
            total_connections = self.connections.len(),
            "connection registered"
        );

        (serial, close)
    }

    /// Remove the entry for `remote_addr` if it still belongs to `serial`.
    ///
    /// A connection that was evicted reports its end after its replacement is
    /// registered; that report must not remove the replacement.
    pub fn unregister(&mut self, closed: ClosedConnection) -> bool {
        let current = self
            .connections
            .get(&closed.remote_addr)
            .is_some_and(|entry| entry.serial == closed.serial);
        if !current {
            return false;
        }

        if let Some(entry) = self.connections.remove(&closed.remote_addr) {
            tracing::debug!(
                peer = %closed.remote_addr,
                serial = closed.serial,
                age = ?entry.age(),
                total_connections = self.connections.len(),
                "connection unregistered"
            );
        }
        true
    }

    pub fn get(&self, remote_addr: &SocketAddr) -> Option<&ConnectionEntry> {
        self.connections.get(remote_addr)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Close and drop every connection.
    pub fn close_all(&mut self) {
        if !self.connections.is_empty() {
            tracing::info!(count = self.connections.len(), "closing live connections");
        }
        for (_, entry) in self.connections.drain() {
            entry.close();
        }
    }
}
