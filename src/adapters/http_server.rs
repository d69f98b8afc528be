//! Listening side of the explorer: accept loop, connection table and restart
//! handling.
//!
//! One task owns the listener and the [`ConnectionTable`]. Each accepted
//! connection runs hyper's HTTP/1 state machine in its own task and reports
//! its end back over a channel. A bind or accept failure drops the listener
//! and re-binds after the restart interval; live connections are unaffected.
use std::{
    collections::HashSet,
    convert::Infallible,
    io,
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::Duration,
};

use eyre::{Result, WrapErr};
use hyper::{Request, body::Incoming, server::conn::http1, service::service_fn};
use hyper_util::rt::TokioIo;
use tokio::{
    net::{TcpListener, TcpSocket, TcpStream},
    sync::{mpsc, watch},
};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::{
    config::ExplorerConfig,
    core::AccessList,
    ports::http_server::{HttpServer, RequestHandler},
    tracing_setup::create_connection_span,
    utils::connection_table::{ClosedConnection, ConnectionTable},
};

const LISTEN_BACKLOG: u32 = 1024;

/// Listener settings resolved from configuration.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub listen_addr: SocketAddr,
    /// Peers accepted at the transport level; empty accepts everyone.
    pub whitelist: HashSet<IpAddr>,
    pub restart_interval: Duration,
    pub acl_refresh_interval: Duration,
    /// How long shutdown waits for connection tasks to finish.
    pub drain_timeout: Duration,
}

impl ServerSettings {
    pub fn from_config(config: &ExplorerConfig) -> Result<Self> {
        let listen_addr = config
            .listen_addr
            .parse()
            .wrap_err_with(|| format!("Failed to parse listen address {}", config.listen_addr))?;

        let whitelist = config
            .whitelist
            .iter()
            .map(|entry| {
                entry
                    .trim()
                    .parse::<IpAddr>()
                    .map(|ip| ip.to_canonical())
                    .wrap_err_with(|| format!("Invalid whitelist entry {entry}"))
            })
            .collect::<Result<HashSet<_>>>()?;

        Ok(Self {
            listen_addr,
            whitelist,
            restart_interval: config.restart_interval(),
            acl_refresh_interval: config.acl_refresh_interval(),
            drain_timeout: config.drain_timeout(),
        })
    }

    /// Whether the transport whitelist lets `peer` connect. IPv4-mapped IPv6
    /// addresses match their IPv4 entry.
    pub fn admits(&self, peer: IpAddr) -> bool {
        self.whitelist.is_empty() || self.whitelist.contains(&peer.to_canonical())
    }
}

enum ListenerExit {
    Shutdown,
    AcceptFailed(io::Error),
}

/// Connection bookkeeping owned by the accept loop.
struct Connections {
    table: ConnectionTable,
    /// Spawned connection tasks that have not reported back yet.
    live: usize,
    closed_tx: mpsc::UnboundedSender<ClosedConnection>,
    closed_rx: mpsc::UnboundedReceiver<ClosedConnection>,
}

impl Connections {
    fn new() -> Self {
        let (closed_tx, closed_rx) = mpsc::unbounded_channel();
        Self {
            table: ConnectionTable::new(),
            live: 0,
            closed_tx,
            closed_rx,
        }
    }

    fn on_closed(&mut self, closed: ClosedConnection) {
        self.live = self.live.saturating_sub(1);
        if self.table.unregister(closed) {
            tracing::debug!(peer = %closed.remote_addr, "-peer");
        }
    }
}

/// HTTP/1.1 server answering explorer requests through a [`RequestHandler`].
pub struct ExplorerServer<H> {
    handler: Arc<H>,
    access_list: Arc<AccessList>,
    settings: ServerSettings,
    shutdown: CancellationToken,
    local_addr: watch::Sender<Option<SocketAddr>>,
}

impl<H: RequestHandler> ExplorerServer<H> {
    pub fn new(
        handler: Arc<H>,
        access_list: Arc<AccessList>,
        settings: ServerSettings,
        shutdown: CancellationToken,
    ) -> Self {
        let (local_addr, _) = watch::channel(None);
        Self {
            handler,
            access_list,
            settings,
            shutdown,
            local_addr,
        }
    }

    /// Address of the current listener, `None` while not listening.
    pub fn local_addr(&self) -> watch::Receiver<Option<SocketAddr>> {
        self.local_addr.subscribe()
    }

    fn bind(&self) -> io::Result<TcpListener> {
        let addr = self.settings.listen_addr;
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        // accepted sockets inherit keep-alive from the listener
        socket.set_keepalive(true)?;
        socket.bind(addr)?;
        socket.listen(LISTEN_BACKLOG)
    }

    async fn serve_listener(
        &self,
        listener: &TcpListener,
        connections: &mut Connections,
    ) -> ListenerExit {
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => return ListenerExit::Shutdown,
                Some(closed) = connections.closed_rx.recv() => connections.on_closed(closed),
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => self.on_accepted(stream, peer, connections),
                    Err(e) => return ListenerExit::AcceptFailed(e),
                },
            }
        }
    }

    fn on_accepted(&self, stream: TcpStream, peer: SocketAddr, connections: &mut Connections) {
        if !self.settings.admits(peer.ip()) {
            tracing::warn!(%peer, "peer not in IP whitelist, closing");
            return;
        }

        tracing::debug!(%peer, "+peer");
        let (serial, close) = connections.table.register(peer);
        connections.live += 1;

        let handler = self.handler.clone();
        let closed_tx = connections.closed_tx.clone();

        tokio::spawn(
            async move {
                let service = service_fn(move |req: Request<Incoming>| {
                    let handler = handler.clone();
                    async move {
                        let target = req
                            .uri()
                            .path_and_query()
                            .map(|pq| pq.as_str().to_string())
                            .unwrap_or_else(|| req.uri().path().to_string());
                        Ok::<_, Infallible>(handler.handle_request(&target, peer).await)
                    }
                });

                let conn = http1::Builder::new()
                    .keep_alive(true)
                    .serve_connection(TokioIo::new(stream), service);
                tokio::pin!(conn);

                let result = tokio::select! {
                    result = conn.as_mut() => result,
                    _ = close.cancelled() => {
                        conn.as_mut().graceful_shutdown();
                        conn.await
                    }
                };
                if let Err(e) = result {
                    tracing::debug!(error = %e, "connection dropped");
                }

                let _ = closed_tx.send(ClosedConnection {
                    remote_addr: peer,
                    serial,
                });
            }
            .instrument(create_connection_span(peer, serial)),
        );
    }

    /// Sleep for the restart interval. Returns `false` if shutdown arrived.
    async fn pause_before_restart(&self, connections: &mut Connections) -> bool {
        let delay = tokio::time::sleep(self.settings.restart_interval);
        tokio::pin!(delay);
        loop {
            tokio::select! {
                _ = &mut delay => return true,
                _ = self.shutdown.cancelled() => return false,
                Some(closed) = connections.closed_rx.recv() => connections.on_closed(closed),
            }
        }
    }

    async fn drain(&self, mut connections: Connections) {
        connections.table.close_all();
        if connections.live == 0 {
            return;
        }

        let pending = connections.live;
        let drained = tokio::time::timeout(self.settings.drain_timeout, async {
            while connections.live > 0 {
                match connections.closed_rx.recv().await {
                    Some(closed) => connections.on_closed(closed),
                    None => break,
                }
            }
        })
        .await;

        if drained.is_err() {
            tracing::warn!(
                pending,
                remaining = connections.live,
                "connections still open after drain timeout"
            );
        }
    }
}

async fn refresh_access_list(
    access_list: Arc<AccessList>,
    interval: Duration,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(interval) => {
                access_list.refresh().await;
            }
        }
    }
}

impl<H: RequestHandler> HttpServer for ExplorerServer<H> {
    async fn run(&self) -> Result<()> {
        let refresher = self.access_list.is_enabled().then(|| {
            tokio::spawn(refresh_access_list(
                self.access_list.clone(),
                self.settings.acl_refresh_interval,
                self.shutdown.clone(),
            ))
        });

        let mut connections = Connections::new();

        while !self.shutdown.is_cancelled() {
            let listener = match self.bind() {
                Ok(listener) => listener,
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        addr = %self.settings.listen_addr,
                        restart_ms = self.settings.restart_interval.as_millis() as u64,
                        "cannot start server"
                    );
                    if !self.pause_before_restart(&mut connections).await {
                        break;
                    }
                    continue;
                }
            };

            let bound = listener.local_addr().ok();
            tracing::info!(addr = ?bound, "listening");
            self.local_addr.send_replace(bound);

            let exit = self.serve_listener(&listener, &mut connections).await;
            drop(listener);
            self.local_addr.send_replace(None);

            match exit {
                ListenerExit::Shutdown => break,
                ListenerExit::AcceptFailed(e) => {
                    tracing::error!(
                        error = %e,
                        restart_ms = self.settings.restart_interval.as_millis() as u64,
                        "accept failed, restarting server"
                    );
                    if !self.pause_before_restart(&mut connections).await {
                        break;
                    }
                }
            }
        }

        tracing::info!(connections = connections.table.len(), "server stopping");
        self.drain(connections).await;

        if let Some(refresher) = refresher {
            refresher.abort();
        }
        tracing::info!("server stopped");
        Ok(())
    }
}
