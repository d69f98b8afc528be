//! File-backed list of peer addresses allowed to query the explorer.
//!
//! The list is disabled when no file is configured. When enabled, the file is
//! polled by [`AccessList::refresh`]; it is only re-read after its modification
//! time changes, and a failed reload keeps the previous set in force.
use std::{
    collections::HashSet,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{SystemTime, UNIX_EPOCH},
};

use arc_swap::ArcSwap;
use thiserror::Error;

/// Lines shorter than this cannot hold an IPv4 address.
const MIN_ADDRESS_LEN: usize = 7;

#[derive(Debug, Error)]
pub enum AccessListError {
    #[error("cannot stat access list {path}: {source}")]
    Metadata {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot read access list {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Permitted peer IPv4 addresses, stored as host-order `u32`.
pub struct AccessList {
    path: Option<PathBuf>,
    permitted: ArcSwap<HashSet<u32>>,
    // nanoseconds since the epoch of the last file version loaded, 0 = never
    last_modified: AtomicU64,
}

impl AccessList {
    /// An access list that lets every peer through.
    pub fn disabled() -> Self {
        Self::with_path(None)
    }

    /// Create the list and perform the initial load.
    pub async fn load(path: Option<PathBuf>) -> Self {
        let list = Self::with_path(path);
        list.refresh().await;
        list
    }

    fn with_path(path: Option<PathBuf>) -> Self {
        Self {
            path,
            permitted: ArcSwap::from_pointee(HashSet::new()),
            last_modified: AtomicU64::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether `peer` may receive responses.
    pub fn check(&self, peer: IpAddr) -> bool {
        let peer = peer.to_canonical();
        if !self.is_enabled() || peer.is_loopback() {
            return true;
        }

        match peer {
            IpAddr::V4(v4) => self.permitted.load().contains(&u32::from(v4)),
            IpAddr::V6(_) => false,
        }
    }

    /// Snapshot of the permitted set.
    pub fn permitted(&self) -> Arc<HashSet<u32>> {
        self.permitted.load_full()
    }

    /// Reload the file if it changed since the last successful load.
    ///
    /// Returns `true` when a new set was installed. Errors are logged and the
    /// previous set stays in effect.
    pub async fn refresh(&self) -> bool {
        let Some(path) = &self.path else {
            return false;
        };

        match self.try_refresh(path).await {
            Ok(reloaded) => reloaded,
            Err(e) => {
                tracing::error!(error = %e, "access list refresh failed");
                false
            }
        }
    }

    async fn try_refresh(&self, path: &Path) -> Result<bool, AccessListError> {
        let modified = tokio::fs::metadata(path)
            .await
            .and_then(|m| m.modified())
            .map_err(|source| AccessListError::Metadata {
                path: path.to_path_buf(),
                source,
            })?;

        let stamp = timestamp_nanos(modified);
        if stamp <= self.last_modified.load(Ordering::Acquire) {
            return Ok(false);
        }

        let contents =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| AccessListError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;

        let mut permitted = HashSet::new();
        for line in contents.lines() {
            let line = line.trim();
            if line.len() < MIN_ADDRESS_LEN {
                continue;
            }
            match resolve_ipv4(line).await {
                Some(ip) => {
                    permitted.insert(u32::from(ip));
                }
                None => tracing::warn!(entry = line, "cannot resolve access list entry"),
            }
        }

        tracing::info!(
            path = %path.display(),
            entries = permitted.len(),
            "access list reloaded"
        );
        self.permitted.store(Arc::new(permitted));
        self.last_modified.store(stamp, Ordering::Release);
        Ok(true)
    }
}

fn timestamp_nanos(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
        .unwrap_or(1)
        .max(1)
}

/// Resolve `host`, `host:port`, or an IPv4 literal to its first IPv4 address.
pub async fn resolve_ipv4(entry: &str) -> Option<Ipv4Addr> {
    if let Ok(ip) = entry.parse::<Ipv4Addr>() {
        return Some(ip);
    }
    if let Ok(SocketAddr::V4(addr)) = entry.parse::<SocketAddr>() {
        return Some(*addr.ip());
    }

    let lookup = if entry.contains(':') {
        entry.to_string()
    } else {
        format!("{entry}:0")
    };

    tokio::net::lookup_host(lookup)
        .await
        .ok()?
        .find_map(|addr| match addr {
            SocketAddr::V4(v4) => Some(*v4.ip()),
            SocketAddr::V6(_) => None,
        })
}

#[cfg(test)]
mod tests {
    use std::{
        fs::{File, OpenOptions},
        io::Write,
        time::Duration,
    };

    use tempfile::NamedTempFile;

    use super::*;

    fn write_list(file: &NamedTempFile, contents: &str, modified: SystemTime) {
        let mut f = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(file.path())
            .unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f.set_modified(modified).unwrap();
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn disabled_list_allows_everyone() {
        let list = AccessList::load(None).await;
        assert!(!list.is_enabled());
        assert!(list.check(ip("198.51.100.9")));
        assert!(!list.refresh().await);
    }

    #[tokio::test]
    async fn loopback_is_always_allowed() {
        let file = NamedTempFile::new().unwrap();
        write_list(&file, "203.0.113.5\n", SystemTime::now());

        let list = AccessList::load(Some(file.path().to_path_buf())).await;
        assert!(list.check(ip("127.0.0.1")));
        assert!(list.check(ip("::1")));
        assert!(list.check(ip("203.0.113.5")));
        assert!(list.check(ip("::ffff:203.0.113.5")));
        assert!(!list.check(ip("198.51.100.9")));
    }

    #[tokio::test]
    async fn mapped_loopback_is_allowed() {
        // Dual-stack listeners report IPv4 peers in the mapped form.
        let file = NamedTempFile::new().unwrap();
        write_list(&file, "203.0.113.5\n", SystemTime::now());

        let list = AccessList::load(Some(file.path().to_path_buf())).await;
        assert!(list.check(ip("::ffff:127.0.0.1")));
        assert!(list.check(ip("::ffff:127.3.2.1")));
        assert!(!list.check(ip("::ffff:198.51.100.9")));
        assert!(!list.check(ip("2001:db8::1")));
    }

    #[tokio::test]
    async fn short_and_bad_lines_are_skipped() {
        let file = NamedTempFile::new().unwrap();
        write_list(
            &file,
            "  203.0.113.5  \n\n1.2.3\nnot an address at all\n10.0.0.1:8080\n",
            SystemTime::now(),
        );

        let list = AccessList::load(Some(file.path().to_path_buf())).await;
        let permitted = list.permitted();
        assert_eq!(permitted.len(), 2);
        assert!(list.check(ip("203.0.113.5")));
        assert!(list.check(ip("10.0.0.1")));
    }

    #[tokio::test]
    async fn refresh_only_reloads_on_change() {
        let file = NamedTempFile::new().unwrap();
        let t0 = SystemTime::now() - Duration::from_secs(60);
        write_list(&file, "203.0.113.5\n", t0);

        let list = AccessList::load(Some(file.path().to_path_buf())).await;
        let before = list.permitted();

        // Same mtime: nothing re-read even though the contents differ.
        write_list(&file, "198.51.100.9\n", t0);
        assert!(!list.refresh().await);
        assert!(!list.refresh().await);
        assert!(Arc::ptr_eq(&before, &list.permitted()));
        assert!(!list.check(ip("198.51.100.9")));

        write_list(&file, "198.51.100.9\n", t0 + Duration::from_secs(5));
        assert!(list.refresh().await);
        assert!(list.check(ip("198.51.100.9")));
        assert!(!list.check(ip("203.0.113.5")));
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("acl.txt");
        {
            let mut f = File::create(&path).unwrap();
            f.write_all(b"203.0.113.5\n").unwrap();
        }

        let list = AccessList::load(Some(path.clone())).await;
        assert!(list.check(ip("203.0.113.5")));

        std::fs::remove_file(&path).unwrap();
        assert!(!list.refresh().await);
        assert!(list.check(ip("203.0.113.5")));
    }

    #[tokio::test]
    async fn missing_file_denies_remote_peers() {
        let list = AccessList::load(Some(PathBuf::from("/nonexistent/acl.txt"))).await;
        assert!(list.is_enabled());
        assert!(!list.check(ip("203.0.113.5")));
        assert!(list.check(ip("127.0.0.1")));
    }
}
