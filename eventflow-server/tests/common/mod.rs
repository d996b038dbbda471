//! Shared fixtures for the host-process tests

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use eventflow_server::db::{DataStore, StoreError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

#[derive(Default)]
pub struct Calls {
    pub connects: AtomicUsize,
    pub disconnects: AtomicUsize,
    pub pings: AtomicUsize,
}

/// In-process store with switchable failures.
#[derive(Clone, Default)]
pub struct FakeStore {
    pub calls: Arc<Calls>,
    pub fail_connect: bool,
    pub fail_release: bool,
    pub fail_ping: bool,
    pub connect_delay: Option<Duration>,
    pub ping_delay: Option<Duration>,
}

impl FakeStore {
    pub fn connects(&self) -> usize {
        self.calls.connects.load(Ordering::SeqCst)
    }

    pub fn disconnects(&self) -> usize {
        self.calls.disconnects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataStore for FakeStore {
    type Handle = u64;

    fn target(&self) -> String {
        "fake://events".to_string()
    }

    async fn connect(&self) -> Result<u64, StoreError> {
        self.calls.connects.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.connect_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_connect {
            return Err(StoreError::Other("connection refused".into()));
        }
        Ok(42)
    }

    async fn disconnect(&self, _handle: &u64) -> Result<(), StoreError> {
        self.calls.disconnects.fetch_add(1, Ordering::SeqCst);
        if self.fail_release {
            return Err(StoreError::Other("connection reset by peer".into()));
        }
        Ok(())
    }

    async fn ping(&self, _handle: &u64) -> Result<(), StoreError> {
        self.calls.pings.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.ping_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_ping {
            return Err(StoreError::Other("server closed the connection".into()));
        }
        Ok(())
    }
}

/// Route logs through the test harness. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("eventflow_server=debug")
        .with_test_writer()
        .try_init();
}

/// Minimal HTTP/1.1 GET; returns the raw response text.
pub async fn http_get(addr: SocketAddr, path: &str) -> std::io::Result<String> {
    let mut stream = TcpStream::connect(addr).await?;
    let request = format!(
        "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        path, addr
    );
    stream.write_all(request.as_bytes()).await?;

    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
