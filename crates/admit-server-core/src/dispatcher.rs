//! Connection dispatcher
//!
//! The accept loop is the only single-threaded section of the server and
//! never performs per-connection I/O: every accepted socket (and, in channel
//! mode, its TLS handshake) runs in its own task. A semaphore caps how many
//! connections are in flight at once so a flood cannot exhaust the process.

use crate::connection::{handle_connection, AuthMode};
use crate::AppState;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tokio_rustls::TlsAcceptor;
use tracing::{debug, error, info, warn};

/// Accepts connections and drives each through the request pipeline
pub struct ConnectionDispatcher {
    state: Arc<AppState>,
    tls: Option<TlsAcceptor>,
    limit: Arc<Semaphore>,
    max_connections: usize,
}

impl ConnectionDispatcher {
    /// Create a dispatcher.
    ///
    /// `tls` must be `Some` exactly when the state's auth mode is
    /// [`AuthMode::Channel`].
    pub fn new(state: AppState, tls: Option<TlsAcceptor>, max_connections: usize) -> Self {
        debug_assert_eq!(
            tls.is_some(),
            matches!(state.auth, AuthMode::Channel),
            "TLS acceptor and channel mode go together"
        );

        Self {
            state: Arc::new(state),
            tls,
            limit: Arc::new(Semaphore::new(max_connections)),
            max_connections,
        }
    }

    /// Run the accept loop until the listener fails or the future is dropped
    /// (e.g. by a shutdown select in the caller).
    pub async fn serve(&self, listener: TcpListener) {
        let local_addr = listener.local_addr().ok();
        info!(addr = ?local_addr, "listening for submissions");

        loop {
            // Admission control: wait for a free slot before accepting more
            // work. The semaphore never closes, so acquire cannot fail.
            let permit = Arc::clone(&self.limit)
                .acquire_owned()
                .await
                .expect("connection semaphore closed");

            match listener.accept().await {
                Ok((stream, peer)) => {
                    debug!(%peer, "accepted connection");
                    let state = Arc::clone(&self.state);
                    let tls = self.tls.clone();

                    tokio::spawn(async move {
                        // Permit lives for the duration of the connection
                        let _permit = permit;

                        match tls {
                            Some(acceptor) => match acceptor.accept(stream).await {
                                Ok(tls_stream) => {
                                    handle_connection(tls_stream, peer, state).await;
                                }
                                Err(e) => {
                                    // Plaintext or broken clients die here
                                    warn!(%peer, error = %e, "TLS handshake failed");
                                }
                            },
                            None => {
                                handle_connection(stream, peer, state).await;
                            }
                        }
                    });
                }
                Err(e) => {
                    // Accept failures are transient (fd exhaustion etc.);
                    // keep listening
                    error!(error = %e, "failed to accept connection");
                }
            }
        }
    }

    /// Wait until every in-flight connection has finished.
    pub async fn drain(&self) {
        let _ = self
            .limit
            .acquire_many(self.max_connections as u32)
            .await
            .expect("connection semaphore closed");
        info!("all connections drained");
    }
}
