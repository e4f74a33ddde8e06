//! SOCKS5 connection server
//!
//! Owns the listener and sequences the handshake stages for every accepted
//! connection: negotiation, request handling, relay.

use crate::config::ServerConfig;
use crate::error::{Result, SockdenError};
use crate::socks::{handle_request, negotiate, AuthMethod, PasswordChecker};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

/// A SOCKS5 proxy server.
///
/// Construction is cheap; nothing touches the network until [`run`] or
/// [`serve`] is called. The configuration is read-only afterwards and shared
/// by every connection task.
///
/// [`run`]: Socks5Server::run
/// [`serve`]: Socks5Server::serve
pub struct Socks5Server {
    config: Arc<ServerConfig>,
    checker: Option<PasswordChecker>,
}

impl Socks5Server {
    /// Create a server from its configuration.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
            checker: None,
        }
    }

    /// Inject the password checker used for username/password negotiation.
    pub fn with_password_checker(mut self, checker: PasswordChecker) -> Self {
        self.checker = Some(checker);
        self
    }

    /// The server's configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Startup invariant: the password method needs a checker to call.
    fn validate(&self) -> Result<()> {
        if self.config.auth == AuthMethod::Password && self.checker.is_none() {
            return Err(SockdenError::Config(
                "password authentication selected, but no password checker set".to_string(),
            ));
        }
        Ok(())
    }

    /// Bind the configured address and serve until a fatal error.
    ///
    /// Configuration and bind failures surface synchronously; after that
    /// only the listener itself can end the loop.
    pub async fn run(&self) -> Result<()> {
        self.validate()?;

        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        info!("listening on {}", listener.local_addr()?);

        self.serve(listener).await
    }

    /// Serve connections from an already-bound listener.
    ///
    /// Each accepted connection runs in its own task; a connection failing
    /// at any stage is logged with its remote address and never stops the
    /// accept loop. Transient accept errors are logged and skipped.
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        self.validate()?;

        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    warn!("accept failed: {}", e);
                    continue;
                }
            };

            let config = Arc::clone(&self.config);
            let checker = self.checker.clone();
            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, &config, checker.as_ref()).await {
                    warn!("connection from {}: {}", peer, e);
                }
            });
        }
    }
}

/// Run one client connection through negotiation, request and relay.
///
/// The stream is owned here, so the client socket closes on every exit
/// path of the task.
async fn handle_connection(
    mut stream: TcpStream,
    config: &ServerConfig,
    checker: Option<&PasswordChecker>,
) -> Result<()> {
    negotiate(&mut stream, config.auth, checker).await?;
    handle_request(stream, config).await
}
