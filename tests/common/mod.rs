//! Test utilities for Sockden integration tests
//!
//! Helpers to stand up a server on an ephemeral port, an echo target whose
//! socket closure can be observed, and to build handshake frames.

use sockden::{AuthMethod, PasswordChecker, ServerConfig, Socks5Server};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Configuration for a no-auth test server
pub fn no_auth_config() -> ServerConfig {
    ServerConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        auth: AuthMethod::None,
        tcp_timeout: 2,
    }
}

/// Configuration for a password-auth test server
pub fn password_config() -> ServerConfig {
    ServerConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        auth: AuthMethod::Password,
        tcp_timeout: 2,
    }
}

/// A checker accepting exactly one username/password pair
pub fn single_user_checker(user: &'static str, pass: &'static str) -> PasswordChecker {
    Arc::new(move |u: &str, p: &str| u == user && p == pass)
}

/// Start a server on an ephemeral port and return its address.
pub async fn start_server(config: ServerConfig, checker: Option<PasswordChecker>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let mut server = Socks5Server::new(config);
    if let Some(checker) = checker {
        server = server.with_password_checker(checker);
    }

    tokio::spawn(async move {
        let _ = server.serve(listener).await;
    });

    addr
}

/// Start a single-connection echo target.
///
/// The returned receiver fires once the target's accepted socket reaches
/// EOF or errors, i.e. once the proxy has closed its side.
pub async fn start_echo_target() -> (SocketAddr, oneshot::Receiver<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (closed_tx, closed_rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut conn, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 1024];
        loop {
            match conn.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if conn.write_all(&buf[..n]).await.is_err() {
                        break;
                    }
                }
            }
        }
        let _ = closed_tx.send(());
    });

    (addr, closed_rx)
}

/// Build a CONNECT request for an IPv4 target.
pub fn connect_request(target: SocketAddr) -> Vec<u8> {
    let mut request = vec![0x05, 0x01, 0x00, 0x01];
    match target {
        SocketAddr::V4(addr) => {
            request.extend_from_slice(&addr.ip().octets());
        }
        SocketAddr::V6(_) => panic!("IPv4 targets only"),
    }
    request.extend_from_slice(&target.port().to_be_bytes());
    request
}

/// Build a username/password sub-negotiation frame.
pub fn credentials_frame(username: &str, password: &str) -> Vec<u8> {
    let mut frame = vec![0x01, username.len() as u8];
    frame.extend_from_slice(username.as_bytes());
    frame.push(password.len() as u8);
    frame.extend_from_slice(password.as_bytes());
    frame
}
