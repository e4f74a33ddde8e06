//! # Sockden - Standalone SOCKS5 Proxy Server
//!
//! Sockden is a SOCKS5 proxy server: it accepts client connections on a
//! local TCP listener, negotiates authentication (none or RFC 1929
//! username/password), dials the requested target and relays bytes in both
//! directions until either side is done.
//!
//! ## Features
//!
//! - **Method negotiation**: no-auth or username/password, picked from the
//!   client's offer against the configured requirement
//! - **Injected credential checks**: the password checker is a callback, so
//!   any backing store works
//! - **CONNECT relaying**: dial with a configurable timeout, then a
//!   transparent bidirectional relay
//! - **TOML configuration**: bind address, auth method, dial timeout and a
//!   user table for the default checker
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sockden::config::load_config;
//! use sockden::Socks5Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config("config.toml")?;
//!     let server = Socks5Server::new(config.server.clone())
//!         .with_password_checker(config.password_checker());
//!
//!     server.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! One task per accepted connection runs the stages in order; the relay
//! phase adds one detached task for the target-to-client direction.
//!
//! ```text
//! SOCKS5 Client -> Sockden -> Target
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod server;
pub mod socks;

// Re-export commonly used items
pub use config::{load_config, Config, ServerConfig};
pub use error::{ReplyCode, SockdenError, Socks5Error};
pub use server::Socks5Server;
pub use socks::{AuthMethod, PasswordChecker};

/// Version of the Sockden library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the application
pub const NAME: &str = env!("CARGO_PKG_NAME");
