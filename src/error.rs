//! Error types for Sockden
//!
//! Defines the crate-level error, the SOCKS5 protocol error taxonomy and
//! the reply status codes sent back to clients.

use std::io;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, SockdenError>;

/// Main error type for Sockden operations
#[derive(Error, Debug)]
pub enum SockdenError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// SOCKS5 protocol error
    #[error("SOCKS5 error: {0}")]
    Socks5(#[from] Socks5Error),
}

/// SOCKS5 protocol errors
///
/// Each variant maps to one way a handshake can go wrong. Which of these
/// produce a reply on the wire before the connection closes is decided by
/// the negotiation and request stages, not here.
#[derive(Error, Debug)]
pub enum Socks5Error {
    /// Unsupported SOCKS version byte on a client frame
    #[error("Unsupported SOCKS version: {0}")]
    UnsupportedVersion(u8),

    /// A frame declared more bytes than the stream delivered
    #[error("Truncated frame")]
    TruncatedFrame,

    /// None of the offered authentication methods is acceptable
    #[error("No acceptable authentication method")]
    NoAcceptableMethod,

    /// Username/password authentication failed
    #[error("Authentication failed")]
    AuthFailed,

    /// Command byte outside the defined set
    #[error("Command not supported: {0}")]
    CommandNotSupported(u8),

    /// Address type byte outside the defined set, or IPv6 at dial time
    #[error("Address type not supported: {0}")]
    AddressTypeNotSupported(u8),

    /// Non-zero reserved byte in a request
    #[error("Invalid reserved field: {0}")]
    InvalidReserved(u8),

    /// Domain name is not valid UTF-8
    #[error("Invalid domain name")]
    InvalidDomain,

    /// IO error while reading or writing a frame
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Reply status codes for SOCKS5 requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReplyCode {
    /// Request succeeded
    Succeeded = 0x00,
    /// General SOCKS server failure
    GeneralFailure = 0x01,
    /// Connection not allowed by ruleset
    ConnectionNotAllowed = 0x02,
    /// Network unreachable
    NetworkUnreachable = 0x03,
    /// Host unreachable
    HostUnreachable = 0x04,
    /// Connection refused
    ConnectionRefused = 0x05,
    /// TTL expired
    TtlExpired = 0x06,
    /// Command not supported
    CommandNotSupported = 0x07,
    /// Address type not supported
    AddressTypeNotSupported = 0x08,
}

impl From<ReplyCode> for u8 {
    fn from(code: ReplyCode) -> Self {
        code as u8
    }
}
