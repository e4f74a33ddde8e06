//! Protocol message types
//!
//! Data carried by the SOCKS5 handshake frames: the client's method offer,
//! username/password credentials, commands and target addresses.

use super::consts::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

/// The client's opening frame: protocol version plus the list of
/// authentication methods it is willing to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOffer {
    /// Protocol version, always 0x05 once decoded
    pub version: u8,
    /// Offered method identifiers, in client order
    pub methods: Vec<u8>,
}

impl AuthOffer {
    /// Whether the given method appears anywhere in the offer.
    pub fn offers(&self, method: AuthMethod) -> bool {
        self.methods.contains(&method.to_byte())
    }
}

/// Username/password pair from the RFC 1929 sub-negotiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Username, at most 255 bytes on the wire
    pub username: String,
    /// Password, at most 255 bytes on the wire
    pub password: String,
}

/// Authentication method the server requires from clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    /// No authentication required
    None,
    /// Username/password authentication
    Password,
}

impl AuthMethod {
    /// Convert to the SOCKS5 method byte
    pub fn to_byte(self) -> u8 {
        match self {
            AuthMethod::None => SOCKS5_METHOD_NONE,
            AuthMethod::Password => SOCKS5_METHOD_PASSWORD,
        }
    }

    /// Parse from a SOCKS5 method byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            SOCKS5_METHOD_NONE => Some(AuthMethod::None),
            SOCKS5_METHOD_PASSWORD => Some(AuthMethod::Password),
            _ => None,
        }
    }
}

/// SOCKS5 request command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocksCommand {
    /// Establish a TCP connection to the target
    Connect,
    /// Bind a listening socket (not implemented)
    Bind,
    /// Set up a UDP relay (accepted, no relay performed)
    UdpAssociate,
}

impl SocksCommand {
    /// Parse from the command byte of a request
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            SOCKS5_CMD_CONNECT => Some(SocksCommand::Connect),
            SOCKS5_CMD_BIND => Some(SocksCommand::Bind),
            SOCKS5_CMD_UDP_ASSOCIATE => Some(SocksCommand::UdpAssociate),
            _ => None,
        }
    }
}

impl fmt::Display for SocksCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocksCommand::Connect => write!(f, "CONNECT"),
            SocksCommand::Bind => write!(f, "BIND"),
            SocksCommand::UdpAssociate => write!(f, "UDP ASSOCIATE"),
        }
    }
}

/// Target address of a request: a literal socket address or an unresolved
/// domain name with a port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetAddr {
    /// Literal IPv4 or IPv6 endpoint
    Ip(SocketAddr),
    /// Domain name and port, resolved at dial time
    Domain(String, u16),
}

impl TargetAddr {
    /// Build an IPv4 target
    pub fn ipv4(ip: Ipv4Addr, port: u16) -> Self {
        TargetAddr::Ip(SocketAddr::new(IpAddr::V4(ip), port))
    }

    /// Build an IPv6 target
    pub fn ipv6(ip: Ipv6Addr, port: u16) -> Self {
        TargetAddr::Ip(SocketAddr::new(IpAddr::V6(ip), port))
    }

    /// Build a domain-name target
    pub fn domain(name: String, port: u16) -> Self {
        TargetAddr::Domain(name, port)
    }

    /// Whether the target is a literal IPv6 endpoint
    pub fn is_ipv6(&self) -> bool {
        matches!(self, TargetAddr::Ip(addr) if addr.is_ipv6())
    }

    /// Target port
    pub fn port(&self) -> u16 {
        match self {
            TargetAddr::Ip(addr) => addr.port(),
            TargetAddr::Domain(_, port) => *port,
        }
    }
}

impl fmt::Display for TargetAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetAddr::Ip(addr) => write!(f, "{}", addr),
            TargetAddr::Domain(name, port) => write!(f, "{}:{}", name, port),
        }
    }
}
