//! SOCKS5 request handling
//!
//! Parses the post-authentication request, dials the target for CONNECT
//! and hands the connection pair to the relay.

use super::codec;
use super::consts::{SOCKS5_ATYP_IPV6, SOCKS5_CMD_BIND};
use super::relay::relay;
use super::types::{SocksCommand, TargetAddr};
use crate::config::ServerConfig;
use crate::error::{ReplyCode, Result, Socks5Error};
use std::io;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Parse and service one client request on an authenticated connection.
///
/// IPv6 targets are parsed but refused with an address-type reply; dialing
/// is IPv4/domain only. UDP ASSOCIATE is accepted without a relay. Every
/// other command besides CONNECT gets a command-not-supported reply.
pub async fn handle_request<S>(mut stream: S, config: &ServerConfig) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (command, target) = codec::read_request(&mut stream).await?;
    debug!("{} request for {}", command, target);

    if target.is_ipv6() {
        codec::write_reply(&mut stream, ReplyCode::AddressTypeNotSupported, None).await?;
        return Err(Socks5Error::AddressTypeNotSupported(SOCKS5_ATYP_IPV6).into());
    }

    match command {
        SocksCommand::Connect => handle_connect(stream, target, config).await,
        SocksCommand::UdpAssociate => {
            // Accepted without a datagram relay; the connection just ends.
            debug!("UDP ASSOCIATE accepted, no relay");
            Ok(())
        }
        SocksCommand::Bind => {
            warn!("BIND command not supported");
            codec::write_reply(&mut stream, ReplyCode::CommandNotSupported, None).await?;
            Err(Socks5Error::CommandNotSupported(SOCKS5_CMD_BIND).into())
        }
    }
}

/// Dial the target, reply, and relay.
async fn handle_connect<S>(mut stream: S, target: TargetAddr, config: &ServerConfig) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let dial_timeout = Duration::from_secs(config.tcp_timeout);

    let dial = async {
        match &target {
            TargetAddr::Ip(addr) => TcpStream::connect(addr).await,
            TargetAddr::Domain(host, port) => TcpStream::connect((host.as_str(), *port)).await,
        }
    };

    let target_stream = match timeout(dial_timeout, dial).await {
        Ok(Ok(conn)) => conn,
        Ok(Err(e)) => {
            warn!("dialing {} failed: {}", target, e);
            codec::write_reply(&mut stream, ReplyCode::HostUnreachable, None).await?;
            return Err(e.into());
        }
        Err(_) => {
            warn!("dialing {} timed out", target);
            codec::write_reply(&mut stream, ReplyCode::HostUnreachable, None).await?;
            return Err(io::Error::from(io::ErrorKind::TimedOut).into());
        }
    };

    // The reply carries the local endpoint of the socket just opened toward
    // the target, not the target's own address.
    let local_addr = target_stream.local_addr()?;
    codec::write_reply(&mut stream, ReplyCode::Succeeded, Some(local_addr)).await?;

    info!("tunnel established to {}", target);

    relay(stream, target_stream).await?;
    Ok(())
}
