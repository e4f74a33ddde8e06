//! SOCKS5 wire codec
//!
//! Async encode/decode for every message of the handshake. These functions
//! only read and write the supplied stream; policy (which method to pick,
//! whether credentials are valid, what to dial) lives in the negotiation
//! and request stages.

use super::consts::*;
use super::types::{AuthOffer, Credentials, SocksCommand, TargetAddr};
use crate::error::{ReplyCode, Socks5Error};
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Codec-level result
pub type CodecResult<T> = Result<T, Socks5Error>;

/// A short read means the client declared more bytes than it sent.
fn read_failure(err: io::Error) -> Socks5Error {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        Socks5Error::TruncatedFrame
    } else {
        Socks5Error::Io(err)
    }
}

/// Read the client's method offer.
///
/// ```text
/// +----+----------+----------+
/// |VER | NMETHODS | METHODS  |
/// +----+----------+----------+
/// | 1  |    1     | 1 to 255 |
/// +----+----------+----------+
/// ```
pub async fn read_auth_offer<S>(stream: &mut S) -> CodecResult<AuthOffer>
where
    S: AsyncRead + Unpin,
{
    let mut header = [0u8; 2];
    stream.read_exact(&mut header).await.map_err(read_failure)?;

    if header[0] != SOCKS5_VERSION {
        return Err(Socks5Error::UnsupportedVersion(header[0]));
    }

    let mut methods = vec![0u8; header[1] as usize];
    stream.read_exact(&mut methods).await.map_err(read_failure)?;

    Ok(AuthOffer {
        version: SOCKS5_VERSION,
        methods,
    })
}

/// Write the server's method selection: `[0x05, method]`.
///
/// `method` is a raw byte so the no-acceptable sentinel (0xFF) can be sent
/// through the same path as a real selection.
pub async fn write_method_selection<S>(stream: &mut S, method: u8) -> CodecResult<()>
where
    S: AsyncWrite + Unpin,
{
    stream.write_all(&[SOCKS5_VERSION, method]).await?;
    stream.flush().await?;
    Ok(())
}

/// Read the username/password sub-negotiation frame.
///
/// ```text
/// +----+------+----------+------+----------+
/// |VER | ULEN |  UNAME   | PLEN |  PASSWD  |
/// +----+------+----------+------+----------+
/// | 1  |  1   | 1 to 255 |  1   | 1 to 255 |
/// +----+------+----------+------+----------+
/// ```
///
/// A wrong sub-negotiation version is reported as [`Socks5Error::AuthFailed`],
/// indistinguishable from bad credentials.
pub async fn read_credentials<S>(stream: &mut S) -> CodecResult<Credentials>
where
    S: AsyncRead + Unpin,
{
    let mut header = [0u8; 2];
    stream.read_exact(&mut header).await.map_err(read_failure)?;

    let (version, ulen) = (header[0], header[1] as usize);
    if version != SOCKS5_AUTH_VERSION {
        return Err(Socks5Error::AuthFailed);
    }

    // Username plus the trailing password-length byte in one read.
    let mut buf = vec![0u8; ulen + 1];
    stream.read_exact(&mut buf).await.map_err(read_failure)?;
    let plen = buf[ulen] as usize;
    let username =
        String::from_utf8(buf[..ulen].to_vec()).map_err(|_| Socks5Error::AuthFailed)?;

    // The buffer is reused for the password; it must be grown first when the
    // password is longer than the username.
    if buf.len() < plen {
        buf.resize(plen, 0);
    }
    stream.read_exact(&mut buf[..plen]).await.map_err(read_failure)?;
    let password =
        String::from_utf8(buf[..plen].to_vec()).map_err(|_| Socks5Error::AuthFailed)?;

    Ok(Credentials { username, password })
}

/// Write the sub-negotiation result: `[0x01, status]`.
pub async fn write_auth_status<S>(stream: &mut S, status: u8) -> CodecResult<()>
where
    S: AsyncWrite + Unpin,
{
    stream.write_all(&[SOCKS5_AUTH_VERSION, status]).await?;
    stream.flush().await?;
    Ok(())
}

/// Read a client request.
///
/// ```text
/// +----+-----+-------+------+----------+----------+
/// |VER | CMD |  RSV  | ATYP | DST.ADDR | DST.PORT |
/// +----+-----+-------+------+----------+----------+
/// | 1  |  1  | X'00' |  1   | Variable |    2     |
/// +----+-----+-------+------+----------+----------+
/// ```
///
/// Validation happens before any target I/O: version, then command, then the
/// reserved byte, then the address type.
pub async fn read_request<S>(stream: &mut S) -> CodecResult<(SocksCommand, TargetAddr)>
where
    S: AsyncRead + Unpin,
{
    let mut header = [0u8; 4];
    stream.read_exact(&mut header).await.map_err(read_failure)?;

    let (version, cmd, reserved, atyp) = (header[0], header[1], header[2], header[3]);

    if version != SOCKS5_VERSION {
        return Err(Socks5Error::UnsupportedVersion(version));
    }

    let command = SocksCommand::from_byte(cmd).ok_or(Socks5Error::CommandNotSupported(cmd))?;

    if reserved != SOCKS5_RESERVED {
        return Err(Socks5Error::InvalidReserved(reserved));
    }

    let target = read_target_addr(stream, atyp).await?;

    Ok((command, target))
}

/// Read the address portion of a request for the given address type.
async fn read_target_addr<S>(stream: &mut S, atyp: u8) -> CodecResult<TargetAddr>
where
    S: AsyncRead + Unpin,
{
    match atyp {
        SOCKS5_ATYP_IPV4 => {
            let mut addr = [0u8; 4];
            stream.read_exact(&mut addr).await.map_err(read_failure)?;
            let port = read_port(stream).await?;
            Ok(TargetAddr::ipv4(Ipv4Addr::from(addr), port))
        }

        SOCKS5_ATYP_DOMAIN => {
            let mut len = [0u8; 1];
            stream.read_exact(&mut len).await.map_err(read_failure)?;

            let mut name = vec![0u8; len[0] as usize];
            stream.read_exact(&mut name).await.map_err(read_failure)?;
            let name = String::from_utf8(name).map_err(|_| Socks5Error::InvalidDomain)?;

            let port = read_port(stream).await?;
            Ok(TargetAddr::domain(name, port))
        }

        SOCKS5_ATYP_IPV6 => {
            let mut addr = [0u8; 16];
            stream.read_exact(&mut addr).await.map_err(read_failure)?;
            let port = read_port(stream).await?;
            Ok(TargetAddr::ipv6(Ipv6Addr::from(addr), port))
        }

        _ => Err(Socks5Error::AddressTypeNotSupported(atyp)),
    }
}

/// Read a big-endian u16 port.
async fn read_port<S>(stream: &mut S) -> CodecResult<u16>
where
    S: AsyncRead + Unpin,
{
    let mut port = [0u8; 2];
    stream.read_exact(&mut port).await.map_err(read_failure)?;
    Ok(u16::from_be_bytes(port))
}

/// Write a server reply.
///
/// ```text
/// +----+-----+-------+------+----------+----------+
/// |VER | REP |  RSV  | ATYP | BND.ADDR | BND.PORT |
/// +----+-----+-------+------+----------+----------+
/// | 1  |  1  | X'00' |  1   | Variable |    2     |
/// +----+-----+-------+------+----------+----------+
/// ```
///
/// Success replies pass the local endpoint of the outbound socket in
/// `bind_addr`; failure replies pass `None`, which encodes the fixed
/// all-zero IPv4 form regardless of what address type the request carried.
pub async fn write_reply<S>(
    stream: &mut S,
    code: ReplyCode,
    bind_addr: Option<SocketAddr>,
) -> CodecResult<()>
where
    S: AsyncWrite + Unpin,
{
    let bind_addr =
        bind_addr.unwrap_or_else(|| SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0));

    let mut reply = vec![SOCKS5_VERSION, u8::from(code), SOCKS5_RESERVED];

    match bind_addr {
        SocketAddr::V4(addr) => {
            reply.push(SOCKS5_ATYP_IPV4);
            reply.extend_from_slice(&addr.ip().octets());
            reply.extend_from_slice(&addr.port().to_be_bytes());
        }
        SocketAddr::V6(addr) => {
            reply.push(SOCKS5_ATYP_IPV6);
            reply.extend_from_slice(&addr.ip().octets());
            reply.extend_from_slice(&addr.port().to_be_bytes());
        }
    }

    stream.write_all(&reply).await?;
    stream.flush().await?;
    Ok(())
}
