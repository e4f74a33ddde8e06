//! SOCKS5 authentication negotiation
//!
//! Drives method selection and, when the password method is configured,
//! the RFC 1929 username/password sub-negotiation.

use super::codec;
use super::consts::*;
use super::types::AuthMethod;
use crate::error::{Result, SockdenError, Socks5Error};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

/// Callback deciding whether a username/password pair is valid.
///
/// Invoked concurrently from any number of connection tasks; implementations
/// guard their own shared state.
pub type PasswordChecker = Arc<dyn Fn(&str, &str) -> bool + Send + Sync>;

/// Negotiate authentication on a fresh client connection.
///
/// Accepts iff `required` appears anywhere in the client's offer, in any
/// order. On rejection the no-acceptable sentinel is written before the
/// error is returned, so the client sees a well-formed selection frame and
/// the connection closes normally. With the password method, credentials
/// are read and passed to `checker`; the sub-negotiation status is written
/// either way.
pub async fn negotiate<S>(
    stream: &mut S,
    required: AuthMethod,
    checker: Option<&PasswordChecker>,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let offer = codec::read_auth_offer(stream).await?;

    if !offer.offers(required) {
        codec::write_method_selection(stream, SOCKS5_METHOD_NOT_ACCEPTABLE).await?;
        return Err(Socks5Error::NoAcceptableMethod.into());
    }

    codec::write_method_selection(stream, required.to_byte()).await?;
    debug!("selected authentication method {:?}", required);

    if required == AuthMethod::Password {
        let checker = checker.ok_or_else(|| {
            SockdenError::Config("password method selected, but no password checker set".into())
        })?;

        let creds = codec::read_credentials(stream).await?;
        if !(checker.as_ref())(&creds.username, &creds.password) {
            codec::write_auth_status(stream, SOCKS5_AUTH_FAILURE).await?;
            return Err(Socks5Error::AuthFailed.into());
        }

        codec::write_auth_status(stream, SOCKS5_AUTH_SUCCESS).await?;
        debug!("authenticated user {}", creds.username);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt};

    fn single_user_checker(user: &'static str, pass: &'static str) -> PasswordChecker {
        Arc::new(move |u: &str, p: &str| u == user && p == pass)
    }

    fn credentials_frame(username: &str, password: &str) -> Vec<u8> {
        let mut frame = vec![SOCKS5_AUTH_VERSION, username.len() as u8];
        frame.extend_from_slice(username.as_bytes());
        frame.push(password.len() as u8);
        frame.extend_from_slice(password.as_bytes());
        frame
    }

    #[tokio::test]
    async fn test_negotiate_no_auth() {
        let (mut client, mut server) = duplex(1024);
        client
            .write_all(&[SOCKS5_VERSION, 1, SOCKS5_METHOD_NONE])
            .await
            .unwrap();

        negotiate(&mut server, AuthMethod::None, None).await.unwrap();

        let mut selection = [0u8; 2];
        client.read_exact(&mut selection).await.unwrap();
        assert_eq!(selection, [SOCKS5_VERSION, SOCKS5_METHOD_NONE]);
    }

    #[tokio::test]
    async fn test_negotiate_accepts_method_anywhere_in_offer() {
        // Offer lists password first; the configured method is no-auth.
        let (mut client, mut server) = duplex(1024);
        client
            .write_all(&[
                SOCKS5_VERSION,
                2,
                SOCKS5_METHOD_PASSWORD,
                SOCKS5_METHOD_NONE,
            ])
            .await
            .unwrap();

        negotiate(&mut server, AuthMethod::None, None).await.unwrap();

        let mut selection = [0u8; 2];
        client.read_exact(&mut selection).await.unwrap();
        assert_eq!(selection, [SOCKS5_VERSION, SOCKS5_METHOD_NONE]);
    }

    #[tokio::test]
    async fn test_negotiate_no_acceptable_method() {
        let (mut client, mut server) = duplex(1024);
        client
            .write_all(&[SOCKS5_VERSION, 1, SOCKS5_METHOD_PASSWORD])
            .await
            .unwrap();

        let err = negotiate(&mut server, AuthMethod::None, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SockdenError::Socks5(Socks5Error::NoAcceptableMethod)
        ));

        let mut selection = [0u8; 2];
        client.read_exact(&mut selection).await.unwrap();
        assert_eq!(selection, [SOCKS5_VERSION, SOCKS5_METHOD_NOT_ACCEPTABLE]);
    }

    #[tokio::test]
    async fn test_negotiate_password_success() {
        let (mut client, mut server) = duplex(1024);
        client
            .write_all(&[SOCKS5_VERSION, 1, SOCKS5_METHOD_PASSWORD])
            .await
            .unwrap();
        client
            .write_all(&credentials_frame("alice", "password123"))
            .await
            .unwrap();

        let checker = single_user_checker("alice", "password123");
        negotiate(&mut server, AuthMethod::Password, Some(&checker))
            .await
            .unwrap();

        let mut response = [0u8; 4];
        client.read_exact(&mut response).await.unwrap();
        assert_eq!(
            response,
            [
                SOCKS5_VERSION,
                SOCKS5_METHOD_PASSWORD,
                SOCKS5_AUTH_VERSION,
                SOCKS5_AUTH_SUCCESS
            ]
        );
    }

    #[tokio::test]
    async fn test_negotiate_password_failure() {
        let (mut client, mut server) = duplex(1024);
        client
            .write_all(&[SOCKS5_VERSION, 1, SOCKS5_METHOD_PASSWORD])
            .await
            .unwrap();
        client
            .write_all(&credentials_frame("alice", "wrong"))
            .await
            .unwrap();

        let checker = single_user_checker("alice", "password123");
        let err = negotiate(&mut server, AuthMethod::Password, Some(&checker))
            .await
            .unwrap_err();
        assert!(matches!(err, SockdenError::Socks5(Socks5Error::AuthFailed)));

        let mut response = [0u8; 4];
        client.read_exact(&mut response).await.unwrap();
        assert_eq!(
            response,
            [
                SOCKS5_VERSION,
                SOCKS5_METHOD_PASSWORD,
                SOCKS5_AUTH_VERSION,
                SOCKS5_AUTH_FAILURE
            ]
        );
    }

    #[tokio::test]
    async fn test_negotiate_password_without_checker() {
        let (mut client, mut server) = duplex(1024);
        client
            .write_all(&[SOCKS5_VERSION, 1, SOCKS5_METHOD_PASSWORD])
            .await
            .unwrap();

        let err = negotiate(&mut server, AuthMethod::Password, None)
            .await
            .unwrap_err();
        assert!(matches!(err, SockdenError::Config(_)));
    }

    #[tokio::test]
    async fn test_negotiate_bad_version() {
        let (mut client, mut server) = duplex(1024);
        client.write_all(&[0x04, 1, SOCKS5_METHOD_NONE]).await.unwrap();

        let err = negotiate(&mut server, AuthMethod::None, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SockdenError::Socks5(Socks5Error::UnsupportedVersion(0x04))
        ));
    }
}
