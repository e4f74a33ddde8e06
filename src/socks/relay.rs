//! Bidirectional stream relay
//!
//! Forwards bytes between the negotiated client connection and the dialed
//! target until the client-to-target direction ends.

use crate::error::Result;
use tokio::io::{copy, split, AsyncRead, AsyncWrite};
use tracing::debug;

/// Relay bytes between `client` and `target`.
///
/// The target-to-client direction runs as a detached task whose outcome is
/// deliberately never observed. The client-to-target copy blocks the caller
/// and its completion, EOF or error, ends the relay. Both target halves are
/// torn down before this returns, so the target connection is closed no
/// matter which direction finished first.
///
/// Returns the number of bytes forwarded from client to target.
pub async fn relay<C, T>(client: C, target: T) -> Result<u64>
where
    C: AsyncRead + AsyncWrite + Send + 'static,
    T: AsyncRead + AsyncWrite + Send + 'static,
{
    let (mut client_read, mut client_write) = split(client);
    let (mut target_read, mut target_write) = split(target);

    let reverse = tokio::spawn(async move {
        let _ = copy(&mut target_read, &mut client_write).await;
    });

    let forwarded = copy(&mut client_read, &mut target_write).await;

    // The reverse task holds the target's read half; dropping it here
    // closes the target socket before the relay returns.
    reverse.abort();
    let _ = reverse.await;
    drop(target_write);

    let forwarded = forwarded?;
    debug!("relay finished, {} bytes client->target", forwarded);
    Ok(forwarded)
}
