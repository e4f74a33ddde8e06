//! SOCKS5 protocol engine
//!
//! The handshake stages in wire order: the codec functions decode and encode
//! every frame, [`negotiate`] drives method selection and the optional
//! username/password sub-negotiation, [`handle_request`] parses the request
//! and dials the target, and [`relay`] forwards bytes until the client side
//! is done.

mod auth;
mod codec;
mod consts;
mod relay;
mod request;
mod types;

pub use auth::{negotiate, PasswordChecker};
pub use codec::{
    read_auth_offer, read_credentials, read_request, write_auth_status, write_method_selection,
    write_reply, CodecResult,
};
pub use consts::*;
pub use relay::relay;
pub use request::handle_request;
pub use types::{AuthMethod, AuthOffer, Credentials, SocksCommand, TargetAddr};
