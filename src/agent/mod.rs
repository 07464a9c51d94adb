//! Clients for the remote command-interpreting agent

mod http;
mod nats;

pub use self::http::HttpCommandExecutor;
pub use self::nats::{parse_reply, NatsCommandExecutor};
