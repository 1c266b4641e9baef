//! Redis-compatible hot-state client (§4.5, §6.1, §6.2): locks, key schema,
//! and the pub/sub control channel.

pub mod client;
pub mod control;
pub mod error;
pub mod keys;
pub mod lock;

pub use client::HotStoreClient;
pub use control::ControlMessage;
pub use error::{HotStoreError, Result};
pub use lock::random_token;
