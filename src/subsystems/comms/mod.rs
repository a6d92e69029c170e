//! Comms — boundary channels that expose the assistant to the outside.
//!
//! Only one channel exists today: the axum HTTP channel.

pub mod axum_channel;

pub use axum_channel::{AxumChannel, AxumState, build_router};
