//! Agents — the decision-making side of the assistant.
//!
//! There is exactly one agent today: the chat resolver.

pub mod chat;
