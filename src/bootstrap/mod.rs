//! Bootstrap — startup-time plumbing that is not a subsystem.

pub mod logger;
