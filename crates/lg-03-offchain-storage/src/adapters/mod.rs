//! Filesystem adapters.

pub mod master_key;
