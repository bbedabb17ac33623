//! Command handlers.

pub(crate) mod deploy;
