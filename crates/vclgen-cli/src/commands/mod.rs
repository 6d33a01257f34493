//! Command handlers.

pub(crate) mod generate;
pub(crate) mod variables;
