//! Application runtime composition modules.

pub(crate) mod exit_handler;
pub(crate) mod messages;
pub(crate) mod runtime;
pub(crate) mod signals;
pub(crate) mod terminal;
