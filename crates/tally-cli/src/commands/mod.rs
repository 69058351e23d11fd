//! CLI command implementations

pub(crate) mod common;
pub(crate) mod mark;
pub(crate) mod status;
pub(crate) mod template;
pub(crate) mod unmark;
