//! Command-line command handlers for daybreak.
//!
//! One-shot commands live in their own submodules. The default run mode is handled by
//! [`crate::Daybreak`].

pub mod simulate;
pub mod status;
