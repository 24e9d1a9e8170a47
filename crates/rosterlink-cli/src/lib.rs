//! Rosterlink chat front end
//!
//! Turns one line of chat text into a registry operation and renders the
//! replies. The binary feeds it from stdin; tests feed it directly.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Chat text parsing
pub mod commands;

/// Command dispatch against the registry service
pub mod handlers;

/// Reply text and attachments
pub mod render;

pub use commands::ChatCommand;
pub use handlers::ChatHandler;
pub use render::Reply;
