//! saltbot: relay chat commands to salt-api.
//!
//! A chat message such as `!glob "web*" "uptime"` is routed to a command
//! handler, sent to salt-api through one lazily established session, checked,
//! rendered with a template and replied to the sender.

pub mod bot;
pub mod channels;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod render;
pub mod router;
pub mod salt;
pub mod settings;
