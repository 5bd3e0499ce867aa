//! # dbseek - chat-bot dataset search
//!
//! Users upload small text/CSV files (optionally inside `.zip`/`.rar`
//! archives) and search their contents by case-insensitive substring.
//! Admins get dataset and runtime reports and can appoint further admins.
//!
//! ## Architecture
//!
//! - [`ingest`] - Decoding uploads into datasets
//! - [`store`] - Append-only dataset storage and search
//! - [`access`] - Admin set and user roster
//! - [`bot`] - Command parsing, dispatch and reply formatting
//! - [`server`] - Unix socket daemon the messaging gateway talks to
//! - [`config`] - Token and bootstrap admin settings
//! - [`output`] - Terminal rendering for the CLI
//!
//! ## Quick Start
//!
//! ```no_run
//! use dbseek::access::UserId;
//! use dbseek::bot::{BotContext, Sender, Update};
//! use dbseek::config::Config;
//!
//! let ctx = BotContext::new(Config::default());
//! let update = Update {
//!     sender: Sender { id: UserId(42), username: None, full_name: "Anna".into() },
//!     text: "/search Smith".into(),
//!     attachment: None,
//! };
//! println!("{}", ctx.handle(&update));
//! ```

pub mod access;
pub mod bot;
pub mod config;
pub mod ingest;
pub mod output;
pub mod server;
pub mod store;
