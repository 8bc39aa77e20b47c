//! Nero, a tarot-reading cat you chat with.
//!
//! A [`Conversation`] holds the message history and a waiting flag, and sends
//! each question to a remote reading service through a [`ReadingTransport`].
//! Two front-ends project it: a terminal chat ([`chat`]) and a server-rendered
//! web widget ([`web_server`]).

pub mod chat;
pub mod config;
pub mod constants;
pub mod conversation;
pub mod error;
pub mod exchange;
pub mod web_server;

pub use config::Config;
pub use conversation::{Conversation, ConversationSnapshot, Message, PendingExchange, SharedConversation};
pub use error::{ConfigError, ExchangeError};
pub use exchange::{HttpReadingClient, ReadingTransport};
