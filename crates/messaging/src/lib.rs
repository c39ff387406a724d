//! dipzy messaging
//!
//! Outbound notification channels: a Telegram bot that can send messages and
//! long-poll for commands, and a Twitter v2 client for user lookups and the
//! filtered stream.
//!
//! # Core Types
//!
//! - [`TelegramBot`] - Bot API calls and the polling loop
//! - [`UpdateHandler`] - Command callbacks for [`TelegramBot::run_polling`]
//! - [`TwitterClient`] - Users, lists, stream rules
//! - [`TweetStream`] - Line-delimited filtered stream reader

pub mod telegram;
pub mod twitter;

pub use telegram::{
    ChatId, DefaultHandler, Message, ParseMode, SendOptions, TelegramBot, TelegramPolicy, Update,
    UpdateHandler, START_REPLY,
};
pub use twitter::{NewRule, Page, Rule, Tweet, TweetStream, TwitterClient, User, UserLookup};
