//! Minimal Telegram transport: long polling, routing and replies.

pub mod client;
pub mod handler;
pub mod models;
pub mod service;

pub use client::{BotClient, TelegramError};
pub use service::BotService;
