//! Stampy: chat with any website.
//!
//! Registers websites by sitemap URL, crawls and indexes their textual
//! content into a per-site full-text index, and chats with an AI assistant
//! that grounds its answers by retrieving indexed passages through a
//! `search_documents` tool call.

pub mod auth;
pub mod chat;
pub mod commands;
pub mod config;
pub mod crawl;
pub mod error;
pub mod index;
pub mod parse;
pub mod registry;
pub mod retrieval;
pub mod storage;
