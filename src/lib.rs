//! Case Desk - disability case management through an AI agent
//!
//! The service half exposes mock case operations as tools for an external
//! agent runtime. The client half streams chat turns from that runtime,
//! reconciles them into a message list and renders tool results.

pub mod agent;
pub mod api;
pub mod cases;
pub mod chat;
pub mod config;
pub mod render;
pub mod tools;
