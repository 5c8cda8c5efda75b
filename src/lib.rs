//! EchoMind: backend for AI-voice-assisted emotional-wellness sessions.
//!
//! Users hold a small free-trial quota and can buy premium calls. Each
//! completed voice conversation is stored as a session record with its
//! transcript and a summary, either written by a hosted model or derived
//! locally from how much the user spoke.
//!
//! # Architecture
//!
//! - **Storage**: SQLite (`users`, `history`) with forward-only migrations
//! - **API**: axum routes; identity arrives from an authenticating gateway as headers
//! - **Summaries**: Gemini `generateContent` with exponential-backoff retry, or a local heuristic
//! - **Sessions**: a client-side controller for the voice call lifecycle
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`db`]: SQLite initialization, schema, migrations, and health checks
//! - [`account`]: Users, usage counters, and session history
//! - [`summary`]: Transcript summarizers
//! - [`api`]: REST handlers and error mapping
//! - [`session`]: Voice session controller

pub mod account;
pub mod api;
pub mod config;
pub mod db;
pub mod server;
pub mod session;
pub mod summary;
