//! `cf-gateway` — the Clipflow HTTP gateway.
//!
//! Hosts the serverless-style function endpoints (`execute-tool`,
//! `multi-agent-chat`), the conversation pipeline, job/credit/catalog
//! APIs, and the payment webhook. Everything is wired together in
//! [`bootstrap`] and shared through [`state::AppState`].

pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod runtime;
pub mod state;
