//! `cf-tools` — tool registry and built-in tools for Clipflow.
//!
//! Tools are schema-described capabilities an agent can invoke. The
//! registry is assembled once at startup and read-only afterwards;
//! dispatch goes through [`ToolExecutor`], which parses typed
//! parameters at the boundary, enforces credits, and records usage.

pub mod builtin;
pub mod executor;
pub mod params;
pub mod registry;

pub use executor::{ExecutionRequest, ToolExecutor};
pub use registry::{RunContext, Tool, ToolRegistry};
