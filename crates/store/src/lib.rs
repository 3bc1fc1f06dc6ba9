//! `cf-store` — client for the hosted backing store.
//!
//! One base URL serves three surfaces, and this crate wraps them all:
//! the table REST API ([`StoreClient`]), storage buckets
//! ([`BucketClient`]), and serverless function invocation
//! ([`FunctionsClient`]). It also owns the process-wide auth session
//! ([`SessionProvider`]) and the mock-data toggles ([`MockDataStore`]).

pub mod buckets;
pub mod client;
pub mod functions;
pub mod mock;
pub mod session;
pub mod tables;

pub use buckets::BucketClient;
pub use client::StoreClient;
pub use functions::FunctionsClient;
pub use mock::MockDataStore;
pub use session::{AuthSession, SessionEvent, SessionProvider};
