//! Auth gateway.
//!
//! This module provides the stateless HTTP layer for the three operations
//! that touch credentials: login, verify, and the bearer-authenticated
//! request wrapper. It never stores a token and never talks to the user; it
//! only returns classified outcomes.

mod client;
mod endpoints;
mod request;

pub use client::{AuthGateway, LoginGrant, VerifyOutcome};
pub use endpoints::{AdminConfig, CONFIG, LOGIN, VERIFY};
pub use request::RequestOptions;
pub use reqwest::Method;
