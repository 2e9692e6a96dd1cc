//! Manual test harness for billing webhook signatures.
//!
//! Signs a sample (or supplied) webhook payload the way the billing provider
//! does and prints a ready-to-run `curl` command, or sends the request
//! itself, so a deployed webhook endpoint can be exercised by hand.
//!
//! This crate is a debugging tool. Nothing in `billing-webhook-auth` depends
//! on it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod config;
pub mod error;
pub mod prompt;
pub mod request;
pub mod sample;

pub use cli::Cli;
pub use config::{HarnessConfig, DEFAULT_ENDPOINT_URL};
pub use error::HarnessError;
pub use prompt::acquire_secret;
pub use request::{SendOutcome, TestRequest};
pub use sample::{subscription_created, PayloadSource};
