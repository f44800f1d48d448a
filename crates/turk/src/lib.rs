//! Task marketplace support for ExpDJ.
//!
//! Host and credential resolution, deployment URLs, and the external
//! question a marketplace task points workers at. Nothing here talks to the
//! network; publishing is left to the marketplace client implementation.

#![warn(missing_docs)]

pub mod config;
pub mod credentials;
pub mod question;
pub mod client;
pub mod time;

mod error;

pub use config::{MarketplaceConfig, Host, PRODUCTION_HOST, SANDBOX_HOST, PRODUCTION_WORKER_URL, SANDBOX_WORKER_URL};
pub use credentials::Credentials;
pub use question::{ExternalQuestion, DeploymentUrls};
pub use client::{TaskMarketplace, TurkClient};
pub use time::{amazon_string_to_datetime, time_difference_minutes};
pub use error::{TurkError, Result};
