//! MFAPI and Kuvera HTTP adapters for navrank.
//!
//! This crate implements the navrank collaborator traits over the public
//! [MFAPI](https://www.mfapi.in/) service (scheme listing and NAV history) and
//! a Kuvera metadata mirror (expense ratio, AUM, manager, rating).
//!
//! # Usage
//!
//! ```rust,ignore
//! use navrank_mfapi::{HttpConfig, KuveraClient, MfApiClient, KUVERA_BASE_URL};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mfapi = MfApiClient::from_env(HttpConfig::default())?;
//!
//!     // First page of the scheme universe
//!     let schemes = mfapi.scheme_page(0, 1000).await?;
//!
//!     // Full NAV history of one scheme
//!     let history = mfapi.nav_history(&schemes[0].code, None).await?;
//!
//!     // Expense ratio and AUM by ISIN
//!     let kuvera = KuveraClient::new(KUVERA_BASE_URL, HttpConfig::default())?;
//!     let meta = kuvera.fund_metadata("INF846K01DP8").await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Environment Variables
//!
//! Set `NAVRANK_API_BASE_URL` in your environment or `.env` file to point at
//! a mirror:
//!
//! ```bash
//! NAVRANK_API_BASE_URL=https://api.mfapi.in
//! ```

mod client;
mod error;
mod http;
mod kuvera;
mod types;

pub use client::{BASE_URL_ENV, MFAPI_BASE_URL, MfApiClient};
pub use error::MfApiError;
pub use http::HttpConfig;
pub use kuvera::{KUVERA_BASE_URL, KuveraClient, metadata_from_value};
pub use types::*;

/// Result type for MFAPI operations.
pub type Result<T> = std::result::Result<T, MfApiError>;
