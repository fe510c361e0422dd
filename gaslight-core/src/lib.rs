//! # gaslight-core
//!
//! Core library for gaslight - a store-and-forward relay for backend requests.
//!
//! This library provides:
//! - A durable, order-preserving request queue backed by SQLite
//! - Destination resolution from `<category>:<suffix>` strings to URLs
//! - An ordered replay pass that delivers queued requests over HTTP
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Architecture
//!
//! Capture and replay are decoupled in time:
//! - **Capture:** collaborators append payloads under a destination; each append
//!   is committed before an id is handed back
//! - **Replay:** an operator-triggered pass drains the queue head-first, deleting
//!   each entry only after a 2xx response and halting at the first failure
//!
//! ## Example
//!
//! ```rust,no_run
//! use gaslight_core::{capture, run_replay_pass, Config, Database};
//!
//! let config = Config::load().expect("failed to load config");
//!
//! let db = Database::open(&Config::database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//!
//! capture(&db, "otel:/v1/traces", serde_json::json!({"resourceSpans": []}))
//!     .expect("failed to capture");
//!
//! let report = run_replay_pass(&db, &config.endpoints, &config.relay).expect("storage fault");
//! println!("delivered {}", report.processed);
//! ```

// Re-export commonly used items at the crate root
pub use capture::{capture, Payload};
pub use config::{Config, EndpointConfig, RelayConfig};
pub use db::Database;
pub use endpoint::{EndpointResolver, UnroutableDestination};
pub use error::{Error, Result};
pub use relay::{run_replay_pass, DeliveryError, HttpTransport, Replayer, Transport};
pub use types::*;

// Public modules
pub mod capture;
pub mod config;
pub mod db;
pub mod endpoint;
pub mod error;
pub mod logging;
pub mod relay;
pub mod types;
