//! Configuration management for groq-client.
//!
//! Runtime settings live in [`ClientConfig`]. They can be built in code or
//! loaded from a TOML file.
//!
//! # Configuration File Format
//!
//! The search order is:
//! 1. `./groq-client.toml` (project-local)
//! 2. `~/.config/groq-client/config.toml` (XDG config)
//!
//! # Example Configuration
//!
//! ```toml
//! api_key_env = "GROQ_API_KEY"
//! default_model = "llama-3.1-8b-instant"
//! timeout_secs = 60
//!
//! [rate_limit]
//! wait = true
//! max_wait_ms = 5000
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use groq_client::config;
//!
//! let file = config::load()?;
//! let client_config = file.to_client_config();
//! ```

mod client;
mod file;
mod types;

pub use client::{ClientConfig, RateLimitConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use file::{from_path, from_str, load, search_paths, xdg_config_dir};
pub use types::{FileConfig, RateLimitFileConfig};
