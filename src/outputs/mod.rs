//! Output sinks for extracted articles.
//!
//! - [`json`]: Writes one [`NewsFeed`](crate::models::NewsFeed) per category
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── stocks.json
//!     ├── markets.json
//!     └── economy.json
//! ```

pub mod json;
