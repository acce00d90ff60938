pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod listing;
pub mod projection;
pub mod tables;

// Re-export commonly used types
pub use cache::{CacheKey, Clock, DayCache, FixedClock, SystemClock};
pub use client::CodaClient;
pub use config::Config;
pub use error::CodaError;
pub use listing::{CodaApi, Listing, Listings};
pub use projection::{FieldSchema, LauncherRecord, OutputFormat, Projector, Record, UnknownFields};
pub use tables::{print_tables, render_table};
