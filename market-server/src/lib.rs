//! Grocery Market Server
//!
//! Backend for an online grocery marketplace's delivery operation.
//!
//! # Module structure
//!
//! ```text
//! market-server/src/
//! ├── core/       # config, state, HTTP server
//! ├── api/        # HTTP routes and handlers
//! ├── db/         # pool, migrations, repositories
//! ├── workflow/   # delivery workflow engine (status machine,
//! │               # inventory reservation, abort/cancel/reassign)
//! └── utils/      # errors, logging
//! ```
//!
//! The workflow engine is the core: every operation runs as one
//! request-scoped transaction over the append-only status ledger, the
//! inventory counters, the delivery rows, and the notification outbox.

pub mod api;
pub mod core;
pub mod db;
pub mod utils;
pub mod workflow;

// Re-export public types
pub use core::{Config, Server, ServerState};
pub use utils::logger::{init_logger, init_logger_with_file};
pub use utils::{AppError, AppResult};
pub use workflow::DeliveryWorkflow;

/// Set up the process environment: dotenv, then logging.
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   __  ___         __       __
  /  |/  /__ _____/ /_____ / /_
 / /|_/ / _ `/ __/  '_/ -_) __/
/_/  /_/\_,_/_/ /_/\_\\__/\__/
    "#
    );
}
