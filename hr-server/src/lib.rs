//! HR Server - multi-tenant HR administration backend
//!
//! # Architecture
//!
//! - **Database** (`db`): embedded SurrealDB storage, models and repositories
//! - **Identity** (`identity`): login/password derivation and CPF validation
//! - **Import** (`import`): spreadsheet bulk import of employees
//! - **HTTP API** (`api`): RESTful API surface
//!
//! # Module structure
//!
//! ```text
//! hr-server/src/
//! ├── core/          # config, state, server
//! ├── api/           # HTTP routes and handlers
//! ├── db/            # database layer (models, repositories)
//! ├── identity/      # login derivation, CPF check digits
//! ├── import/        # bulk import orchestrator
//! └── utils/         # error type, logging, validation helpers
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod identity;
pub mod import;
pub mod utils;

pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

pub use utils::logger::init_logger_with_file;

pub fn print_banner() {
    println!(
        r#"
    __  ______
   / / / / __ \  ________  ______   _____  _____
  / /_/ / /_/ / / ___/ _ \/ ___/ | / / _ \/ ___/
 / __  / _, _/ (__  )  __/ /   | |/ /  __/ /
/_/ /_/_/ |_| /____/\___/_/    |___/\___/_/
"#
    );
}

/// Initialize logging from the loaded configuration. Call once at startup,
/// after `.env` has been loaded and the config read.
pub fn setup_environment(config: &Config) {
    init_logger_with_file(None, config.log_dir.as_deref());
}
