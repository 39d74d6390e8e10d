//! # Spark2Scale
//!
//! Founder dashboard core for the Spark2Scale startup platform.
//!
//! Spark2Scale connects founders, investors and contributors. This crate holds
//! the parts of the founder dashboard that carry real logic, talking to the
//! platform backend over HTTP:
//!
//! ## Features
//!
//! - **Document cards**: groups stored documents by type, merges their version
//!   histories and picks the current file for each type
//! - **Partial loading**: a document whose history fails to load still shows,
//!   with a warning instead of a failed page
//! - **Workflow stages**: generate, regenerate and complete stage artifacts,
//!   with button gating that never locks up after a failed call
//!
//! ## Quick Start
//!
//! ```bash
//! # Show a startup's documents grouped by type
//! spark2scale docs list --startup 42
//!
//! # Generate and complete the evaluation stage
//! spark2scale stage generate --startup 42 --stage evaluation
//! spark2scale stage complete --startup 42 --stage evaluation
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::significant_drop_tightening)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod core;
pub mod documents;
pub mod error;
pub mod integrations;
pub mod workflow;

// Re-export commonly used types
pub use self::core::Config;
pub use documents::{
    aggregate, select_path, Aggregation, DocumentGroup, DocumentLoader, DocumentRecord,
    VersionRecord, VersionSelection,
};
pub use error::{CoreError, CoreResult};
pub use integrations::{ApiClient, ApiError, Backend};
pub use workflow::{StageActions, StageName, StageState, WorkflowController, WorkflowStage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "spark2scale";
