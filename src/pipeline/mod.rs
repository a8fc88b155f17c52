//! Batch personalization pipeline.
//!
//! - [`BatchBuilder`]: fluent builder resolving fonts and the renderer
//! - [`BatchOrchestrator`]: fans names out across template pages and
//!   assembles one [`PersonalizedDocument`] per recipient
//! - [`StatusReporter`]: per-job progress events for subscribers
//!
//! # Example
//!
//! ```ignore
//! use inscribe::{BatchBuilder, Template};
//!
//! let orchestrator = BatchBuilder::new().with_concurrency(4).build()?;
//! let events = orchestrator.subscribe();
//! let result = orchestrator.run_blocking(&template_bytes, layouts.as_slice(), names.entries())?;
//! ```

mod builder;
pub mod config;
pub mod job;
mod orchestrator;
pub mod reporter;
pub mod result;

pub use builder::BatchBuilder;
pub use config::{BatchConfig, default_concurrency};
pub use job::{JobError, JobId, JobStatus, RenderJob};
pub use orchestrator::{BatchOrchestrator, CancelHandle};
pub use reporter::{StatusEvent, StatusReporter, StatusSubscription};
pub use result::{BatchResult, BatchSummary, JobFailure, PersonalizedDocument};
