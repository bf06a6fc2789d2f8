//! dcprof Services Layer
//!
//! This crate sits between the front-ends (the `dcprof` CLI) and the domain
//! crates. Services orchestrate datastore access and return plain data that a
//! front-end can render.
//!
//! # Architecture
//!
//! ```text
//! Front-end (dcprof-cli)
//!     ↓
//! Service Layer (dcprof-services) ← This crate
//!     ↓
//! Domain Layer (dcprof-wizard)
//!     ↓
//! Infrastructure Layer (dcprof-core, dcprof-drivers)
//! ```
//!
//! # Services
//!
//! - [`PreviewSourceDataAction`] - Preview the rows behind a set of columns
//! - [`DataSetWindow`] - Paginated grid over a query
//! - [`DatastoreService`] - Open and list registered datastores

mod data_set_window;
mod datastore_service;
mod error;
mod preview;

pub use data_set_window::DataSetWindow;
pub use datastore_service::DatastoreService;
pub use error::{ServiceError, ServiceResult};
pub use preview::{PAGE_SIZE, PreviewSourceDataAction};
