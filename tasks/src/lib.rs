//! # Tasklist Tasks
//!
//! Per-user task lists kept in a document-style store.
//!
//! - [`store::TaskStore`]: CRUD against the remote document store
//! - [`repository::TaskRepository`]: owner-scoped operations that report
//!   failures as notices and re-fetch after every mutation
//! - [`controller::TaskListReducer`]: the List View Controller, reconciling
//!   repository results into local list state and redirecting anonymous
//!   visitors to sign-in
//!
//! There is no optimistic update: the local list only changes when a fresh
//! `list` result arrives.

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod controller;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod repository;
pub mod store;
pub mod types;

pub use controller::{
    Route, TaskListAction, TaskListEnvironment, TaskListReducer, TaskListState, TaskListStore,
    View,
};
pub use error::{Result, TaskError};
pub use memory::MemoryTaskStore;
pub use postgres::PostgresTaskStore;
pub use repository::TaskRepository;
pub use store::TaskStore;
pub use types::{NewTask, Task, TaskId};
