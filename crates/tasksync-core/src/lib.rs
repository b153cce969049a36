//! tasksync core library
//!
//! A to-do list whose only source of truth is a realtime database. The
//! database pushes the full set of tasks on every change; the list rebuilds
//! and reorders itself from each push and turns user commands into keyed
//! writes.
//!
//! # Quick Start
//!
//! ```text
//! let store = FirebaseStore::new("https://demo.firebaseio.com", None)?;
//! let mut list = TaskList::new(store, view);
//! let mut subscription = list.subscribe();
//!
//! list.create_or_update(None, "Buy milk", "", "01/01/2030").await?;
//! list.run(&mut subscription).await;
//! ```
//!
//! # Modules
//!
//! - `list`: the synchronizer (main entry point)
//! - `models`: the `Task` record
//! - `order`: list ordering
//! - `store`: realtime store contract and clients
//! - `view`: display layer contract
//! - `deadline`: deadline input parsing
//! - `config`: application configuration

pub mod config;
pub mod deadline;
pub mod error;
pub mod list;
pub mod models;
pub mod order;
pub mod store;
pub mod view;

pub use config::Config;
pub use error::{TaskError, TaskResult};
pub use list::TaskList;
pub use models::{DecodeError, Task};
pub use store::{FirebaseStore, MemoryStore, RemoteStore, Snapshot, StoreError, StoreEvent, Subscription};
pub use view::{RecordingView, TaskView};
