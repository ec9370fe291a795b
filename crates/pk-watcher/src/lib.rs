//! Filesystem change watcher with async event streaming.
//!
//! This crate subscribes to filesystem notifications through the `notify`
//! crate and bridges them to a tokio channel, so a single async consumer can
//! handle changes one at a time.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    notify thread                                │
//! │  ┌──────────────────┐    ┌────────────────┐    ┌────────────┐   │
//! │  │RecommendedWatcher│ -> │ FileEvent per  │ -> │ FileFilter │   │
//! │  │ (one sub per dir)│    │ path + kind    │    │            │   │
//! │  └──────────────────┘    └────────────────┘    └─────┬──────┘   │
//! └──────────────────────────────────────────────────────│──────────┘
//!                                                        │
//!                                          blocking_send │
//!                                                        ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Async Runtime (tokio)                        │
//! │  ┌──────────────────┐    ┌────────────────┐                     │
//! │  │ FileWatcher      │    │ mpsc::Receiver │ -> dispatcher loop  │
//! │  │ (shutdown ctrl)  │    │ (events)       │                     │
//! │  └──────────────────┘    └────────────────┘                     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Subscriptions
//!
//! By default the watcher subscribes the root and every subdirectory that
//! exists when it starts, each non-recursively. Directories created later
//! are not subscribed. [`WatchOptions::recursive`] switches to a single
//! recursive subscription instead.
//!
//! # Usage
//!
//! ```no_run
//! use pk_watcher::{ChangeKindFilter, FileWatcher, WatchOptions};
//! use camino::Utf8Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut watcher = FileWatcher::new(
//!         Utf8Path::new("/src"),
//!         &WatchOptions::default(),
//!         ChangeKindFilter::write_or_create(),
//!     )
//!     .await?;
//!
//!     while let Some(event) = watcher.recv().await {
//!         println!("{:?} {}", event.kind, event.path);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod events;
pub mod filter;
pub mod watcher;

pub use error::WatchError;
pub use events::{ChangeKind, FileEvent};
pub use filter::{AcceptAllFilter, ChangeKindFilter, CompositeFilter, ExcludeDirFilter, FileFilter};
pub use watcher::{FileWatcher, WatchOptions};
