#![forbid(unsafe_code)]

//! Persistence and dashboard domain data for OpsGrid.
//!
//! Everything the dashboard remembers lives in flat JSON array files under
//! one data directory: the widget layout, tasks, quick-launch links,
//! reminders, and automation presets. [`JsonFileStore`] is the shared file
//! layer; each domain module wraps it with typed records and the view
//! logic its widget needs.
//!
//! # Failure Modes
//!
//! - A missing data file loads as an empty collection, never an error.
//! - Malformed JSON surfaces as [`StoreError::Malformed`] with the file
//!   path attached; callers decide whether to fall back or abort.
//! - Saves are atomic (temp file plus rename), so a crash mid-write leaves
//!   the previous file intact.

pub mod automation;
pub mod json;
pub mod layout_store;
pub mod links;
pub mod reminders;
pub mod tasks;

pub use automation::{Action, ActionError, ActionKind, AutomationPreset, AutomationStore};
pub use json::{JsonFileStore, StoreError};
pub use layout_store::FileLayoutStore;
pub use links::{Link, LinkKind, LinkStore};
pub use reminders::{Reminder, ReminderStore, Repeat};
pub use tasks::{LinkRef, Priority, Task, TaskKind, TaskStore};
