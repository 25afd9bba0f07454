pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod list;
pub mod task;
pub mod ui;

pub use client::{TaskClient, TaskService};
pub use config::Config;
pub use error::{Result, TaskError};
pub use task::{Task, TaskStatus};
