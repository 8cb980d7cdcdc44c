pub mod app;
pub mod config;
pub mod dispatch;
pub mod document;
pub mod error;
pub(crate) mod event;
pub mod input;
pub mod logging;
pub mod ui;
pub mod viewport;
pub mod worker;
