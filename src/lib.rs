pub mod app;
pub mod auth;
pub mod config;
pub mod contact;
pub mod gallery;
pub mod logging;
pub mod store;
pub mod tasks;
pub mod ui;
