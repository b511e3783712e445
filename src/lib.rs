pub mod config;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod pages;
pub mod palette;
pub mod reactive;
pub mod server;
pub mod views;
