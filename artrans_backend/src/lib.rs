pub mod api;
pub mod artran;
pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod console;
pub mod database;
pub mod identity;
pub mod importer;
pub mod progress;
pub mod rebuild;
pub mod remap;
pub mod store;
pub mod telemetry;
pub mod utils;
