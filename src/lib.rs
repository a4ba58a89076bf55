pub mod config;
pub mod db;
pub mod dialogs;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;
