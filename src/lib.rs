pub mod api_client;
pub mod app_url;
pub mod commands;
pub mod config;
pub mod controller;
pub mod errors;
pub mod models;
pub mod page;
pub mod render;
pub mod view;
