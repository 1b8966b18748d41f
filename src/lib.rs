pub mod api_types;
pub mod cache;
pub mod cluster;
pub mod config;
pub mod embed;
pub mod error;
pub mod fetch;
pub mod keywords;
pub mod models;
pub mod normalize;
pub mod orchestrator;
pub mod render;
pub mod script;
pub mod sentiment;
pub mod themes;
