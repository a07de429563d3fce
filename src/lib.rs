pub mod config;
pub mod github;
pub mod http;
pub mod services;
pub mod sync;
