pub mod app;
pub mod configs;
pub mod errors;
pub mod models;
pub mod services;

pub use app::run;
