pub mod builtin;
pub mod config;
pub mod model;
