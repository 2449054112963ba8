pub mod api;
pub mod config;
pub mod error;
pub mod helper;
pub mod modules;
pub mod pipeline;
pub mod pose;
pub mod triton_client;
pub mod utils;
