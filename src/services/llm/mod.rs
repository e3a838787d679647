pub mod client;
pub mod client_config;
pub mod models;
pub mod providers;

pub use client::InferenceClient;
pub use client_config::{ClientBuilder, ClientConfig};
pub use models::*;
