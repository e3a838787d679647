pub mod base;
pub mod chat;
pub mod errors;

pub use base::*;
pub use chat::*;
pub use errors::*;
