pub mod models;
pub(crate) mod util;

pub use models::*;
