pub mod config;
pub mod log_utils;
pub mod serde_fun;
pub(crate) mod utils;
