#[macro_use]
pub mod macros;
pub mod collector;
pub mod common;
pub mod domain;
pub mod global;
pub mod infra;
pub mod scheduler;
pub mod schema;

#[cfg(test)]
mod testing;
