pub mod pipeline;
pub mod start_time;
pub mod sync;
