//! Utility modules

pub mod socket;
pub mod tracing_setup;

pub use socket::tune_stream;
pub use tracing_setup::init_tracing;
