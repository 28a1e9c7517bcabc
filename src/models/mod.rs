pub mod geo;
pub mod log;
