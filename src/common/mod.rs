pub mod buffer;
pub mod errors;
