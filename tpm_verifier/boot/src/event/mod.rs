pub mod model;
pub mod parser;
pub mod log;
pub mod serialize;
