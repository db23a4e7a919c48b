pub mod core_api;
pub mod reader;
pub mod serialization;
