pub mod engine;
pub mod op;
