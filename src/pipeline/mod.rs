pub mod geometry;
pub mod reader;
