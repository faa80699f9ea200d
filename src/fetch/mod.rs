pub mod error;
pub mod fetcher;
pub mod observations;
pub mod parser;
