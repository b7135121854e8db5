// Presentation layer - Command line surface and process signals
pub mod cli;
pub mod signals;
