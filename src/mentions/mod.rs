//! Mention parsing and recipient resolution.

pub mod parser;
pub mod resolver;
