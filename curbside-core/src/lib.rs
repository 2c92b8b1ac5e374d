//! Core types for the curbside waste-collection client.

/// Client configuration and vendor api keys.
pub mod config;
/// Holiday advisory parser.
pub mod holiday;
/// Domain models and identifiers shared by the provider and its clients.
pub mod model;
/// Transport port and error taxonomy.
pub mod ports;
/// Reading claims out of bearer tokens.
pub mod token;

pub use config::*;
pub use holiday::*;
pub use model::*;
pub use ports::*;
pub use token::*;
