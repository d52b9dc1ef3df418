// Library root for the domain-agnostic pieces: configuration, the SQLite
// key-value store, and text decoding of imported files.

pub mod config;
pub mod db;
pub mod mode;
pub mod text;

pub use mode::ImportMode;
