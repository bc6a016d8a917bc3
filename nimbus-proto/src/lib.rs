// plumbing
pub mod error;
pub mod transport;
pub mod credentials;
pub mod client;

// results
pub mod file;
pub mod operation;

// operations
pub mod propfind;
pub mod files;
