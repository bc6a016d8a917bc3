// utils
pub mod error;
pub mod xml;

// property model
pub mod names;
pub mod types;
pub mod decoder;
pub mod registry;
pub mod catalog;

// multistatus
pub mod response;
pub mod classify;
pub mod multistatus;

// request bodies
pub mod encoder;
