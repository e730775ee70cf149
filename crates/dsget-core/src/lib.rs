pub mod config;
pub mod logging;

pub mod checksum;
pub mod citation;
pub mod fetch;
pub mod manifest;
pub mod transport;
pub mod url_model;
