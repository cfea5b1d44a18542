pub mod cluster;
pub mod config;
pub mod descriptor;
pub mod benchmark;
pub mod error;
