pub mod analytics;
pub mod cli;
pub mod common;
pub mod generator;
pub mod storage;
pub mod traits;

pub use generator::descriptor_builder::build_descriptor;
pub use generator::topology::assign_topology;
