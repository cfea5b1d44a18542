pub mod topology;
pub mod descriptor_builder;
