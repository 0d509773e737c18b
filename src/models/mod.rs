pub mod envelope;
pub mod feature;
pub mod job;
pub mod upload;
