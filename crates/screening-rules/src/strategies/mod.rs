pub mod destination;
pub mod orchestration;
pub mod results;
pub mod scoring;
