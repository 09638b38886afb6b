pub mod bundler;
pub mod category;
pub mod collector;
pub mod orchestrator;
