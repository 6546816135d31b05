pub mod analytics;
pub mod errors;
