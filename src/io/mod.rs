pub mod reporting;
pub mod scenario;
