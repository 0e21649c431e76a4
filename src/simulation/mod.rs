pub mod comparison;
pub mod config;
pub mod engine;
pub mod monte_carlo;
pub mod presets;
