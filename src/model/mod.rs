pub mod distribution;
pub mod inventory;
pub mod orders;
