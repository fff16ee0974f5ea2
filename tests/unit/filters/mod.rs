pub mod gaussian;
pub mod threshold;
