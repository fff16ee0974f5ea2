/// External anisotropic diffusion backends and scratch file handling
pub mod diffusion;
/// Parameter stacks consumed by repeated stages
pub mod parameters;
/// Stage execution and output derivation
pub mod runner;
/// Stage codes and pipeline parsing
pub mod stage;
