/// Command-line parsing and single-volume processing
pub mod cli;
/// Compile-time defaults and tool names
pub mod configuration;
/// Error types and constructor helpers
pub mod error;
/// Per-stage progress display
pub mod progress;
/// Multi-page TIFF reading and writing
pub mod tiff_stack;
/// Vaa3D raw stack reading and writing
pub mod v3draw;
/// Format detection and load/save dispatch
pub mod volume;
