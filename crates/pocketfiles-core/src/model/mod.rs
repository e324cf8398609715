/// Data model shared by the scanner and its consumers.
///
/// The scanner's output is deliberately flat: an ordered `Vec<PathBuf>`.
/// Modification times are never stored; they are read lazily by whoever
/// needs them (see [`crate::analysis::recent`]).
pub mod request;
pub mod size;

pub use request::{RequestId, ScanRequest};
