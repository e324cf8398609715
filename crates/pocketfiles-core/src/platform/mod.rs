/// Platform-specific functionality: where a device keeps its user storage.

pub mod roots;

pub use roots::{default_roots, roots_for, TargetPlatform};
