pub mod fd;
pub mod fs;

pub use fd::Fd;
pub use fs::{Filesystem, Mode};
