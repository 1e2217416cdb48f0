pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::config::manifest::Manifest;
pub use crate::config::{Cli, Command};
pub use crate::core::banner::{version_line, LineBuffer, LINE_CAPACITY};
pub use crate::core::tag::{stamped_version, STUB_VERSION};
pub use crate::utils::error::{Result, StubError};
