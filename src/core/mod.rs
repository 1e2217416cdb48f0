pub mod archive;
pub mod banner;
pub mod ops;
pub mod tag;

pub use crate::domain::model::{
    ApplyReport, InspectReport, InstallReport, RuntimeName, VerifyReport, VersionSpec,
};
pub use crate::utils::error::Result;
