use crate::utils::error::{Result, StubError};
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Interpreter version carried by fixture runtimes, e.g. `2.7.9` or `2.7.9+1`
/// (upstream part plus an optional build number).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionSpec {
    nums: Vec<u32>,
    build: Option<u32>,
}

impl VersionSpec {
    pub fn from_string(s: &str) -> Result<Self> {
        let invalid = |reason: String| StubError::InvalidVersion {
            version: s.to_string(),
            reason,
        };

        if s.trim().is_empty() {
            return Err(invalid("version is empty".to_string()));
        }

        let (upstream, build) = match s.split_once('+') {
            Some((u, b)) => {
                if b.is_empty() || !b.bytes().all(|c| c.is_ascii_digit()) {
                    return Err(invalid(format!("invalid build number {b:?}")));
                }
                let build = b
                    .parse::<u32>()
                    .map_err(|_| invalid(format!("build number {b:?} is out of range")))?;
                (u, Some(build))
            }
            None => (s, None),
        };

        if upstream.is_empty() {
            return Err(invalid("missing upstream version".to_string()));
        }

        let mut nums = Vec::new();
        for part in upstream.split('.') {
            if part.is_empty() {
                return Err(invalid("empty version component".to_string()));
            }
            if !part.bytes().all(|c| c.is_ascii_digit()) {
                return Err(invalid(format!("non-numeric component {part:?}")));
            }
            let num = part
                .parse::<u32>()
                .map_err(|_| invalid(format!("component {part:?} is out of range")))?;
            nums.push(num);
        }

        Ok(Self { nums, build })
    }

    pub fn major(&self) -> u32 {
        self.nums.first().copied().unwrap_or(0)
    }

    pub fn minor(&self) -> u32 {
        self.nums.get(1).copied().unwrap_or(0)
    }

    pub fn micro(&self) -> u32 {
        self.nums.get(2).copied().unwrap_or(0)
    }

    pub fn build(&self) -> Option<u32> {
        self.build
    }

    /// Major.Minor.Micro as a string, missing positions padded with zeros.
    pub fn numpart(&self) -> String {
        format!("{}.{}.{}", self.major(), self.minor(), self.micro())
    }

    /// True when the upstream parts agree; build numbers are only compared
    /// when both sides carry one.
    pub fn matches_upstream(&self, other: &VersionSpec) -> bool {
        if self.numpart() != other.numpart() {
            return false;
        }
        match (self.build, other.build) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let upstream = self
            .nums
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(".");
        match self.build {
            Some(build) => write!(f, "{upstream}+{build}"),
            None => write!(f, "{upstream}"),
        }
    }
}

/// Parsed runtime archive file name:
/// `implementation-version-platform-abi.runtime`, abi `none` meaning no ABI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeName {
    implementation: String,
    version: VersionSpec,
    platform: String,
    abi: Option<String>,
}

impl RuntimeName {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StubError::InvalidRuntimeName {
                name: path.display().to_string(),
                reason: "missing file name".to_string(),
            })?;

        let invalid = |reason: String| StubError::InvalidRuntimeName {
            name: file_name.to_string(),
            reason,
        };

        let base = file_name
            .strip_suffix(".runtime")
            .ok_or_else(|| invalid("expected a .runtime extension".to_string()))?;

        let (implementation, remain) = base
            .split_once('-')
            .ok_or_else(|| invalid("expected implementation-version-platform-abi".to_string()))?;
        let (rest, abi) = remain
            .rsplit_once('-')
            .ok_or_else(|| invalid("expected implementation-version-platform-abi".to_string()))?;
        let (version_part, platform) = rest
            .rsplit_once('-')
            .ok_or_else(|| invalid("expected implementation-version-platform-abi".to_string()))?;

        if implementation.is_empty() {
            return Err(invalid("empty implementation".to_string()));
        }
        if platform.is_empty()
            || !platform
                .bytes()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == b'_')
        {
            return Err(invalid(format!("invalid platform token {platform:?}")));
        }
        if abi.is_empty() {
            return Err(invalid("empty abi".to_string()));
        }

        let version = VersionSpec::from_string(version_part)?;
        let abi = if abi == "none" {
            None
        } else {
            Some(abi.to_string())
        };

        Ok(Self {
            implementation: implementation.to_string(),
            version,
            platform: platform.to_string(),
            abi,
        })
    }

    pub fn implementation(&self) -> &str {
        &self.implementation
    }

    pub fn version(&self) -> &VersionSpec {
        &self.version
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn abi(&self) -> Option<&str> {
        self.abi.as_deref()
    }
}

impl fmt::Display for RuntimeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}.runtime",
            self.implementation,
            self.version,
            self.platform,
            self.abi.as_deref().unwrap_or("none")
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub path: String,
    pub version: String,
    pub numpart: String,
    pub build: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub archive: String,
    pub member: String,
    pub stub: String,
    pub stub_version: Option<String>,
    pub runtime_version: Option<String>,
    pub forced: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub archive: String,
    pub member: String,
    pub member_present: bool,
    pub runtime_version: String,
    pub stub_version: Option<String>,
    pub tag_error: Option<String>,
    pub version_match: Option<bool>,
}

impl VerifyReport {
    pub fn passed(&self) -> bool {
        self.member_present && self.version_match == Some(true)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplyReport {
    pub fixture: String,
    pub updated: Vec<InstallReport>,
}
