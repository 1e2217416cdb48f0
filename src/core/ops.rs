use crate::config::manifest::Manifest;
use crate::core::{archive, tag};
use crate::domain::model::{
    ApplyReport, InspectReport, InstallReport, RuntimeName, VerifyReport, VersionSpec,
};
use crate::utils::error::{Result, StubError};
use std::fs;
use std::path::{Path, PathBuf};

pub fn inspect_stub(path: &Path) -> Result<InspectReport> {
    tracing::debug!("Reading stub image from {}", path.display());
    let image = fs::read(path)?;

    let origin = path.display().to_string();
    let version = tag::embedded_version(&image, &origin)?;
    let spec = VersionSpec::from_string(version)?;

    Ok(InspectReport {
        path: origin,
        version: version.to_string(),
        numpart: spec.numpart(),
        build: spec.build(),
    })
}

/// Replaces `executable` inside the runtime archive with the stub image.
/// Unless forced, the archive name must parse and the stub must carry a tag
/// whose version matches the archive's.
pub fn install_stub(
    archive_path: &Path,
    stub_path: &Path,
    executable: &str,
    force: bool,
) -> Result<InstallReport> {
    let image = fs::read(stub_path)?;

    let mut stub_version = None;
    let mut runtime_version = None;

    if force {
        tracing::warn!(
            "--force given, skipping version checks for {}",
            archive_path.display()
        );
    } else {
        let name = RuntimeName::from_path(archive_path)?;
        let origin = stub_path.display().to_string();
        let embedded = tag::embedded_version(&image, &origin)?;
        let stub_spec = VersionSpec::from_string(embedded)?;

        if !stub_spec.matches_upstream(name.version()) {
            return Err(StubError::VersionMismatch {
                stub: stub_spec.to_string(),
                runtime: name.version().to_string(),
            });
        }

        stub_version = Some(stub_spec.to_string());
        runtime_version = Some(name.version().to_string());
    }

    archive::replace_member(archive_path, executable, &image)?;
    tracing::info!(
        "Replaced {} in {} ({} bytes)",
        executable,
        archive_path.display(),
        image.len()
    );

    Ok(InstallReport {
        archive: archive_path.display().to_string(),
        member: executable.to_string(),
        stub: stub_path.display().to_string(),
        stub_version,
        runtime_version,
        forced: force,
    })
}

/// Checks that the archive carries the expected executable and that its
/// embedded version agrees with the archive name. Findings land in the
/// report; only unreadable archives or unparseable names error out.
pub fn verify_runtime(archive_path: &Path, executable: &str) -> Result<VerifyReport> {
    let name = RuntimeName::from_path(archive_path)?;
    let runtime_version = name.version().to_string();

    let names = archive::member_names(archive_path)?;
    let member_present = names.iter().any(|n| n == executable);

    let (stub_version, tag_error, version_match) = if member_present {
        let image = archive::read_member(archive_path, executable)?;
        match tag::embedded_version(&image, executable) {
            Ok(embedded) => match VersionSpec::from_string(embedded) {
                Ok(spec) => {
                    let matched = spec.matches_upstream(name.version());
                    (Some(spec.to_string()), None, Some(matched))
                }
                Err(err) => (Some(embedded.to_string()), Some(err.to_string()), Some(false)),
            },
            Err(err) => (None, Some(err.to_string()), Some(false)),
        }
    } else {
        (None, None, None)
    };

    Ok(VerifyReport {
        archive: archive_path.display().to_string(),
        member: executable.to_string(),
        member_present,
        runtime_version,
        stub_version,
        tag_error,
        version_match,
    })
}

/// Installs a stub into every runtime the manifest lists. Stops at the first
/// failure; the report covers the archives updated up to that point.
pub fn apply_manifest(manifest: &Manifest, stub_override: Option<&Path>) -> Result<ApplyReport> {
    let mut updated = Vec::new();

    for entry in manifest.runtimes() {
        let stub = match (stub_override, entry.stub.as_deref()) {
            (Some(path), _) => path.to_path_buf(),
            (None, Some(path)) => PathBuf::from(path),
            (None, None) => {
                return Err(StubError::MissingConfigError {
                    field: "runtime.stub".to_string(),
                })
            }
        };

        let executable = manifest.executable_for(entry);
        let force = entry.force.unwrap_or(false);

        tracing::info!("Installing {} into {}", stub.display(), entry.archive);
        let report = install_stub(Path::new(&entry.archive), &stub, executable, force)?;
        updated.push(report);
    }

    Ok(ApplyReport {
        fixture: manifest.fixture.name.clone(),
        updated,
    })
}
