use pystub::core::{archive, ops, tag};
use pystub::StubError;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;
use zip::write::FileOptions;
use zip::ZipWriter;

fn write_runtime_archive(path: &Path, executable: &str) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());

    zip.add_directory::<_, ()>("lib/", FileOptions::default())
        .unwrap();
    zip.start_file::<_, ()>(executable, FileOptions::default().unix_permissions(0o755))
        .unwrap();
    zip.write_all(b"original interpreter").unwrap();
    zip.start_file::<_, ()>("lib/site.py", FileOptions::default().unix_permissions(0o644))
        .unwrap();
    zip.write_all(b"# site module").unwrap();

    zip.finish().unwrap();
}

fn fake_stub(version: &str) -> Vec<u8> {
    let mut image = b"\x7fELF fake header ".to_vec();
    image.extend_from_slice(tag::TAG_MAGIC);
    image.extend_from_slice(version.as_bytes());
    image.push(0);
    image.extend_from_slice(b" trailing section data");
    image
}

#[test]
fn test_install_and_verify_matching_stub() {
    let temp_dir = TempDir::new().unwrap();
    let archive_path = temp_dir
        .path()
        .join("cpython-2.7.9+1-rh5_x86_64-gnu.runtime");
    write_runtime_archive(&archive_path, "python.exe");

    let stub_path = temp_dir.path().join("dummy-python");
    std::fs::write(&stub_path, fake_stub("2.7.9+1")).unwrap();

    let report = ops::install_stub(&archive_path, &stub_path, "python.exe", false).unwrap();
    assert_eq!(report.stub_version.as_deref(), Some("2.7.9+1"));
    assert_eq!(report.runtime_version.as_deref(), Some("2.7.9+1"));
    assert!(!report.forced);

    // The member carries the stub now, the rest of the archive survived
    let installed = archive::read_member(&archive_path, "python.exe").unwrap();
    assert_eq!(installed, fake_stub("2.7.9+1"));
    let names = archive::member_names(&archive_path).unwrap();
    assert!(names.contains(&"lib/site.py".to_string()));

    let verify = ops::verify_runtime(&archive_path, "python.exe").unwrap();
    assert!(verify.passed());
    assert_eq!(verify.stub_version.as_deref(), Some("2.7.9+1"));
    assert_eq!(verify.version_match, Some(true));
}

#[test]
fn test_stub_without_build_number_matches() {
    let temp_dir = TempDir::new().unwrap();
    let archive_path = temp_dir
        .path()
        .join("cpython-2.7.9+1-rh5_x86_64-gnu.runtime");
    write_runtime_archive(&archive_path, "python.exe");

    let stub_path = temp_dir.path().join("dummy-python");
    std::fs::write(&stub_path, fake_stub("2.7.9")).unwrap();

    let report = ops::install_stub(&archive_path, &stub_path, "python.exe", false).unwrap();
    assert_eq!(report.stub_version.as_deref(), Some("2.7.9"));

    let verify = ops::verify_runtime(&archive_path, "python.exe").unwrap();
    assert!(verify.passed());
}

#[test]
fn test_version_mismatch_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let archive_path = temp_dir
        .path()
        .join("cpython-2.7.9+1-rh5_x86_64-gnu.runtime");
    write_runtime_archive(&archive_path, "python.exe");

    let stub_path = temp_dir.path().join("dummy-python");
    std::fs::write(&stub_path, fake_stub("3.4.1")).unwrap();

    let err = ops::install_stub(&archive_path, &stub_path, "python.exe", false).unwrap_err();
    assert!(matches!(err, StubError::VersionMismatch { .. }));

    // Archive is untouched
    let member = archive::read_member(&archive_path, "python.exe").unwrap();
    assert_eq!(member, b"original interpreter");
}

#[test]
fn test_force_skips_version_check() {
    let temp_dir = TempDir::new().unwrap();
    let archive_path = temp_dir
        .path()
        .join("cpython-2.7.9+1-rh5_x86_64-gnu.runtime");
    write_runtime_archive(&archive_path, "python.exe");

    let stub_path = temp_dir.path().join("dummy-python");
    std::fs::write(&stub_path, fake_stub("3.4.1")).unwrap();

    let report = ops::install_stub(&archive_path, &stub_path, "python.exe", true).unwrap();
    assert!(report.forced);
    assert_eq!(report.stub_version, None);

    // Verification still catches the mismatch afterwards
    let verify = ops::verify_runtime(&archive_path, "python.exe").unwrap();
    assert!(!verify.passed());
    assert_eq!(verify.version_match, Some(false));
    assert_eq!(verify.stub_version.as_deref(), Some("3.4.1"));
}

#[test]
fn test_verify_reports_missing_member() {
    let temp_dir = TempDir::new().unwrap();
    let archive_path = temp_dir
        .path()
        .join("cpython-2.7.9+1-rh5_x86_64-gnu.runtime");
    write_runtime_archive(&archive_path, "python.exe");

    let verify = ops::verify_runtime(&archive_path, "pythonw.exe").unwrap();
    assert!(!verify.member_present);
    assert!(!verify.passed());
    assert_eq!(verify.stub_version, None);
    assert_eq!(verify.version_match, None);
}

#[test]
fn test_verify_reports_untagged_member() {
    let temp_dir = TempDir::new().unwrap();
    let archive_path = temp_dir
        .path()
        .join("cpython-2.7.9+1-rh5_x86_64-gnu.runtime");
    write_runtime_archive(&archive_path, "python.exe");

    // The original interpreter payload carries no version tag
    let verify = ops::verify_runtime(&archive_path, "python.exe").unwrap();
    assert!(verify.member_present);
    assert!(verify.tag_error.is_some());
    assert_eq!(verify.version_match, Some(false));
    assert!(!verify.passed());
}

#[test]
fn test_install_missing_member_leaves_archive_alone() {
    let temp_dir = TempDir::new().unwrap();
    let archive_path = temp_dir
        .path()
        .join("cpython-2.7.9+1-rh5_x86_64-gnu.runtime");
    write_runtime_archive(&archive_path, "python.exe");

    let stub_path = temp_dir.path().join("dummy-python");
    std::fs::write(&stub_path, fake_stub("2.7.9+1")).unwrap();

    let err = ops::install_stub(&archive_path, &stub_path, "pythonw.exe", false).unwrap_err();
    assert!(matches!(err, StubError::MemberNotFound { .. }));

    // No temp file left behind next to the archive
    let leftovers: Vec<String> = std::fs::read_dir(temp_dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());

    let member = archive::read_member(&archive_path, "python.exe").unwrap();
    assert_eq!(member, b"original interpreter");
}

#[test]
fn test_unparseable_archive_name_is_rejected_without_force() {
    let temp_dir = TempDir::new().unwrap();
    let archive_path = temp_dir.path().join("notaruntime.runtime");
    write_runtime_archive(&archive_path, "python.exe");

    let stub_path = temp_dir.path().join("dummy-python");
    std::fs::write(&stub_path, fake_stub("2.7.9+1")).unwrap();

    let err = ops::install_stub(&archive_path, &stub_path, "python.exe", false).unwrap_err();
    assert!(matches!(err, StubError::InvalidRuntimeName { .. }));

    // Force bypasses the name parse entirely
    let report = ops::install_stub(&archive_path, &stub_path, "python.exe", true).unwrap();
    assert!(report.forced);
}

#[test]
fn test_inspect_stub_reads_tag() {
    let temp_dir = TempDir::new().unwrap();
    let stub_path = temp_dir.path().join("dummy-python");
    std::fs::write(&stub_path, fake_stub("3.4.1+2")).unwrap();

    let report = ops::inspect_stub(&stub_path).unwrap();
    assert_eq!(report.version, "3.4.1+2");
    assert_eq!(report.numpart, "3.4.1");
    assert_eq!(report.build, Some(2));
}

#[test]
fn test_inspect_untagged_image_fails() {
    let temp_dir = TempDir::new().unwrap();
    let stub_path = temp_dir.path().join("not-a-stub");
    std::fs::write(&stub_path, b"no marker in here").unwrap();

    let err = ops::inspect_stub(&stub_path).unwrap_err();
    assert!(matches!(err, StubError::TagNotFound { .. }));
}
