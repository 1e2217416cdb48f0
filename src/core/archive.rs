use crate::utils::error::{Result, StubError};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use zip::write::{FileOptions, ZipWriter};

// Replaced executables keep their mode; entries without one still need to be
// runnable once extracted.
const DEFAULT_EXECUTABLE_MODE: u32 = 0o755;

pub fn member_names(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)?;
    let archive = zip::ZipArchive::new(file)?;
    Ok(archive.file_names().map(|n| n.to_string()).collect())
}

pub fn read_member(path: &Path, member: &str) -> Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;

    let mut entry = archive.by_name(member).map_err(|e| match e {
        zip::result::ZipError::FileNotFound => StubError::MemberNotFound {
            archive: path.display().to_string(),
            member: member.to_string(),
        },
        other => StubError::ZipError(other),
    })?;

    let mut data = Vec::new();
    entry.read_to_end(&mut data)?;
    Ok(data)
}

/// Rewrites the archive with `member` replaced by `payload`. Every other
/// entry keeps its name, directory-ness and unix mode; the whole archive is
/// re-deflated. The rewrite lands in a sibling `.tmp` file that is renamed
/// over the original only on success, so a failed run leaves the archive as
/// it was.
pub fn replace_member(path: &Path, member: &str, payload: &[u8]) -> Result<()> {
    let source = File::open(path)?;
    let mut archive = zip::ZipArchive::new(source)?;

    if !archive.file_names().any(|n| n == member) {
        return Err(StubError::MemberNotFound {
            archive: path.display().to_string(),
            member: member.to_string(),
        });
    }

    let tmp_path = sibling_tmp_path(path)?;
    if let Err(err) = rewrite_with_replacement(&mut archive, &tmp_path, member, payload) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err.into());
    }
    Ok(())
}

fn sibling_tmp_path(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| StubError::InvalidConfigValueError {
            field: "archive".to_string(),
            value: path.display().to_string(),
            reason: "Path has no file name".to_string(),
        })?;
    Ok(path.with_file_name(format!("{file_name}.tmp")))
}

fn rewrite_with_replacement(
    archive: &mut zip::ZipArchive<File>,
    tmp_path: &Path,
    member: &str,
    payload: &[u8],
) -> Result<()> {
    let mut writer = ZipWriter::new(File::create(tmp_path)?);

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let name = entry.name().to_string();

        if entry.is_dir() {
            let options = match entry.unix_mode() {
                Some(mode) => FileOptions::default().unix_permissions(mode),
                None => FileOptions::default(),
            };
            writer.add_directory::<_, ()>(name, options)?;
            continue;
        }

        if name == member {
            let mode = entry.unix_mode().unwrap_or(DEFAULT_EXECUTABLE_MODE);
            writer.start_file::<_, ()>(name, FileOptions::default().unix_permissions(mode))?;
            writer.write_all(payload)?;
        } else {
            let mut data = Vec::new();
            entry.read_to_end(&mut data)?;
            let options = match entry.unix_mode() {
                Some(mode) => FileOptions::default().unix_permissions(mode),
                None => FileOptions::default(),
            };
            writer.start_file::<_, ()>(name, options)?;
            writer.write_all(&data)?;
        }
    }

    writer.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_fixture_archive(path: &Path) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());

        zip.add_directory::<_, ()>("lib/", FileOptions::default()).unwrap();
        zip.start_file::<_, ()>(
            "python.exe",
            FileOptions::default().unix_permissions(0o755),
        )
        .unwrap();
        zip.write_all(b"original interpreter").unwrap();
        zip.start_file::<_, ()>("lib/site.py", FileOptions::default().unix_permissions(0o644))
            .unwrap();
        zip.write_all(b"# site module").unwrap();

        zip.finish().unwrap();
    }

    #[test]
    fn test_member_names_lists_all_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cpython-2.7.9+1-rh5_x86_64-gnu.runtime");
        write_fixture_archive(&path);

        let names = member_names(&path).unwrap();
        assert_eq!(names.len(), 3);
        assert!(names.iter().any(|n| n == "python.exe"));
        assert!(names.iter().any(|n| n == "lib/site.py"));
    }

    #[test]
    fn test_read_member_returns_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cpython-2.7.9+1-rh5_x86_64-gnu.runtime");
        write_fixture_archive(&path);

        let data = read_member(&path, "python.exe").unwrap();
        assert_eq!(data, b"original interpreter");

        let err = read_member(&path, "missing.exe").unwrap_err();
        assert!(matches!(err, StubError::MemberNotFound { .. }));
    }

    #[test]
    fn test_replace_member_swaps_payload_and_preserves_the_rest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cpython-2.7.9+1-rh5_x86_64-gnu.runtime");
        write_fixture_archive(&path);

        replace_member(&path, "python.exe", b"replacement stub").unwrap();

        let file = File::open(&path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        assert_eq!(archive.len(), 3);

        {
            let mut entry = archive.by_name("python.exe").unwrap();
            let mut data = Vec::new();
            entry.read_to_end(&mut data).unwrap();
            assert_eq!(data, b"replacement stub");
            assert_eq!(entry.unix_mode().map(|m| m & 0o777), Some(0o755));
        }

        {
            let mut entry = archive.by_name("lib/site.py").unwrap();
            let mut data = Vec::new();
            entry.read_to_end(&mut data).unwrap();
            assert_eq!(data, b"# site module");
        }
    }

    #[test]
    fn test_replace_missing_member_fails_and_leaves_no_tmp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cpython-2.7.9+1-rh5_x86_64-gnu.runtime");
        write_fixture_archive(&path);

        let err = replace_member(&path, "julia.exe", b"stub").unwrap_err();
        assert!(matches!(err, StubError::MemberNotFound { .. }));

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries.len(), 1);

        // Untouched archive still carries the original interpreter.
        let data = read_member(&path, "python.exe").unwrap();
        assert_eq!(data, b"original interpreter");
    }

    #[test]
    fn test_failed_rewrite_removes_the_tmp_file_and_keeps_the_archive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cpython-2.7.9+1-rh5_x86_64-gnu.runtime");

        let mut zip = ZipWriter::new(File::create(&path).unwrap());
        zip.start_file::<_, ()>(
            "python.exe",
            FileOptions::default().unix_permissions(0o755),
        )
        .unwrap();
        zip.write_all(b"original interpreter").unwrap();
        zip.start_file::<_, ()>(
            "lib/site.py",
            FileOptions::default().compression_method(zip::CompressionMethod::Stored),
        )
        .unwrap();
        zip.write_all(b"# site module").unwrap();
        zip.finish().unwrap();

        // Flip one byte of the stored member so copying it during the rewrite
        // fails its checksum.
        let mut bytes = fs::read(&path).unwrap();
        let at = bytes
            .windows(b"# site module".len())
            .position(|w| w == b"# site module")
            .unwrap();
        bytes[at] ^= 0xff;
        fs::write(&path, &bytes).unwrap();

        let before = fs::read(&path).unwrap();
        assert!(replace_member(&path, "python.exe", b"stub").is_err());

        assert_eq!(fs::read(&path).unwrap(), before);
        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries.len(), 1);
    }
}
