use crate::core::banner::LINE_CAPACITY;
use crate::utils::error::{Result, StubError};

/// Version stamped into this build. `build.rs` always emits the variable, so
/// a build without it does not compile.
pub const STUB_VERSION: &str = env!("PYSTUB_EMBEDDED_VERSION");

// The marker is spelled once, here. concat! only takes literals, so the
// macro prepends it to whatever follows.
macro_rules! tag_magic {
    ($($tail:tt)*) => {
        concat!("pystub-version:", $($tail)*)
    };
}

/// Marker preceding the version payload inside a stub binary image.
pub const TAG_MAGIC: &[u8] = tag_magic!().as_bytes();

/// Marker, version and terminator as one blob. Every binary that prints the
/// version reads it through here, which keeps the tag in the compiled image
/// for `inspect` to find.
pub static VERSION_TAG: &str = tag_magic!(env!("PYSTUB_EMBEDDED_VERSION"), "\0");

/// The version payload of this binary's own tag.
pub fn stamped_version() -> &'static str {
    let payload = &VERSION_TAG[TAG_MAGIC.len()..];
    // concat! appends the terminator, so the scan always finds one.
    match payload.find('\0') {
        Some(end) => &payload[..end],
        None => payload,
    }
}

/// Number of bytes before the first terminator, `None` when the slice holds
/// no terminator. Never reads past the slice.
pub fn nul_terminated_len(bytes: &[u8]) -> Option<usize> {
    bytes.iter().position(|&b| b == 0)
}

/// Extracts the version embedded in a stub binary image. `origin` labels the
/// image in errors (usually its path).
///
/// Marker bytes can occur in an image more than once; the first occurrence
/// followed by a terminated, printable payload wins.
pub fn embedded_version<'a>(image: &'a [u8], origin: &str) -> Result<&'a str> {
    let mut offset = 0;
    let mut malformed: Option<StubError> = None;

    while let Some(pos) = find_magic(&image[offset..]) {
        let payload_start = offset + pos + TAG_MAGIC.len();
        match read_payload(image, payload_start) {
            Ok(version) => return Ok(version),
            Err(reason) => {
                malformed.get_or_insert_with(|| StubError::MalformedTag {
                    path: origin.to_string(),
                    reason,
                });
            }
        }
        offset = payload_start;
    }

    Err(malformed.unwrap_or_else(|| StubError::TagNotFound {
        path: origin.to_string(),
    }))
}

fn find_magic(image: &[u8]) -> Option<usize> {
    if image.len() < TAG_MAGIC.len() {
        return None;
    }
    image.windows(TAG_MAGIC.len()).position(|w| w == TAG_MAGIC)
}

fn read_payload(image: &[u8], start: usize) -> std::result::Result<&str, String> {
    let window_end = (start + LINE_CAPACITY).min(image.len());
    let window = &image[start..window_end];

    let len = nul_terminated_len(window).ok_or_else(|| {
        format!("no terminator within {LINE_CAPACITY} bytes of the marker")
    })?;
    let payload = std::str::from_utf8(&window[..len])
        .map_err(|_| "version bytes are not valid UTF-8".to_string())?;

    if payload.is_empty() {
        return Err("empty version payload".to_string());
    }
    if !payload.bytes().all(|b| b.is_ascii_graphic()) {
        return Err("version payload contains non-printable bytes".to_string());
    }

    Ok(payload)
}
