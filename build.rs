use std::env;

const VERSION_ENV: &str = "PYSTUB_VERSION";

// The stub formats its output into a 256-byte line buffer, newline included.
const MAX_VERSION_LEN: usize = 255;

fn main() {
    println!("cargo:rerun-if-env-changed={VERSION_ENV}");

    let version = match env::var(VERSION_ENV) {
        Ok(raw) => {
            let trimmed = raw.trim().to_string();
            if let Err(reason) = check_version(&trimmed) {
                panic!("{VERSION_ENV}={raw:?} is not usable: {reason}");
            }
            trimmed
        }
        // Without an override the stub impersonates nothing in particular and
        // carries the package version.
        Err(_) => env::var("CARGO_PKG_VERSION")
            .expect("cargo always provides CARGO_PKG_VERSION to build scripts"),
    };

    println!("cargo:rustc-env=PYSTUB_EMBEDDED_VERSION={version}");
}

fn check_version(version: &str) -> Result<(), String> {
    if version.is_empty() {
        return Err("the version is empty".to_string());
    }
    if version.len() > MAX_VERSION_LEN {
        return Err(format!(
            "the version is {} bytes, the stub line buffer holds at most {}",
            version.len(),
            MAX_VERSION_LEN
        ));
    }
    // The version is embedded in the binary behind a scannable tag, which
    // only admits printable ASCII.
    if !version.chars().all(|c| c.is_ascii_graphic()) {
        return Err("the version contains characters outside printable ASCII".to_string());
    }
    Ok(())
}
