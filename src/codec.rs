//! Availability probe for the native mesh-compression codec.
//!
//! Compression is performed by a separately-shipped shared library; the
//! exporter only needs to know up front whether it can offer the option.
//! Nothing here loads the library.

use std::env;
use std::path::{Path, PathBuf};

/// Overrides the directory the codec library is searched in.
pub const LIBRARY_PATH_ENV: &str = "EXTERN_DRACO_LIBRARY_PATH";

const LIBRARY_STEM: &str = "extern_draco";

/// Platform file name of the codec shared library.
pub fn codec_library_name() -> String {
    if cfg!(target_os = "windows") {
        format!("{LIBRARY_STEM}.dll")
    } else if cfg!(target_os = "macos") {
        format!("lib{LIBRARY_STEM}.dylib")
    } else {
        format!("lib{LIBRARY_STEM}.so")
    }
}

fn library_path_in(dir: &Path) -> PathBuf {
    dir.join(codec_library_name())
}

/// Full path the codec library is expected at: the `LIBRARY_PATH_ENV`
/// directory when set, otherwise next to the running executable.
pub fn codec_library_path() -> PathBuf {
    let dir = env::var_os(LIBRARY_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(default_search_dir);
    library_path_in(&dir)
}

fn default_search_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Whether the codec library is present. Reports the outcome on stderr
/// unless `quiet` is set.
pub fn codec_available(quiet: bool) -> bool {
    let path = codec_library_path();
    let exists = path.is_file();
    if !quiet {
        if exists {
            eprintln!(
                "[codec] mesh compression is available, library found at {}",
                path.display()
            );
        } else {
            eprintln!(
                "[codec] mesh compression is not available, library not found at {}",
                path.display()
            );
        }
    }
    exists
}
