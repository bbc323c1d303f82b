use std::io;
use std::path::{Path, PathBuf};

/// Path of a file staged by the build script. `build.rs` copies `res/` into
/// OUT_DIR, so resolving against that finds the files no matter which
/// directory the binary is launched from.
pub fn staged_path(file_name: &str) -> PathBuf {
    Path::new(env!("OUT_DIR")).join("res").join(file_name)
}

pub fn load_text(file_name: &str) -> io::Result<String> {
    std::fs::read_to_string(staged_path(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_shader_sources_are_staged() {
        for file in ["pyramid.vert.wgsl", "pyramid.frag.wgsl"] {
            let source = load_text(file).unwrap();
            assert!(!source.is_empty(), "{file} staged but empty");
        }
    }

    #[test]
    fn missing_files_surface_an_io_error() {
        assert!(load_text("no-such-shader.wgsl").is_err());
    }
}
