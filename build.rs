use std::env;

use anyhow::Result;
use fs_extra::copy_items;
use fs_extra::dir::CopyOptions;
use glob::glob;

// Stages res/ (the shader sources) into OUT_DIR so the binary can read them
// at runtime regardless of where cargo was invoked from.
fn main() -> Result<()> {
    for entry in glob("res/**/*")? {
        println!("cargo:rerun-if-changed={}", entry?.display());
    }

    let out_dir = env::var("OUT_DIR")?;
    let mut copy_options = CopyOptions::new();
    copy_options.overwrite = true;
    copy_items(&["res/"], out_dir, &copy_options)?;

    Ok(())
}
