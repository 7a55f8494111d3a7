use anyhow::*;
use fs_extra::copy_items;
use fs_extra::dir::CopyOptions;
use std::env;
use std::path::PathBuf;

// Textures, cubemap faces and OBJ models live in `assets/`. The binary reads
// them from `./assets` at runtime; a copy next to the build output keeps
// packaged builds self-contained.
fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=assets");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let assets = manifest_dir.join("assets");
    if !assets.is_dir() {
        return Ok(());
    }

    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    let options = CopyOptions {
        overwrite: true,
        ..CopyOptions::new()
    };
    copy_items(&[assets], out_dir, &options)
        .context("copying the scene assets into OUT_DIR")?;

    Ok(())
}
