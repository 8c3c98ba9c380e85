//! Build script for the admin crate.
//!
//! Hashes the stylesheet so templates can version its URL.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let css_path = Path::new(&manifest_dir).join("static/css/admin.css");

    println!("cargo:rerun-if-changed={}", css_path.display());

    let hash = fs::read(&css_path).map_or_else(
        |e| {
            println!("cargo:warning=Could not read admin.css: {e}");
            String::new()
        },
        |content| format!("{:x}", Sha256::digest(&content))[..8].to_owned(),
    );

    println!("cargo:rustc-env=CSS_HASH={hash}");
}
