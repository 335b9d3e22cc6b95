//! Build-time hints for locating FFmpeg on Windows.
//!
//! `ffmpeg-sys-next` does the actual discovery. This script only emits
//! warnings that point at the usual vcpkg setup when discovery is likely
//! to fail.

use std::env;
use std::path::{Path, PathBuf};

const WATCHED_VARIABLES: [&str; 4] = ["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_DYNAMIC", "VCPKGRS_TRIPLET"];
const DEFAULT_TRIPLET: &str = "x64-windows";

fn warn(message: impl AsRef<str>) {
    println!("cargo:warning={}", message.as_ref());
}

fn vcpkg_install_dir(root: &str) -> PathBuf {
    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| DEFAULT_TRIPLET.to_string());
    Path::new(root).join("installed").join(triplet)
}

fn main() {
    for variable in WATCHED_VARIABLES {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    let targets_windows = env::var("CARGO_CFG_TARGET_OS").is_ok_and(|os| os == "windows");
    if !targets_windows || env::var_os("FFMPEG_DIR").is_some() {
        return;
    }

    let Ok(vcpkg_root) = env::var("VCPKG_ROOT") else {
        warn("frameforge needs FFmpeg. Install it with vcpkg and set FFMPEG_DIR (or VCPKG_ROOT).");
        return;
    };

    let install_dir = vcpkg_install_dir(&vcpkg_root);
    if !install_dir.exists() {
        warn(format!("No vcpkg FFmpeg install under {}.", install_dir.display()));
        return;
    }

    warn(format!(
        "Using vcpkg FFmpeg at {0}; set FFMPEG_DIR={0} to silence this warning.",
        install_dir.display()
    ));
    if env::var_os("VCPKGRS_DYNAMIC").is_none() {
        warn("Set VCPKGRS_DYNAMIC=1 if your vcpkg FFmpeg is a dynamic build.");
    }
}
