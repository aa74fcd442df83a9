use std::process::Command;

use chrono::Local;

fn main() {
    let head = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output();
    let revision = match head {
        Ok(out) if out.status.success() => String::from_utf8_lossy(&out.stdout).trim().to_string(),
        _ => "unknown".to_string(),
    };

    // `git diff --quiet` exits non-zero when tracked files differ from HEAD
    let modified = Command::new("git")
        .args(["diff", "--quiet", "HEAD"])
        .status()
        .map(|status| !status.success())
        .unwrap_or(false);

    let build_hash = if modified {
        format!("{revision}-dirty-{}", Local::now().format("%Y%m%d-%H%M%S"))
    } else {
        revision
    };
    println!("cargo:rustc-env=BUILD_HASH={build_hash}");

    // The workspace .git sits two levels above this crate
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-changed=../../.git/index");
}
