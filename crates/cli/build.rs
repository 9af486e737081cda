use std::process::Command;

const CURATED: &str = "../recon/data/curated.toml";

fn main() {
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-changed=../../.git/index");
    println!("cargo:rerun-if-changed={CURATED}");

    println!("cargo:rustc-env=ASNSWEEP_BUILD_COMMIT={}", commit());
    println!("cargo:rustc-env=ASNSWEEP_CURATED_UPDATED={}", curated_updated());
    println!(
        "cargo:rustc-env=ASNSWEEP_BUILD_TARGET={}",
        std::env::var("TARGET").unwrap_or_else(|_| "unknown".into())
    );
}

fn git(args: &[&str]) -> Option<String> {
    let out = Command::new("git").args(args).output().ok()?;
    out.status
        .success()
        .then(|| String::from_utf8_lossy(&out.stdout).trim().to_string())
}

/// Short hash, suffixed `-dirty` when the tree has uncommitted changes.
fn commit() -> String {
    let Some(hash) = git(&["rev-parse", "--short=7", "HEAD"]).filter(|h| !h.is_empty()) else {
        return "unknown".into();
    };
    match git(&["status", "--porcelain", "--untracked-files=no"]) {
        Some(changes) if !changes.is_empty() => format!("{hash}-dirty"),
        _ => hash,
    }
}

/// `updated = "..."` from the embedded curated table, so `--version` shows
/// which revision of the table the binary carries.
fn curated_updated() -> String {
    std::fs::read_to_string(CURATED)
        .ok()
        .and_then(|text| {
            text.lines().find_map(|line| {
                let value = line.trim().strip_prefix("updated")?.trim_start().strip_prefix('=')?;
                Some(value.trim().trim_matches('"').to_string())
            })
        })
        .unwrap_or_else(|| "unknown".into())
}
