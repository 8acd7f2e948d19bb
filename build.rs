use std::env;
use std::process::Command;

const PREFIX: &str = "W3_INTAKE_BUILD";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs");
    println!("cargo:rerun-if-env-changed={PREFIX}_HASH");

    // Source tarballs have no .git, so packagers can pin the revision.
    let hash = env::var(format!("{PREFIX}_HASH"))
        .ok()
        .filter(|hash| !hash.is_empty())
        .or_else(|| git(&["rev-parse", "--short", "HEAD"]))
        .unwrap_or_else(|| "unknown".into());
    let status = match git(&["status", "--porcelain", "--untracked-files=no"]) {
        Some(changes) if changes.is_empty() => "clean",
        Some(_) => "dirty",
        None => "unknown",
    };
    let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);

    let entries = [
        ("HASH", hash),
        ("STATUS", status.to_string()),
        ("TIMESTAMP", timestamp),
        ("TARGET", cargo_var("TARGET")),
        ("PROFILE", cargo_var("PROFILE")),
    ];
    for (name, value) in entries {
        println!("cargo:rustc-env={PREFIX}_{name}={value}");
    }
}

/// Trimmed stdout of a successful git invocation. `None` when git is missing
/// or the build runs outside a checkout.
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|stdout| stdout.trim().to_string())
}

fn cargo_var(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| "unknown".into())
}
