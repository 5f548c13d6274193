use std::env;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    let version = match git_describe() {
        Some(tag) if tag.ends_with("-dirty") => format!("{}.{}", tag, build_time()),
        Some(tag) => tag,
        None => format!(
            "{}+nogit.{}",
            env::var("CARGO_PKG_VERSION").unwrap_or_default(),
            build_time()
        ),
    };

    println!("cargo:rustc-env=DOWNLOADS_SYNC_VERSION={}", version);
}

/// `v1.4.0-3-gabc123` becomes `1.4.0-3-gabc123`.
fn git_describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()
        .filter(|o| o.status.success())?;

    let described = String::from_utf8(output.stdout).ok()?;
    let described = described.trim();
    let described = described.strip_prefix('v').unwrap_or(described);

    (!described.is_empty()).then(|| described.to_string())
}

fn build_time() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
