use std::process::Command;

fn main() {
    let timestamp = chrono::Utc::now().to_rfc3339();
    println!("cargo:rustc-env=NEWSDESK_BUILD_TIMESTAMP={}", timestamp);

    // Left unset outside a git checkout; read with option_env!.
    if let Ok(output) = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
    {
        if output.status.success() {
            if let Ok(hash) = String::from_utf8(output.stdout) {
                println!("cargo:rustc-env=NEWSDESK_GIT_HASH={}", hash.trim());
            }
        }
    }
}
