use std::path::Path;
use std::process::{Command, Output};

/// Run the CLI binary against an isolated store.
pub fn run_cli_with_store(args: &[&str], store: &Path) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_stacksync"));
    cmd.args(args);
    cmd.env("STACKSYNC_STORE", store);
    cmd.env_remove("STACKSYNC_CONFIG");
    cmd.env_remove("STACKSYNC_API_KEY");
    cmd.env_remove("RUST_LOG");
    cmd.env("NO_COLOR", "1");
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI against an isolated store and expect success.
pub fn run_cli_with_store_success(args: &[&str], store: &Path) -> String {
    let output = run_cli_with_store(args, store);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Write a configuration file pointing at a mock CDN.
pub fn write_config(path: &Path, cdn: &str) {
    let config = serde_json::json!({
        "api_key": "blt123",
        "delivery_token": "cs-token",
        "environment": "production",
        "cdn": cdn,
    });
    std::fs::write(path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
}
