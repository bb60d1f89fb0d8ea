fn main() {
    // GPU acceleration detection and build guidance
    report_acceleration();

    println!("cargo:rerun-if-changed=build.rs");
}

fn feature_enabled(name: &str) -> bool {
    // Build scripts see features through the environment, not cfg!
    std::env::var_os(format!("CARGO_FEATURE_{}", name.to_uppercase())).is_some()
}

/// Tell the builder which whisper.cpp backend this build uses and
/// suggest a feature flag when a GPU toolchain is found without one
fn report_acceleration() {
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();

    let enabled: Vec<&str> = ["metal", "coreml", "cuda", "vulkan", "hipblas", "openblas"]
        .into_iter()
        .filter(|name| feature_enabled(name))
        .collect();

    if !enabled.is_empty() {
        println!(
            "cargo:warning=whisper-bridge for {}: {} acceleration enabled",
            target_os,
            enabled.join(", ")
        );
        return;
    }

    match target_os.as_str() {
        "macos" => {
            // Metal comes in through the target-specific whisper-rs dependency
            println!("cargo:warning=whisper-bridge for macOS: Metal acceleration enabled");
        }
        "windows" | "linux" => {
            if which::which("nvidia-smi").is_ok() {
                println!("cargo:warning=NVIDIA GPU detected! Consider rebuilding with --features cuda");
            }
            if target_os == "linux" && which::which("rocm-smi").is_ok() {
                println!("cargo:warning=AMD GPU detected! Consider rebuilding with --features hipblas");
            }
        }
        _ => {}
    }
}
