//! Check system capabilities.

use clipmix_common::config::{config_file_path, AppConfig};
use clipmix_render::engine::command_exists;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("ClipMix System Check");
    println!("{}", "=".repeat(50));

    let binaries = [
        ("ffmpeg", &config.render.ffmpeg),
        ("ffprobe", &config.render.ffprobe),
    ];
    let mut all_ok = true;
    for (role, binary) in binaries {
        if command_exists(binary) {
            println!("[OK] {role}: {binary}");
        } else {
            all_ok = false;
            println!("[MISSING] {role}: {binary} (install ffmpeg or set render.{role} in the config)");
        }
    }

    let config_path = config_file_path();
    if config_path.exists() {
        println!("[OK] Config: {}", config_path.display());
    } else {
        println!(
            "[INFO] Config: {} not found, using defaults (`clipmix config --init` writes it)",
            config_path.display()
        );
    }

    println!();
    if all_ok {
        println!("ffmpeg and ffprobe are available. ClipMix is ready.");
    } else {
        println!("Some required tools are missing. See above for fixes.");
    }

    Ok(())
}
