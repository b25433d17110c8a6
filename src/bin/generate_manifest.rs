use geodesic_overlay::overlay::default_registry;
use geodesic_overlay::scene::manifest;
use std::env;
use std::path::PathBuf;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    if let Err(err) = run() {
        eprintln!("[manifest] error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let output_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("schemas/component_manifest.json"));

    let registry = default_registry();
    manifest::check_hash_collisions(&registry)?;
    manifest::write_manifest_json(&registry, &output_path)?;
    log::info!(
        "[manifest] wrote {} entries to {}",
        registry.len(),
        output_path.display()
    );
    Ok(())
}
