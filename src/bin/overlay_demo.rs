use geodesic_overlay::demo::{Demo, DemoConfig};
use std::env;
use std::path::PathBuf;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    if let Err(err) = run() {
        eprintln!("[demo] error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = match env::args().nth(1).map(PathBuf::from) {
        Some(path) => DemoConfig::load(&path)?,
        None => DemoConfig::default(),
    };

    let mut demo = Demo::build(&config)?;
    demo.run();

    let summary = demo
        .engine()
        .last_summary()
        .ok_or("no frame was rendered")?;
    println!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}
