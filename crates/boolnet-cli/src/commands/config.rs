//! Config command implementation.

use anyhow::Result;

use crate::config::Config;

/// Show current configuration.
pub fn show(config: &Config) -> Result<()> {
    println!("Boolean Network CLI Configuration");
    println!("{:-<40}", "");
    println!("Store Directory:     {}", config.store_dir.display());
    println!("Max Entities:        {}", config.max_entities);
    println!("Parallel Scan:       {}", config.parallel);
    println!(
        "Workers:             {}",
        if config.workers == 0 {
            "auto".to_string()
        } else {
            config.workers.to_string()
        }
    );

    if let Some(config_path) = Config::config_file_path() {
        println!("\nConfig file: {}", config_path.display());
    }
    Ok(())
}

/// Show path to config file.
pub fn path() -> Result<()> {
    match Config::config_file_path() {
        Some(path) => println!("{}", path.display()),
        None => anyhow::bail!("No config directory available on this platform"),
    }
    Ok(())
}
