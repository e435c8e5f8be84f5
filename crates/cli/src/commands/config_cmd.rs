//! `rustedrag config`: Configuration management commands.

use std::path::{Path, PathBuf};

use rustedrag_config::SolverConfig;

fn resolve(config_path: Option<&Path>) -> PathBuf {
    config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(SolverConfig::config_path)
}

pub async fn show(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;

    let redacted = SolverConfig {
        key: config.key.as_ref().map(|_| "***".to_string()),
        ..config
    };
    let toml_str = toml::to_string_pretty(&redacted)?;
    println!("{toml_str}");

    if redacted.llm_model.is_none() {
        eprintln!("   ⚠️  llm_model not set; the server default model will be used");
    }
    if !redacted.has_api_key() {
        eprintln!("   ⚠️  No API key set (set RUSTEDRAG_API_KEY or OPENAI_API_KEY)");
    }
    Ok(())
}

pub async fn path(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", resolve(config_path).display());
    Ok(())
}

pub async fn init(config_path: Option<&Path>, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = resolve(config_path);
    if path.exists() && !force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )
        .into());
    }

    write_example(&path)?;
    println!("✅ Wrote example config to {}", path.display());
    println!("   Set api_url and vector_store_id before running `rustedrag ask`.");
    Ok(())
}

fn write_example(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, SolverConfig::default_toml())
}
