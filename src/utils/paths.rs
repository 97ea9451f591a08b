use anyhow::{Result, anyhow};
use std::fs;
use std::path::PathBuf;

pub fn get_clipdeck_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
    Ok(home.join(".clipdeck"))
}

pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_clipdeck_dir()?.join("config.toml"))
}

pub fn get_database_path() -> Result<PathBuf> {
    Ok(get_clipdeck_dir()?.join("clipdeck.db"))
}

pub fn get_log_path() -> Result<PathBuf> {
    Ok(get_clipdeck_dir()?.join("clipdeck.log"))
}

pub fn ensure_directories_exist() -> Result<()> {
    let dir = get_clipdeck_dir()?;

    if !dir.exists() {
        fs::create_dir_all(&dir)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_clipdeck_dir() {
        let dir = get_clipdeck_dir().unwrap();
        assert!(dir.to_string_lossy().ends_with(".clipdeck"));
    }

    #[test]
    fn test_files_live_in_clipdeck_dir() {
        let dir = get_clipdeck_dir().unwrap();
        assert_eq!(get_config_path().unwrap(), dir.join("config.toml"));
        assert_eq!(get_database_path().unwrap(), dir.join("clipdeck.db"));
        assert_eq!(get_log_path().unwrap(), dir.join("clipdeck.log"));
    }
}
