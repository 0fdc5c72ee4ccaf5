//! Global configuration loaded from `~/.config/sonata/config.toml`.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Audio quality requested from the catalog for each track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Low,
    Standard,
    High,
    Lossless,
}

impl Default for Quality {
    fn default() -> Self {
        Quality::Standard
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LyricsConfig {
    pub enabled: bool,
    pub save_synced_file: bool,
}

impl Default for LyricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            save_synced_file: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 5,
        }
    }
}

/// Global configuration for the download orchestration core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SonataConfig {
    /// Number of concurrent downloads handled by the worker pool.
    pub concurrent_downloads: usize,
    /// Capacity of the worker pool's submission channel.
    pub submission_channel_capacity: usize,
    /// Default quality requested from the catalog.
    pub quality: Quality,
    /// Root directory downloads are written under.
    pub output_dir: PathBuf,
    pub embed_artwork: bool,
    pub artwork_size: u32,
    pub create_cd_folder: bool,
    pub cd_folder_template: String,
    pub create_playlist_folder: bool,
    pub playlist_folder_template: String,
    pub playlist_track_template: String,
    pub lyrics: LyricsConfig,
    pub network: NetworkConfig,
}

impl Default for SonataConfig {
    fn default() -> Self {
        Self {
            concurrent_downloads: 4,
            submission_channel_capacity: 10_000,
            quality: Quality::default(),
            output_dir: PathBuf::from("downloads"),
            embed_artwork: true,
            artwork_size: 1200,
            create_cd_folder: true,
            cd_folder_template: "CD {disc_number}".to_string(),
            create_playlist_folder: true,
            playlist_folder_template: "{playlist}".to_string(),
            playlist_track_template: "{playlist_position:02d} - {artist} - {title}".to_string(),
            lyrics: LyricsConfig::default(),
            network: NetworkConfig::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("sonata")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Path to the Unix control socket a `sonata run` daemon listens on and a
/// `sonata pause`/`resume`/`cancel`/`stop-all` invocation connects to, so a
/// live worker's in-flight job can be cancelled from a separate process
/// invocation (not just have its durable row flipped).
pub fn control_socket_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("sonata")?;
    Ok(xdg_dirs.get_state_home().join("control.sock"))
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SonataConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SonataConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: SonataConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = SonataConfig::default();
        assert_eq!(cfg.concurrent_downloads, 4);
        assert_eq!(cfg.quality, Quality::Standard);
        assert!(cfg.lyrics.enabled);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = SonataConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: SonataConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.concurrent_downloads, cfg.concurrent_downloads);
        assert_eq!(parsed.output_dir, cfg.output_dir);
    }

    #[test]
    fn config_toml_partial_override_uses_defaults() {
        let toml = r#"
            concurrent_downloads = 8
            quality = "lossless"
        "#;
        let cfg: SonataConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.concurrent_downloads, 8);
        assert_eq!(cfg.quality, Quality::Lossless);
        // untouched fields fall back to Default via #[serde(default)]
        assert!(cfg.create_cd_folder);
    }
}
