use super::{default_profile, BindingProfile};
use color_eyre::{eyre::eyre, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const CONFIG_DIR: &str = "vr-bac";
const PROFILE_FILE: &str = "profile.toml";

/// `<config dir>/vr-bac/profile.toml`
pub fn default_profile_path() -> PathBuf {
    let mut path = get_config_dir();
    path.push(CONFIG_DIR);
    path.push(PROFILE_FILE);
    path
}

fn get_config_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(|| {
            warn!("Could not determine config directory, using current directory");
            PathBuf::from(".")
        })
}

pub async fn load_profile(path: &Path) -> Result<BindingProfile> {
    if !tokio::fs::try_exists(path)
        .await
        .map_err(|e| eyre!("Failed to check if profile exists: {}", e))?
    {
        return Err(eyre!("Profile does not exist: {}", path.display()));
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| eyre!("Failed to read profile {}: {}", path.display(), e))?;
    let profile: BindingProfile = toml::from_str(&content)
        .map_err(|e| eyre!("Failed to parse profile {}: {}", path.display(), e))?;

    info!(
        "Loaded profile {} ({} bindings)",
        path.display(),
        profile.bindings.len()
    );
    Ok(profile)
}

pub async fn save_profile(path: &Path, profile: &BindingProfile) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty()
            && !tokio::fs::try_exists(parent)
                .await
                .map_err(|e| eyre!("Failed to check if profile directory exists: {}", e))?
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| eyre!("Failed to create profile directory: {}", e))?;
        }
    }

    let content = toml::to_string_pretty(profile)
        .map_err(|e| eyre!("Failed to serialize profile: {}", e))?;
    tokio::fs::write(path, content)
        .await
        .map_err(|e| eyre!("Failed to write profile {}: {}", path.display(), e))?;

    info!("Profile saved to {}", path.display());
    Ok(())
}

/// Loads the profile at `path`, writing the built-in default first if it is missing
pub async fn ensure_default_profile(path: &Path) -> Result<BindingProfile> {
    if tokio::fs::try_exists(path)
        .await
        .map_err(|e| eyre!("Failed to check if profile exists: {}", e))?
    {
        debug!("Profile found at {}", path.display());
        return load_profile(path).await;
    }

    warn!(
        "No profile at {}, writing the default profile",
        path.display()
    );
    let profile = default_profile();
    save_profile(path, &profile).await?;
    Ok(profile)
}
