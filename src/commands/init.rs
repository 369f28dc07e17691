//! Init command handler.

use crate::commands::Out;
use crate::{Config, Result};
use std::path::Path;

/// Handles the `finapp init` command: scaffolds the home directory, writes the default
/// `config.json` and moves the credentials file into the secrets directory.
pub async fn init(home: &Path, credentials: &Path) -> Result<Out<String>> {
    let config = Config::create(home, credentials).await?;
    let root = config.root().display().to_string();
    Ok(Out::new(
        format!(
            "Initialized finapp home at {root}. Edit {} to change the drive folder or sheet names.",
            config.config_path().display()
        ),
        root,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_scaffolds_home() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("finapp");
        let credentials = dir.path().join("creds.json");
        utils::write(&credentials, "{}").await.unwrap();

        let out = init(&home, &credentials).await.unwrap();
        assert!(out.message().contains("Initialized"));
        assert!(home.join("config.json").is_file());
        assert!(home.join(".secrets").join("credentials.json").is_file());

        // the home is loadable afterwards
        Config::load(&home).await.unwrap();
    }
}
