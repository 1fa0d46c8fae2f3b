use std::path::PathBuf;

use directories::ProjectDirs;
use figment::{
    providers::{
        Env,
        Format,
        Serialized,
        Toml,
    },
    Figment,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::types::Result;


/// Defaults shared by every command, overridable from a TOML file under the
/// user configuration directory and from `RSPOST_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Raw data store read when a command gets no explicit file name.
    pub vaspout: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            vaspout: PathBuf::from("./vaspout.h5"),
        }
    }
}

impl Settings {
    pub fn config_file() -> Option<PathBuf> {
        ProjectDirs::from("", "", "rspost")
            .map(|dirs| dirs.config_dir().join("settings.toml"))
    }

    /// Defaults, then the configuration file if present, then the
    /// environment.
    pub fn load() -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(config) = Self::config_file() {
            if config.is_file() {
                figment = figment.merge(Toml::file(&config));
            }
        }
        let settings = figment
            .merge(Env::prefixed("RSPOST_"))
            .extract()?;
        Ok(settings)
    }

    /// TOML template with the default values, ready to be saved as a
    /// configuration file.
    pub fn template() -> Result<String> {
        let body = toml::to_string_pretty(&Self::default())?;
        Ok(format!("# rspost configuration\n{}", body))
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_template() {
        let template = Settings::template().unwrap();
        assert!(template.starts_with("# rspost configuration"));
        assert!(template.contains("vaspout"));
    }

    #[test]
    fn test_template_parses_back() {
        let template = Settings::template().unwrap();
        let parsed: Settings = toml::from_str(&template).unwrap();
        assert_eq!(parsed.vaspout, Settings::default().vaspout);
    }
}
