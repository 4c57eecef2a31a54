//! config.rs — Configuration `embedc.toml`
//!
//! ```toml
//! [emit]
//! per_line = 16          # éléments par ligne
//! guard = "ifndef"       # ou "pragma-once"
//! ```
//!
//! Tout est optionnel ; les clés inconnues sont refusées.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::emit::EmitOptions;
use crate::error::{Error, Result};

/// Options de la section `[emit]`.
pub type EmitConfig = EmitOptions;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub emit: EmitConfig,
}

impl Config {
    /// Nom du fichier cherché dans le répertoire courant.
    pub const FILE_NAME: &'static str = "embedc.toml";

    /// Parse + valide. `path` ne sert qu’aux messages d’erreur.
    ///
    /// # Errors
    /// `Error::Config` si le TOML est invalide ou si une option est hors bornes.
    pub fn from_toml_str(src: &str, path: &Utf8Path) -> Result<Self> {
        let cfg: Self = toml::from_str(src).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            msg: e.message().to_owned(),
        })?;
        cfg.validate(path)?;
        Ok(cfg)
    }

    /// Charge un fichier explicite (absent = erreur).
    ///
    /// # Errors
    /// `Error::Config` si le fichier est illisible ou invalide.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let src = fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            msg: format!("lecture: {e}"),
        })?;
        let cfg = Self::from_toml_str(&src, path)?;
        log::debug!("config chargée depuis {path}: {cfg:?}");
        Ok(cfg)
    }

    /// Cherche `embedc.toml` dans `dir` ; `None` s’il n’existe pas.
    ///
    /// # Errors
    /// Comme [`Config::load`] quand le fichier existe.
    pub fn discover(dir: &Utf8Path) -> Result<Option<Self>> {
        let candidate: Utf8PathBuf = dir.join(Self::FILE_NAME);
        if candidate.is_file() {
            Self::load(&candidate).map(Some)
        } else {
            Ok(None)
        }
    }

    fn validate(&self, path: &Utf8Path) -> Result<()> {
        if self.emit.per_line == 0 {
            return Err(Error::Config {
                path: path.to_path_buf(),
                msg: "emit.per_line doit être >= 1".into(),
            });
        }
        Ok(())
    }
}
