//! error.rs — Erreurs de l’émetteur embedc
//!
//! Une seule énumération pour tout le crate. Toutes les erreurs sont
//! terminales pour l’invocation : pas de reprise, pas de sortie partielle.

use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Fichier d’entrée introuvable / illisible.
    #[error("entrée introuvable: {path}")]
    InputNotFound {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    /// Mode texte demandé mais les octets ne sont pas de l’UTF-8 valide.
    #[error("{}: UTF-8 invalide (octet {valid_up_to}), mode texte impossible", display_origin(.origin.as_ref()))]
    Encoding {
        origin: Option<Utf8PathBuf>,
        valid_up_to: usize,
    },

    /// Destination impossible à créer / écrire.
    #[error("écriture impossible: {path}")]
    OutputWrite {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    /// Symbole qui n’est pas un identifiant C (seulement en mode strict).
    #[error("symbole invalide `{0}` (attendu: [A-Za-z_][A-Za-z0-9_]*)")]
    InvalidSymbol(String),

    /// Impossible de déduire un symbole (stdin, chemin sans nom de fichier).
    #[error("impossible de déduire un symbole depuis `{0}`, précise --symbol")]
    NoSymbol(String),

    /// Fichier de configuration invalide.
    #[error("config {path}: {msg}")]
    Config { path: Utf8PathBuf, msg: String },

    /// Séquence de littéraux illisible (relecture / vérification).
    #[error("littéral invalide à l’offset {offset}: {msg}")]
    Decode { offset: usize, msg: String },

    /// Le round-trip rendu → relecture ne redonne pas l’entrée.
    #[error("vérification échouée pour `{symbol}`: {msg}")]
    Verify { symbol: String, msg: String },
}

impl Error {
    /// Attache un chemin d’origine à une erreur d’encodage (sinon inchangée).
    #[must_use]
    pub fn with_origin(self, path: &camino::Utf8Path) -> Self {
        match self {
            Self::Encoding { origin: None, valid_up_to } => Self::Encoding {
                origin: Some(path.to_path_buf()),
                valid_up_to,
            },
            other => other,
        }
    }
}

fn display_origin(origin: Option<&Utf8PathBuf>) -> &str {
    origin.map_or("<mémoire>", |p| p.as_str())
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
