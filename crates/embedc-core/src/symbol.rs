//! symbol.rs — Identifiant exposé par les fichiers générés
//!
//! Le symbole est pris **tel quel** : d’autres fichiers générés et des règles
//! de build le référencent par sa chaîne exacte. On peut le valider, jamais le
//! réécrire. Seule la garde d’inclusion (un nom de macro dérivé) est encodée.

use std::fmt::{self, Write as _};

use camino::Utf8Path;

use crate::error::{Error, Result};

/// Suffixe fixe du symbole de taille (`foo` → `foo_size`).
pub const SIZE_SUFFIX: &str = "_size";

/// Préfixe des gardes d’inclusion.
const GUARD_PREFIX: &str = "EMBEDC_";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol(String);

impl Symbol {
    /// Symbole explicite, conservé octet pour octet.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Déduit le symbole du nom de base du fichier, sans sa (dernière) extension.
    ///
    /// `dir/file.txt` → `file`, `archive.tar.gz` → `archive.tar`.
    ///
    /// # Errors
    /// `Error::NoSymbol` si le chemin n’a pas de nom de fichier exploitable (`-`, `/`).
    pub fn derive(path: &Utf8Path) -> Result<Self> {
        let stem = path
            .file_stem()
            .filter(|s| !s.is_empty() && *s != "-")
            .ok_or_else(|| Error::NoSymbol(path.to_string()))?;
        log::debug!("symbole déduit de {path}: {stem}");
        Ok(Self(stem.to_owned()))
    }

    /// Symbole explicite s’il est fourni, sinon déduit du chemin.
    ///
    /// # Errors
    /// Comme [`Symbol::derive`] sans symbole explicite.
    pub fn resolve(explicit: Option<&str>, path: &Utf8Path) -> Result<Self> {
        match explicit {
            Some(name) => Ok(Self::new(name)),
            None => Self::derive(path),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Nom du symbole de taille associé.
    #[must_use]
    pub fn size_symbol(&self) -> String {
        format!("{}{SIZE_SUFFIX}", self.0)
    }

    /// Macro de garde d’inclusion : `EMBEDC_<symbole>_H`.
    ///
    /// Casse conservée ; tout octet hors `[A-Za-z0-9]` (y compris `_`) devient
    /// `_XX` en hexadécimal. L’encodage est réversible, donc deux symboles
    /// distincts n’ont jamais la même garde (`a_b` → `EMBEDC_a_5Fb_H`,
    /// `a-b` → `EMBEDC_a_2Db_H`).
    #[must_use]
    pub fn guard(&self) -> String {
        let mut out = String::from(GUARD_PREFIX);
        for b in self.0.bytes() {
            if b.is_ascii_alphanumeric() {
                out.push(char::from(b));
            } else {
                let _ = write!(out, "_{b:02X}");
            }
        }
        out.push_str("_H");
        out
    }

    /// `true` si le symbole est un identifiant C : `[A-Za-z_][A-Za-z0-9_]*`.
    #[must_use]
    pub fn is_c_identifier(&self) -> bool {
        let mut bytes = self.0.bytes();
        match bytes.next() {
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => {}
            _ => return false,
        }
        bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
    }

    /// Valide sans modifier. Erreur `InvalidSymbol` si ce n’est pas un identifiant C.
    ///
    /// # Errors
    /// `Error::InvalidSymbol`.
    pub fn validate(&self) -> Result<()> {
        if self.is_c_identifier() {
            Ok(())
        } else {
            Err(Error::InvalidSymbol(self.0.clone()))
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
