//! embedc-core — Cœur de l’émetteur embedc
//!
//! Transforme une séquence d’octets en une paire de fichiers C compilables :
//! une implémentation (`.c`) qui définit le tableau et sa taille, et un
//! en-tête (`.h`) qui ne contient que les déclarations `extern`.
//!
//! ## Modules
//! - `symbol`  : identifiant exposé (`foo`, `foo_size`, garde d’inclusion).
//! - `literal` : encodage des octets en littéraux C (hex / caractères) + relecture.
//! - `emit`    : l’émetteur lui-même (`render`), fonction pure.
//! - `config`  : options d’émission lues depuis `embedc.toml`.
//! - `output`  : lecture de l’entrée, écriture des artefacts (fichier/stdout).
//! - `rules`   : génération de règles de build (CMake / JSON) pour une cible.
//!
//! Usage typique :
//! ```
//! use embedc_core::{render, EmissionMode, OutputKind, Symbol};
//!
//! let sym = Symbol::new("x");
//! let c = render(&[0x00, 0xFF, 0x41], &sym, EmissionMode::Binary, OutputKind::Implementation).unwrap();
//! assert!(c.contains("const size_t x_size = 3;"));
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms, unused_must_use)]

// ---------- Modules publics ----------
pub mod config;
pub mod emit;
pub mod error;
pub mod literal;
pub mod output;
pub mod rules;
pub mod symbol;

// ---------- Reexports de confort ----------
pub use config::{Config, EmitConfig};
pub use emit::{
    parse_implementation, render, render_with, Definition, EmissionMode, EmitOptions, GuardStyle,
    OutputKind,
};
pub use error::{Error, Result};
pub use output::{Artifact, EmitPlan, Input, Sink};
pub use symbol::Symbol;

// ---------- Version ----------
/// Version du crate (lisible, via Cargo).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Renvoie une jolie bannière de version (utile pour logs/outils).
#[must_use]
pub fn version() -> String {
    format!("embedc {VERSION}")
}
