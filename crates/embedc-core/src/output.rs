//! output.rs — Lecture de l’entrée et écriture des artefacts
//!
//! L’émetteur (`emit`) ne touche pas au disque : ce module charge les octets,
//! résout le symbole, puis écrit le texte rendu vers un fichier ou stdout.
//!
//! Usage typique :
//! ```no_run
//! use camino::Utf8Path;
//! use embedc_core::{EmitPlan, EmissionMode, Input};
//!
//! let plan = EmitPlan::load(&Input::from_arg("assets/logo.png"), None, EmissionMode::Binary)?;
//! plan.emit_pair(Utf8Path::new("build/gen"))?; // logo.c puis logo.h
//! # Ok::<(), embedc_core::Error>(())
//! ```
//!
//! Pas d’atomicité entre les deux artefacts : si l’en-tête échoue, le `.c`
//! déjà écrit reste en place.

use std::fs;
use std::io::{self, Read, Write};

use camino::{Utf8Path, Utf8PathBuf};

use crate::emit::{self, EmissionMode, EmitOptions, OutputKind};
use crate::error::{Error, Result};
use crate::symbol::Symbol;

/* ───────────────────────────── Types publics ───────────────────────────── */

/// Source des octets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    Path(Utf8PathBuf),
}

impl Input {
    /// `-` → stdin, sinon un chemin.
    #[must_use]
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" { Self::Stdin } else { Self::Path(Utf8PathBuf::from(arg)) }
    }

    /// Chemin servant à déduire le symbole.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        match self {
            Self::Stdin => Utf8Path::new("-"),
            Self::Path(p) => p,
        }
    }

    /// Nom de la source dans les messages d’erreur (`<stdin>` pour stdin).
    #[must_use]
    pub fn origin(&self) -> Utf8PathBuf {
        match self {
            Self::Stdin => Utf8PathBuf::from("<stdin>"),
            Self::Path(p) => p.clone(),
        }
    }

    /// Lecture intégrale.
    ///
    /// # Errors
    /// `Error::InputNotFound` si la source est illisible.
    pub fn read(&self) -> Result<Vec<u8>> {
        match self {
            Self::Stdin => {
                let mut buf = Vec::new();
                io::stdin()
                    .lock()
                    .read_to_end(&mut buf)
                    .map_err(|source| Error::InputNotFound { path: self.origin(), source })?;
                Ok(buf)
            }
            Self::Path(p) => {
                let bytes = fs::read(p).map_err(|source| Error::InputNotFound { path: p.clone(), source })?;
                log::debug!("lu {} octets depuis {p}", bytes.len());
                Ok(bytes)
            }
        }
    }
}

/// Destination d’un artefact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sink {
    Stdout,
    File(Utf8PathBuf),
}

/// Artefact émis (pour logs/tests).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: OutputKind,
    /// `None` pour stdout.
    pub path: Option<Utf8PathBuf>,
    /// Taille du texte écrit, en octets.
    pub size: usize,
}

/// Tout ce qu’il faut pour produire les artefacts d’une entrée.
#[derive(Debug, Clone)]
pub struct EmitPlan {
    pub symbol: Symbol,
    pub mode: EmissionMode,
    pub options: EmitOptions,
    /// Relit le texte rendu et le compare à l’entrée avant d’écrire.
    pub verify: bool,
    origin: Option<Utf8PathBuf>,
    bytes: Vec<u8>,
}

impl EmitPlan {
    /// Lit l’entrée et résout le symbole (explicite, sinon déduit du nom de fichier).
    ///
    /// # Errors
    /// `Error::NoSymbol` si le symbole ne peut pas être déduit, `Error::InputNotFound` si la lecture échoue.
    pub fn load(input: &Input, symbol: Option<&str>, mode: EmissionMode) -> Result<Self> {
        let symbol = Symbol::resolve(symbol, input.path())?;
        let bytes = input.read()?;
        Ok(Self { origin: Some(input.origin()), ..Self::from_bytes(bytes, symbol, mode) })
    }

    /// Plan en mémoire (pas de fichier d’origine).
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>, symbol: Symbol, mode: EmissionMode) -> Self {
        Self { symbol, mode, options: EmitOptions::default(), verify: false, origin: None, bytes }
    }

    #[must_use]
    pub fn with_options(mut self, options: EmitOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_verify(mut self, yes: bool) -> Self {
        self.verify = yes;
        self
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Rendu d’un artefact (+ vérification si demandée).
    ///
    /// # Errors
    /// Celles de [`emit::render_with`] ; avec `verify`, `Error::Verify` ou `Error::Decode`.
    pub fn render(&self, kind: OutputKind) -> Result<String> {
        let text = emit::render_with(&self.bytes, &self.symbol, self.mode, kind, &self.options)
            .map_err(|e| match &self.origin {
                Some(p) => e.with_origin(p),
                None => e,
            })?;
        if self.verify {
            self.check(kind, &text)?;
        }
        Ok(text)
    }

    /// Rendu + écriture vers `sink`.
    ///
    /// # Errors
    /// Comme [`EmitPlan::render`], plus `Error::OutputWrite` si la destination est inaccessible.
    pub fn write(&self, kind: OutputKind, sink: &Sink) -> Result<Artifact> {
        let text = self.render(kind)?;
        let path = match sink {
            Sink::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(text.as_bytes())
                    .and_then(|()| out.flush())
                    .map_err(|source| Error::OutputWrite { path: Utf8PathBuf::from("<stdout>"), source })?;
                None
            }
            Sink::File(path) => {
                write_text(path, &text)?;
                log::info!("écrit {path} ({} octets)", text.len());
                Some(path.clone())
            }
        };
        Ok(Artifact { kind, path, size: text.len() })
    }

    /// `<dir>/<symbol>.<ext>`
    #[must_use]
    pub fn default_path(&self, dir: &Utf8Path, kind: OutputKind) -> Utf8PathBuf {
        dir.join(format!("{}.{}", self.symbol, kind.extension()))
    }

    /// Écrit `<dir>/<symbol>.c` puis `<dir>/<symbol>.h`.
    ///
    /// # Errors
    /// Première erreur de [`EmitPlan::write`] ; le `.c` peut déjà être écrit.
    pub fn emit_pair(&self, dir: &Utf8Path) -> Result<Vec<Artifact>> {
        [OutputKind::Implementation, OutputKind::Header]
            .into_iter()
            .map(|kind| self.write(kind, &Sink::File(self.default_path(dir, kind))))
            .collect()
    }

    /// Round-trip : le texte rendu redonne-t-il exactement l’entrée ?
    fn check(&self, kind: OutputKind, text: &str) -> Result<()> {
        let fail = |msg: String| Error::Verify { symbol: self.symbol.to_string(), msg };
        match kind {
            OutputKind::Implementation => {
                let def = emit::parse_implementation(text)?;
                if def.symbol != self.symbol.as_str() {
                    return Err(fail(format!("symbole relu `{}`", def.symbol)));
                }
                if def.contents() != self.bytes.as_slice() {
                    return Err(fail(format!(
                        "contenu relu différent ({} octets relus, {} attendus)",
                        def.size,
                        self.bytes.len()
                    )));
                }
            }
            OutputKind::Header => {
                let decl = format!("extern const {} {}[];", self.mode.element_type(), self.symbol);
                let size_decl = format!("extern const {} {};", emit::SIZE_TYPE, self.symbol.size_symbol());
                if !text.contains(&decl) || !text.contains(&size_decl) {
                    return Err(fail("déclarations manquantes dans l’en-tête".into()));
                }
            }
        }
        log::debug!("vérification {kind:?} OK pour `{}`", self.symbol);
        Ok(())
    }
}

/* ───────────────────────────── Helpers locaux ───────────────────────────── */

fn write_text(path: &Utf8Path, s: &str) -> Result<()> {
    let io_err = |source: io::Error| Error::OutputWrite { path: path.to_path_buf(), source };
    if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let mut f = fs::File::create(path).map_err(io_err)?;
    f.write_all(s.as_bytes()).map_err(io_err)?;
    Ok(())
}

/* ───────────────────────────── Tests ───────────────────────────── */
