//! rules.rs — Règles de build pour une cible embarquée
//!
//! À partir d’une requête `{cible, entrée, sorties?, symbole?, texte}` on
//! produit deux étapes de génération (le `.c` puis le `.h`, chacune invoquant
//! `embedc`) et une bibliothèque qui compile le `.c` et expose le répertoire du
//! `.h` en include public.
//!
//! Rendus : CMake (`add_custom_command` + `add_library`) ou JSON.

use std::fmt::Write as _;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::emit::OutputKind;
use crate::error::Result;
use crate::symbol::Symbol;

/// Ce que demande le système de build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRequest {
    /// Nom de la cible (bibliothèque) produite.
    pub target: String,
    pub input: Utf8PathBuf,
    #[serde(default)]
    pub c_output: Option<Utf8PathBuf>,
    #[serde(default)]
    pub h_output: Option<Utf8PathBuf>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub text: bool,
}

/// Une étape « fichier généré ».
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateStep {
    pub kind: OutputKind,
    pub input: Utf8PathBuf,
    pub output: Utf8PathBuf,
    /// Ligne de commande complète (outil en tête).
    pub argv: Vec<String>,
}

/// Unité de compilation qui dépend des deux fichiers générés.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Library {
    pub name: String,
    pub sources: Vec<Utf8PathBuf>,
    pub headers: Vec<Utf8PathBuf>,
    pub public_include_dirs: Vec<Utf8PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildRules {
    pub target: String,
    pub symbol: String,
    pub steps: Vec<GenerateStep>,
    pub library: Library,
}

/// Calcule les règles. Sorties par défaut : `<gen_root>/<cible>/<symbole>.c|.h`.
///
/// # Errors
/// `Error::NoSymbol` si le symbole ne peut pas être déduit de l’entrée.
pub fn plan(req: &RuleRequest, gen_root: &Utf8Path, tool: &str) -> Result<BuildRules> {
    let symbol = Symbol::resolve(req.symbol.as_deref(), &req.input)?;
    let gen_dir = gen_root.join(&req.target);
    let c_out = req
        .c_output
        .clone()
        .unwrap_or_else(|| gen_dir.join(format!("{symbol}.{}", OutputKind::Implementation.extension())));
    let h_out = req
        .h_output
        .clone()
        .unwrap_or_else(|| gen_dir.join(format!("{symbol}.{}", OutputKind::Header.extension())));

    let step = |kind: OutputKind, output: &Utf8Path| {
        let mut argv = vec![
            tool.to_owned(),
            req.input.to_string(),
            "-o".to_owned(),
            output.to_string(),
            "-s".to_owned(),
            symbol.to_string(),
        ];
        if req.text {
            argv.push("--text".to_owned());
        }
        if kind == OutputKind::Header {
            argv.push("--header".to_owned());
        }
        GenerateStep { kind, input: req.input.clone(), output: output.to_path_buf(), argv }
    };

    let include_dir = h_out
        .parent()
        .filter(|p| !p.as_str().is_empty())
        .map_or_else(|| Utf8PathBuf::from("."), Utf8Path::to_path_buf);

    let rules = BuildRules {
        target: req.target.clone(),
        symbol: symbol.to_string(),
        steps: vec![step(OutputKind::Implementation, &c_out), step(OutputKind::Header, &h_out)],
        library: Library {
            name: req.target.clone(),
            sources: vec![c_out.clone()],
            headers: vec![h_out.clone()],
            public_include_dirs: vec![include_dir],
        },
    };
    log::debug!("règles `{}`: {c_out} + {h_out}", req.target);
    Ok(rules)
}

impl BuildRules {
    /// Rendu CMake (toutes les chaînes sont quotées, `VERBATIM`).
    #[must_use]
    pub fn to_cmake(&self) -> String {
        let mut s = String::new();
        let _ = writeln!(s, "# Generated by embedc-rules. Do not edit.");
        for step in &self.steps {
            let file = step.output.file_name().unwrap_or(step.output.as_str());
            let _ = writeln!(s, "add_custom_command(");
            let _ = writeln!(s, "  OUTPUT {}", cmake_quote(step.output.as_str()));
            let _ = write!(s, "  COMMAND");
            for arg in &step.argv {
                let _ = write!(s, " {}", cmake_quote(arg));
            }
            let _ = writeln!(s);
            let _ = writeln!(s, "  DEPENDS {}", cmake_quote(step.input.as_str()));
            let _ = writeln!(s, "  COMMENT {}", cmake_quote(&format!("embedc: {file}")));
            let _ = writeln!(s, "  VERBATIM");
            let _ = writeln!(s, ")");
        }
        let lib = &self.library;
        let _ = write!(s, "add_library({} STATIC", lib.name);
        for f in lib.sources.iter().chain(&lib.headers) {
            let _ = write!(s, " {}", cmake_quote(f.as_str()));
        }
        let _ = writeln!(s, ")");
        let _ = write!(s, "target_include_directories({} PUBLIC", lib.name);
        for d in &lib.public_include_dirs {
            let _ = write!(s, " {}", cmake_quote(d.as_str()));
        }
        let _ = writeln!(s, ")");
        s
    }

    /// Rendu JSON (serde).
    ///
    /// # Errors
    /// Erreur `serde_json` (pas attendue pour ces types).
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty { serde_json::to_string_pretty(self) } else { serde_json::to_string(self) }
    }
}

fn cmake_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' | '\\' | '$' => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
