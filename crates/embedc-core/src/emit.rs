//! emit.rs — L’émetteur : (octets, symbole, mode, sortie) → texte C
//!
//! `render` est une fonction **pure** : mêmes entrées → même texte, octet pour
//! octet. Pas d’horodatage, pas de chemin, rien qui dépende de l’environnement.
//!
//! Forme des artefacts pour `symbol = "x"` en mode binaire :
//!
//! ```c
//! /* x.c */                              /* x.h */
//! const unsigned char x[] = { ... };     extern const unsigned char x[];
//! const size_t x_size = 3;               extern const size_t x_size;
//! ```
//!
//! L’en-tête est protégé (garde d’inclusion + `extern "C"`) et ne contient
//! aucune donnée : il peut être inclus par plusieurs unités de compilation.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::literal;
use crate::symbol::Symbol;

/// Bannière en tête de chaque fichier généré.
pub const BANNER: &str = "/* Generated by embedc. Do not edit. */";

/// Type C de la taille.
pub const SIZE_TYPE: &str = "size_t";

/// Éléments par ligne par défaut.
pub const DEFAULT_PER_LINE: usize = 16;

/* ───────────────────────────── Types publics ───────────────────────────── */

/// Binaire (octets opaques) ou texte (UTF-8 valide, terminé par `'\0'`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmissionMode {
    #[default]
    Binary,
    Text,
}

impl EmissionMode {
    /// Type C d’un élément du tableau.
    #[must_use]
    pub const fn element_type(self) -> &'static str {
        match self {
            Self::Binary => "unsigned char",
            Self::Text => "char",
        }
    }

    #[must_use]
    pub const fn from_text_flag(text: bool) -> Self {
        if text { Self::Text } else { Self::Binary }
    }
}

/// Implémentation (définitions + données) ou en-tête (déclarations seules).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    #[default]
    Implementation,
    Header,
}

impl OutputKind {
    /// Extension de fichier conventionnelle.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Implementation => "c",
            Self::Header => "h",
        }
    }
}

/// Style de protection contre l’inclusion multiple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GuardStyle {
    /// `#ifndef EMBEDC_x_H` / `#define` / `#endif`
    #[default]
    Ifndef,
    /// `#pragma once`
    PragmaOnce,
}

/// Options de mise en forme (section `[emit]` de `embedc.toml`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmitOptions {
    /// Nombre d’éléments par ligne (>= 1).
    pub per_line: usize,
    pub guard: GuardStyle,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self { per_line: DEFAULT_PER_LINE, guard: GuardStyle::Ifndef }
    }
}

/* ───────────────────────────── Rendu ───────────────────────────── */

/// Rendu avec les options par défaut.
///
/// # Errors
/// `Error::Encoding` en mode texte si `bytes` n’est pas de l’UTF-8 valide.
pub fn render(bytes: &[u8], symbol: &Symbol, mode: EmissionMode, kind: OutputKind) -> Result<String> {
    render_with(bytes, symbol, mode, kind, &EmitOptions::default())
}

/// Rendu configurable.
///
/// En mode texte, l’entrée doit être de l’UTF-8 valide, sinon `Error::Encoding`
/// et aucun texte n’est produit (y compris pour l’en-tête).
///
/// # Errors
/// `Error::Encoding`, voir ci-dessus.
pub fn render_with(
    bytes: &[u8],
    symbol: &Symbol,
    mode: EmissionMode,
    kind: OutputKind,
    opts: &EmitOptions,
) -> Result<String> {
    if mode == EmissionMode::Text {
        if let Err(e) = std::str::from_utf8(bytes) {
            return Err(Error::Encoding { origin: None, valid_up_to: e.valid_up_to() });
        }
    }
    log::debug!("rendu {kind:?}/{mode:?} de `{symbol}` ({} octets)", bytes.len());
    Ok(match kind {
        OutputKind::Implementation => render_implementation(bytes, symbol, mode, opts),
        OutputKind::Header => render_header(symbol, mode, opts),
    })
}

fn render_implementation(bytes: &[u8], symbol: &Symbol, mode: EmissionMode, opts: &EmitOptions) -> String {
    let data = match mode {
        EmissionMode::Binary => literal::encode_binary(bytes, opts.per_line),
        EmissionMode::Text => literal::encode_text(bytes, opts.per_line),
    };
    let mut s = String::with_capacity(data.len() + 128);
    let _ = writeln!(s, "{BANNER}");
    let _ = writeln!(s, "#include <stddef.h>");
    let _ = writeln!(s);
    let _ = writeln!(s, "const {} {symbol}[] = {data};", mode.element_type());
    let _ = writeln!(s, "const {SIZE_TYPE} {} = {};", symbol.size_symbol(), bytes.len());
    s
}

fn render_header(symbol: &Symbol, mode: EmissionMode, opts: &EmitOptions) -> String {
    let guard = symbol.guard();
    let mut s = String::new();
    let _ = writeln!(s, "{BANNER}");
    match opts.guard {
        GuardStyle::Ifndef => {
            let _ = writeln!(s, "#ifndef {guard}");
            let _ = writeln!(s, "#define {guard}");
        }
        GuardStyle::PragmaOnce => {
            let _ = writeln!(s, "#pragma once");
        }
    }
    let _ = writeln!(s);
    let _ = writeln!(s, "#include <stddef.h>");
    let _ = writeln!(s);
    let _ = writeln!(s, "#ifdef __cplusplus");
    let _ = writeln!(s, "extern \"C\" {{");
    let _ = writeln!(s, "#endif");
    let _ = writeln!(s);
    let _ = writeln!(s, "extern const {} {symbol}[];", mode.element_type());
    let _ = writeln!(s, "extern const {SIZE_TYPE} {};", symbol.size_symbol());
    let _ = writeln!(s);
    let _ = writeln!(s, "#ifdef __cplusplus");
    let _ = writeln!(s, "}}");
    let _ = writeln!(s, "#endif");
    if opts.guard == GuardStyle::Ifndef {
        let _ = writeln!(s);
        let _ = writeln!(s, "#endif /* {guard} */");
    }
    s
}

/* ───────────────────────────── Relecture ───────────────────────────── */

/// Définition relue depuis un fichier d’implémentation généré.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub symbol: String,
    pub element_type: String,
    /// Tous les éléments du tableau (terminateur / remplissage compris).
    pub elements: Vec<u8>,
    /// Valeur de `<symbol>_size`.
    pub size: usize,
}

impl Definition {
    /// Ce que voit un consommateur C à travers `x` / `x_size`.
    #[must_use]
    pub fn contents(&self) -> &[u8] {
        &self.elements[..self.size]
    }

    #[must_use]
    pub fn mode(&self) -> EmissionMode {
        if self.element_type == EmissionMode::Text.element_type() {
            EmissionMode::Text
        } else {
            EmissionMode::Binary
        }
    }
}

/// Relit un fichier d’implémentation produit par `render`.
///
/// # Errors
/// `Error::Decode` si le texte n’a pas la forme produite par `render`.
pub fn parse_implementation(src: &str) -> Result<Definition> {
    let decl_err = |offset: usize, msg: &str| Error::Decode { offset, msg: msg.into() };

    let open = src.find("[] =").ok_or_else(|| decl_err(0, "définition de tableau introuvable"))?;
    let line_start = src[..open].rfind('\n').map_or(0, |i| i + 1);
    let declarator = src[line_start..open]
        .trim()
        .strip_prefix("const ")
        .ok_or_else(|| decl_err(line_start, "`const` attendu"))?;
    let (element_type, symbol) = declarator
        .rsplit_once(' ')
        .ok_or_else(|| decl_err(line_start, "type ou symbole manquant"))?;

    let (elements, after) = literal::decode_list(src, open + "[] =".len())?;

    let rest = &src[after..];
    let size_decl = format!("const {SIZE_TYPE} {symbol}{} =", crate::symbol::SIZE_SUFFIX);
    let at = rest
        .find(&size_decl)
        .ok_or_else(|| decl_err(after, "définition de la taille introuvable"))?;
    let value_start = after + at + size_decl.len();
    let value_end = src[value_start..]
        .find(';')
        .map(|i| value_start + i)
        .ok_or_else(|| decl_err(value_start, "`;` attendu après la taille"))?;
    let size: usize = src[value_start..value_end]
        .trim()
        .parse()
        .map_err(|_| decl_err(value_start, "taille non numérique"))?;
    if size > elements.len() {
        return Err(decl_err(value_start, "taille supérieure au nombre d’éléments"));
    }

    Ok(Definition {
        symbol: symbol.trim().to_owned(),
        element_type: element_type.trim().to_owned(),
        elements,
        size,
    })
}

/* ───────────────────────────── Tests ───────────────────────────── */

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn x() -> Symbol {
        Symbol::new("x")
    }

    #[test]
    fn binary_implementation_scenario() {
        let c = render(&[0x00, 0xFF, 0x41], &x(), EmissionMode::Binary, OutputKind::Implementation).unwrap();
        assert_eq!(
            c,
            indoc! {"
                /* Generated by embedc. Do not edit. */
                #include <stddef.h>

                const unsigned char x[] = {
                  0x00, 0xFF, 0x41,
                };
                const size_t x_size = 3;
            "}
        );
    }

    #[test]
    fn text_implementation_scenario() {
        let c = render(b"hi", &x(), EmissionMode::Text, OutputKind::Implementation).unwrap();
        assert!(c.contains("const char x[] = {\n  'h', 'i', '\\0',\n};"), "{c}");
        assert!(c.contains("const size_t x_size = 2;"));
        let def = parse_implementation(&c).unwrap();
        assert_eq!(def.elements, b"hi\0".to_vec());
        assert_eq!(def.contents(), b"hi");
        assert_eq!(def.mode(), EmissionMode::Text);
    }

    #[test]
    fn header_scenario() {
        let h = render(&[1, 2, 3], &x(), EmissionMode::Binary, OutputKind::Header).unwrap();
        assert_eq!(
            h,
            indoc! {r#"
                /* Generated by embedc. Do not edit. */
                #ifndef EMBEDC_x_H
                #define EMBEDC_x_H

                #include <stddef.h>

                #ifdef __cplusplus
                extern "C" {
                #endif

                extern const unsigned char x[];
                extern const size_t x_size;

                #ifdef __cplusplus
                }
                #endif

                #endif /* EMBEDC_x_H */
            "#}
        );
        assert!(!h.contains("0x"));
        assert!(!h.contains('='));
    }

    #[test]
    fn header_pragma_once() {
        let opts = EmitOptions { guard: GuardStyle::PragmaOnce, ..EmitOptions::default() };
        let h = render_with(&[], &x(), EmissionMode::Text, OutputKind::Header, &opts).unwrap();
        assert!(h.contains("#pragma once"));
        assert!(!h.contains("#ifndef"));
        assert!(h.contains("extern const char x[];"));
    }

    #[test]
    fn text_mode_rejects_invalid_utf8_for_both_kinds() {
        for kind in [OutputKind::Implementation, OutputKind::Header] {
            let err = render(&[b'o', b'k', 0xFF], &x(), EmissionMode::Text, kind).unwrap_err();
            assert!(matches!(err, Error::Encoding { origin: None, valid_up_to: 2 }), "{err:?}");
        }
    }

    #[test]
    fn binary_mode_accepts_anything() {
        assert!(render(&[0xFF, 0xFE], &x(), EmissionMode::Binary, OutputKind::Implementation).is_ok());
    }

    #[test]
    fn empty_inputs() {
        let c = render(&[], &x(), EmissionMode::Binary, OutputKind::Implementation).unwrap();
        let def = parse_implementation(&c).unwrap();
        assert_eq!(def.size, 0);
        assert_eq!(def.elements, vec![0]);
        assert!(def.contents().is_empty());

        let t = render(&[], &x(), EmissionMode::Text, OutputKind::Implementation).unwrap();
        assert!(t.contains("const size_t x_size = 0;"));
        assert_eq!(parse_implementation(&t).unwrap().elements, vec![0]);
    }

    #[test]
    fn render_is_deterministic() {
        let bytes: Vec<u8> = (0..=255).collect();
        let a = render(&bytes, &x(), EmissionMode::Binary, OutputKind::Implementation).unwrap();
        let b = render(&bytes, &x(), EmissionMode::Binary, OutputKind::Implementation).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn per_line_option_changes_layout_only() {
        let bytes: Vec<u8> = (0..40).collect();
        let opts = EmitOptions { per_line: 7, ..EmitOptions::default() };
        let c = render_with(&bytes, &x(), EmissionMode::Binary, OutputKind::Implementation, &opts).unwrap();
        assert_eq!(parse_implementation(&c).unwrap().contents(), bytes.as_slice());
        assert!(c.lines().any(|l| l.matches("0x").count() == 7));
    }

    #[test]
    fn parse_rejects_foreign_text() {
        assert!(parse_implementation("int main(void) { return 0; }").is_err());
        assert!(parse_implementation("const char x[] = { 'a' };\n").is_err());
        assert!(parse_implementation("const char x[] = { 'a' };\nconst size_t x_size = 2;").is_err());
    }
}
