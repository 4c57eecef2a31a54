//! tests/integration.rs — batteries d’intégration pour embedc-core
//!
//! Propriétés vérifiées à travers l’API publique uniquement :
//! round-trip (binaire/texte), cohérence en-tête ↔ implémentation,
//! invariant de taille, déterminisme, écriture sur disque.

use std::collections::HashSet;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use embedc_core::{
    parse_implementation, render, render_with, rules, Config, EmissionMode, EmitPlan, Error, Input, OutputKind,
    Sink, Symbol,
};

// -----------------------------------------------------------------------------
// Helpers de test
// -----------------------------------------------------------------------------

/// `extern const <type> <nom>[];` / `extern const size_t <nom>;` → (type, nom)
fn header_declarations(h: &str) -> Vec<(String, String)> {
    h.lines()
        .filter_map(|l| l.strip_prefix("extern const "))
        .filter_map(|l| l.strip_suffix(';'))
        .filter_map(|decl| decl.rsplit_once(' '))
        .map(|(ty, name)| (ty.to_owned(), name.trim_end_matches("[]").to_owned()))
        .collect()
}

/// `const <type> <nom>[] = ...` / `const size_t <nom> = ...` → (type, nom)
fn implementation_definitions(c: &str) -> Vec<(String, String)> {
    c.lines()
        .filter_map(|l| l.strip_prefix("const "))
        .filter_map(|l| l.split_once(" ="))
        .filter_map(|(decl, _)| decl.rsplit_once(' '))
        .map(|(ty, name)| (ty.to_owned(), name.trim_end_matches("[]").to_owned()))
        .collect()
}

/// Lignes qui survivent au préprocesseur C (`#ifndef`/`#ifdef`/`#define`/`#endif`,
/// `__cplusplus` non défini).
fn preprocessed(src: &str) -> String {
    let mut defined: HashSet<String> = HashSet::new();
    let mut stack: Vec<bool> = Vec::new();
    let mut out = String::new();
    for line in src.lines() {
        let active = stack.iter().all(|&on| on);
        let t = line.trim();
        if let Some(m) = t.strip_prefix("#ifndef ") {
            stack.push(!defined.contains(m.trim()));
        } else if let Some(m) = t.strip_prefix("#ifdef ") {
            stack.push(defined.contains(m.trim()));
        } else if t.starts_with("#endif") {
            stack.pop();
        } else if let Some(m) = t.strip_prefix("#define ") {
            if active {
                defined.insert(m.trim().to_owned());
            }
        } else if active {
            out.push_str(line);
            out.push('\n');
        }
    }
    assert!(stack.is_empty(), "#if/#endif déséquilibrés");
    out
}

fn tmp() -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    (dir, root)
}

// -----------------------------------------------------------------------------
// Scénarios
// -----------------------------------------------------------------------------

#[test]
fn binary_scenario_three_bytes() {
    let c = render(&[0x00, 0xFF, 0x41], &Symbol::new("x"), EmissionMode::Binary, OutputKind::Implementation).unwrap();
    assert!(c.contains("const unsigned char x[] = {\n  0x00, 0xFF, 0x41,\n};"));
    assert!(c.contains("const size_t x_size = 3;"));
    let def = parse_implementation(&c).unwrap();
    assert_eq!(def.elements, vec![0x00, 0xFF, 0x41]);
    assert_eq!(def.size, 3);
}

#[test]
fn text_scenario_hi() {
    let c = render(b"hi", &Symbol::new("x"), EmissionMode::Text, OutputKind::Implementation).unwrap();
    let def = parse_implementation(&c).unwrap();
    assert_eq!(def.element_type, "char");
    assert_eq!(def.elements, vec![b'h', b'i', 0]);
    assert_eq!(def.size, 2);
}

#[test]
fn header_has_no_data_and_is_guarded() {
    let h = render(&[9, 9, 9], &Symbol::new("x"), EmissionMode::Binary, OutputKind::Header).unwrap();
    assert!(!h.contains("0x09"));
    assert!(!h.contains('{') || h.contains("extern \"C\" {"));
    assert_eq!(h.matches("#ifndef EMBEDC_x_H").count(), 1);
    assert!(h.contains("#define EMBEDC_x_H"));
    assert!(h.trim_end().ends_with("#endif /* EMBEDC_x_H */"));
    assert!(h.contains("#ifdef __cplusplus\nextern \"C\" {\n#endif"));
}

#[test]
fn header_included_twice_declares_once() {
    let h = render(b"abc", &Symbol::new("x"), EmissionMode::Text, OutputKind::Header).unwrap();
    let once = preprocessed(&h);
    let twice = preprocessed(&format!("{h}{h}"));
    // seule la bannière, hors garde, est répétée
    assert_eq!(twice.matches("#include <stddef.h>").count(), 1);
    assert_eq!(header_declarations(&twice), header_declarations(&once));
    assert_eq!(
        header_declarations(&twice),
        vec![("char".to_owned(), "x".to_owned()), ("size_t".to_owned(), "x_size".to_owned())]
    );
}

#[test]
fn headers_of_distinct_symbols_coexist() {
    for (a, b) in [("foo", "Foo"), ("a_b", "a-b")] {
        let ha = render(&[1], &Symbol::new(a), EmissionMode::Binary, OutputKind::Header).unwrap();
        let hb = render(&[2], &Symbol::new(b), EmissionMode::Binary, OutputKind::Header).unwrap();
        let names: Vec<String> = header_declarations(&preprocessed(&format!("{ha}{hb}")))
            .into_iter()
            .map(|(_, name)| name)
            .collect();
        assert_eq!(names, vec![a.to_owned(), format!("{a}_size"), b.to_owned(), format!("{b}_size")]);
    }
}

#[test]
fn symbol_derivation_from_file_txt() {
    assert_eq!(Symbol::derive(Utf8Path::new("file.txt")).unwrap().as_str(), "file");
}

// -----------------------------------------------------------------------------
// Propriétés
// -----------------------------------------------------------------------------

#[test]
fn header_and_implementation_agree() {
    for mode in [EmissionMode::Binary, EmissionMode::Text] {
        let sym = Symbol::new("asset_01");
        let c = render(b"payload", &sym, mode, OutputKind::Implementation).unwrap();
        let h = render(b"payload", &sym, mode, OutputKind::Header).unwrap();
        assert_eq!(header_declarations(&h), implementation_definitions(&c), "{mode:?}");
        assert_eq!(
            header_declarations(&h),
            vec![
                (mode.element_type().to_owned(), "asset_01".to_owned()),
                ("size_t".to_owned(), "asset_01_size".to_owned()),
            ]
        );
    }
}

#[test]
fn render_twice_is_byte_identical() {
    let sym = Symbol::new("d");
    for kind in [OutputKind::Implementation, OutputKind::Header] {
        let a = render(b"\x00\x01abc", &sym, EmissionMode::Binary, kind).unwrap();
        let b = render(b"\x00\x01abc", &sym, EmissionMode::Binary, kind).unwrap();
        assert_eq!(a, b);
    }
}

proptest! {
    #[test]
    fn binary_round_trip(bytes in proptest::collection::vec(any::<u8>(), 0..1024)) {
        let c = render(&bytes, &Symbol::new("b"), EmissionMode::Binary, OutputKind::Implementation).unwrap();
        let def = parse_implementation(&c).unwrap();
        prop_assert_eq!(def.contents(), bytes.as_slice());
        prop_assert_eq!(def.size, bytes.len());
    }

    #[test]
    fn text_round_trip(s in any::<String>()) {
        let c = render(s.as_bytes(), &Symbol::new("t"), EmissionMode::Text, OutputKind::Implementation).unwrap();
        let def = parse_implementation(&c).unwrap();
        prop_assert_eq!(def.contents(), s.as_bytes());
        prop_assert_eq!(def.size, s.len());
        prop_assert_eq!(def.elements.len(), s.len() + 1);
        prop_assert_eq!(def.elements.last().copied(), Some(0u8));
    }
}

#[test]
fn invalid_utf8_in_text_mode() {
    let err = render(&[0xC3, 0x28], &Symbol::new("x"), EmissionMode::Text, OutputKind::Implementation).unwrap_err();
    assert!(matches!(err, Error::Encoding { valid_up_to: 0, .. }));
}

// -----------------------------------------------------------------------------
// Disque / config / règles
// -----------------------------------------------------------------------------

#[test]
fn plan_from_file_with_config_and_verify() {
    let (_guard, root) = tmp();
    let input = root.join("notes.md");
    fs::write(&input, "# titre\n\tcorps \"cité\" \\ fin\n").unwrap();
    fs::write(root.join(Config::FILE_NAME), "[emit]\nper_line = 5\nguard = \"pragma-once\"\n").unwrap();

    let cfg = Config::discover(&root).unwrap().unwrap();
    let plan = EmitPlan::load(&Input::Path(input.clone()), None, EmissionMode::Text)
        .unwrap()
        .with_options(cfg.emit)
        .with_verify(true);

    let out = root.join("out");
    let arts = plan.emit_pair(&out).unwrap();
    assert_eq!(arts.iter().map(|a| a.kind).collect::<Vec<_>>(), vec![OutputKind::Implementation, OutputKind::Header]);

    let c = fs::read_to_string(out.join("notes.c")).unwrap();
    let h = fs::read_to_string(out.join("notes.h")).unwrap();
    assert_eq!(parse_implementation(&c).unwrap().contents(), fs::read(&input).unwrap().as_slice());
    assert!(h.contains("#pragma once"));
    assert!(c.lines().filter(|l| l.starts_with("  ")).all(|l| l.matches("',").count() <= 5));
}

#[test]
fn single_artifact_to_explicit_file() {
    let (_guard, root) = tmp();
    let plan = EmitPlan::from_bytes(vec![0xAA; 40], Symbol::new("pad"), EmissionMode::Binary);
    let target = root.join("deep/dir/pad_decl.h");
    let art = plan.write(OutputKind::Header, &Sink::File(target.clone())).unwrap();
    assert_eq!(art.path, Some(target.clone()));
    let on_disk = fs::read_to_string(&target).unwrap();
    assert_eq!(on_disk, plan.render(OutputKind::Header).unwrap());
}

#[test]
fn configured_rendering_round_trips() {
    let cfg = Config::from_toml_str("[emit]\nper_line = 1\n", Utf8Path::new("embedc.toml")).unwrap();
    let bytes = b"\x7F\x80\xFE".to_vec();
    let c = render_with(&bytes, &Symbol::new("z"), EmissionMode::Binary, OutputKind::Implementation, &cfg.emit).unwrap();
    assert_eq!(c.lines().filter(|l| l.starts_with("  0x")).count(), 3);
    assert_eq!(parse_implementation(&c).unwrap().contents(), bytes.as_slice());
}

#[test]
fn rules_follow_symbol_derivation() {
    let req = rules::RuleRequest {
        target: "fonts".into(),
        input: "third_party/Inter.ttf".into(),
        c_output: None,
        h_output: None,
        symbol: None,
        text: false,
    };
    let r = rules::plan(&req, Utf8Path::new("build"), "embedc").unwrap();
    assert_eq!(r.symbol, "Inter");
    assert_eq!(r.library.headers, vec![Utf8PathBuf::from("build/fonts/Inter.h")]);
}
