//! src/bin/embedc-rules.rs — Règles de build pour embarquer un fichier
//!
//! Exemples :
//!   embedc-rules assets/logo.png --target logo_data
//!   embedc-rules shader.glsl --target shaders --text --format json
//!
//! Les règles (CMake par défaut) sont imprimées sur stdout.

fn main() {
    color_eyre::install().ok();
    if let Err(err) = embedc_cli::run_rules() {
        eprintln!("❌ {err:#}");
        std::process::exit(1);
    }
}
