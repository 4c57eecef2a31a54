//! embedc — fichier → implémentation `.c` / en-tête `.h`
//!
//! Exemples :
//!   embedc logo.png -o gen/logo.c
//!   embedc logo.png --header -o gen/logo.h
//!   embedc shader.glsl --text -s shader_src -d gen/
//!   cat blob.bin | embedc - -s blob > blob.c
//!
//! Code de sortie : 0 si OK, 1 sur toute erreur (message d’une ligne sur stderr).

fn main() {
    color_eyre::install().ok();
    if let Err(err) = embedc_cli::run() {
        eprintln!("❌ {err:#}");
        std::process::exit(1);
    }
}
