//! embedc-cli/src/lib.rs — CLI lib pour embedc
//!
//! Deux binaires :
//!   - `embedc`       : fichier → implémentation `.c` ou en-tête `.h` (ou les deux)
//!   - `embedc-rules` : règles de build (CMake / JSON) pour une cible
//!
//! Toute la logique vit dans `embedc-core` ; ici on parse les arguments,
//! on initialise les logs et on branche les sorties.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, ValueEnum};

use embedc_core::rules::{self, RuleRequest};
use embedc_core::{Config, EmissionMode, EmitPlan, Input, OutputKind, Sink};

/// Variable d’environnement des filtres de log (syntaxe `env_logger`).
pub const LOG_ENV: &str = "EMBEDC_LOG";

/* ───────────────────────────── embedc ───────────────────────────── */

#[derive(Parser, Debug)]
#[command(name = "embedc", version, about = "Embarque un fichier dans une paire .c/.h")]
pub struct Cli {
    /// Fichier à embarquer ('-' pour stdin, --symbol requis)
    pub input: String,

    /// Fichier de sortie (stdout si omis)
    #[arg(short, long, conflicts_with = "output_dir")]
    pub output: Option<PathBuf>,

    /// Écrit <symbol>.c et <symbol>.h dans ce dossier
    #[arg(short = 'd', long, conflicts_with = "header")]
    pub output_dir: Option<PathBuf>,

    /// Symbole exposé (défaut : nom du fichier sans extension)
    #[arg(short, long)]
    pub symbol: Option<String>,

    /// Mode texte : UTF-8 requis, tableau terminé par '\0'
    #[arg(long)]
    pub text: bool,

    /// Produit l’en-tête (déclarations seules) au lieu de l’implémentation
    #[arg(long)]
    pub header: bool,

    /// Fichier de config (défaut : ./embedc.toml s’il existe)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Relit le texte généré et vérifie le round-trip avant d’écrire
    #[arg(long)]
    pub verify: bool,

    /// Refuse les symboles qui ne sont pas des identifiants C
    #[arg(long)]
    pub strict: bool,

    /// Verbosité (répéter pour plus de bruit)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Point d’entrée du binaire `embedc` (à appeler depuis src/main.rs).
///
/// # Errors
/// Toute erreur d’exécution, chaînée avec son contexte.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    execute(&cli)
}

/// Exécute une ligne de commande déjà parsée.
///
/// # Errors
/// Erreurs de `embedc-core` avec contexte ; symbole invalide sous `--strict`.
pub fn execute(cli: &Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let input = Input::from_arg(&cli.input);
    let mode = EmissionMode::from_text_flag(cli.text);

    let plan = EmitPlan::load(&input, cli.symbol.as_deref(), mode)
        .with_context(|| format!("lecture de {}", cli.input))?
        .with_options(config.emit)
        .with_verify(cli.verify);

    if let Err(e) = plan.symbol.validate() {
        if cli.strict {
            return Err(e.into());
        }
        log::warn!("{e}: les fichiers générés ne compileront probablement pas");
    }

    if let Some(dir) = &cli.output_dir {
        let dir = utf8(dir.clone())?;
        for art in plan.emit_pair(&dir)? {
            log::info!("{:?} → {}", art.kind, art.path.as_deref().map_or("<stdout>", Utf8Path::as_str));
        }
        return Ok(());
    }

    let kind = if cli.header { OutputKind::Header } else { OutputKind::Implementation };
    let sink = match &cli.output {
        Some(p) => Sink::File(utf8(p.clone())?),
        None => Sink::Stdout,
    };
    let art = plan.write(kind, &sink)?;
    log::debug!("{art:?}");
    Ok(())
}

/// Config explicite (doit exister), sinon `./embedc.toml` s’il est présent, sinon défauts.
///
/// # Errors
/// Config explicite absente ou invalide, chemin non UTF-8.
pub fn load_config(explicit: Option<&std::path::Path>) -> Result<Config> {
    if let Some(p) = explicit {
        let p = utf8(p.to_path_buf())?;
        return Ok(Config::load(&p)?);
    }
    let cwd = std::env::current_dir().context("répertoire courant")?;
    let cwd = utf8(cwd)?;
    Ok(Config::discover(&cwd)?.unwrap_or_default())
}

/// Logs sur stderr ; `EMBEDC_LOG` prime sur `-v`.
pub fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env = env_logger::Env::new().filter_or(LOG_ENV, default);
    let _ = env_logger::Builder::from_env(env).format_target(false).try_init();
    log::debug!("{}", embedc_core::version());
}

fn utf8(p: PathBuf) -> Result<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(p).map_err(|p| anyhow!("chemin non UTF-8: {}", p.display()))
}

/* ───────────────────────────── embedc-rules ───────────────────────────── */

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum RulesFormat {
    Cmake,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "embedc-rules", version, about = "Règles de build (CMake/JSON) pour embarquer un fichier")]
pub struct RulesCli {
    /// Fichier à embarquer
    pub input: Utf8PathBuf,

    /// Nom de la cible (bibliothèque) à créer
    #[arg(long)]
    pub target: String,

    /// Racine des fichiers générés (<gen-dir>/<target>/...)
    #[arg(long, default_value = "build/embedc")]
    pub gen_dir: Utf8PathBuf,

    /// Chemin du .c généré
    #[arg(long)]
    pub c_output: Option<Utf8PathBuf>,

    /// Chemin du .h généré
    #[arg(long)]
    pub h_output: Option<Utf8PathBuf>,

    /// Symbole exposé
    #[arg(short, long)]
    pub symbol: Option<String>,

    /// Mode texte
    #[arg(long)]
    pub text: bool,

    /// Commande embedc à invoquer dans les règles
    #[arg(long, default_value = "embedc")]
    pub tool: String,

    /// Format de sortie
    #[arg(long, value_enum, default_value_t = RulesFormat::Cmake)]
    pub format: RulesFormat,

    /// Verbosité (répéter pour plus de bruit)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Point d’entrée du binaire `embedc-rules`.
///
/// # Errors
/// Comme [`render_rules`].
pub fn run_rules() -> Result<()> {
    let cli = RulesCli::parse();
    init_logging(cli.verbose);
    print!("{}", render_rules(&cli)?);
    Ok(())
}

/// Texte des règles pour une ligne de commande déjà parsée.
///
/// # Errors
/// Symbole impossible à déduire, ou échec de sérialisation JSON.
pub fn render_rules(cli: &RulesCli) -> Result<String> {
    let req = RuleRequest {
        target: cli.target.clone(),
        input: cli.input.clone(),
        c_output: cli.c_output.clone(),
        h_output: cli.h_output.clone(),
        symbol: cli.symbol.clone(),
        text: cli.text,
    };
    let rules = rules::plan(&req, &cli.gen_dir, &cli.tool)?;
    Ok(match cli.format {
        RulesFormat::Cmake => rules.to_cmake(),
        RulesFormat::Json => {
            let mut s = rules.to_json(true).context("sérialisation JSON")?;
            s.push('\n');
            s
        }
    })
}
