//! XCForge CLI
//!
//! Command-line interface for generating native IDE build projects from a
//! declarative configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use xcforge_core::{stage_project, update_schemes, Assembler, BuildConfig, Pbxproj, UuidService};

/// Configuration keys a full generation run needs, validated before any
/// file-system mutation.
const REQUIRED_KEYS: &[&str] = &[
    "root",
    "build",
    "camel",
    "short",
    "name",
    "appid",
    "orientation",
    "engine",
    "assets",
    "build_to_root",
    "build_to_engine",
    "source_tree",
];

#[derive(Parser)]
#[command(name = "xcforge")]
#[command(about = "Native IDE project generation for game-engine distributions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the Apple (Xcode) build project
    Make {
        /// Path to the project configuration (default: xcforge.json)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the build output directory
        #[arg(short, long)]
        build: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("xcforge=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Make { config, build } => cmd_make(config, build),
    }
}

/// Generate the Xcode project.
///
/// This only creates the project; building it is up to Xcode.
fn cmd_make(config_path: Option<PathBuf>, build: Option<PathBuf>) -> Result<()> {
    let config_path = config_path.unwrap_or_else(|| PathBuf::from("xcforge.json"));
    let mut config = BuildConfig::load(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    if let Some(build) = build {
        config.build = Some(build);
    }
    config.require(REQUIRED_KEYS)?;

    tracing::info!("Configuring Apple build files");
    let project = stage_project(&config)?;
    let descriptor = project.join("project.pbxproj");
    let mut pbx = Pbxproj::parse_file(&descriptor)
        .with_context(|| format!("Failed to parse {}", descriptor.display()))?;

    let uuids = UuidService::new(config.appid()?);
    let assembler = Assembler::new(&config, uuids);

    tracing::info!("Modifying project settings");
    assembler.retarget(&mut pbx)?;
    assembler.assign_orientation(&mut pbx)?;

    tracing::info!("Populating project file");
    assembler.populate_assets(&mut pbx)?;
    assembler.populate_sources(&mut pbx)?;

    tracing::info!("Retargeting builds");
    pbx.write_to(&descriptor)
        .with_context(|| format!("Failed to write {}", descriptor.display()))?;
    update_schemes(&config, &project)?;

    println!("Generated Xcode project at {}", project.display());
    Ok(())
}
