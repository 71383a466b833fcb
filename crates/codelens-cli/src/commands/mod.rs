use anyhow::{bail, Context, Result};
use clap::{Subcommand, ValueEnum};
use codelens_core::{
    CodelensEngine, ConfigManager, FsWorkspace, FunctionBehavior, Language, SnippetAnalysis,
    WorkspaceProfile,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Subcommand)]
pub enum Commands {
    /// Explain a JavaScript or TypeScript file
    Explain {
        file: PathBuf,
        #[arg(long, help = "Editor language id; inferred from the extension when omitted")]
        language: Option<String>,
        #[arg(long, value_enum, default_value_t = Tier::All)]
        tier: Tier,
        #[arg(long, help = "Print the full analysis as JSON")]
        json: bool,
    },

    /// Describe the behavior of every function in a file
    Functions {
        file: PathBuf,
        #[arg(long)]
        language: Option<String>,
        #[arg(long, help = "Only analyze the function with this name")]
        name: Option<String>,
        #[arg(long)]
        json: bool,
    },

    /// Build a skill profile of a workspace directory
    Profile {
        dir: PathBuf,
        #[arg(long)]
        json: bool,
    },

    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Write a default configuration file
    Init {
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Tier {
    Simple,
    Detailed,
    Technical,
    All,
}

pub async fn execute(command: Commands, manager: ConfigManager) -> Result<()> {
    match command {
        Commands::Explain {
            file,
            language,
            tier,
            json,
        } => {
            let engine = build_engine(manager).await?;
            handle_explain(&engine, &file, language, tier, json).await
        }
        Commands::Functions {
            file,
            language,
            name,
            json,
        } => {
            let engine = build_engine(manager).await?;
            handle_functions(&engine, &file, language, name, json).await
        }
        Commands::Profile { dir, json } => {
            let engine = build_engine(manager).await?;
            handle_profile(&engine, &dir, json).await
        }
        Commands::Config(cmd) => handle_config_command(cmd, &manager).await,
    }
}

async fn build_engine(manager: ConfigManager) -> Result<CodelensEngine> {
    Ok(CodelensEngine::with_config(manager.into_config()).await?)
}

async fn handle_explain(
    engine: &CodelensEngine,
    file: &Path,
    language: Option<String>,
    tier: Tier,
    json: bool,
) -> Result<()> {
    let text = read_source(file).await?;
    let tag = language_tag(file, language);
    let analysis = engine.explain(&text, &tag)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print_explanation(&analysis, tier);
    }
    Ok(())
}

async fn handle_functions(
    engine: &CodelensEngine,
    file: &Path,
    language: Option<String>,
    name: Option<String>,
    json: bool,
) -> Result<()> {
    let text = read_source(file).await?;
    let tag = language_tag(file, language);
    let behaviors = match name {
        Some(name) => vec![engine.analyze_named_function(&text, &tag, &name)?],
        None => engine.analyze_functions(&text, &tag)?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&behaviors)?);
    } else if behaviors.is_empty() {
        println!("No functions found in {}", file.display());
    } else {
        behaviors.iter().for_each(print_behavior);
    }
    Ok(())
}

async fn handle_profile(engine: &CodelensEngine, dir: &Path, json: bool) -> Result<()> {
    let workspace = FsWorkspace::new(dir, &engine.config().workspace)?;
    let profile = engine.profile_workspace(&workspace).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        print_profile(&profile);
    }
    Ok(())
}

async fn handle_config_command(cmd: ConfigCommands, manager: &ConfigManager) -> Result<()> {
    match cmd {
        ConfigCommands::Show => {
            if let Some(path) = manager.config_path() {
                println!("# loaded from {}", path.display());
            }
            print!("{}", manager.config().to_toml_string()?);
        }
        ConfigCommands::Init { path } => {
            let path = match path.or_else(ConfigManager::default_config_path) {
                Some(path) => path,
                None => bail!("No configuration directory available, pass --path"),
            };
            if path.exists() {
                bail!("{} already exists", path.display());
            }

            ConfigManager::new(Default::default())
                .save_to_file(&path)
                .await?;
            info!("Wrote default configuration");
            println!("Created {}", path.display());
        }
    }
    Ok(())
}

async fn read_source(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

/// Explicit tag, else the lowercase language name inferred from the extension
fn language_tag(path: &Path, explicit: Option<String>) -> String {
    explicit.unwrap_or_else(|| {
        let tag = Language::from_path(path).display_name().to_lowercase();
        debug!("Inferred language tag {} for {}", tag, path.display());
        tag
    })
}

fn print_explanation(analysis: &SnippetAnalysis, tier: Tier) {
    let explanation = &analysis.explanation;
    match tier {
        Tier::Simple => println!("{}", explanation.simple),
        Tier::Detailed => println!("{}", explanation.detailed),
        Tier::Technical => println!("{}", explanation.technical),
        Tier::All => {
            println!("Simple:\n{}\n", explanation.simple);
            println!("Detailed:\n{}\n", explanation.detailed);
            println!("{}", explanation.technical);
        }
    }

    if !analysis.warnings.is_empty() {
        eprintln!("warning: no recognizable structure, explanation is generic");
    }
}

fn print_behavior(behavior: &FunctionBehavior) {
    let function = &behavior.function;
    println!(
        "{}({}) [complexity: {}]",
        function.name,
        function.params.join(", "),
        behavior.complexity.level
    );
    println!("  {}", behavior.explanation);

    if !behavior.dependencies.is_empty() {
        let modules: Vec<&str> = behavior
            .dependencies
            .iter()
            .map(|d| d.module.as_str())
            .collect();
        println!("  Dependencies: {}", modules.join(", "));
    }
    println!();
}

fn print_profile(profile: &WorkspaceProfile) {
    println!(
        "Skill level: {} (score {})",
        profile.skill_level, profile.skill_score
    );
    println!(
        "Files analyzed: {} ({} skipped)",
        profile.files_analyzed, profile.files_skipped
    );

    if !profile.language_usage.is_empty() {
        println!("\nLanguages:");
        for (language, files) in &profile.language_usage {
            println!("  {}: {}", language, files);
        }
    }

    println!("\nStrengths:");
    if profile.strengths.is_empty() {
        println!("  none yet");
    }
    for strength in &profile.strengths {
        println!("  + {}", strength);
    }

    println!("\nAreas for improvement:");
    if profile.areas_for_improvement.is_empty() {
        println!("  none");
    }
    for area in &profile.areas_for_improvement {
        println!("  - {}", area);
    }

    if !profile.learning_path.is_empty() {
        println!("\nLearning path:");
        for item in &profile.learning_path {
            println!(
                "  [{}] {}: {} ({:?})",
                item.difficulty, item.area, item.challenge, item.character
            );
        }
    }
}
