use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::MultiSelect;
use std::path::PathBuf;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::paths;
use crate::platform::Platform;
use crate::scanner::Scanner;

#[derive(Parser)]
#[command(
    name = "questlog",
    author,
    version,
    about = "Questlog - Game Library Scanner & Catalog",
    long_about = "Discovers titles installed through Steam, Epic, Ubisoft Connect and GOG and keeps them in a single catalog"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Scan platforms for installed titles")]
    Scan {
        #[arg(long, help = "Only scan one platform (steam, epic, ubisoft, gog)")]
        platform: Option<String>,

        #[arg(long, help = "Add every candidate without prompting")]
        yes: bool,
    },

    #[command(about = "List catalog entries")]
    List,

    #[command(about = "Add a title manually")]
    Add {
        #[arg(help = "Display title")]
        title: String,

        #[arg(help = "Platform name (steam, epic, ubisoft, gog)")]
        platform: String,

        #[arg(help = "Platform-native id")]
        id: String,
    },

    #[command(about = "Remove a catalog entry")]
    Remove {
        #[arg(help = "Catalog id")]
        id: u64,
    },

    #[command(about = "Print the launch URI for an entry")]
    Uri {
        #[arg(help = "Catalog id")]
        id: u64,
    },

    #[command(about = "Record a launch of an entry")]
    Played {
        #[arg(help = "Catalog id")]
        id: u64,
    },

    #[command(about = "Build a launch URI from a platform name and id")]
    Proto {
        #[arg(help = "Platform name, any casing")]
        platform: String,

        #[arg(help = "Platform-native id")]
        id: String,
    },

    #[command(about = "Show catalog statistics")]
    Stats,

    #[command(about = "Show the candidate installation roots per platform")]
    Roots,

    #[command(about = "Merge entries from a legacy library file")]
    Migrate {
        #[arg(help = "Path to the legacy file")]
        file: PathBuf,
    },
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = Config::load()?;

        match self.command {
            Commands::Scan { platform, yes } => handle_scan(config, platform, yes).await,
            Commands::List => handle_list(config),
            Commands::Add {
                title,
                platform,
                id,
            } => handle_add(config, title, platform, id),
            Commands::Remove { id } => handle_remove(config, id),
            Commands::Uri { id } => handle_uri(config, id),
            Commands::Played { id } => handle_played(config, id),
            Commands::Proto { platform, id } => {
                println!("{}", crate::platform::build_uri(&platform, &id));
                Ok(())
            }
            Commands::Stats => handle_stats(config),
            Commands::Roots => handle_roots(config),
            Commands::Migrate { file } => handle_migrate(config, file),
        }
    }
}

fn parse_platform(name: &str) -> Result<Platform> {
    Platform::from_name(name)
        .ok_or_else(|| anyhow::anyhow!("Unknown platform '{}'. Expected steam, epic, ubisoft or gog.", name))
}

async fn handle_scan(config: Config, platform: Option<String>, yes: bool) -> Result<()> {
    let filter = platform.as_deref().map(parse_platform).transpose()?;
    let catalog = Catalog::open(&config.paths.catalog_file)?;

    println!("{}", "🔍 Scanning platforms...".bold().cyan());
    let candidates = Scanner::new(config).scan(filter).await;

    if candidates.is_empty() {
        println!("No titles found.");
        return Ok(());
    }

    let selected: Vec<_> = if yes {
        candidates
    } else {
        let items: Vec<String> = candidates
            .iter()
            .map(|c| format!("{} [{}] ({})", c.title, c.platform, c.external_id))
            .collect();
        let defaults = vec![true; items.len()];
        let picked = MultiSelect::new()
            .with_prompt("Select titles to add to the catalog")
            .items(&items)
            .defaults(&defaults)
            .interact()?;
        picked
            .into_iter()
            .map(|index| candidates[index].clone())
            .collect()
    };

    if selected.is_empty() {
        println!("Nothing selected, catalog unchanged.");
        return Ok(());
    }

    let ids = catalog.confirm_additions(&selected)?;
    for (candidate, id) in selected.iter().zip(&ids) {
        println!(
            "✅ #{} {} {}",
            id,
            candidate.title.bold(),
            format!("[{}]", candidate.platform).dimmed()
        );
    }
    println!("{} titles in catalog.", catalog.stats().total);

    Ok(())
}

fn handle_list(config: Config) -> Result<()> {
    let catalog = Catalog::open(&config.paths.catalog_file)?;
    let entries = catalog.list();

    if entries.is_empty() {
        println!("Catalog is empty. Run 'questlog scan' to discover titles.");
        return Ok(());
    }

    println!("{}", "📚 Catalog:".bold().cyan());
    for entry in entries {
        let launches = if entry.launch_count > 0 {
            format!("{} launches", entry.launch_count)
        } else {
            "never launched".to_string()
        };
        println!(
            "  #{:<4} {} {} {}",
            entry.catalog_id,
            entry.title.bold(),
            format!("[{}]", entry.platform).dimmed(),
            launches.dimmed()
        );
    }

    Ok(())
}

fn handle_add(config: Config, title: String, platform: String, id: String) -> Result<()> {
    let platform = parse_platform(&platform)?;
    let catalog = Catalog::open(&config.paths.catalog_file)?;
    let catalog_id = catalog.add_manual(&title, platform, &id)?;
    println!("✅ #{} {} [{}]", catalog_id, title.bold(), platform);
    Ok(())
}

fn handle_remove(config: Config, id: u64) -> Result<()> {
    let catalog = Catalog::open(&config.paths.catalog_file)?;
    if catalog.remove(id)? {
        println!("🗑️  Removed entry #{}", id);
    } else {
        println!("No entry #{} in the catalog.", id);
    }
    Ok(())
}

fn handle_uri(config: Config, id: u64) -> Result<()> {
    let catalog = Catalog::open(&config.paths.catalog_file)?;
    println!("{}", catalog.launch_uri_for(id)?);
    Ok(())
}

fn handle_played(config: Config, id: u64) -> Result<()> {
    let catalog = Catalog::open(&config.paths.catalog_file)?;
    catalog.record_launch(id)?;
    println!("🎮 Recorded a launch of #{}", id);
    Ok(())
}

fn handle_stats(config: Config) -> Result<()> {
    let catalog = Catalog::open(&config.paths.catalog_file)?;
    let stats = catalog.stats();

    println!("{}", "📊 Catalog statistics:".bold().cyan());
    println!("  Total titles:   {}", stats.total);
    println!("  Auto-detected:  {}", stats.auto_detected);
    for (platform, count) in &stats.per_platform {
        println!("  {:<14} {}", format!("{}:", platform), count);
    }

    Ok(())
}

fn handle_roots(config: Config) -> Result<()> {
    println!("{}", "📂 Candidate installation roots:".bold().cyan());
    for platform in Platform::ALL {
        println!("{}", platform.name().bold());
        let roots = paths::resolve_roots(platform, config.root_override(platform));
        if roots.is_empty() {
            println!("  (discovered through the Windows registry)");
            continue;
        }
        for root in roots {
            let marker = if root.exists() { "✅" } else { "  " };
            println!("  {} {}", marker, root.display());
        }
    }
    Ok(())
}

fn handle_migrate(config: Config, file: PathBuf) -> Result<()> {
    let bytes = std::fs::read(&file)?;
    let text = String::from_utf8_lossy(&bytes);

    let catalog = Catalog::open(&config.paths.catalog_file)?;
    let merged = catalog.migrate_legacy(&text)?;

    if merged == 0 {
        println!("Nothing to migrate from {}.", file.display());
    } else {
        println!("✅ Migrated {} entries from {}", merged, file.display());
    }
    Ok(())
}
