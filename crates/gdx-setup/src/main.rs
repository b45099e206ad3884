//! gdx-setup - Project generator for multi-platform libGDX games

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use setup_core::catalog::DisplayLists;
use setup_core::tui::CreateArgs;
use setup_core::{Catalog, PlatformId, ProductConfig, TemplateSource};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the log filter
const LOG_ENV: &str = "GDX_SETUP_LOG";

/// gdx-setup product configuration
#[derive(Clone)]
pub struct GdxSetupConfig;

impl ProductConfig for GdxSetupConfig {
    fn name(&self) -> &'static str {
        "gdx-setup"
    }

    fn display_name(&self) -> &'static str {
        "gdx-setup"
    }

    fn catalog_env(&self) -> &'static str {
        "GDX_SETUP_CATALOG"
    }

    fn template_dir_env(&self) -> &'static str {
        "GDX_SETUP_TEMPLATES"
    }

    fn docs_url(&self) -> &'static str {
        "https://libgdx.com/wiki/"
    }

    fn cli_description(&self) -> &'static str {
        "Generate multi-platform libGDX project skeletons"
    }

    fn next_steps(&self, dir: &Path, platforms: &BTreeSet<PlatformId>) -> Vec<String> {
        let mut steps = Vec::new();
        let current = std::env::current_dir().ok();

        // Step 1: cd to directory if not current
        if current.as_deref() != Some(dir) {
            steps.push(format!("cd {}", dir.display()));
        }

        // Step 2: one run task per platform that has a launcher
        for platform in platforms {
            let step = match platform {
                PlatformId::Desktop => "gradle desktop:run",
                PlatformId::Android => "gradle android:installDebug android:run",
                PlatformId::Ios => "gradle ios:launchIPhoneSimulator",
                PlatformId::Html => "gradle html:superDev",
                PlatformId::Headless => "gradle headless:run",
                PlatformId::Server => "gradle server:run",
            };
            steps.push(step.to_string());
        }

        // Step 3: Android needs an SDK location
        if platforms.contains(&PlatformId::Android) && !dir.join("local.properties").exists() {
            steps.push("Set sdk.dir in local.properties or export ANDROID_HOME".to_string());
        }

        steps
    }
}

#[derive(Parser, Debug)]
#[command(name = "gdx-setup")]
#[command(about = "Generate multi-platform libGDX project skeletons")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new project
    Create(CreateArgs),
    /// List platforms, languages, extensions and templates
    List(ListArgs),
    /// Build zip files for all templates in the template directory (for development use)
    BuildZips(BuildZipsArgs),
    /// Open the documentation, or the page of an extension
    Docs(DocsArgs),
}

#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Catalog YAML file to use instead of the built-in catalog
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Template directory or zip bundle layered over the built-in templates
    #[arg(long = "template-dir")]
    pub template_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct BuildZipsArgs {
    /// Local directory containing templates to build zips from (for development use)
    #[arg(long = "template-dir")]
    pub template_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct DocsArgs {
    /// Extension id; omit to open the framework documentation
    pub extension: Option<String>,

    /// Catalog YAML file to use instead of the built-in catalog
    #[arg(long)]
    pub catalog: Option<PathBuf>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_lists(lists: &DisplayLists) {
    println!(
        "{} {}",
        "Framework version:".cyan().bold(),
        lists.framework_version
    );
    println!();

    println!("{}", "Platforms".cyan().bold());
    for platform in &lists.platforms {
        println!("  {} {}", "->".blue(), platform);
    }
    println!();

    println!("{}", "Languages".cyan().bold());
    for dialect in &lists.dialects {
        println!(
            "  {} {:<8} {}",
            "->".blue(),
            dialect.id,
            dialect.versions.join(", ").dimmed()
        );
    }
    println!();

    println!("{}", "Official extensions".cyan().bold());
    for row in &lists.official_extensions {
        println!("  {} {:<14} {}", "->".blue(), row.id, row.url.dimmed());
    }
    println!();

    println!("{}", "Third-party extensions".cyan().bold());
    for row in &lists.third_party_extensions {
        println!(
            "  {} {:<14} {:<10} {}",
            "->".blue(),
            row.id,
            row.version.green(),
            row.url.dimmed()
        );
    }
    println!();

    println!("{}", "GWT versions".cyan().bold());
    println!("  {}", lists.gwt_versions.join(", "));
    println!();

    println!("{}", "Templates".cyan().bold());
    for template in &lists.templates {
        println!("  {} {}", "->".blue(), template);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic and Ctrl+C
    setup_core::tui::install_terminal_guards();
    init_logging();

    let args = Args::parse();
    let config = GdxSetupConfig;

    // Handle subcommands
    match args.command {
        Some(Command::Create(create_args)) => {
            let result = setup_core::run(&config, create_args, CLI_VERSION).await;

            // Ensure cursor is visible on normal exit
            setup_core::tui::show_cursor();

            result
        }
        Some(Command::List(list_args)) => {
            let catalog = Catalog::from_config(&config, list_args.catalog.as_deref())?;
            let source = match list_args.template_dir {
                Some(path) => TemplateSource::local(path),
                None => TemplateSource::from_config(&config),
            };
            let templates = source.load()?;
            print_lists(&catalog.display_lists().with_templates(&templates));
            Ok(())
        }
        Some(Command::BuildZips(build_args)) => {
            setup_core::templates::build_zips(&config, &build_args.template_dir)
        }
        Some(Command::Docs(docs_args)) => {
            let catalog = Catalog::from_config(&config, docs_args.catalog.as_deref())?;
            setup_core::tui::open_docs(&config, &catalog, docs_args.extension.as_deref())
        }
        None => {
            // No subcommand provided, default to create behavior (interactive mode)
            let result = setup_core::run(&config, CreateArgs::default(), CLI_VERSION).await;

            // Ensure cursor is visible on normal exit
            setup_core::tui::show_cursor();

            result
        }
    }
}
