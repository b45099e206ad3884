//! Charm-style CLI prompts using cliclack

use crate::catalog::Catalog;
use crate::error::{Diagnostic, Severity};
use crate::prefs::{SdkPreferences, YamlPreferences, PREFS_FILE};
use crate::product::ProductConfig;
use crate::project::{Generated, GeneratedProject, ProjectGenerator};
use crate::selection::{PlatformId, SdkVersions, SelectionModel};
use crate::templates::{TemplateCatalog, TemplateSource};
use crate::version::{resolve_extremum, Extremum};
use crate::writer::{write_project, FsWriter};
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Which end of the fetched SDK lists to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SdkPick {
    Latest,
    Oldest,
}

impl From<SdkPick> for Extremum {
    fn from(pick: SdkPick) -> Self {
        match pick {
            SdkPick::Latest => Extremum::Latest,
            SdkPick::Oldest => Extremum::Oldest,
        }
    }
}

/// CLI arguments for the create command. Anything left out is prompted for.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CreateArgs {
    /// Catalog YAML file to use instead of the built-in catalog
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Template directory or zip bundle layered over the built-in templates
    #[arg(long = "template-dir")]
    pub template_dir: Option<PathBuf>,

    /// Template id to use
    #[arg(short, long)]
    pub template: Option<String>,

    /// Project directory to create
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Project name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Java package of the generated sources
    #[arg(long)]
    pub package: Option<String>,

    /// Name of the main application class
    #[arg(long = "main-class")]
    pub main_class: Option<String>,

    /// Platforms to generate (comma-separated: desktop,android,ios,html,headless,server)
    #[arg(short, long, value_delimiter = ',')]
    pub platforms: Option<Vec<String>>,

    /// Language dialect (java, kotlin, groovy, scala)
    #[arg(long)]
    pub dialect: Option<String>,

    /// Dialect version
    #[arg(long = "dialect-version")]
    pub dialect_version: Option<String>,

    /// Extensions to include (comma-separated ids)
    #[arg(short, long, value_delimiter = ',')]
    pub extensions: Option<Vec<String>>,

    /// Framework version overriding the catalog's
    #[arg(long = "gdx-version")]
    pub gdx_version: Option<String>,

    /// Android API level
    #[arg(long = "android-sdk")]
    pub android_sdk_version: Option<String>,

    /// Android build-tools version
    #[arg(long = "android-tools")]
    pub android_tools_version: Option<String>,

    /// GWT version
    #[arg(long = "gwt-version")]
    pub gwt_version: Option<String>,

    /// Per-extension version overrides (comma-separated id=version)
    #[arg(long = "extension-version", value_delimiter = ',')]
    pub extension_versions: Vec<String>,

    /// Android SDK location written to local.properties
    #[arg(long = "android-sdk-path")]
    pub android_sdk_path: Option<PathBuf>,

    /// Pick the newest or oldest entry of --api-levels and --build-tools
    #[arg(long, value_enum, requires_all = ["api_levels", "build_tools"])]
    pub sdk: Option<SdkPick>,

    /// Installed Android API levels (comma-separated)
    #[arg(long = "api-levels", value_delimiter = ',')]
    pub api_levels: Vec<String>,

    /// Installed Android build-tools versions (comma-separated)
    #[arg(long = "build-tools", value_delimiter = ',')]
    pub build_tools: Vec<String>,

    /// Preferences file remembering the Android SDK versions
    #[arg(long)]
    pub prefs: Option<PathBuf>,

    /// Print the generated project as YAML instead of writing it
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

struct Identity {
    name: String,
    package: String,
    main_class: String,
}

/// Run the CLI with interactive prompts
pub async fn run<C: ProductConfig>(
    config: &C,
    args: CreateArgs,
    generator_version: &str,
) -> Result<()> {
    cliclack::intro(config.display_name())?;

    // Step 1: Load catalog and templates
    let (catalog, templates) = load_catalogs(config, &args)?;
    let generator =
        ProjectGenerator::new(Arc::new(catalog), Arc::new(templates), generator_version);

    // Step 2: Select template
    let template = select_template(generator.templates(), &args)?;

    // Step 3: Project identity and directory
    let identity = select_identity(&args)?;
    let project_dir = select_directory(&args, &identity.name)?;

    // Step 4: Platforms, dialect and extensions
    let platforms = select_platforms(generator.catalog(), &args)?;
    let (dialect, dialect_version) = select_dialect(generator.catalog(), &args)?;
    let extensions = select_extensions(generator.catalog(), &args)?;

    // Step 5: Build the selection, filling SDK versions from preferences
    let prefs_path = args.prefs.clone().unwrap_or_else(|| {
        project_dir
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(PREFS_FILE)
    });
    let mut prefs = YamlPreferences::load(prefs_path)?;

    let mut builder = SelectionModel::builder(identity.name)
        .package_name(identity.package)
        .main_class(identity.main_class)
        .destination(project_dir.clone())
        .platforms(platforms)
        .dialect(dialect, dialect_version)
        .extensions(extensions)
        .template(template);

    if let Some(pick) = args.sdk {
        let sdk = SdkVersions {
            api_levels: args.api_levels.clone(),
            build_tools: args.build_tools.clone(),
        };
        builder = builder.use_sdk_extremum(&sdk, pick.into())?;
    }
    if let Some(version) = &args.gdx_version {
        builder = builder.framework_version(version);
    }
    if let Some(version) = &args.android_sdk_version {
        builder = builder.android_sdk_version(version);
    }
    if let Some(version) = &args.android_tools_version {
        builder = builder.android_tools_version(version);
    }
    if let Some(version) = &args.gwt_version {
        builder = builder.gwt_version(version);
    }
    if let Some(path) = &args.android_sdk_path {
        builder = builder.android_sdk_path(path.clone());
    }
    for entry in &args.extension_versions {
        let (id, version) = entry
            .split_once('=')
            .with_context(|| format!("Invalid extension version '{}', expected id=version", entry))?;
        builder = builder.extension_version(id.trim(), version.trim());
    }
    let selection = builder.sdk_preferences(&prefs).build()?;

    // Step 6: Generate
    let generated = generate(&generator, &selection)?;
    report_diagnostics(&generated.diagnostics)?;

    if args.dry_run {
        let yaml = generated
            .project
            .to_yaml()
            .context("Failed to serialize generated project")?;
        println!("{}", yaml);
        cliclack::outro("Dry run, nothing written")?;
        return Ok(());
    }

    // Step 7: Write project
    create_project(&generated.project, &selection).await?;

    if selection.platforms().contains(&PlatformId::Android) {
        SdkPreferences::save(&mut prefs, selection.advanced());
        prefs.save()?;
    }

    // Step 8: Show next steps
    print_next_steps(config, &project_dir, selection.platforms())?;

    Ok(())
}

/// Open the source page of an extension, or the product documentation
pub fn open_docs<C: ProductConfig>(
    config: &C,
    catalog: &Catalog,
    extension: Option<&str>,
) -> Result<()> {
    let url = match extension {
        Some(id) => catalog.extension(id)?.url.to_string(),
        None => config.docs_url().to_string(),
    };
    cliclack::log::info(format!("Opening {}", url))?;
    open::that(&url).with_context(|| format!("Failed to open {}", url))?;
    Ok(())
}

fn load_catalogs<C: ProductConfig>(
    config: &C,
    args: &CreateArgs,
) -> Result<(Catalog, TemplateCatalog)> {
    let spinner = cliclack::spinner();
    spinner.start("Loading catalog...");

    let catalog = match Catalog::from_config(config, args.catalog.as_deref()) {
        Ok(catalog) => catalog,
        Err(e) => {
            spinner.stop("Failed to load catalog");
            return Err(e);
        }
    };

    let source = match &args.template_dir {
        Some(path) => TemplateSource::local(path.clone()),
        None => TemplateSource::from_config(config),
    };
    let templates = match source.load() {
        Ok(templates) => templates,
        Err(e) => {
            spinner.stop("Failed to load templates");
            return Err(e);
        }
    };

    spinner.stop(format!(
        "Catalog loaded (framework {}, {} extensions)",
        catalog.framework_version(),
        catalog.extensions().len()
    ));
    if let TemplateSource::Local(path) = &source {
        cliclack::log::info(format!("Using local templates from {}", path.display()))?;
    }

    Ok((catalog, templates))
}

fn select_template(templates: &TemplateCatalog, args: &CreateArgs) -> Result<String> {
    // If a template was specified via --template flag, use it directly
    if let Some(id) = &args.template {
        let Some(template) = templates.get(id) else {
            let available: Vec<&str> = templates.ids().collect();
            anyhow::bail!(
                "Template '{}' not found. Available templates: {}",
                id,
                available.join(", ")
            );
        };
        cliclack::log::info(format!(
            "Template: {} - {}",
            template.name, template.description
        ))?;
        return Ok(id.clone());
    }

    let all: Vec<_> = templates.iter().collect();
    if all.is_empty() {
        anyhow::bail!("No templates found.");
    }

    let default = crate::selection::SelectionBuilder::DEFAULT_TEMPLATE;
    if args.yes || all.len() == 1 {
        let template = templates.get(default).unwrap_or(all[0]);
        cliclack::log::info(format!(
            "Using template: {} - {}",
            template.name, template.description
        ))?;
        return Ok(template.id.clone());
    }

    let mut select = cliclack::select("Select a template");
    for template in &all {
        select = select.item(template.id.clone(), &template.name, &template.description);
    }
    if templates.get(default).is_some() {
        select = select.initial_value(default.to_string());
    }

    Ok(select.interact()?)
}

fn select_identity(args: &CreateArgs) -> Result<Identity> {
    let default_name = args
        .directory
        .as_ref()
        .and_then(|d| d.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or("my-game")
        .to_string();

    let name = match &args.name {
        Some(name) => name.clone(),
        None if args.yes => default_name,
        None => cliclack::input("Project name")
            .placeholder(&default_name)
            .default_input(&default_name)
            .interact()?,
    };

    let package = match &args.package {
        Some(package) => package.clone(),
        None if args.yes => crate::selection::SelectionBuilder::DEFAULT_PACKAGE.to_string(),
        None => cliclack::input("Package")
            .placeholder(crate::selection::SelectionBuilder::DEFAULT_PACKAGE)
            .default_input(crate::selection::SelectionBuilder::DEFAULT_PACKAGE)
            .validate(|input: &String| {
                if input.split('.').all(|part| !part.is_empty()) {
                    Ok(())
                } else {
                    Err("Package segments must not be empty")
                }
            })
            .interact()?,
    };

    let main_class = match &args.main_class {
        Some(main_class) => main_class.clone(),
        None if args.yes => crate::selection::SelectionBuilder::DEFAULT_MAIN_CLASS.to_string(),
        None => cliclack::input("Main class")
            .placeholder(crate::selection::SelectionBuilder::DEFAULT_MAIN_CLASS)
            .default_input(crate::selection::SelectionBuilder::DEFAULT_MAIN_CLASS)
            .interact()?,
    };

    Ok(Identity {
        name,
        package,
        main_class,
    })
}

fn select_directory(args: &CreateArgs, project_name: &str) -> Result<PathBuf> {
    let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let absolute = |p: PathBuf| {
        if p.is_absolute() {
            p
        } else {
            current_dir.join(p)
        }
    };

    // Use --directory flag if provided
    let path = if let Some(dir) = &args.directory {
        let p = absolute(dir.clone());
        cliclack::log::info(format!("Using directory: {}", p.display()))?;
        p
    } else if args.yes {
        absolute(PathBuf::from(project_name))
    } else {
        let input: String = cliclack::input("Project directory")
            .placeholder(project_name)
            .default_input(project_name)
            .interact()?;
        absolute(PathBuf::from(input))
    };

    // Validate parent directory exists
    if let Some(parent) = path.parent() {
        if !parent.exists() && parent != Path::new("") {
            anyhow::bail!("Parent directory does not exist: {}", parent.display());
        }
    }

    // Warn if directory exists and has files
    if path.is_dir() {
        if let Ok(entries) = std::fs::read_dir(&path) {
            let count = entries.count();
            if count > 0 {
                cliclack::log::warning(format!("Directory has {} existing items", count))?;

                // Auto-confirm with --yes flag
                let confirm = if args.yes {
                    true
                } else {
                    cliclack::confirm("Continue anyway?")
                        .initial_value(false)
                        .interact()?
                };

                if !confirm {
                    anyhow::bail!("Setup cancelled.");
                }
            }
        }
    }

    Ok(path)
}

fn select_platforms(catalog: &Catalog, args: &CreateArgs) -> Result<BTreeSet<PlatformId>> {
    let platforms: BTreeSet<PlatformId> = match &args.platforms {
        Some(names) => names
            .iter()
            .map(|name| name.parse::<PlatformId>())
            .collect::<Result<BTreeSet<_>, _>>()?,
        None if args.yes => BTreeSet::from([PlatformId::Desktop]),
        None => {
            let mut multi = cliclack::multiselect("Select platforms");
            for platform in catalog.matrix().platforms() {
                multi = multi.item(platform, platform.display_name(), platform.as_str());
            }
            multi
                .initial_values(vec![PlatformId::Desktop])
                .required(true)
                .interact()?
                .into_iter()
                .collect()
        }
    };

    let names: Vec<&str> = platforms.iter().map(|p| p.display_name()).collect();
    cliclack::log::success(format!("Platforms: {}", names.join(", ")))?;

    Ok(platforms)
}

fn select_dialect(catalog: &Catalog, args: &CreateArgs) -> Result<(String, String)> {
    let id = match &args.dialect {
        Some(id) => id.clone(),
        None if args.yes || catalog.dialects().len() == 1 => catalog
            .dialects()
            .first()
            .map(|d| d.id.clone())
            .context("Catalog defines no language dialects")?,
        None => {
            let mut select = cliclack::select("Select a language");
            for dialect in catalog.dialects() {
                select = select.item(dialect.id.clone(), &dialect.name, "");
            }
            select.interact()?
        }
    };

    let dialect = catalog.dialect(&id)?;
    let version = match &args.dialect_version {
        Some(version) => version.clone(),
        None => {
            let latest = resolve_extremum(&dialect.name, &dialect.versions, Extremum::Latest)?;
            if args.yes || dialect.versions.len() == 1 {
                latest.clone()
            } else {
                let mut select = cliclack::select(format!("{} version", dialect.name));
                for version in &dialect.versions {
                    select = select.item(version.clone(), version, "");
                }
                select.initial_value(latest.clone()).interact()?
            }
        }
    };

    Ok((id, version))
}

fn select_extensions(catalog: &Catalog, args: &CreateArgs) -> Result<Vec<String>> {
    if let Some(ids) = &args.extensions {
        return Ok(ids.iter().filter(|id| !id.is_empty()).cloned().collect());
    }
    if args.yes || catalog.extensions().is_empty() {
        return Ok(Vec::new());
    }

    let lists = catalog.display_lists();
    let mut multi = cliclack::multiselect("Select extensions (optional)");
    for row in &lists.official_extensions {
        multi = multi.item(row.id.clone(), &row.name, "official");
    }
    for row in &lists.third_party_extensions {
        multi = multi.item(row.id.clone(), &row.name, format!("third-party {}", row.version));
    }

    Ok(multi.required(false).interact()?)
}

fn generate(generator: &ProjectGenerator, selection: &SelectionModel) -> Result<Generated> {
    let spinner = cliclack::spinner();
    spinner.start("Resolving dependencies...");

    match generator.generate(selection) {
        Ok(generated) => {
            spinner.stop(format!(
                "Resolved {} modules",
                generated.project.modules.len()
            ));
            Ok(generated)
        }
        Err(e) => {
            spinner.stop("Invalid selection");
            cliclack::log::error(format!("{}", e))?;
            anyhow::bail!("Adjust the selection and try again.");
        }
    }
}

fn report_diagnostics(diagnostics: &[Diagnostic]) -> Result<()> {
    for diagnostic in diagnostics {
        match diagnostic.severity() {
            Severity::Warning => cliclack::log::warning(diagnostic.to_string())?,
            Severity::Info => cliclack::log::info(diagnostic.to_string())?,
        }
    }
    Ok(())
}

async fn create_project(project: &GeneratedProject, selection: &SelectionModel) -> Result<()> {
    let spinner = cliclack::spinner();
    spinner.start("Creating project...");

    let mut writer = FsWriter::new(selection.destination());
    let written = match write_project(&mut writer, project, selection).await {
        Ok(written) => written,
        Err(e) => {
            spinner.stop("Failed to write project");
            return Err(e);
        }
    };

    spinner.stop(format!(
        "Created {} files in {}",
        written.len(),
        selection.destination().display()
    ));

    Ok(())
}

fn print_next_steps<C: ProductConfig>(
    config: &C,
    project_dir: &Path,
    platforms: &BTreeSet<PlatformId>,
) -> Result<()> {
    let steps = config.next_steps(project_dir, platforms);

    println!();
    println!("  Next steps");
    println!();

    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, step);
    }

    cliclack::outro("Happy coding!")?;

    Ok(())
}
