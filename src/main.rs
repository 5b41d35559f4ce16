use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use plugin_registry::settings::{self, Settings};
use plugin_registry::{Context, Plugin, Registry};

#[derive(Debug, Parser)]
#[command(name = "plugin-registry", version, about = "Manage installed plugins")]
struct Cli {
    /// Plugin directory, overriding the settings file.
    #[arg(long, global = true)]
    registry: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List installed plugins.
    List {
        #[arg(long)]
        tag: Option<String>,
        /// Include hidden plugins.
        #[arg(long)]
        all: bool,
    },
    /// Show a plugin and the artifact resolved for this platform.
    Show { name: String },
    Enable { name: String },
    Disable { name: String },
    /// Install or reinstall a plugin from a source.
    Install { source: String },
    Uninstall { name: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load()?;

    // Logs go to a file, stdout is reserved for command output.
    let log_dir = settings::project_dirs()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(std::env::temp_dir);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "plugin-registry.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log.filter)),
        )
        .init();

    let path = match cli.registry {
        Some(path) => path,
        None => settings.registry_path()?,
    };

    let mut builder = Registry::builder(&path);
    if let Some(config_file) = settings.config_file()? {
        builder = builder.config_file(config_file);
    }
    let registry = builder
        .build()
        .with_context(|| format!("could not open registry at {}", path.display()))?;

    tracing::debug!(path = %path.display(), command = ?cli.command, "running");
    run(&registry, cli.command)
}

fn run(registry: &Registry, command: Command) -> Result<()> {
    match command {
        Command::List { tag, all } => {
            let mut plugins = registry.config()?.plugins;
            if let Some(tag) = tag {
                plugins = plugins.filter_by_tag(&tag);
            }

            for plugin in plugins.values().filter(|plugin| all || !plugin.hidden) {
                println!("{}", summary(plugin));
            }
        }
        Command::Show { name } => {
            let plugin = registry
                .get_plugin(&name)?
                .ok_or(plugin_registry::Error::PluginNotExist)
                .with_context(|| format!("plugin {name}"))?;
            let artifact = plugin.resolve_artifact(&plugin.runtime_artifact());

            println!("{}", summary(&plugin));
            if !plugin.description.is_empty() {
                println!("  {}", plugin.description);
            }
            if !plugin.url.is_empty() {
                println!("  url: {}", plugin.url);
            }
            println!("  artifact: {}", artifact.file);
        }
        Command::Enable { name } => {
            registry
                .enable(&name)
                .with_context(|| format!("could not enable {name}"))?;
            println!("enabled {name}");
        }
        Command::Disable { name } => {
            registry
                .disable(&name)
                .with_context(|| format!("could not disable {name}"))?;
            println!("disabled {name}");
        }
        Command::Install { source } => {
            let plugin = registry
                .install(&Context::new(), &source)
                .with_context(|| format!("could not install {source}"))?;
            println!("installed {}", summary(&plugin));
        }
        Command::Uninstall { name } => {
            registry
                .uninstall(&name)
                .with_context(|| format!("could not uninstall {name}"))?;
            println!("uninstalled {name}");
        }
    }

    Ok(())
}

fn summary(plugin: &Plugin) -> String {
    let state = if plugin.enabled { "enabled" } else { "disabled" };
    let mut line = format!("{} {} [{state}]", plugin.name, plugin.version);

    if !plugin.tags.is_empty() {
        line.push_str(&format!(" ({})", plugin.tags.iter().collect::<Vec<_>>().join(", ")));
    }

    line
}
