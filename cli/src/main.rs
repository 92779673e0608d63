//! folio CLI - document library inspection tool

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use folio::content::ContentTreeLoader;
use folio::fetch::DocumentLocator;
use folio::prefs::FileStore;
use folio::{
    markdown_outline, ContentNode, LibraryConfig, OutlineNode, Preferences, ThemePreset,
    ThemeSelection,
};

#[derive(Parser)]
#[command(name = "folio")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Inspect document libraries, outlines and reader state", long_about = None)]
struct Cli {
    /// Library configuration file
    #[arg(short, long, global = true, env = "FOLIO_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Reader state file (cached tree, panel layout, theme)
    #[arg(
        long,
        global = true,
        env = "FOLIO_STATE",
        value_name = "FILE",
        default_value = ".folio/state.json"
    )]
    state: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and print the content tree
    Tree {
        /// Output format
        #[arg(long, value_enum, default_value = "tree")]
        format: TreeFormat,
    },

    /// Print the outline of a markdown file
    Outline {
        /// Input markdown file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output JSON instead of a tree
        #[arg(long)]
        json: bool,
    },

    /// Show where a library path is fetched from
    Locate {
        /// Path of a document inside the library
        #[arg(value_name = "PATH")]
        path: String,
    },

    /// Show or change the stored theme
    Theme {
        /// Preset name (light, dark, sepia, nord, dracula, solarized)
        #[arg(value_name = "NAME")]
        name: Option<String>,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum TreeFormat {
    /// Indented tree
    Tree,
    /// Manifest JSON
    Json,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Tree { format }) => cmd_tree(cli.config.as_deref(), &cli.state, format),
        Some(Commands::Outline {
            input,
            output,
            json,
        }) => cmd_outline(&input, output.as_deref(), json),
        Some(Commands::Locate { path }) => cmd_locate(cli.config.as_deref(), &path),
        Some(Commands::Theme { name }) => cmd_theme(&cli.state, name.as_deref()),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: folio <COMMAND>".yellow());
            println!("       folio --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<LibraryConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(LibraryConfig::load(path)?),
        None => Ok(LibraryConfig::default()),
    }
}

fn open_preferences(state: &Path) -> Preferences {
    Preferences::new(Arc::new(FileStore::open(state)))
}

fn cmd_tree(
    config: Option<&Path>,
    state: &Path,
    format: TreeFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config)?;
    let prefs = open_preferences(state);
    let loader = ContentTreeLoader::from_config(&config, prefs);

    let rt = tokio::runtime::Runtime::new()?;
    let tree = rt.block_on(loader.load())?;

    match format {
        TreeFormat::Json => println!("{}", serde_json::to_string_pretty(&tree)?),
        TreeFormat::Tree => {
            println!("{}", config.title.cyan().bold());
            print_nodes(&tree.nodes, "");
            println!();
            println!("{} {} documents", "Total:".bold(), tree.leaf_count());
        }
    }

    Ok(())
}

fn print_nodes(nodes: &[ContentNode], indent: &str) {
    for (i, node) in nodes.iter().enumerate() {
        let last = i + 1 == nodes.len();
        let branch = if last { "└─" } else { "├─" };
        match node {
            ContentNode::Folder { name, children, .. } => {
                println!("{}{} {}/", indent, branch.dimmed(), name.bold());
                let next = format!("{}{}", indent, if last { "   " } else { "│  " });
                print_nodes(children, &next);
            }
            ContentNode::Leaf { title, kind, .. } => {
                println!("{}{} {} {}", indent, branch.dimmed(), title, format!("[{}]", kind).dimmed());
            }
        }
    }
}

fn cmd_outline(
    input: &Path,
    output: Option<&Path>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = fs::read_to_string(input)?;
    let Some(outline) = markdown_outline(&text) else {
        println!("{}", "No headings found".yellow());
        return Ok(());
    };

    let rendered = if json {
        serde_json::to_string_pretty(&outline)?
    } else {
        let mut lines = Vec::new();
        render_outline(&outline.items, 0, &mut lines);
        lines.join("\n")
    };

    if let Some(path) = output {
        fs::write(path, &rendered)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", rendered);
        if !json {
            println!();
            println!("{} {} entries", "Total:".bold(), outline.total_items());
        }
    }

    Ok(())
}

fn render_outline(nodes: &[OutlineNode], depth: usize, lines: &mut Vec<String>) {
    for node in nodes {
        lines.push(format!("{}{} (#{})", "  ".repeat(depth), node.title, node.id));
        render_outline(&node.children, depth + 1, lines);
    }
}

fn cmd_locate(config: Option<&Path>, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config)?;
    let kind = folio::DocumentKind::from_file_name(path)
        .ok_or_else(|| format!("Not a document: {}", path))?;
    let location = DocumentLocator::from_config(&config).locate(path);

    println!("{}: {}", "Kind".bold(), kind);
    println!("{}: {:?}", "Source".bold(), config.source_mode());
    println!("{}: {}", "Location".bold(), location.as_string());

    Ok(())
}

fn cmd_theme(state: &Path, name: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let prefs = open_preferences(state);

    if let Some(name) = name {
        let preset = ThemePreset::from_name(name).ok_or_else(|| {
            let names: Vec<_> = ThemePreset::ALL.iter().map(|p| p.name()).collect();
            format!("Unknown theme '{}' (expected one of: {})", name, names.join(", "))
        })?;
        prefs.set_theme(&ThemeSelection::Preset(preset));
        println!("{} {}", "Theme set to".green(), preset.name());
        return Ok(());
    }

    match prefs.theme() {
        ThemeSelection::Preset(preset) => println!("{}: {}", "Theme".bold(), preset.name()),
        ThemeSelection::Custom(vars) => {
            println!("{}: custom ({} variables)", "Theme".bold(), vars.len());
            for (key, value) in &vars {
                println!("  {} {} = {}", "├─".dimmed(), key, value);
            }
        }
    }
    println!("{}: {}px", "Outline width".bold(), prefs.outline_width());

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "folio".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Document library navigation tool");
    println!();
    println!("License: MIT");
}
