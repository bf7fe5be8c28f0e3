//! Command-line boundary for the view composer.
//!
//! Loads the catalog once, turns flags into the same string-keyed options an
//! API request would carry, and prints the composed view as JSON on stdout.
//! Missing entities exit with status 2; every other failure exits with 1.
//! Diagnostics go to stderr through `tracing` (`RUST_LOG` controls the level).

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use schema_views::options::{EXTENSION_PARAM, EXTENSIONS_PARAM, OBJECTS_PARAM, PROFILES_PARAM};
use schema_views::{
    CatalogIndex, EntityKind, RequestOptions, ViewComposer, ViewError, ViewOptions,
    resolve_catalog_path,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "schema-view", about = "Render JSON views of schema catalog entries")]
struct Cli {
    /// Catalog file (defaults to $SCHEMA_VIEWS_CATALOG, then the bundled catalog)
    #[arg(long, value_name = "PATH")]
    catalog: Option<PathBuf>,

    /// Comma-separated extensions to include
    #[arg(long, value_name = "LIST")]
    extensions: Option<String>,

    /// Comma-separated active profiles; pass an empty string to disable all
    #[arg(long, value_name = "LIST")]
    profiles: Option<String>,

    /// Set to 1 to expand nested object types
    #[arg(long, value_name = "FLAG")]
    objects: Option<String>,

    /// Extension that qualifies the identifier
    #[arg(long, value_name = "NAME")]
    extension: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show a single class or object
    Show {
        #[arg(value_parser = parse_kind)]
        kind: EntityKind,
        identifier: String,
    },
    /// Show a category and its classes in the selected extensions
    Category { identifier: String },
    /// List every class, object, or category in scope
    List {
        #[arg(value_parser = parse_kind)]
        kind: EntityKind,
    },
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        if let Some(ViewError::NotFound(_)) = err.downcast_ref::<ViewError>() {
            eprintln!("{err}");
            std::process::exit(2);
        }
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let catalog_path = resolve_catalog_path(cli.catalog.clone())?;
    let index = CatalogIndex::load(&catalog_path)?;
    let composer = ViewComposer::new(&index);
    let options = RequestOptions::from_params(&request_params(&cli));
    let scope = options.extension.as_deref();

    match &cli.command {
        Command::Show { kind, identifier } => {
            if *kind == EntityKind::Category {
                bail!("use the 'category' command for categories");
            }
            let view = composer.resolve_view(*kind, scope, identifier, &options.view_options())?;
            print_json(&view, cli.pretty)
        }
        Command::Category { identifier } => {
            let options = ViewOptions {
                include_nested_objects: false,
                ..options.view_options()
            };
            let view = composer.resolve_view(EntityKind::Category, scope, identifier, &options)?;
            print_json(&view, cli.pretty)
        }
        Command::List { kind } => {
            let views =
                composer.list_views(*kind, &options.extensions, options.profiles.as_ref())?;
            print_json(&views, cli.pretty)
        }
    }
}

/// Raw options exactly as a request would carry them.
fn request_params(cli: &Cli) -> BTreeMap<String, String> {
    [
        (EXTENSIONS_PARAM, &cli.extensions),
        (PROFILES_PARAM, &cli.profiles),
        (OBJECTS_PARAM, &cli.objects),
        (EXTENSION_PARAM, &cli.extension),
    ]
    .into_iter()
    .filter_map(|(key, value)| value.clone().map(|value| (key.to_string(), value)))
    .collect()
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{rendered}");
    Ok(())
}

fn parse_kind(raw: &str) -> Result<EntityKind, String> {
    EntityKind::parse(raw)
        .ok_or_else(|| format!("unknown kind '{raw}' (expected class|object|category)"))
}
