use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use quadrat_core::export;
use quadrat_core::manifest::{load_dataset, Manifest};
use quadrat_core::{compute_view, InteractionController, LeafId, ViewConfig};

#[derive(Parser, Debug)]
#[command(name = "quadrat-cli", about = "Treemap layout renderer")]
struct Args {
    /// Dataset file (a root record, or {title, description, data})
    dataset: Option<PathBuf>,
    /// Manifest listing the available sections
    #[arg(short, long, requires = "section", conflicts_with = "dataset")]
    manifest: Option<PathBuf>,
    /// Section id to render from the manifest
    #[arg(short, long)]
    section: Option<String>,
    #[arg(long, default_value_t = 960.0)]
    width: f64,
    #[arg(long, default_value_t = 600.0)]
    height: f64,
    /// JSON file overriding layout defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output JSON view path
    #[arg(short, long)]
    json: Option<PathBuf>,
    /// Output CSV tile table path
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Output SVG path
    #[arg(long)]
    svg: Option<PathBuf>,
    /// Print the tooltip for a pointer over a leaf, as ID@X,Y
    #[arg(long, value_parser = parse_hover)]
    hover: Option<(usize, f64, f64)>,
}

fn parse_hover(s: &str) -> Result<(usize, f64, f64), String> {
    let err = || format!("expected ID@X,Y, got `{s}`");
    let (id, pos) = s.split_once('@').ok_or_else(err)?;
    let (x, y) = pos.split_once(',').ok_or_else(err)?;
    Ok((
        id.trim().parse().map_err(|_| err())?,
        x.trim().parse().map_err(|_| err())?,
        y.trim().parse().map_err(|_| err())?,
    ))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("quadrat_core=info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            ViewConfig::from_json(&text).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => ViewConfig::default(),
    };

    let dataset = match (&args.dataset, &args.manifest, &args.section) {
        (Some(path), _, _) => load_dataset(path)?,
        (None, Some(manifest), Some(section)) => Manifest::open(manifest)?.load(section)?,
        _ => bail!("pass a dataset file or --manifest with --section"),
    };

    let view = compute_view(&dataset, args.width, args.height, &config)?;

    if let Some(path) = &args.json {
        let json = serde_json::to_string_pretty(&export::to_json(&view))?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!("Wrote view to {}", path.display());
    }
    if let Some(path) = &args.csv {
        let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
        export::to_csv(&view, file)?;
        tracing::info!("Wrote tiles to {}", path.display());
    }
    if let Some(path) = &args.svg {
        std::fs::write(path, export::to_svg(&view)).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!("Wrote SVG to {}", path.display());
    }

    println!(
        "{}: {} tiles, {} categories in {}x{}",
        if view.title.is_empty() { "untitled" } else { view.title.as_str() },
        view.tiles.len(),
        view.legend.len(),
        args.width,
        args.height
    );

    if let Some((id, x, y)) = args.hover {
        let mut controller = InteractionController::new(config.tooltip.clone());
        let update = controller.on_pointer_move(&view.tiles, LeafId(id), x, y);
        println!("{}", serde_json::to_string(&update.tooltip)?);
    }
    Ok(())
}
