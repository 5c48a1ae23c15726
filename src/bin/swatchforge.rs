use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use swatchforge::{
    AdvanceMeasure, ArcGeometry, CanvasData, DirAssetStore, HeadlessRenderer, HttpImageSource,
    JobOrchestrator, PaletteBook, PipelineConfig, PipelineController, ShopifyClient, ShopifyConfig,
    SqliteStore, Template, TemplateStore, TextMeasure as _, ThumbnailRenderer, Worker,
    WorkerContext,
    render::fonts::build_fontdb, scene::model::TextStyle, substitute_canvas,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "swatchforge", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the front face of a scene document to PNG.
    Render(RenderArgs),
    /// Re-color a scene document from one palette chip to another.
    Substitute(SubstituteArgs),
    /// Print the arc geometry of a curved text as JSON.
    Arc(ArcArgs),
    /// Store a master template.
    Import(ImportArgs),
    /// Queue generation of every color variant of a master template.
    Enqueue(EnqueueArgs),
    /// Print the status of a job.
    Status(StatusArgs),
    /// Run the background worker until Ctrl-C.
    Worker(WorkerArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input scene JSON (one document or a front/back pair).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Longer side of the output, in pixels.
    #[arg(long)]
    max_px: Option<u32>,

    /// Directory relative image paths resolve against (default: the input's directory).
    #[arg(long)]
    image_dir: Option<PathBuf>,

    /// Extra font directories.
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,

    /// Per-image fetch timeout in milliseconds.
    #[arg(long, default_value_t = 10_000)]
    image_timeout_ms: u64,
}

#[derive(Parser, Debug)]
struct SubstituteArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Palette book JSON.
    #[arg(long)]
    palettes: PathBuf,

    /// Source chip.
    #[arg(long)]
    from: String,

    /// Target chip.
    #[arg(long)]
    to: String,

    /// Output path (default: stdout).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ArcArgs {
    /// Text laid on the arc.
    #[arg(long)]
    text: String,

    /// Font size in pixels.
    #[arg(long, default_value_t = 32.0)]
    font_size: f64,

    /// Font family.
    #[arg(long, default_value = "Arial")]
    font_family: String,

    /// Bold text.
    #[arg(long)]
    bold: bool,

    /// Arc radius.
    #[arg(long)]
    radius: f64,

    /// Arc bows downward.
    #[arg(long)]
    flipped: bool,

    /// Pinned edge position.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    top_y: f64,
}

#[derive(Parser, Debug)]
struct DbArgs {
    /// SQLite database holding jobs and templates.
    #[arg(long)]
    db: PathBuf,

    /// Owning shop.
    #[arg(long)]
    shop: String,
}

#[derive(Parser, Debug)]
struct ImportArgs {
    #[command(flatten)]
    db: DbArgs,

    /// Template name.
    #[arg(long)]
    name: String,

    /// Canvas JSON.
    #[arg(long)]
    canvas: PathBuf,

    /// Color chip of the design.
    #[arg(long)]
    chip: String,

    /// Pattern of the design, for products with a pattern option.
    #[arg(long)]
    pattern: Option<String>,
}

#[derive(Parser, Debug)]
struct EnqueueArgs {
    #[command(flatten)]
    db: DbArgs,

    /// Master template id.
    #[arg(long)]
    master: String,

    /// Platform product id.
    #[arg(long)]
    product: String,
}

#[derive(Parser, Debug)]
struct StatusArgs {
    #[command(flatten)]
    db: DbArgs,

    /// Job id.
    #[arg(long)]
    job: String,
}

#[derive(Parser, Debug)]
struct WorkerArgs {
    /// SQLite database holding jobs and templates.
    #[arg(long)]
    db: PathBuf,

    /// Pipeline config JSON (default: built-in defaults).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Palette book JSON.
    #[arg(long)]
    palettes: PathBuf,

    /// Directory thumbnails are written to.
    #[arg(long)]
    assets_dir: PathBuf,

    /// Public URL prefix of `--assets-dir`.
    #[arg(long)]
    assets_url: String,

    /// Extra font directories.
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,

    #[command(flatten)]
    shopify: ShopifyConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args).await,
        Command::Substitute(args) => cmd_substitute(args),
        Command::Arc(args) => cmd_arc(args),
        Command::Import(args) => cmd_import(args),
        Command::Enqueue(args) => cmd_enqueue(args).await,
        Command::Status(args) => cmd_status(args),
        Command::Worker(args) => cmd_worker(args).await,
    }
}

fn read_canvas(path: &Path) -> anyhow::Result<CanvasData> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read scene '{}'", path.display()))?;
    Ok(CanvasData::from_json(&text)?)
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let canvas = read_canvas(&args.in_path)?;
    let root = match args.image_dir {
        Some(dir) => dir,
        None => args
            .in_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf(),
    };
    let timeout = std::time::Duration::from_millis(args.image_timeout_ms);
    let images = HttpImageSource::new(timeout)?.with_root(root);
    let fonts = build_fontdb(&args.font_dirs, true);
    let renderer = HeadlessRenderer::new(fonts, Arc::new(AdvanceMeasure))
        .with_max_px(args.max_px);
    let thumbs = ThumbnailRenderer::new(Arc::new(renderer), Arc::new(images), timeout);

    let png = thumbs.render(canvas.front()).await?;
    write_output(&args.out, &png)?;
    tracing::info!(out = %args.out.display(), bytes = png.len(), "rendered");
    Ok(())
}

fn cmd_substitute(args: SubstituteArgs) -> anyhow::Result<()> {
    let canvas = read_canvas(&args.in_path)?;
    let book = PaletteBook::load(&args.palettes)?;
    let (source, target) = (book.require(&args.from)?, book.require(&args.to)?);
    let (out, stats) = substitute_canvas(&canvas, source, target);
    tracing::info!(visited = stats.visited, replaced = stats.replaced, "substituted");

    let json = out.to_json()?;
    match &args.out {
        Some(path) => write_output(path, json.as_bytes()),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}

fn cmd_arc(args: ArcArgs) -> anyhow::Result<()> {
    let mut style = TextStyle::sized(args.font_size);
    style.font_family = args.font_family;
    if args.bold {
        style.font_weight = "bold".to_string();
    }
    let text_len = AdvanceMeasure.text_width(
        &args.text,
        &style.font_family,
        style.font_size,
        style.is_bold(),
    );
    let arc = ArcGeometry::compute(text_len, args.radius, args.flipped, args.top_y)?;
    print_json(&serde_json::json!({
        "textLength": text_len,
        "geometry": arc,
        "path": arc.svg_path(),
        "bounds": arc.bounds(),
    }))
}

fn cmd_import(args: ImportArgs) -> anyhow::Result<()> {
    let store = SqliteStore::open(&args.db.db)?;
    let canvas = read_canvas(&args.canvas)?;
    let template =
        Template::new_master(args.db.shop, args.name, canvas, Some(args.chip), args.pattern)?;
    store.insert(&template)?;
    println!("{}", template.id);
    Ok(())
}

fn controller(db: &Path) -> anyhow::Result<PipelineController> {
    let store = Arc::new(SqliteStore::open(db)?);
    let orchestrator = Arc::new(JobOrchestrator::new(store.clone()));
    Ok(PipelineController::new(orchestrator, store))
}

async fn cmd_enqueue(args: EnqueueArgs) -> anyhow::Result<()> {
    let controller = controller(&args.db.db)?;
    let job = controller
        .enqueue_generation(&args.db.shop, &args.master, &args.product)
        .await?;
    print_json(&job.view())
}

fn cmd_status(args: StatusArgs) -> anyhow::Result<()> {
    let controller = controller(&args.db.db)?;
    print_json(&controller.status(&args.job, &args.db.shop)?)
}

async fn cmd_worker(args: WorkerArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    let store = Arc::new(SqliteStore::open(&args.db)?);
    let orchestrator = Arc::new(JobOrchestrator::new(store.clone()));
    let platform = ShopifyClient::new(&args.shopify, config.remote_timeout())?;
    let fonts = build_fontdb(&args.font_dirs, true);
    let renderer = HeadlessRenderer::new(fonts, Arc::new(AdvanceMeasure))
        .with_max_px(Some(config.thumbnail_max_px));
    let images = HttpImageSource::new(config.image_timeout())?;

    let worker = Worker::new(WorkerContext {
        orchestrator,
        templates: store,
        palettes: Arc::new(PaletteBook::load(&args.palettes)?),
        platform: Arc::new(platform),
        assets: Arc::new(DirAssetStore::new(&args.assets_dir, args.assets_url.clone())),
        thumbnails: ThumbnailRenderer::new(
            Arc::new(renderer),
            Arc::new(images),
            config.image_timeout(),
        ),
        config,
    })?;

    worker
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "ctrl-c handler unavailable");
            }
        })
        .await?;
    Ok(())
}
