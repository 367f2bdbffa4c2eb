use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

use qrloom::{
    BackgroundSource, EcLevel, EncodeOpts, LayoutMode, MatrixEncoder as _, Preset, QrCodeEncoder,
    RenderJob, RenderOpts, RenderToFileOpts, ResizeFilter, Rgba8, StyleConfig,
};

#[derive(Parser, Debug)]
#[command(name = "qrloom", version)]
struct Cli {
    /// Log at debug level unless RUST_LOG is set.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a URL over a background image or animation.
    Render(RenderArgs),
    /// Run a JSON render job.
    Job(JobArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Payload to encode.
    #[arg(long)]
    url: String,

    /// Background image (GIF, PNG/APNG, WebP, JPEG, ...).
    #[arg(long)]
    background: PathBuf,

    /// Output path (.gif, or .png for still backgrounds).
    #[arg(long)]
    out: PathBuf,

    /// Starting style and layout; the flags below override it.
    #[arg(long, value_enum, default_value_t = PresetChoice::Classic)]
    preset: PresetChoice,

    #[arg(long, value_enum, default_value_t = EcChoice::H)]
    ec_level: EcChoice,

    /// Pixels per module. Selects scale-driven layout.
    #[arg(long, conflicts_with = "canvas_size")]
    scale: Option<u32>,

    /// Extra pixels around the quiet zone (scale-driven layout).
    #[arg(long, requires = "scale", default_value_t = 0)]
    extra_margin: u32,

    /// Canvas side in pixels. Selects size-driven layout.
    #[arg(long)]
    canvas_size: Option<u32>,

    /// Pixels reserved on each edge (size-driven layout).
    #[arg(long, requires = "canvas_size", default_value_t = 0)]
    border: u32,

    /// Quiet zone width in modules.
    #[arg(long)]
    quiet_zone: Option<u32>,

    /// Dark data module colour (#RRGGBB[AA]).
    #[arg(long)]
    dark: Option<Rgba8>,

    /// Light data module colour. Omit to leave light modules unpainted.
    #[arg(long)]
    light: Option<Rgba8>,

    #[arg(long)]
    finder_dark: Option<Rgba8>,

    #[arg(long)]
    finder_light: Option<Rgba8>,

    /// Fraction trimmed from each edge of a data dot, in [0, 0.5).
    #[arg(long)]
    padding: Option<f32>,

    /// Alpha applied to dark data modules, 0..=255.
    #[arg(long)]
    opacity: Option<u32>,

    /// Finder halo bleed in pixels.
    #[arg(long)]
    finder_bleed: Option<u32>,

    /// 1px ring colour around dark data dots.
    #[arg(long)]
    outline: Option<Rgba8>,

    /// Base canvas fill for size-driven layouts.
    #[arg(long)]
    base_fill: Option<Rgba8>,

    #[arg(long, value_enum, default_value_t = FilterChoice::Triangle)]
    filter: FilterChoice,

    /// Delay for frames without a timing hint, in milliseconds.
    #[arg(long, default_value_t = 50)]
    delay_ms: u32,

    /// Use --delay-ms for every frame.
    #[arg(long, default_value_t = false)]
    override_delays: bool,

    /// Repeats after the first play; 0 loops forever.
    #[arg(long, default_value_t = 0)]
    loop_count: u16,

    /// GIF quantiser speed, 1 (best) to 30 (fastest).
    #[arg(long, default_value_t = 10)]
    gif_speed: i32,

    /// Refuse to replace an existing output file.
    #[arg(long, default_value_t = false)]
    no_overwrite: bool,

    /// Composite frames in parallel.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Also write the bare overlay as a PNG.
    #[arg(long)]
    overlay_out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct JobArgs {
    /// Job JSON file.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PresetChoice {
    Classic,
    Translucent,
    Framed,
    Dots,
}

impl From<PresetChoice> for Preset {
    fn from(p: PresetChoice) -> Self {
        match p {
            PresetChoice::Classic => Preset::Classic,
            PresetChoice::Translucent => Preset::Translucent,
            PresetChoice::Framed => Preset::Framed,
            PresetChoice::Dots => Preset::Dots,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EcChoice {
    L,
    M,
    Q,
    H,
}

impl From<EcChoice> for EcLevel {
    fn from(e: EcChoice) -> Self {
        match e {
            EcChoice::L => EcLevel::L,
            EcChoice::M => EcLevel::M,
            EcChoice::Q => EcLevel::Q,
            EcChoice::H => EcLevel::H,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FilterChoice {
    Nearest,
    Triangle,
    Lanczos3,
}

impl From<FilterChoice> for ResizeFilter {
    fn from(f: FilterChoice) -> Self {
        match f {
            FilterChoice::Nearest => ResizeFilter::Nearest,
            FilterChoice::Triangle => ResizeFilter::Triangle,
            FilterChoice::Lanczos3 => ResizeFilter::Lanczos3,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Job(args) => cmd_job(args),
    }
}

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let default = if verbose { "qrloom=debug" } else { "qrloom=info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(default))
        .context("parse log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let preset = Preset::from(args.preset);
    let style = style_from_args(&args, preset);
    let layout = layout_from_args(&args, preset);

    let opts = RenderToFileOpts {
        render: RenderOpts {
            ec_level: args.ec_level.into(),
            filter: args.filter.into(),
            default_delay_ms: args.delay_ms,
            override_delays: args.override_delays,
            loop_count: args.loop_count,
            parallel: args.parallel,
            threads: args.threads,
        },
        encode: EncodeOpts {
            format: None,
            overwrite: !args.no_overwrite,
            gif_speed: args.gif_speed,
        },
    };

    let background = BackgroundSource::path(&args.background);
    let stats = qrloom::render_to_file(&args.url, &background, &style, layout, &args.out, &opts)
        .with_context(|| format!("render '{}'", args.out.display()))?;

    if let Some(path) = &args.overlay_out {
        write_overlay(&args.url, &style, layout, opts.render.ec_level, path)?;
        eprintln!("wrote {}", path.display());
    }

    eprintln!(
        "wrote {} ({} frame(s), {}x{} px, module {} px)",
        args.out.display(),
        stats.frames,
        stats.canvas_size,
        stats.canvas_size,
        stats.module_size
    );
    Ok(())
}

fn cmd_job(args: JobArgs) -> anyhow::Result<()> {
    let job = RenderJob::from_path(&args.in_path)
        .with_context(|| format!("load job '{}'", args.in_path.display()))?;
    let stats = job
        .run()
        .with_context(|| format!("run job '{}'", args.in_path.display()))?;
    eprintln!("wrote {} ({} frame(s))", job.out.display(), stats.frames);
    Ok(())
}

fn style_from_args(args: &RenderArgs, preset: Preset) -> StyleConfig {
    let mut style = preset.style();
    if let Some(c) = args.dark {
        style.dark_color = c;
    }
    if let Some(c) = args.light {
        style.light_color = Some(c);
    }
    if let Some(c) = args.finder_dark {
        style.finder_dark_color = c;
    }
    if let Some(c) = args.finder_light {
        style.finder_light_color = Some(c);
    }
    if let Some(p) = args.padding {
        style.data_padding_ratio = p;
    }
    if let Some(o) = args.opacity {
        style.opacity = o;
    }
    if let Some(b) = args.finder_bleed {
        style.finder_bleed_px = b;
    }
    if let Some(c) = args.outline {
        style.data_outline = Some(c);
    }
    if let Some(c) = args.base_fill {
        style.base_fill = c;
    }
    style
}

fn layout_from_args(args: &RenderArgs, preset: Preset) -> LayoutMode {
    let base = match (args.scale, args.canvas_size) {
        (Some(scale), _) => LayoutMode::Scale {
            scale,
            quiet_zone: preset.layout().quiet_zone(),
            extra_margin: args.extra_margin,
        },
        (None, Some(canvas_size)) => LayoutMode::FitCanvas {
            canvas_size,
            border: args.border,
            quiet_zone: preset.layout().quiet_zone(),
        },
        (None, None) => preset.layout(),
    };
    match args.quiet_zone {
        Some(qz) => base.with_quiet_zone(qz),
        None => base,
    }
}

fn write_overlay(
    url: &str,
    style: &StyleConfig,
    layout: LayoutMode,
    ec: EcLevel,
    path: &Path,
) -> anyhow::Result<()> {
    let matrix = QrCodeEncoder.encode(url, ec)?;
    let plan = qrloom::plan_layout(matrix.side(), layout)?;
    let overlay = qrloom::render_overlay(&matrix, &plan, style)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    overlay
        .to_rgba_image()
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}
