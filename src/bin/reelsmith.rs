use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use rand::{SeedableRng, rngs::StdRng};
use rayon::prelude::*;
use reelsmith::{
    Anchor, AssetCategory, CanvasComposer, FontLibrary,
    OutputKind, OutputRecord, OverlayRequest, RotationLedger, Settings, TextFitter,
    TimelineComposer,
    content::{caption::truncate_chars, key_points::extract_key_points, quotes::QuoteBook},
    encode::{ffmpeg, still::save_frame},
    load_history,
    media::{
        discover::{MediaKindHint, list_media},
        probe::{SystemProbe, probe_segment, probe_track},
    },
};

/// Feed overlays keep at most this many characters of copy.
const POST_TEXT_CHARS: usize = 100;
/// Reel captions are shorter; they compete with the picture.
const REEL_TEXT_CHARS: usize = 80;

#[derive(Parser, Debug)]
#[command(name = "reelsmith", version, about = "Branded post and reel composer")]
struct Cli {
    /// Settings file (YAML, or JSON by extension).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Extra directory of .ttf/.otf fonts (repeatable).
    #[arg(long = "font-dir", global = true)]
    font_dirs: Vec<PathBuf>,

    /// Seed for asset rotation; random when omitted.
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Root holding previous outputs' *_metadata.json files.
    #[arg(long, global = true, default_value = "output")]
    history: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Wrap text to a pixel width and print the layout as JSON.
    Fit(FitArgs),
    /// Render a feed post: image plus text on a translucent panel.
    Post(PostArgs),
    /// Render a quote card on the brand background.
    QuoteCard(QuoteCardArgs),
    /// Compose a reel timeline and encode it (requires `ffmpeg`/`ffprobe` on PATH).
    Reel(ReelArgs),
    /// Pick assets from a pool, avoiding ones used in previous outputs.
    Pick(PickArgs),
    /// Render several feed posts in parallel from a text source.
    BatchPosts(BatchArgs),
}

#[derive(Parser, Debug)]
struct FitArgs {
    #[arg(long)]
    text: String,
    #[arg(long)]
    width: f32,
    #[arg(long, default_value_t = 20.0)]
    size: f32,
    /// Font family; defaults to the brand heading font.
    #[arg(long)]
    family: Option<String>,
}

#[derive(Parser, Debug)]
struct PostArgs {
    #[arg(long)]
    text: String,
    /// Base image; omitted means plain brand background.
    #[arg(long)]
    image: Option<PathBuf>,
    #[arg(long, default_value = "bottom")]
    anchor: Anchor,
    #[arg(long, default_value = "post")]
    theme: String,
    /// Output .jpg or .png.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct QuoteCardArgs {
    /// Quote text; picked from --quotes-file when omitted.
    #[arg(long)]
    quote: Option<String>,
    #[arg(long)]
    quotes_file: Option<PathBuf>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    author: Option<String>,
    #[arg(long, default_value = "quote")]
    theme: String,
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ReelArgs {
    /// Clip or still to include, in order (repeatable).
    #[arg(long = "clip")]
    clips: Vec<PathBuf>,
    /// Directory to draw additional clips from, least recently used first.
    #[arg(long)]
    clips_dir: Option<PathBuf>,
    #[arg(long, default_value_t = 3)]
    count: usize,
    /// Overlay near the start.
    #[arg(long)]
    intro: Option<String>,
    /// Overlay around the middle.
    #[arg(long)]
    closing: Option<String>,
    #[arg(long)]
    music: Option<PathBuf>,
    #[arg(long)]
    min: Option<f64>,
    #[arg(long)]
    max: Option<f64>,
    #[arg(long, default_value = "reel")]
    theme: String,
    /// Print the composed timeline as JSON instead of encoding.
    #[arg(long)]
    plan_only: bool,
    #[arg(long, required_unless_present = "plan_only")]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PickArgs {
    /// image, video, quote, health_benefit or music.
    #[arg(long)]
    category: AssetCategory,
    /// Media pool directory (image, video and music categories).
    #[arg(long)]
    dir: Option<PathBuf>,
    /// Quote file (quote category) or plain text (health_benefit category).
    #[arg(long)]
    from_file: Option<PathBuf>,
    #[arg(long, default_value_t = 1)]
    count: usize,
}

#[derive(Parser, Debug)]
struct BatchArgs {
    #[arg(long)]
    images_dir: PathBuf,
    /// Plain text whose key points become the post copy.
    #[arg(long)]
    text_file: PathBuf,
    #[arg(long, default_value_t = 3)]
    count: usize,
    #[arg(long, default_value = "bottom")]
    anchor: Anchor,
    #[arg(long, default_value = "batch")]
    theme: String,
    #[arg(long)]
    out_dir: PathBuf,
}

struct Env {
    settings: Settings,
    fonts: FontLibrary,
    rng: StdRng,
    history: PathBuf,
}

impl Env {
    fn load(cli: &Cli) -> anyhow::Result<Self> {
        let settings = Settings::load(cli.config.as_deref())?;
        settings.validate()?;
        let mut dirs = settings.fonts.dirs.clone();
        dirs.extend(cli.font_dirs.iter().cloned());
        let fonts = FontLibrary::from_dirs(&dirs, settings.fonts.fallback_family.as_deref());
        if fonts.is_empty() {
            tracing::debug!("no font files configured, resolving families from system fonts");
        }
        let rng = match cli.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            settings,
            fonts,
            rng,
            history: cli.history.clone(),
        })
    }

    fn ledger(&self) -> RotationLedger {
        let records = load_history(&self.history);
        let ledger = RotationLedger::from_records(&records);
        tracing::info!(records = records.len(), used = ledger.len(), "rotation ledger rebuilt");
        ledger
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut env = Env::load(&cli)?;
    match cli.cmd {
        Command::Fit(args) => cmd_fit(&mut env, args),
        Command::Post(args) => cmd_post(&mut env, args),
        Command::QuoteCard(args) => cmd_quote_card(&mut env, args),
        Command::Reel(args) => cmd_reel(&mut env, args),
        Command::Pick(args) => cmd_pick(&mut env, args),
        Command::BatchPosts(args) => cmd_batch_posts(&mut env, args),
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

fn path_id(p: &Path) -> String {
    p.to_string_lossy().into_owned()
}

/// Metadata lands next to the artifact as `<artifact stem>_metadata.json`.
fn write_metadata(record: &OutputRecord, out: &Path) -> anyhow::Result<()> {
    let dir = out.parent().unwrap_or_else(|| Path::new("."));
    let stem = out
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("{}_{}", record.theme, timestamp()));
    let path = record.write(dir, &stem)?;
    tracing::info!(path = %path.display(), "metadata written");
    Ok(())
}

fn cmd_fit(env: &mut Env, args: FitArgs) -> anyhow::Result<()> {
    let family = args
        .family
        .unwrap_or_else(|| env.settings.brand.fonts.heading.clone());
    let font = reelsmith::FontSpec::new(family, args.size);
    let layout =
        TextFitter::new(&mut env.fonts, env.settings.fit_config()).fit(&args.text, &font, args.width);
    println!("{}", serde_json::to_string_pretty(&layout)?);
    Ok(())
}

fn render_post(
    fonts: &mut FontLibrary,
    settings: &Settings,
    image: Option<&Path>,
    text: &str,
    anchor: Anchor,
    out: &Path,
) -> anyhow::Result<()> {
    let canvas = settings.post_canvas()?;
    let base = image
        .map(|p| image::open(p).with_context(|| format!("open image '{}'", p.display())))
        .transpose()?;
    let block = settings.text_block(
        truncate_chars(text, POST_TEXT_CHARS),
        settings.post_font(),
        canvas,
        anchor,
    );
    let comp = CanvasComposer::new(fonts, settings.fit_config(), settings.placement_config())
        .compose_image_post(base.as_ref(), &block, canvas)?;
    save_frame(&comp.frame, out)?;
    Ok(())
}

fn cmd_post(env: &mut Env, args: PostArgs) -> anyhow::Result<()> {
    render_post(
        &mut env.fonts,
        &env.settings,
        args.image.as_deref(),
        &args.text,
        args.anchor,
        &args.out,
    )?;
    let mut record = OutputRecord::new(&args.theme, OutputKind::Feed);
    record.image_source = args.image.as_deref().map(path_id);
    record.output = Some(path_id(&args.out));
    write_metadata(&record, &args.out)?;
    tracing::info!(out = %args.out.display(), "post rendered");
    Ok(())
}

fn cmd_quote_card(env: &mut Env, args: QuoteCardArgs) -> anyhow::Result<()> {
    let quote = match (args.quote, &args.quotes_file) {
        (Some(q), _) => q,
        (None, Some(path)) => {
            let book = QuoteBook::load(path)?;
            let pool: Vec<&str> = match args.category.as_deref() {
                Some(c) => book.by_category(c).iter().map(String::as_str).collect(),
                None => book.all(),
            };
            if pool.is_empty() {
                book.random(args.category.as_deref(), &mut env.rng).to_owned()
            } else {
                let ledger = env.ledger();
                let pick = ledger.select(AssetCategory::Quote, &pool, &mut env.rng)?;
                (*pick.item).to_owned()
            }
        }
        (None, None) => anyhow::bail!("pass --quote or --quotes-file"),
    };

    let settings = &env.settings;
    let canvas = settings.post_canvas()?;
    let quote_block = settings.quote_block(&quote, canvas);
    let author_block = args.author.as_deref().map(|a| settings.author_block(a, canvas));
    let comp = CanvasComposer::new(&mut env.fonts, settings.fit_config(), settings.placement_config())
        .compose_quote_card(&quote_block, author_block.as_ref(), canvas)?;
    save_frame(&comp.frame, &args.out)?;

    let mut record = OutputRecord::new(&args.theme, OutputKind::QuoteCard);
    record.quote = Some(quote);
    record.output = Some(path_id(&args.out));
    write_metadata(&record, &args.out)?;
    tracing::info!(out = %args.out.display(), "quote card rendered");
    Ok(())
}

fn cmd_reel(env: &mut Env, args: ReelArgs) -> anyhow::Result<()> {
    let settings = env.settings.clone();
    let canvas = settings.reel_canvas()?;
    let min = args.min.unwrap_or(settings.instagram.reel_duration.min);
    let max = args.max.unwrap_or(settings.instagram.reel_duration.max);

    let mut paths = args.clips.clone();
    if let Some(dir) = &args.clips_dir {
        let pool = list_media(dir, MediaKindHint::Video)?;
        if !pool.is_empty() && args.count > 0 {
            let ledger = env.ledger();
            let picked = ledger.select_many(AssetCategory::Video, &pool, args.count, &mut env.rng)?;
            paths.extend(picked.item.into_iter().cloned());
        }
    }
    let segments = paths
        .iter()
        .map(|p| probe_segment(&SystemProbe, p))
        .collect::<Result<Vec<_>, _>>()?;
    let music = args
        .music
        .as_deref()
        .map(|p| probe_track(&SystemProbe, p, 1.0))
        .transpose()?;

    let timeline = {
        let mut composer = TimelineComposer::new(
            &mut env.fonts,
            settings.fit_config(),
            settings.timeline_config(),
            canvas,
        );
        let mut overlays: Vec<OverlayRequest> = Vec::new();
        if let Some(text) = &args.intro {
            let block = settings.overlay_block(truncate_chars(text, REEL_TEXT_CHARS), canvas, Anchor::Top);
            overlays.push(composer.intro(block));
        }
        if let Some(text) = &args.closing {
            let block =
                settings.overlay_block(truncate_chars(text, REEL_TEXT_CHARS), canvas, Anchor::Bottom);
            overlays.push(composer.closing(block));
        }
        composer.compose(&segments, min, max, &overlays, music.as_ref())?
    };

    if args.plan_only {
        println!("{}", serde_json::to_string_pretty(&timeline)?);
        return Ok(());
    }
    let out = args
        .out
        .context("--out is required unless --plan-only is set")?;

    let mut cfg = ffmpeg::VideoEncodeConfig::new(&out, canvas.width, canvas.height, settings.instagram.fps);
    cfg.video_bitrate = settings.instagram.video_bitrate.clone();
    let mut composer =
        CanvasComposer::new(&mut env.fonts, settings.fit_config(), settings.placement_config());
    ffmpeg::encode_timeline(&mut composer, &timeline, canvas, &cfg)?;

    let mut record = OutputRecord::new(&args.theme, OutputKind::Reel);
    record.video_sources = paths.iter().map(|p| path_id(p)).collect();
    record.music_source = args.music.as_deref().map(path_id);
    record.output = Some(path_id(&out));
    let overlays: Vec<serde_json::Value> = timeline
        .overlays
        .iter()
        .map(|o| {
            serde_json::json!({
                "text": o.block.text,
                "start_time": o.start_sec,
                "duration": o.duration_sec,
            })
        })
        .collect();
    record
        .extra
        .insert("text_overlays".to_owned(), serde_json::Value::Array(overlays));
    write_metadata(&record, &out)?;
    Ok(())
}

fn cmd_pick(env: &mut Env, args: PickArgs) -> anyhow::Result<()> {
    let pool: Vec<String> = match args.category {
        AssetCategory::Image | AssetCategory::Video | AssetCategory::Music => {
            let dir = args
                .dir
                .as_deref()
                .context("--dir is required for media categories")?;
            let kind = match args.category {
                AssetCategory::Image => MediaKindHint::Image,
                AssetCategory::Video => MediaKindHint::Video,
                _ => MediaKindHint::Audio,
            };
            list_media(dir, kind)?.iter().map(|p| path_id(p)).collect()
        }
        AssetCategory::Quote => {
            let file = args.from_file.as_deref().context("--from-file is required for quotes")?;
            QuoteBook::load(file)?.all().into_iter().map(str::to_owned).collect()
        }
        AssetCategory::HealthBenefit => {
            let file = args
                .from_file
                .as_deref()
                .context("--from-file is required for health benefits")?;
            let text = std::fs::read_to_string(file)
                .with_context(|| format!("read '{}'", file.display()))?;
            extract_key_points(&text, usize::MAX)
        }
    };

    let ledger = env.ledger();
    let picked = ledger.select_many(args.category, &pool, args.count, &mut env.rng)?;
    if picked.exhausted {
        tracing::warn!(category = %args.category, pool = pool.len(), "pool exhausted, reusing assets");
    }
    for item in picked.item {
        println!("{item}");
    }
    Ok(())
}

fn cmd_batch_posts(env: &mut Env, args: BatchArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.text_file)
        .with_context(|| format!("read '{}'", args.text_file.display()))?;
    let points = extract_key_points(&text, args.count);
    anyhow::ensure!(
        !points.is_empty(),
        "no usable sentences in '{}'",
        args.text_file.display()
    );
    let images = list_media(&args.images_dir, MediaKindHint::Image)?;
    anyhow::ensure!(!images.is_empty(), "no images in '{}'", args.images_dir.display());

    // Snapshot history before any job writes new metadata.
    let ledger = env.ledger();
    let picked = ledger.select_many(AssetCategory::Image, &images, args.count, &mut env.rng)?;
    let stamp = timestamp();
    let jobs: Vec<(PathBuf, String, PathBuf)> = picked
        .item
        .into_iter()
        .zip(points.iter().cycle())
        .enumerate()
        .map(|(i, (img, point))| {
            let out = args
                .out_dir
                .join(format!("{}_{stamp}_{i:02}.jpg", args.theme));
            (img.clone(), point.clone(), out)
        })
        .collect();

    let sources = env.fonts.sources();
    let settings = &env.settings;
    let results: Vec<anyhow::Result<OutputRecord>> = jobs
        .par_iter()
        .map_init(
            || sources.open(),
            |fonts: &mut FontLibrary,
             (img, point, out): &(PathBuf, String, PathBuf)|
             -> anyhow::Result<OutputRecord> {
                render_post(fonts, settings, Some(img.as_path()), point, args.anchor, out)?;
                let mut record = OutputRecord::new(&args.theme, OutputKind::Feed);
                record.image_source = Some(path_id(img));
                record.health_benefit = Some(point.clone());
                record.output = Some(path_id(out));
                write_metadata(&record, out)?;
                Ok(record)
            },
        )
        .collect();

    let mut ok = 0usize;
    for ((_, _, out), result) in jobs.iter().zip(results) {
        match result {
            Ok(_) => {
                ok += 1;
                tracing::info!(out = %out.display(), "post rendered");
            }
            Err(e) => tracing::warn!(out = %out.display(), error = %e, "post failed, continuing"),
        }
    }
    tracing::info!(ok, failed = jobs.len() - ok, "batch finished");
    anyhow::ensure!(ok > 0 || jobs.is_empty(), "every post in the batch failed");
    Ok(())
}
