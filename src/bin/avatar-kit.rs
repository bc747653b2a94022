use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context as _;
use avatar_kit::{
    Avatar, AvatarSize, AvatarSource, Completion, CpuBackend, FetchError, FileFetcher, FrameRGBA,
    GroupSpec, ImageFetcher, LoadMailbox, MountOptions, RenderBackend, RenderSettings,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "avatar-kit", version)]
struct Cli {
    /// Device pixels per layout unit.
    #[arg(long, global = true, default_value_t = 1.0)]
    scale: f64,

    /// Extra font directory (repeatable).
    #[arg(long = "font-dir", global = true)]
    font_dirs: Vec<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one initials avatar as a PNG.
    Avatar(AvatarArgs),
    /// Render a group description JSON as a PNG.
    Group(GroupArgs),
}

#[derive(Parser, Debug)]
struct AvatarArgs {
    /// Display name.
    #[arg(long)]
    name: String,

    /// `large`, `medium`, `small`, `extra_small` or a diameter.
    #[arg(long, default_value = "medium")]
    size: AvatarSize,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct GroupArgs {
    /// Input group description JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// How long to wait for remote images before rendering what is there.
    #[arg(long, default_value_t = 5_000)]
    wait_ms: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = RenderSettings {
        scale: cli.scale,
        font_dirs: cli.font_dirs,
        ..RenderSettings::default()
    };
    match cli.cmd {
        Command::Avatar(args) => cmd_avatar(args, settings),
        Command::Group(args) => cmd_group(args, settings),
    }
}

fn cmd_avatar(args: AvatarArgs, settings: RenderSettings) -> anyhow::Result<()> {
    let scene = Avatar::new(AvatarSource::name(args.name), args.size).scene();
    let mut backend = CpuBackend::new(settings)?;
    let frame = backend.render_scene(&scene)?;
    write_png(&frame, &args.out)
}

fn cmd_group(args: GroupArgs, settings: RenderSettings) -> anyhow::Result<()> {
    let spec = GroupSpec::from_path(&args.in_path)?;
    let clear = spec.background_rgba()?;
    let group = spec
        .build()
        .with_context(|| format!("load group '{}'", args.in_path.display()))?;

    let mailbox = LoadMailbox::new();
    let fetcher = CliFetcher::new()?;
    let options = MountOptions::default().with_failure_fade(Duration::ZERO);
    let mounted = group.mount(&fetcher, &mailbox, options);

    let deadline = Instant::now() + Duration::from_millis(args.wait_ms);
    mailbox.settle(deadline);
    if mailbox.pending() > 0 {
        tracing::warn!(pending = mailbox.pending(), "rendering before all remote images arrived");
    }

    let mut backend = CpuBackend::new(settings.with_clear_rgba(clear))?;
    let frame = backend.render_scene(&mounted.scene())?;
    write_png(&frame, &args.out)
}

/// Dispatches on URL scheme: local files inline, HTTP(S) on the pool when built with `http`.
struct CliFetcher {
    #[cfg(feature = "http")]
    http: avatar_kit::HttpFetcher,
}

impl CliFetcher {
    fn new() -> anyhow::Result<Self> {
        Ok(Self {
            #[cfg(feature = "http")]
            http: avatar_kit::HttpFetcher::http(&avatar_kit::HttpFetcherOpts::default())
                .context("create http fetcher")?,
        })
    }
}

impl ImageFetcher for CliFetcher {
    fn fetch(&self, url: &Url, completion: Completion) {
        match url.scheme() {
            "file" => FileFetcher.fetch(url, completion),
            #[cfg(feature = "http")]
            "http" | "https" => self.http.fetch(url, completion),
            other => completion.complete(Err(FetchError::UnsupportedScheme(other.to_owned()))),
        }
    }
}

fn write_png(frame: &FrameRGBA, out: &Path) -> anyhow::Result<()> {
    if frame.width == 0 || frame.height == 0 {
        anyhow::bail!("nothing to render: no visible avatars");
    }
    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        out,
        &frame.to_straight_rgba8(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", out.display()))?;

    eprintln!("wrote {}", out.display());
    Ok(())
}
