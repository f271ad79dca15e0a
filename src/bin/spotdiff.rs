use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "spotdiff", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a job to MP4 (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Print the computed timeline as JSON without rendering.
    Schedule(ScheduleArgs),
    /// Render, then optionally upload.
    Pipeline(PipelineArgs),
    /// Upload an already rendered video.
    Publish(PublishArgs),
    /// Write a placeholder asset library and sample job.
    Fixtures(FixturesArgs),
}

#[derive(Parser, Debug)]
struct JobArgs {
    /// Job description JSON.
    #[arg(long)]
    job: PathBuf,

    /// Asset library directory.
    #[arg(long)]
    assets: PathBuf,
}

#[derive(Parser, Debug)]
struct EncodeArgs {
    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,

    /// Disable audio mixing for this render.
    #[arg(long, default_value_t = false)]
    no_audio: bool,

    /// Refuse to replace an existing output file.
    #[arg(long, default_value_t = false)]
    no_overwrite: bool,

    /// x264 preset.
    #[arg(long, default_value = "medium")]
    preset: String,

    /// First frame to render (inclusive).
    #[arg(long)]
    start_frame: Option<u64>,

    /// Last frame to render (exclusive).
    #[arg(long)]
    end_frame: Option<u64>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    job: JobArgs,

    /// Output MP4 path.
    #[arg(long, default_value = "out/spot_diff.mp4")]
    output: PathBuf,

    #[command(flatten)]
    encode: EncodeArgs,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    job: JobArgs,

    /// Time in seconds.
    #[arg(long)]
    at: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ScheduleArgs {
    #[command(flatten)]
    job: JobArgs,
}

#[derive(Parser, Debug)]
struct MetadataArgs {
    #[arg(long, default_value = spotdiff::DEFAULT_TITLE)]
    title: String,

    #[arg(long, default_value = "")]
    description: String,

    #[arg(long, num_args = 0.., default_values = spotdiff::DEFAULT_TAGS)]
    tags: Vec<String>,

    /// private, unlisted or public.
    #[arg(long, default_value = "private")]
    privacy: spotdiff::Privacy,
}

#[derive(Parser, Debug)]
struct PipelineArgs {
    #[command(flatten)]
    job: JobArgs,

    #[arg(long, default_value = "out/spot_diff.mp4")]
    output: PathBuf,

    /// Upload after rendering. Needs YOUTUBE_TOKEN_JSON and YOUTUBE_CLIENT_SECRETS_JSON.
    #[arg(long, default_value_t = false)]
    upload: bool,

    #[command(flatten)]
    meta: MetadataArgs,

    #[command(flatten)]
    encode: EncodeArgs,
}

#[derive(Parser, Debug)]
struct PublishArgs {
    /// Rendered MP4.
    #[arg(long)]
    video: PathBuf,

    #[command(flatten)]
    meta: MetadataArgs,
}

#[derive(Parser, Debug)]
struct FixturesArgs {
    /// Target directory.
    #[arg(long, default_value = "assets/dummy")]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Schedule(args) => cmd_schedule(args),
        Command::Pipeline(args) => cmd_pipeline(args),
        Command::Publish(args) => cmd_publish(args),
        Command::Fixtures(args) => cmd_fixtures(args),
    }
}

fn load_program(args: &JobArgs) -> anyhow::Result<spotdiff::Program> {
    let job = spotdiff::Job::from_path(&args.job)
        .with_context(|| format!("load job '{}'", args.job.display()))?;
    let mut resolver = spotdiff::MediaResolver::new(
        spotdiff::AssetLibrary::new(&args.assets),
        spotdiff::CANVAS,
    );
    Ok(spotdiff::assemble_program(&job, &mut resolver)?)
}

fn render(program: &spotdiff::Program, output: &Path, args: &EncodeArgs) -> anyhow::Result<()> {
    let full = spotdiff::full_range(program)?;
    let range = spotdiff::FrameRange::new(
        spotdiff::FrameIndex(args.start_frame.unwrap_or(full.start.0)),
        spotdiff::FrameIndex(args.end_frame.unwrap_or(full.end.0)),
    )?;
    let opts = spotdiff::RenderOpts {
        threads: args.threads,
        audio: !args.no_audio,
        overwrite: !args.no_overwrite,
        preset: args.preset.clone(),
        ..spotdiff::RenderOpts::default()
    };
    let stats = spotdiff::render_to_mp4(program, output, range, &opts)?;
    eprintln!(
        "wrote {} ({} frames, {:.1}s)",
        output.display(),
        stats.frames_rendered,
        program.fps.frames_to_secs(range.len_frames())
    );
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let program = load_program(&args.job)?;
    render(&program, &args.output, &args.encode)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let program = load_program(&args.job)?;
    let mut compositor = spotdiff::Compositor::new(spotdiff::Rgba8::rgb(0, 0, 0));
    let frame = compositor.render(&program, args.at)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_schedule(args: ScheduleArgs) -> anyhow::Result<()> {
    let program = load_program(&args.job)?;
    let json = serde_json::to_string_pretty(&program.summary()).context("serialize schedule")?;
    println!("{json}");
    Ok(())
}

fn cmd_pipeline(args: PipelineArgs) -> anyhow::Result<()> {
    let credentials = if args.upload {
        Some(spotdiff::Credentials::from_env()?)
    } else {
        None
    };

    let program = load_program(&args.job)?;
    render(&program, &args.output, &args.encode)?;

    if let Some(credentials) = credentials {
        publish(credentials, &args.output, args.meta)?;
    }
    Ok(())
}

fn cmd_publish(args: PublishArgs) -> anyhow::Result<()> {
    let credentials = spotdiff::Credentials::from_env()?;
    publish(credentials, &args.video, args.meta)
}

fn publish(
    credentials: spotdiff::Credentials,
    video: &Path,
    meta: MetadataArgs,
) -> anyhow::Result<()> {
    use spotdiff::Publisher as _;

    let meta = spotdiff::VideoMetadata {
        title: meta.title,
        description: meta.description,
        tags: meta.tags,
        privacy: meta.privacy,
    };
    let mut publisher = spotdiff::YouTubePublisher::new(credentials)?;
    let id = publisher
        .publish(video, &meta)
        .with_context(|| format!("upload '{}'", video.display()))?;
    println!("{id}");
    Ok(())
}

fn cmd_fixtures(args: FixturesArgs) -> anyhow::Result<()> {
    let report = spotdiff::generate_fixtures(&args.out)?;
    eprintln!(
        "fixtures in {}: {} written, {} already present",
        args.out.display(),
        report.written.len(),
        report.skipped.len()
    );
    Ok(())
}
