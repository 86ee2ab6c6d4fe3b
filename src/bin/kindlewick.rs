use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use kindlewick_avatar::{
    AvatarConfig, AvatarSession, Canvas, ConfigSource, ConfigState, CpuRenderer3d, DrawRequest,
    Fps, ManualScheduler, MaterialKind, OutlinePass, Renderer3d, SessionOpts, ShaderOptions,
    build_avatar_scene,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "kindlewick", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the flat avatar at one point in time as a PNG.
    Frame(FrameArgs),
    /// Render a PNG sequence of the idle animation.
    Frames(FramesArgs),
    /// Render the shaded sphere avatar as a PNG.
    Shade(ShadeArgs),
    /// Print a random avatar configuration as JSON.
    Random(RandomArgs),
    /// Report malformed colors and unknown style codes in a configuration.
    Validate(ValidateArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Avatar configuration JSON. Missing or unreadable files fall back to the default avatar.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Elapsed time in seconds.
    #[arg(long, default_value_t = 0.0)]
    t: f64,

    /// Square canvas size in pixels.
    #[arg(long, default_value_t = 300)]
    size: u32,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Also print the PNG as base64 on stdout.
    #[arg(long, default_value_t = false)]
    base64: bool,
}

#[derive(Parser, Debug)]
struct FramesArgs {
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Number of frames to render.
    #[arg(long, default_value_t = 60)]
    count: u64,

    #[arg(long, default_value_t = 300)]
    size: u32,

    /// Output directory; frames are written as `frame_0000.png`, ...
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct ShadeArgs {
    #[arg(long)]
    config: Option<PathBuf>,

    /// toon, cell_shade or watercolor.
    #[arg(long, default_value = "toon")]
    material: String,

    /// Shader options JSON (`{"toon": {...}, "cellShade": {...}, "watercolor": {...}}`).
    #[arg(long)]
    shader_options: Option<PathBuf>,

    /// Draw the silhouette outline pass.
    #[arg(long, default_value_t = false)]
    outline: bool,

    #[arg(long, default_value_t = 0.0)]
    t: f64,

    #[arg(long, default_value_t = 300)]
    size: u32,

    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RandomArgs {
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    #[arg(long)]
    config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Frames(args) => cmd_frames(args),
        Command::Shade(args) => cmd_shade(args),
        Command::Random(args) => cmd_random(args),
        Command::Validate(args) => cmd_validate(args),
    }
}

fn load_config(path: Option<&Path>) -> AvatarConfig {
    let Some(path) = path else {
        return AvatarConfig::default();
    };
    let source = ConfigSource::from_path(path);
    if let ConfigState::Ready { reason, .. } = source.state() {
        tracing::debug!(?reason, path = %path.display(), "config settled");
    }
    source.current()
}

fn square_opts(size: u32, fps: Fps) -> anyhow::Result<SessionOpts> {
    Ok(SessionOpts {
        canvas: Canvas::new(size, size)?,
        fps,
        clear_rgba: None,
    })
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref());
    let opts = square_opts(args.size, SessionOpts::default().fps)?;

    let mut sched = ManualScheduler::new(opts.fps);
    let mut session = AvatarSession::mount(opts, &mut sched)?;
    session.deliver_config(config);
    let surface = session
        .frame(args.t)
        .context("session stopped before the first frame")?;

    surface
        .write_png(&args.out)
        .with_context(|| format!("write png '{}'", args.out.display()))?;
    if args.base64 {
        println!("{}", surface.to_base64_png()?);
    }
    session.stop(&mut sched);

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref());
    let opts = square_opts(args.size, Fps::new(args.fps, 1)?)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let mut sched = ManualScheduler::new(opts.fps);
    let mut session = AvatarSession::mount(opts, &mut sched)?;
    session.deliver_config(config);

    let out_dir = args.out_dir.clone();
    let written = session.run(&mut sched, args.count, |n, _t, surface| {
        surface.write_png(&out_dir.join(format!("frame_{n:04}.png")))
    })?;
    session.stop(&mut sched);

    eprintln!("wrote {written} frames to {}", args.out_dir.display());
    Ok(())
}

fn cmd_shade(args: ShadeArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref());
    let kind: MaterialKind = args.material.parse()?;
    let shader_opts = match &args.shader_options {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read shader options '{}'", path.display()))?;
            serde_json::from_str::<ShaderOptions>(&text)
                .with_context(|| format!("parse shader options '{}'", path.display()))?
        }
        None => ShaderOptions::default(),
    };

    let mut avatar = build_avatar_scene(&config, kind, &shader_opts)?;
    avatar.animate(args.t);
    let camera = avatar.camera();

    let mut renderer = CpuRenderer3d::new();
    let surface = if args.outline {
        let mut pass = OutlinePass::new(&mut renderer, args.size, args.size)?;
        let target = pass.render(&mut renderer, &avatar.scene, &camera)?;
        let surface = renderer.read_pixels(target)?;
        pass.dispose(&mut renderer);
        surface
    } else {
        let target = renderer.create_target(args.size, args.size)?;
        renderer.render(
            &avatar.scene,
            &camera,
            &DrawRequest::new(target).cleared([0, 0, 0, 0]),
        )?;
        renderer.read_pixels(target)?
    };

    surface
        .write_png(&args.out)
        .with_context(|| format!("write png '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_random(args: RandomArgs) -> anyhow::Result<()> {
    let config = AvatarConfig::random(args.seed);
    println!("{}", config.to_json_string_pretty()?);
    Ok(())
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let config = AvatarConfig::from_path(&args.config)
        .with_context(|| format!("load config '{}'", args.config.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config '{}'", args.config.display()))?;
    eprintln!("ok {}", args.config.display());
    Ok(())
}
