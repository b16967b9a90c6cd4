use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use warpmorph::{
    CancelToken, DistortionParams, Ease, Fps, FrameSink, FrameSource, MorphParams, NoiseParams,
    Point, Progress, RunOpts, WaveAxes, WaveComponent, WaveParams, WaveShape,
};

#[derive(Parser, Debug)]
#[command(name = "warpmorph", version, about = "Animated image distortion and morphing")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Animate a wave or noise distortion of one image.
    Distort(DistortArgs),
    /// Morph between two images through corresponding control points.
    Morph(MorphArgs),
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Output path: .mp4/.webm/.gif/.webp (needs `ffmpeg` on PATH), or a directory (trailing `/`
    /// or no extension) for a PNG sequence.
    #[arg(long)]
    out: PathBuf,

    /// Number of frames to generate.
    #[arg(long, default_value_t = 30)]
    frames: u64,

    /// Display duration of one frame in milliseconds (0 = 25 fps).
    #[arg(long, default_value_t = 40)]
    frame_ms: u32,

    /// Render frames in parallel.
    #[arg(long)]
    parallel: bool,

    /// Worker threads for --parallel.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct DistortArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    #[arg(long, value_enum, default_value_t = EffectChoice::Wave)]
    effect: EffectChoice,

    #[arg(long, value_enum, default_value_t = ShapeChoice::Sine)]
    shape: ShapeChoice,

    #[arg(long, value_enum, default_value_t = AxesChoice::Both)]
    axes: AxesChoice,

    /// Peak displacement in pixels.
    #[arg(long)]
    amplitude: Option<f64>,

    /// Wave cycles across the image.
    #[arg(long)]
    frequency: Option<f64>,

    /// Starting wave phase (radians).
    #[arg(long, default_value_t = 0.0)]
    phase: f64,

    /// Wave phase advance per frame (radians).
    #[arg(long, conflicts_with = "loop_cycles")]
    phase_step: Option<f64>,

    /// Complete this many wave periods over the run so it loops.
    #[arg(long)]
    loop_cycles: Option<f64>,

    /// Horizontal (`dx`) wave shape; any `--h-*` flag gives `dx` its own wave, starting from the
    /// shared values and ignoring `--axes`.
    #[arg(long, value_enum)]
    h_shape: Option<ShapeChoice>,

    #[arg(long)]
    h_amplitude: Option<f64>,

    #[arg(long)]
    h_frequency: Option<f64>,

    #[arg(long)]
    h_phase_step: Option<f64>,

    /// Vertical (`dy`) wave shape; `--v-*` flags work like `--h-*`.
    #[arg(long, value_enum)]
    v_shape: Option<ShapeChoice>,

    #[arg(long)]
    v_amplitude: Option<f64>,

    #[arg(long)]
    v_frequency: Option<f64>,

    #[arg(long)]
    v_phase_step: Option<f64>,

    /// Noise lattice cells per pixel.
    #[arg(long)]
    scale: Option<f64>,

    #[arg(long, default_value_t = 0)]
    seed: u32,

    /// Noise time advance per frame.
    #[arg(long)]
    time_step: Option<f64>,

    /// Make the noise animation loop seamlessly.
    #[arg(long)]
    looped: bool,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser, Debug)]
struct MorphArgs {
    /// Start image.
    #[arg(long)]
    from: PathBuf,

    /// End image.
    #[arg(long)]
    to: PathBuf,

    /// JSON file `{ "start": [[x, y], ...], "end": [[x, y], ...] }`.
    #[arg(long)]
    points: PathBuf,

    /// Easing curve for the morph parameter (e.g. linear, in-quad, in-out-cubic).
    #[arg(long, value_parser = parse_ease)]
    ease: Option<Ease>,

    /// Switch color at the halfway frame instead of cross-dissolving.
    #[arg(long)]
    no_cross_dissolve: bool,

    /// Resize the end image to the start image's dimensions.
    #[arg(long)]
    resize_end: bool,

    /// Do not add image corners and edge midpoints to the point sets.
    #[arg(long)]
    no_boundary: bool,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EffectChoice {
    Wave,
    Noise,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ShapeChoice {
    Sine,
    Triangle,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AxesChoice {
    Both,
    Horizontal,
    Vertical,
}

#[derive(serde::Deserialize, Debug)]
struct PointsFile {
    start: Vec<[f64; 2]>,
    end: Vec<[f64; 2]>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Distort(args) => cmd_distort(args),
        Command::Morph(args) => cmd_morph(args),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_ease(s: &str) -> Result<Ease, String> {
    s.parse::<Ease>().map_err(|e| e.to_string())
}

fn cmd_distort(args: DistortArgs) -> anyhow::Result<()> {
    let image = warpmorph::load_image(&args.in_path)?;
    let frames = args.output.frames;

    let params = match args.effect {
        EffectChoice::Wave => {
            let d = WaveParams::default();
            let phase_step = match (args.phase_step, args.loop_cycles) {
                (Some(step), _) => step,
                (None, Some(cycles)) => warpmorph::phase_step_for_loop(frames, cycles),
                (None, None) => d.phase_step,
            };
            let shared = WaveParams {
                shape: args.shape.into(),
                amplitude: args.amplitude.unwrap_or(d.amplitude),
                frequency: args.frequency.unwrap_or(d.frequency),
                phase: args.phase,
                phase_step,
                axes: match args.axes {
                    AxesChoice::Both => WaveAxes::Both,
                    AxesChoice::Horizontal => WaveAxes::Horizontal,
                    AxesChoice::Vertical => WaveAxes::Vertical,
                },
                ..d
            };
            let base = shared.shared();
            DistortionParams::Wave(WaveParams {
                horizontal: axis_override(
                    base,
                    args.h_shape,
                    args.h_amplitude,
                    args.h_frequency,
                    args.h_phase_step,
                ),
                vertical: axis_override(
                    base,
                    args.v_shape,
                    args.v_amplitude,
                    args.v_frequency,
                    args.v_phase_step,
                ),
                ..shared
            })
        }
        EffectChoice::Noise => {
            let d = NoiseParams::default();
            DistortionParams::Noise(NoiseParams {
                amplitude: args.amplitude.unwrap_or(d.amplitude),
                scale: args.scale.unwrap_or(d.scale),
                seed: args.seed,
                time_step: args.time_step.unwrap_or(d.time_step),
                looped: args.looped,
                ..d
            })
        }
    };

    let source = warpmorph::generate_distortion_frames(&image, params, frames)?.into_source();
    run(&source, &args.output)
}

impl From<ShapeChoice> for WaveShape {
    fn from(c: ShapeChoice) -> Self {
        match c {
            ShapeChoice::Sine => WaveShape::Sine,
            ShapeChoice::Triangle => WaveShape::Triangle,
        }
    }
}

fn axis_override(
    base: WaveComponent,
    shape: Option<ShapeChoice>,
    amplitude: Option<f64>,
    frequency: Option<f64>,
    phase_step: Option<f64>,
) -> Option<WaveComponent> {
    if shape.is_none() && amplitude.is_none() && frequency.is_none() && phase_step.is_none() {
        return None;
    }
    Some(WaveComponent {
        shape: shape.map_or(base.shape, WaveShape::from),
        amplitude: amplitude.unwrap_or(base.amplitude),
        frequency: frequency.unwrap_or(base.frequency),
        phase: base.phase,
        phase_step: phase_step.unwrap_or(base.phase_step),
    })
}

fn cmd_morph(args: MorphArgs) -> anyhow::Result<()> {
    let start = warpmorph::load_image(&args.from)?;
    let mut end = warpmorph::load_image(&args.to)?;
    if args.resize_end && end.dimensions() != start.dimensions() {
        let (w, h) = start.dimensions();
        end = warpmorph::resize_image(&end, w, h)?;
    }

    let pts = read_points_json(&args.points)?;
    let to_points = |raw: &[[f64; 2]]| -> Vec<Point> {
        raw.iter().map(|&[x, y]| Point::new(x, y)).collect()
    };
    let (mut sp, mut ep) = (to_points(&pts.start), to_points(&pts.end));
    if !args.no_boundary {
        let (w, h) = start.dimensions();
        (sp, ep) = warpmorph::with_boundary_point_pair(&sp, &ep, w, h)?;
    }

    let params = MorphParams {
        frame_count: args.output.frames,
        ease: args.ease,
        cross_dissolve: !args.no_cross_dissolve,
    };
    let source = warpmorph::generate_morph_frames(&start, &sp, &end, &ep, params)?.into_source();
    tracing::info!(
        triangles = source.blender().triangulation().len(),
        "triangulated control points"
    );
    run(&source, &args.output)
}

fn read_points_json(path: &Path) -> anyhow::Result<PointsFile> {
    let f = File::open(path).with_context(|| format!("open points '{}'", path.display()))?;
    let r = BufReader::new(f);
    let pts: PointsFile = serde_json::from_reader(r).with_context(|| "parse points JSON")?;
    Ok(pts)
}

fn run<S: FrameSource>(source: &S, out: &OutputArgs) -> anyhow::Result<()> {
    let mut sink: Box<dyn FrameSink> = warpmorph::sink_for_path(&out.out)?;
    let opts = RunOpts {
        parallel: out.parallel,
        threads: out.threads,
        fps: Fps::from_frame_duration_ms(out.frame_ms),
        ..RunOpts::default()
    };
    let total = source.frame_count();
    let mut report = |p: Progress| {
        tracing::debug!(frame = p.frame_index.0 + 1, total = p.total_frames, "frame written");
    };

    let stats = warpmorph::run_to_sink(
        source,
        sink.as_mut(),
        &opts,
        &CancelToken::new(),
        &mut report,
    )
    .with_context(|| format!("write '{}'", out.out.display()))?;

    eprintln!(
        "wrote {}/{} frames to {}",
        stats.frames_delivered,
        total,
        out.out.display()
    );
    Ok(())
}
