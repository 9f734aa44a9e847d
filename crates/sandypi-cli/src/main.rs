//! sandypi: generate, preview and upload sand table drawings.
//!
//! Drives the whole pipeline from the command line: pattern generation,
//! table-aware coordinate transform and clipping, G-code serialization,
//! and the table's drawings API.
//!
//! # Usage
//!
//! ```text
//! sandypi [--settings <FILE>] [--server <URL>] <COMMAND>
//!
//! sandypi generate rose --params '{"petals": 7}' -o rose.gcode
//! sandypi layers --config-json "$(cat doc.json)" --upload ""
//! sandypi spirograph --moving-teeth 30 --svg gears.svg
//! sandypi upload rose.gcode
//! sandypi preview 12 --svg stored.svg
//! sandypi corners
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use sandypi_export::{
    DEFAULT_FEEDRATE, GcodeMetadata, GcodeOptions, SvgMetadata, to_gcode, to_preview_svg, to_svg,
};
use sandypi_io::{
    HttpDrawingsApi, IoError, LogNotifier, PreviewState, Uploader, download, fetch_for_preview,
};
use sandypi_pipeline::playback::{GearConfig, GearMode};
use sandypi_pipeline::table::format_coordinate;
use sandypi_pipeline::{
    CoordinateSpace, LayerAction, MirrorMode, PatternBuilder, PatternError, PatternKind,
    Polyline, TableConfig, TransformPatch, kaleidoscope, to_machine_paths,
};

/// Generate, preview and upload sand table drawings.
#[derive(Parser)]
#[command(name = "sandypi", version)]
struct Cli {
    /// Device settings JSON file (the table's saved settings document).
    ///
    /// Without it the default table geometry is used.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Base URL of the table server.
    #[arg(long, global = true, default_value = "http://localhost:5000")]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a single pattern.
    Generate(GenerateArgs),
    /// Render a full pattern-builder document.
    Layers(LayersArgs),
    /// Draw a gear spirograph.
    Spirograph(SpirographArgs),
    /// Upload an existing G-code file.
    Upload {
        /// G-code file to upload.
        file: PathBuf,

        /// Drawing name; defaults to the file name.
        #[arg(long)]
        name: Option<String>,
    },
    /// Fetch a stored drawing and check that it parses.
    Preview {
        /// Drawing id on the server.
        id: u64,

        /// Write the preview as SVG.
        #[arg(long)]
        svg: Option<PathBuf>,

        /// Longest side of the preview canvas in pixels.
        #[arg(long, default_value_t = 600.0)]
        size: f64,
    },
    /// Print which machine coordinate sits under each screen corner.
    Corners,
}

/// Where the generated drawing goes.
#[derive(Args, Clone)]
struct OutputArgs {
    /// Write G-code to this file instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Also save the G-code into this directory under the drawing name.
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Also write an SVG preview.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Upload to the table under this name (empty for a generated name).
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    upload: Option<String>,

    /// Linear move feedrate.
    #[arg(long)]
    feedrate: Option<f64>,

    /// Emit coordinates as transformed, without clipping to the drawing area.
    #[arg(long)]
    no_clip: bool,

    /// Longest side of the SVG preview canvas in pixels.
    #[arg(long, default_value_t = 600.0)]
    preview_size: f64,
}

/// Pattern selection for `generate`.
#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    /// Many-sided polygon.
    Circle,
    /// Regular polygon.
    Polygon,
    /// Archimedean or Fermat spiral.
    Spiral,
    /// Rose curve.
    Rose,
    /// Epitrochoid.
    Spirograph,
    /// Star polygon.
    Star,
    /// Lissajous figure.
    Lissajous,
    /// Single-stroke text.
    Text,
}

impl From<Kind> for PatternKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Circle => Self::Circle,
            Kind::Polygon => Self::Polygon,
            Kind::Spiral => Self::Spiral,
            Kind::Rose => Self::Rose,
            Kind::Spirograph => Self::Spirograph,
            Kind::Star => Self::Star,
            Kind::Lissajous => Self::Lissajous,
            Kind::Text => Self::Text,
        }
    }
}

#[derive(Args)]
struct GenerateArgs {
    /// Pattern to draw.
    #[arg(value_enum)]
    pattern: Kind,

    /// Pattern parameters as a JSON object, merged over the defaults.
    #[arg(long)]
    params: Option<String>,

    /// Uniform scale.
    #[arg(long)]
    scale: Option<f64>,

    /// Rotation in degrees.
    #[arg(long)]
    rotation: Option<f64>,

    /// Horizontal offset in normalized units.
    #[arg(long)]
    offset_x: Option<f64>,

    /// Vertical offset in normalized units.
    #[arg(long)]
    offset_y: Option<f64>,

    /// Repeat the pattern into this many rotational copies.
    #[arg(long)]
    kaleidoscope: Option<u32>,

    /// Mirror each kaleidoscope copy.
    #[arg(long, requires = "kaleidoscope")]
    mirror: bool,

    #[command(flatten)]
    out: OutputArgs,
}

#[derive(Args)]
struct LayersArgs {
    /// Full pattern-builder document as a JSON string.
    #[arg(long, conflicts_with = "config")]
    config_json: Option<String>,

    /// Pattern-builder document JSON file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON array of layer actions applied to the document in order.
    #[arg(long)]
    actions: Option<String>,

    /// Print the resulting document as JSON on stderr.
    #[arg(long)]
    dump: bool,

    #[command(flatten)]
    out: OutputArgs,
}

#[derive(Args)]
struct SpirographArgs {
    /// Teeth on the fixed ring.
    #[arg(long, default_value_t = GearConfig::default().fixed_teeth)]
    fixed_teeth: u32,

    /// Teeth on the rolling gear.
    #[arg(long, default_value_t = GearConfig::default().moving_teeth)]
    moving_teeth: u32,

    /// Pen hole as a fraction of the rolling gear radius.
    #[arg(long, default_value_t = GearConfig::default().pen_position)]
    pen_position: f64,

    /// Roll outside the ring instead of inside.
    #[arg(long)]
    outside: bool,

    /// Animation speed.
    #[arg(long, default_value_t = GearConfig::default().speed)]
    speed: f64,

    /// Stop after this many animation ticks instead of drawing the
    /// complete curve.
    #[arg(long)]
    ticks: Option<u32>,

    #[command(flatten)]
    out: OutputArgs,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {what}: {source}")]
    Json {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error(transparent)]
    Io(#[from] IoError),

    #[error("preview failed: {0}")]
    Preview(String),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let config = table_config(cli.settings.as_deref())?;
    log::debug!("table config: {config:?}");

    match &cli.command {
        Command::Generate(args) => {
            let paths = generate(args)?;
            let name = format!("{:?}", PatternKind::from(args.pattern)).to_lowercase();
            emit(cli, &config, &paths, CoordinateSpace::PatternBuilder, &name, &args.out)
        }
        Command::Layers(args) => {
            let doc = layers_document(args)?;
            if args.dump {
                let json = serde_json::to_string_pretty(&doc).map_err(|source| CliError::Json {
                    what: "document",
                    source,
                })?;
                eprintln!("{json}");
            }
            let out = OutputArgs {
                feedrate: args.out.feedrate.or(Some(doc.feedrate())),
                upload: args.out.upload.as_ref().map(|name| {
                    if name.trim().is_empty() {
                        doc.drawing_name().to_owned()
                    } else {
                        name.clone()
                    }
                }),
                ..args.out.clone()
            };
            emit(
                cli,
                &config,
                &doc.generate(),
                CoordinateSpace::PatternBuilder,
                doc.drawing_name(),
                &out,
            )
        }
        Command::Spirograph(args) => {
            let paths = spirograph(args);
            emit(cli, &config, &paths, CoordinateSpace::CenterNormalized, "spirograph", &args.out)
        }
        Command::Upload { file, name } => {
            let gcode = std::fs::read_to_string(file).map_err(|source| CliError::Read {
                path: file.clone(),
                source,
            })?;
            let name = name.clone().unwrap_or_else(|| {
                file.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            });
            upload(cli, &gcode, &name)
        }
        Command::Preview { id, svg, size } => {
            let api = HttpDrawingsApi::new(&cli.server)?;
            match fetch_for_preview(&api, *id) {
                PreviewState::Ready(preview) => {
                    println!(
                        "drawing {id}: {} strokes, {} points, space {}",
                        preview.strokes.len(),
                        preview.point_count(),
                        preview.space.as_deref().unwrap_or("unknown"),
                    );
                    if let Some(path) = svg {
                        let canvas = config.display_size(*size, *size);
                        let title = format!("drawing {id}");
                        let metadata = SvgMetadata {
                            title: Some(&title),
                            description: None,
                        };
                        write_file(path, &to_preview_svg(&preview, &config, canvas, &metadata))?;
                    }
                    Ok(())
                }
                PreviewState::Error(message) => Err(CliError::Preview(message)),
            }
        }
        Command::Corners => {
            let corners = config.corner_coordinates();
            println!("rotation: {}°", config.rotation.degrees());
            println!("top-left:     {}", format_coordinate(corners.top_left));
            println!("top-right:    {}", format_coordinate(corners.top_right));
            println!("bottom-left:  {}", format_coordinate(corners.bottom_left));
            println!("bottom-right: {}", format_coordinate(corners.bottom_right));
            Ok(())
        }
    }
}

/// Resolve the table geometry from `--settings`, or the defaults.
fn table_config(settings: Option<&Path>) -> Result<TableConfig, CliError> {
    let Some(path) = settings else {
        return Ok(TableConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_owned(),
        source,
    })?;
    let value = serde_json::from_str(&text).map_err(|source| CliError::Json {
        what: "settings",
        source,
    })?;
    Ok(TableConfig::resolve(&value))
}

fn generate(args: &GenerateArgs) -> Result<Vec<Polyline>, CliError> {
    let mut doc = PatternBuilder::new();
    let id = doc.layers().first().map_or(1, |layer| layer.id);
    doc.set_pattern_kind(id, args.pattern.into())?;
    if let Some(params) = &args.params {
        let patch = serde_json::from_str(params).map_err(|source| CliError::Json {
            what: "--params",
            source,
        })?;
        doc.update_params(id, &patch)?;
    }
    doc.update_transform(
        id,
        TransformPatch {
            scale: args.scale,
            rotation: args.rotation,
            offset_x: args.offset_x,
            offset_y: args.offset_y,
        },
    )?;

    let paths = doc.generate();
    Ok(match args.kaleidoscope {
        Some(segments) => {
            let mirror = if args.mirror {
                MirrorMode::Bilateral
            } else {
                MirrorMode::Radial
            };
            kaleidoscope(&paths, segments, mirror)
        }
        None => paths,
    })
}

fn layers_document(args: &LayersArgs) -> Result<PatternBuilder, CliError> {
    let mut doc = if let Some(json) = &args.config_json {
        serde_json::from_str(json).map_err(|source| CliError::Json {
            what: "--config-json",
            source,
        })?
    } else if let Some(path) = &args.config {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| CliError::Json {
            what: "--config",
            source,
        })?
    } else {
        PatternBuilder::new()
    };

    if let Some(actions) = &args.actions {
        let actions: Vec<LayerAction> =
            serde_json::from_str(actions).map_err(|source| CliError::Json {
                what: "--actions",
                source,
            })?;
        for action in actions {
            doc.apply(action)?;
        }
    }
    Ok(doc)
}

fn spirograph(args: &SpirographArgs) -> Vec<Polyline> {
    let mut player = sandypi_pipeline::SpirographPlayer::new(GearConfig {
        fixed_teeth: args.fixed_teeth,
        moving_teeth: args.moving_teeth,
        pen_position: args.pen_position,
        mode: if args.outside {
            GearMode::Outside
        } else {
            GearMode::Inside
        },
        speed: args.speed,
    });

    if let Some(ticks) = args.ticks {
        player.play();
        for _ in 0..ticks {
            if player.tick().is_none() {
                break;
            }
        }
        log::info!(
            "spirograph stopped at {:.2} rad ({:?})",
            player.angle(),
            player.state()
        );
    } else {
        player.generate_complete();
    }
    player.paths()
}

/// Serialize `paths` and send them wherever `out` says.
fn emit(
    cli: &Cli,
    config: &TableConfig,
    paths: &[Polyline],
    space: CoordinateSpace,
    title: &str,
    out: &OutputArgs,
) -> Result<(), CliError> {
    let options = GcodeOptions {
        feedrate: out.feedrate.unwrap_or(DEFAULT_FEEDRATE),
        coordinate_space: space,
        clip: !out.no_clip,
    };
    let timestamp = chrono::Utc::now().to_rfc3339();
    let metadata = GcodeMetadata {
        title: (!title.is_empty()).then_some(title),
        description: None,
        timestamp: Some(&timestamp),
    };
    let gcode = to_gcode(paths, config, &options, &metadata);
    log::info!(
        "generated {} lines of G-code ({} space)",
        gcode.lines().count(),
        space
    );

    match &out.output {
        Some(path) => write_file(path, &gcode)?,
        None => print!("{gcode}"),
    }

    if let Some(dir) = &out.save_dir {
        download(&gcode, title, dir)?;
    }

    if let Some(path) = &out.svg {
        let machine = to_machine_paths(paths, space, config, options.clip);
        let canvas = config.display_size(out.preview_size, out.preview_size);
        let svg_meta = SvgMetadata {
            title: Some(title),
            description: Some(&timestamp),
        };
        write_file(path, &to_svg(&machine, config, canvas, &svg_meta))?;
    }

    if let Some(name) = &out.upload {
        upload(cli, &gcode, name)?;
    }
    Ok(())
}

fn upload(cli: &Cli, gcode: &str, name: &str) -> Result<(), CliError> {
    let uploader = Uploader::new(HttpDrawingsApi::new(&cli.server)?, LogNotifier);
    let uploaded = uploader.upload(gcode, name)?;
    match uploaded.ack.id {
        Some(id) => eprintln!("Uploaded {} as drawing {id}", uploaded.filename),
        None => eprintln!("Uploaded {}", uploaded.filename),
    }
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<(), CliError> {
    std::fs::write(path, contents).map_err(|source| CliError::Write {
        path: path.to_owned(),
        source,
    })?;
    log::info!("wrote {} ({} bytes)", path.display(), contents.len());
    Ok(())
}
