//! camyuv CLI
//!
//! Command-line interface for converting and rotating raw YUV dumps.

use anyhow::Context;
use camyuv::{
    config::Config,
    image_to_nv21, packed_size, rotate_nv21, rotated_dimensions, supported_input_formats,
    CapturedImage, Plane, RotationWorkspace, Rotation,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

/// Chroma arrangement of a raw capture dump
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum Layout {
    /// Separate U then V planes
    #[default]
    I420,
    /// One interleaved UV plane
    Nv12,
    /// One interleaved VU plane
    Nv21,
}

#[derive(Parser)]
#[command(name = "camyuv")]
#[command(about = "Camera YUV 4:2:0 normalization and NV21 rotation")]
#[command(version)]
struct Cli {
    /// TOML config file (supplies the default rotation)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version and supported formats
    Info,

    /// Convert a raw three-plane capture dump to NV21
    Convert {
        /// Raw capture file: Y plane followed by chroma
        #[arg(short, long)]
        input: PathBuf,

        /// Output NV21 file
        #[arg(short, long)]
        output: PathBuf,

        /// Frame width
        #[arg(long)]
        width: u32,

        /// Frame height
        #[arg(long)]
        height: u32,

        /// Chroma layout of the dump
        #[arg(short, long, value_enum, default_value = "i420")]
        layout: Layout,

        /// Y row stride in bytes (default: width)
        #[arg(long)]
        y_stride: Option<usize>,

        /// Chroma row stride in bytes (default: tight for the layout)
        #[arg(long)]
        uv_stride: Option<usize>,

        /// Clockwise rotation in degrees (default: from config)
        #[arg(short, long, allow_hyphen_values = true)]
        degrees: Option<i32>,
    },

    /// Rotate a raw NV21 file
    Rotate {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(long)]
        width: u32,

        #[arg(long)]
        height: u32,

        /// Clockwise rotation in degrees (default: from config)
        #[arg(short, long, allow_hyphen_values = true)]
        degrees: Option<i32>,
    },

    /// Rotate synthetic frames through a reusable workspace
    Bench {
        #[arg(long, default_value = "1920")]
        width: u32,

        #[arg(long, default_value = "1080")]
        height: u32,

        #[arg(short, long, default_value = "90", allow_hyphen_values = true)]
        degrees: i32,

        /// Number of frames to rotate
        #[arg(short, long, default_value = "300")]
        frames: u32,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("camyuv=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Info => cmd_info(),
        Commands::Convert {
            input,
            output,
            width,
            height,
            layout,
            y_stride,
            uv_stride,
            degrees,
        } => {
            let degrees = degrees.unwrap_or(config.rotation.degrees);
            let strides = (
                y_stride.unwrap_or(width as usize),
                uv_stride.unwrap_or(match layout {
                    Layout::I420 => width as usize / 2,
                    Layout::Nv12 | Layout::Nv21 => width as usize,
                }),
            );
            cmd_convert(input, output, width, height, layout, strides, degrees)
        }
        Commands::Rotate {
            input,
            output,
            width,
            height,
            degrees,
        } => cmd_rotate(
            input,
            output,
            width,
            height,
            degrees.unwrap_or(config.rotation.degrees),
        ),
        Commands::Bench {
            width,
            height,
            degrees,
            frames,
        } => cmd_bench(width, height, degrees, frames),
    }
}

fn cmd_info() -> anyhow::Result<()> {
    println!("camyuv {}", camyuv::VERSION);
    println!();
    println!("Input formats:");
    for format in supported_input_formats() {
        println!("  {}", format);
    }
    println!("Output format: NV21 (Y plane + interleaved VU)");
    println!("Rotations: 0, 90, 180, 270 (clockwise)");
    Ok(())
}

fn tail(data: &[u8], offset: usize) -> &[u8] {
    data.get(offset..).unwrap_or(&[])
}

fn cmd_convert(
    input: PathBuf,
    output: PathBuf,
    width: u32,
    height: u32,
    layout: Layout,
    (y_stride, uv_stride): (usize, usize),
    degrees: i32,
) -> anyhow::Result<()> {
    let raw = std::fs::read(&input).with_context(|| format!("reading {}", input.display()))?;

    let y_len = (y_stride * height as usize).min(raw.len());
    let chroma = tail(&raw, y_len);
    let (u, v) = match layout {
        Layout::I420 => {
            let u_len = (uv_stride * height as usize / 2).min(chroma.len());
            (
                Plane::new(&chroma[..u_len], uv_stride, 1)?,
                Plane::new(tail(chroma, u_len), uv_stride, 1)?,
            )
        }
        Layout::Nv12 => (
            Plane::new(chroma, uv_stride, 2)?,
            Plane::new(tail(chroma, 1), uv_stride, 2)?,
        ),
        Layout::Nv21 => (
            Plane::new(tail(chroma, 1), uv_stride, 2)?,
            Plane::new(chroma, uv_stride, 2)?,
        ),
    };
    let y = Plane::new(&raw[..y_len], y_stride, 1)?;
    let image = CapturedImage::new(width, height, y, u, v);

    let frame = image_to_nv21(&image)?;
    let frame = if Rotation::from_degrees(degrees) == Rotation::Rotation0 {
        frame
    } else {
        rotate_nv21(&frame.data, frame.width, frame.height, degrees)?
    };

    std::fs::write(&output, &frame.data)
        .with_context(|| format!("writing {}", output.display()))?;
    tracing::info!(
        "Wrote {} NV21 frame ({} bytes) to {}",
        frame.resolution(),
        frame.size_bytes(),
        output.display()
    );
    Ok(())
}

fn cmd_rotate(
    input: PathBuf,
    output: PathBuf,
    width: u32,
    height: u32,
    degrees: i32,
) -> anyhow::Result<()> {
    let raw = std::fs::read(&input).with_context(|| format!("reading {}", input.display()))?;
    let frame = rotate_nv21(&raw, width, height, degrees)?;
    std::fs::write(&output, &frame.data)
        .with_context(|| format!("writing {}", output.display()))?;
    tracing::info!(
        "Rotated {}x{} by {} -> {}",
        width,
        height,
        Rotation::from_degrees(degrees),
        frame.resolution()
    );
    Ok(())
}

fn cmd_bench(width: u32, height: u32, degrees: i32, frames: u32) -> anyhow::Result<()> {
    let src: Vec<u8> = (0..packed_size(width, height)?)
        .map(|i| (i % 251) as u8)
        .collect();
    let (out_w, out_h) = rotated_dimensions(width, height, degrees);
    let mut dst = vec![0u8; packed_size(out_w, out_h)?];
    let mut workspace = RotationWorkspace::new();

    tracing::info!(
        "Rotating {} frames of {}x{} by {}",
        frames,
        width,
        height,
        Rotation::from_degrees(degrees)
    );

    let start = Instant::now();
    for _ in 0..frames {
        workspace.rotate_into(&src, width, height, degrees, &mut dst)?;
    }
    let elapsed = start.elapsed();

    let stats = workspace.stats();
    let fps = frames as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
    println!("Frames:        {}", frames);
    println!("Elapsed:       {:.3} s", elapsed.as_secs_f64());
    println!("Throughput:    {:.1} fps", fps);
    println!(
        "Allocations:   {} source, {} rotated",
        stats.source_allocations, stats.rotated_allocations
    );
    println!(
        "Frames staged: {} rotated, {} copied",
        stats.frames_rotated, stats.frames_copied
    );
    Ok(())
}
