//! Command line interface.

use crate::trace::{SessionTrace, replay};
use clap::{Parser, Subcommand};
use judgeink_core::{
    Canvas, CanvasOptions, DefaultsStore, FileDefaults, FileStorage, Frame, Layer, Scheduler,
    SerializableColor, StrokeStore, TokioScheduler,
};
use judgeink_render::VelloRenderer;
use kurbo::Size;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid trace: {0}")]
    Trace(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] judgeink_core::StorageError),
    #[error(transparent)]
    Config(#[from] judgeink_core::ConfigError),
    #[error(transparent)]
    Render(#[from] judgeink_render::RendererError),
    #[error("Invalid size {0}x{1}")]
    InvalidSize(f64, f64),
}

/// JudgeInk annotation engine
#[derive(Parser, Debug)]
#[command(name = "judgeink")]
#[command(about = "Freehand annotation engine for judging sessions")]
#[command(version)]
pub struct Cli {
    /// Directory holding stroke records (defaults to the platform data dir)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Tool defaults file (defaults to the platform config dir)
    #[arg(long, global = true)]
    pub defaults: Option<PathBuf>,

    /// Logical canvas width
    #[arg(long, global = true, default_value_t = 1024.0)]
    pub canvas_width: f64,

    /// Logical canvas height
    #[arg(long, global = true, default_value_t = 768.0)]
    pub canvas_height: f64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a recorded session trace onto an owner's canvas
    Replay {
        /// Trace file (JSON)
        trace: PathBuf,
        /// Owner the strokes are stored under
        owner: String,
    },
    /// Compose an owner's strokes at a new size and summarize the result
    Export {
        owner: String,
        width: f64,
        height: f64,
        /// Background color for the export
        #[arg(long, default_value = "#ffffff")]
        background: SerializableColor,
        /// Reference image drawn under the emphasis layers
        #[arg(long)]
        reference: Option<PathBuf>,
        /// Resolution multiplier for the rendered scene
        #[arg(long, default_value_t = 1.0)]
        scale: f64,
    },
}

struct Stores {
    strokes: Arc<dyn StrokeStore>,
    defaults: Arc<dyn DefaultsStore>,
}

impl Cli {
    fn canvas_size(&self) -> Result<Size, AppError> {
        checked_size(self.canvas_width, self.canvas_height)
    }

    fn stores(&self) -> Result<Stores, AppError> {
        let strokes = match &self.data_dir {
            Some(dir) => FileStorage::new(dir.clone())?,
            None => FileStorage::default_location()?,
        };
        let defaults = match &self.defaults {
            Some(path) => FileDefaults::new(path.clone()),
            None => FileDefaults::default_location()?,
        };
        Ok(Stores {
            strokes: Arc::new(strokes),
            defaults: Arc::new(defaults),
        })
    }
}

fn checked_size(width: f64, height: f64) -> Result<Size, AppError> {
    if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
        Ok(Size::new(width, height))
    } else {
        Err(AppError::InvalidSize(width, height))
    }
}

/// Run the selected command.
pub async fn run(cli: Cli) -> Result<(), AppError> {
    let stores = cli.stores()?;
    let size = cli.canvas_size()?;
    let scheduler: Arc<dyn Scheduler> = Arc::new(TokioScheduler::new(
        tokio::runtime::Handle::current(),
    ));

    match cli.command {
        Command::Replay { trace, owner } => {
            let json = std::fs::read_to_string(&trace)?;
            let trace = SessionTrace::from_json(&json)?;
            let mut canvas = Canvas::mount(
                CanvasOptions::new(owner, size),
                stores.strokes,
                scheduler,
                stores.defaults,
            )
            .await;
            let summary = replay(&mut canvas, &trace);
            println!(
                "{} steps: {} committed, {} abandoned, {} ignored, {} undone, {} redone",
                summary.steps,
                summary.committed,
                summary.abandoned,
                summary.ignored,
                summary.undone,
                summary.redone
            );
            println!("{} strokes on canvas {}", canvas.history().len(), canvas.owner_id());
            canvas.unmount().await;
        }
        Command::Export {
            owner,
            width,
            height,
            background,
            reference,
            scale,
        } => {
            let target = checked_size(width, height)?;
            let mut options = CanvasOptions::new(owner, size);
            if reference.is_some() {
                options = options.with_full_reference();
            }
            let canvas =
                Canvas::mount(options, stores.strokes, scheduler, stores.defaults).await;
            let frame = canvas.export_frame(target, background);
            print_frame_summary(&frame);

            let mut renderer = VelloRenderer::new();
            if let Some(path) = reference {
                let bytes = std::fs::read(&path)?;
                if let Err(e) = renderer.set_reference_image(&bytes) {
                    log::warn!("Using placeholder for {}: {}", path.display(), e);
                }
            }
            let (_scene, bounds) = renderer.build_export_scene(&frame, scale);
            println!("scene {}x{} px", bounds.width(), bounds.height());
            canvas.unmount().await;
        }
    }
    Ok(())
}

fn print_frame_summary(frame: &Frame) {
    println!(
        "frame {}x{} background {}",
        frame.size.width, frame.size.height, frame.background
    );
    for layer in Layer::ORDER {
        println!("  {:?}: {} ops", layer, frame.layer(layer).len());
    }
}
