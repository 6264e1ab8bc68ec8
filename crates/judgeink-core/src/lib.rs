//! JudgeInk Core Library
//!
//! Freehand annotation engine: gesture capture, tool state, undo/redo
//! history, debounced persistence and layered composition. Rendering lives
//! in `judgeink-render`.

pub mod canvas;
pub mod codec;
pub mod color;
pub mod compositor;
pub mod config;
pub mod constants;
pub mod gesture;
pub mod history;
pub mod input;
pub mod path;
pub mod storage;
pub mod stroke;
pub mod tools;
pub mod transform;

pub use canvas::{Canvas, CanvasOptions, InputOutcome};
pub use codec::{CodecError, StrokeRecord, decode_strokes, encode_strokes};
pub use color::SerializableColor;
pub use compositor::{Compositor, DrawOp, Frame, FrameLayer, Layer};
pub use config::{
    ConfigError, DefaultsStore, FileDefaults, MemoryDefaults, ToolDefaults, ToolDefaultsPatch,
};
pub use gesture::StrokeBuilder;
pub use history::History;
pub use input::{InputClass, InputEvent, InputMode, PlatformInputAdapter, PointerPhase};
pub use path::{PathCommand, PathError, StrokePath};
pub use storage::{
    FileStorage, ManualScheduler, MemoryStorage, PersistenceAdapter, Scheduler, StorageError,
    StorageResult, StrokeStore, TokioScheduler,
};
pub use stroke::{Stroke, StrokeError, ToolType};
pub use tools::{ResolvedStyle, ToolConfig, ToolManager};
pub use transform::{CanvasTransform, transform_path};
