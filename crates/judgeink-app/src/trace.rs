//! Recorded annotation sessions.
//!
//! A trace is a JSON document listing the steps of a session in order:
//!
//! ```json
//! {"steps": [
//!   {"input": {"phase": "Down", "position": {"x": 10.0, "y": 12.0}, "class": "Finger"}},
//!   {"select_tool": "Highlighter"},
//!   {"set_width": 6.0},
//!   "toggle_eraser",
//!   "undo"
//! ]}
//! ```

use judgeink_core::{Canvas, InputEvent, InputMode, InputOutcome, SerializableColor, ToolType};
use serde::{Deserialize, Serialize};

/// One recorded action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceStep {
    Input(InputEvent),
    SelectTool(ToolType),
    ToggleEraser,
    SetColor(SerializableColor),
    SetWidth(f64),
    SetInputMode(InputMode),
    Undo,
    Redo,
}

/// A recorded session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionTrace {
    pub steps: Vec<TraceStep>,
}

impl SessionTrace {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Counters collected while replaying.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub steps: usize,
    pub committed: usize,
    pub abandoned: usize,
    pub ignored: usize,
    pub undone: usize,
    pub redone: usize,
}

/// Apply `trace` to `canvas`.
pub fn replay(canvas: &mut Canvas, trace: &SessionTrace) -> ReplaySummary {
    let mut summary = ReplaySummary::default();
    for step in &trace.steps {
        summary.steps += 1;
        match step {
            TraceStep::Input(event) => match canvas.handle_input(*event) {
                InputOutcome::Committed => summary.committed += 1,
                InputOutcome::Abandoned => summary.abandoned += 1,
                InputOutcome::Ignored => summary.ignored += 1,
                InputOutcome::Started | InputOutcome::Updated => {}
            },
            TraceStep::SelectTool(tool) => canvas.select_tool(*tool),
            TraceStep::ToggleEraser => canvas.toggle_eraser(),
            TraceStep::SetColor(color) => canvas.set_color(*color),
            TraceStep::SetWidth(width) => canvas.set_width(*width),
            TraceStep::SetInputMode(mode) => canvas.set_input_mode(*mode),
            TraceStep::Undo => {
                if canvas.undo() {
                    summary.undone += 1;
                }
            }
            TraceStep::Redo => {
                if canvas.redo() {
                    summary.redone += 1;
                }
            }
        }
    }
    summary
}
