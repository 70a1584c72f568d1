//! Tileboard drag replay.
//!
//! Loads a board and a drag script, replays every drag through the connector
//! drag machine and prints the resulting board as JSON.
//!
//! ```text
//! tileboard <board.json> <script.json>
//! ```
//!
//! A script is `{ "config": {..}?, "steps": [..] }` where each step names the
//! connector, the drag kind and the world-space cursor positions to visit:
//!
//! ```json
//! { "element_id": "…", "kind": "createCorner", "target_style": "elbow",
//!   "moves": [{ "x": 50.0, "y": 80.0 }] }
//! ```

use kurbo::Point;
use serde::Deserialize;
use std::process::ExitCode;
use thiserror::Error;
use tileboard_core::geometry::Axis;
use tileboard_core::{
    Board, BoardError, ConnectorDragKind, DragMachine, DragSession, ElementId, InteractionConfig, PathStyle,
};

#[derive(Debug, Error)]
enum AppError {
    #[error("usage: tileboard <board.json> <script.json>")]
    Usage,
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid script step {step}: {reason}")]
    Script { step: usize, reason: &'static str },
    #[error(transparent)]
    Board(#[from] BoardError),
}

type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Deserialize)]
struct Script {
    #[serde(default)]
    config: Option<InteractionConfig>,
    steps: Vec<Step>,
}

/// One drag: begin, visit every cursor position, commit.
#[derive(Debug, Deserialize)]
struct Step {
    element_id: ElementId,
    kind: ConnectorDragKind,
    #[serde(default)]
    index: usize,
    #[serde(default)]
    axis: Option<Axis>,
    #[serde(default)]
    range: Option<(usize, usize)>,
    #[serde(default)]
    target_style: Option<PathStyle>,
    #[serde(default)]
    anchor: Option<Point>,
    moves: Vec<Point>,
    /// Look for snap targets at every move.
    #[serde(default)]
    snap: bool,
}

fn read(path: &str) -> AppResult<String> {
    std::fs::read_to_string(path).map_err(|source| AppError::Io {
        path: path.to_string(),
        source,
    })
}

fn session_for(number: usize, step: &Step, board: &Board) -> AppResult<DragSession> {
    let original = board
        .get(step.element_id)
        .cloned()
        .ok_or(BoardError::ElementNotFound(step.element_id))?;
    let anchor = step.anchor.or_else(|| step.moves.first().copied());

    let session = match step.kind {
        ConnectorDragKind::CreateCorner => {
            DragSession::create_corner(original, step.target_style.unwrap_or_default())?
        }
        ConnectorDragKind::ElbowEdge => {
            let (left, right) = step.range.ok_or(AppError::Script {
                step: number,
                reason: "edge drags need a range",
            })?;
            let anchor = anchor.ok_or(AppError::Script {
                step: number,
                reason: "edge drags need an anchor or at least one move",
            })?;
            DragSession::elbow_edge(original, left, right, anchor)?
        }
        kind => {
            let mut session = DragSession::new(original, kind, step.index)?;
            if let Some(axis) = step.axis {
                session = session.with_axis(axis);
            }
            if let Some(anchor) = step.anchor {
                session = session.with_anchor(anchor);
            }
            session
        }
    };
    Ok(session)
}

fn replay(machine: &mut DragMachine, board: &mut Board, number: usize, step: &Step) -> AppResult<()> {
    let session = session_for(number, step, board)?;
    machine.begin(session, board)?;
    for &cursor in &step.moves {
        let snap = if step.snap {
            machine.find_snap(cursor, board)
        } else {
            None
        };
        machine.update(cursor, snap, board)?;
    }
    let committed = machine.commit(board)?;
    log::info!("Step {}: {:?} drag on {} committed", number, step.kind, committed.id);
    Ok(())
}

fn run() -> AppResult<()> {
    let mut args = std::env::args().skip(1);
    let (Some(board_path), Some(script_path)) = (args.next(), args.next()) else {
        return Err(AppError::Usage);
    };

    let mut board = Board::from_json(&read(&board_path)?)?;
    let script: Script = serde_json::from_str(&read(&script_path)?).map_err(BoardError::from)?;
    log::info!(
        "Loaded {} elements and {} steps",
        board.len(),
        script.steps.len()
    );

    let mut machine = DragMachine::new(script.config.unwrap_or_default());
    for (number, step) in script.steps.iter().enumerate() {
        replay(&mut machine, &mut board, number, step)?;
    }

    println!("{}", board.to_json()?);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
