//! Template-mining engine interface.
//!
//! Engines are black boxes: given trimmed lines in a scratch [`Workspace`],
//! they return one [`MinedLine`] per surviving input line, pairing the
//! line's content with the template of the cluster it fell into. Each engine
//! owns its parameters, fixed when the [`EngineRegistry`] is built.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use thiserror::Error;

use crate::algorithm::{AlgorithmId, BACKUP_ORDER};

/// Name of the input file written into every workspace.
pub const INPUT_FILE: &str = "input.log";
/// Name of the structured artifact an engine leaves in its workspace.
pub const ARTIFACT_FILE: &str = "input.log_structured.jsonl";

/// Why a template-mining attempt did not produce usable output.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no engine registered for {0}")]
    Unavailable(AlgorithmId),

    #[error("failed to start engine: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("engine exited with {status}: {stderr}")]
    Exited { status: String, stderr: String },

    #[error("engine produced no output artifact at {}", .0.display())]
    NoOutput(PathBuf),

    #[error("malformed engine output: {0}")]
    Malformed(String),

    #[error("engine panicked: {0}")]
    Panicked(String),

    #[error("scratch workspace error: {0}")]
    Workspace(#[source] std::io::Error),

    #[error("engine returned no results")]
    EmptyOutput,

    /// A single result for a multi-line input.
    #[error("engine collapsed {inputs} lines into a single result")]
    DegenerateCollapse { inputs: usize },
}

/// One engine result: a line's content and the template it was assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinedLine {
    #[serde(rename = "Content")]
    pub content: String,
    #[serde(rename = "EventTemplate")]
    pub template: String,
}

impl MinedLine {
    pub fn new(content: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            template: template.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrainParams {
    pub depth: u32,
    pub st: f64,
    #[serde(rename = "maxChild")]
    pub max_child: u32,
}

impl Default for DrainParams {
    fn default() -> Self {
        Self {
            depth: 4,
            st: 0.5,
            max_child: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpellParams {
    pub tau: f64,
}

impl Default for SpellParams {
    fn default() -> Self {
        Self { tau: 0.5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IplomParams {
    pub k: u32,
    pub threshold: f64,
}

impl Default for IplomParams {
    fn default() -> Self {
        Self { k: 1, threshold: 0.9 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogClusterParams {
    pub support: u32,
    pub rsupport: f64,
}

impl Default for LogClusterParams {
    fn default() -> Self {
        Self {
            support: 10,
            rsupport: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogMineParams {
    pub k: u32,
}

impl Default for LogMineParams {
    fn default() -> Self {
        Self { k: 1 }
    }
}

/// Per-engine parameters, one variant per [`AlgorithmId`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EngineParams {
    Drain(DrainParams),
    Spell(SpellParams),
    Iplom(IplomParams),
    LogCluster(LogClusterParams),
    LogMine(LogMineParams),
}

impl EngineParams {
    /// Built-in parameters for `id`.
    pub fn defaults_for(id: AlgorithmId) -> Self {
        match id {
            AlgorithmId::Drain => Self::Drain(DrainParams::default()),
            AlgorithmId::Spell => Self::Spell(SpellParams::default()),
            AlgorithmId::Iplom => Self::Iplom(IplomParams::default()),
            AlgorithmId::LogCluster => Self::LogCluster(LogClusterParams::default()),
            AlgorithmId::LogMine => Self::LogMine(LogMineParams::default()),
        }
    }
}

/// Scratch directory for one engine invocation. Removed on drop.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn acquire() -> Result<Self, EngineError> {
        tempfile::Builder::new()
            .prefix("lognorm-")
            .tempdir()
            .map(|dir| Self { dir })
            .map_err(EngineError::Workspace)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn input_path(&self) -> PathBuf {
        self.path().join(INPUT_FILE)
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.path().join(ARTIFACT_FILE)
    }

    /// Write `lines` to the input file, one per row.
    pub fn write_input(&self, lines: &[String]) -> Result<(), EngineError> {
        let file = File::create(self.input_path()).map_err(EngineError::Workspace)?;
        let mut writer = BufWriter::new(file);
        for line in lines {
            writeln!(writer, "{line}").map_err(EngineError::Workspace)?;
        }
        writer.flush().map_err(EngineError::Workspace)
    }

    /// Read the structured artifact an engine left behind.
    pub fn read_artifact(&self) -> Result<Vec<MinedLine>, EngineError> {
        let path = self.artifact_path();
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(EngineError::NoOutput(path)),
            Err(e) => return Err(EngineError::Workspace(e)),
        };
        text.lines()
            .filter(|row| !row.trim().is_empty())
            .enumerate()
            .map(|(i, row)| {
                serde_json::from_str::<MinedLine>(row)
                    .map_err(|e| EngineError::Malformed(format!("row {}: {e}", i + 1)))
            })
            .collect()
    }
}

/// A template-mining engine.
pub trait TemplateEngine: Send + Sync {
    /// Cluster `lines` (already trimmed, never empty) using `workspace` for
    /// scratch files.
    fn run(&self, lines: &[String], workspace: &Workspace) -> Result<Vec<MinedLine>, EngineError>;
}

impl<F> TemplateEngine for F
where
    F: Fn(&[String], &Workspace) -> Result<Vec<MinedLine>, EngineError> + Send + Sync,
{
    fn run(&self, lines: &[String], workspace: &Workspace) -> Result<Vec<MinedLine>, EngineError> {
        self(lines, workspace)
    }
}

/// Runs an external program as the engine.
///
/// Invocation: `program [args] --algorithm <id> --params <json> --input
/// <workspace>/input.log --output <workspace>`. The program must write
/// `input.log_structured.jsonl` into the output directory.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: PathBuf,
    args: Vec<String>,
    algorithm: AlgorithmId,
    params: EngineParams,
}

impl CommandEngine {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, algorithm: AlgorithmId) -> Self {
        Self {
            program: program.into(),
            args,
            algorithm,
            params: EngineParams::defaults_for(algorithm),
        }
    }
}

impl TemplateEngine for CommandEngine {
    fn run(&self, _lines: &[String], workspace: &Workspace) -> Result<Vec<MinedLine>, EngineError> {
        let params = serde_json::to_string(&self.params)
            .map_err(|e| EngineError::Malformed(format!("engine parameters: {e}")))?;

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg("--algorithm")
            .arg(self.algorithm.as_str())
            .arg("--params")
            .arg(params)
            .arg("--input")
            .arg(workspace.input_path())
            .arg("--output")
            .arg(workspace.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(EngineError::Spawn)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::Exited {
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        workspace.read_artifact()
    }
}

/// Immutable `AlgorithmId -> engine` table handed to the pipeline.
#[derive(Default)]
pub struct EngineRegistry {
    engines: HashMap<AlgorithmId, Box<dyn TemplateEngine>>,
}

impl EngineRegistry {
    /// A registry with no engines; every batch goes to the regex fallback.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Register `engine` for `id`, replacing any previous one.
    #[must_use]
    pub fn with_engine(mut self, id: AlgorithmId, engine: impl TemplateEngine + 'static) -> Self {
        self.engines.insert(id, Box::new(engine));
        self
    }

    /// A registry backed by one external program for every algorithm.
    pub fn with_command(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        let program = program.into();
        BACKUP_ORDER.iter().fold(Self::empty(), |registry, &id| {
            registry.with_engine(id, CommandEngine::new(program.clone(), args.clone(), id))
        })
    }

    pub fn get(&self, id: AlgorithmId) -> Option<&dyn TemplateEngine> {
        let engine = self.engines.get(&id)?;
        Some(engine.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

impl fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&str> = self.engines.keys().map(|id| id.as_str()).collect();
        ids.sort_unstable();
        f.debug_struct("EngineRegistry").field("engines", &ids).finish()
    }
}
