//! # Animation Programs
//!
//! The linear form consumed by the playback engine: an ordered list of
//! typed, parameterized steps. A [`Program`] is exchanged with the host as a
//! JSON array of step records and is never patched in place.

use crate::error::ProgramError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Instruction tag of an [`AnimationStep`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepKind {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    MoveForward,
    MoveBackward,
    RotateX,
    RotateY,
    RotateZ,
    ScaleUp,
    ScaleDown,
    Pause,
}

/// Group of step kinds sharing one editor block type and parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepFamily {
    Move,
    Rotate,
    Scale,
    Pause,
}

impl StepKind {
    pub const ALL: [StepKind; 12] = [
        StepKind::MoveUp,
        StepKind::MoveDown,
        StepKind::MoveLeft,
        StepKind::MoveRight,
        StepKind::MoveForward,
        StepKind::MoveBackward,
        StepKind::RotateX,
        StepKind::RotateY,
        StepKind::RotateZ,
        StepKind::ScaleUp,
        StepKind::ScaleDown,
        StepKind::Pause,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StepKind::MoveUp => "moveUp",
            StepKind::MoveDown => "moveDown",
            StepKind::MoveLeft => "moveLeft",
            StepKind::MoveRight => "moveRight",
            StepKind::MoveForward => "moveForward",
            StepKind::MoveBackward => "moveBackward",
            StepKind::RotateX => "rotateX",
            StepKind::RotateY => "rotateY",
            StepKind::RotateZ => "rotateZ",
            StepKind::ScaleUp => "scaleUp",
            StepKind::ScaleDown => "scaleDown",
            StepKind::Pause => "pause",
        }
    }

    pub fn family(self) -> StepFamily {
        match self {
            StepKind::MoveUp
            | StepKind::MoveDown
            | StepKind::MoveLeft
            | StepKind::MoveRight
            | StepKind::MoveForward
            | StepKind::MoveBackward => StepFamily::Move,
            StepKind::RotateX | StepKind::RotateY | StepKind::RotateZ => StepFamily::Rotate,
            StepKind::ScaleUp | StepKind::ScaleDown => StepFamily::Scale,
            StepKind::Pause => StepFamily::Pause,
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StepKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or(())
    }
}

/// One compiled instruction.
///
/// Fields are read-only: steps are produced by the compiler (or parsed from
/// the host) and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationStep {
    id: String,
    kind: StepKind,
    duration: f64,
    /// Units for moves, radians for rotations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scale: Option<f64>,
}

impl AnimationStep {
    pub fn movement(kind: StepKind, duration: f64, distance: f64) -> Self {
        Self::build(kind, duration, Some(distance), None)
    }

    /// `radians` is the already-converted rotation angle.
    pub fn rotation(kind: StepKind, duration: f64, radians: f64) -> Self {
        Self::build(kind, duration, Some(radians), None)
    }

    pub fn scaling(kind: StepKind, duration: f64, scale: f64) -> Self {
        Self::build(kind, duration, None, Some(scale))
    }

    pub fn pause(duration: f64) -> Self {
        Self::build(StepKind::Pause, duration, None, None)
    }

    fn build(kind: StepKind, duration: f64, distance: Option<f64>, scale: Option<f64>) -> Self {
        Self {
            id: fresh_step_id(),
            kind,
            duration,
            distance,
            scale,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> StepKind {
        self.kind
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn distance(&self) -> Option<f64> {
        self.distance
    }

    pub fn scale(&self) -> Option<f64> {
        self.scale
    }

    /// Copy of this step under a newly generated id.
    pub fn with_fresh_id(&self) -> Self {
        self.with_id(fresh_step_id())
    }

    pub fn with_id(&self, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..self.clone()
        }
    }

    /// Equality of everything except the id.
    pub fn same_effect(&self, other: &AnimationStep) -> bool {
        self.kind == other.kind
            && self.duration == other.duration
            && self.distance == other.distance
            && self.scale == other.scale
    }
}

fn fresh_step_id() -> String {
    Uuid::new_v4().to_string()
}

/// Ordered sequence of steps; order is execution order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Program {
    steps: Vec<AnimationStep>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_steps(steps: Vec<AnimationStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[AnimationStep] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<AnimationStep> {
        self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AnimationStep> {
        self.steps.iter()
    }

    pub fn kinds(&self) -> Vec<StepKind> {
        self.steps.iter().map(AnimationStep::kind).collect()
    }

    /// Sum of all step durations, in seconds.
    pub fn total_duration(&self) -> f64 {
        self.steps.iter().map(AnimationStep::duration).sum()
    }

    /// Equality ignoring step ids.
    pub fn same_effect(&self, other: &Program) -> bool {
        self.steps.len() == other.steps.len()
            && self
                .steps
                .iter()
                .zip(&other.steps)
                .all(|(a, b)| a.same_effect(b))
    }

    pub fn to_json(&self) -> Result<String, ProgramError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse the host's step array and check each record carries the
    /// parameters its kind requires.
    pub fn from_json(json: &str) -> Result<Self, ProgramError> {
        let program: Program = serde_json::from_str(json)?;
        program.validate()?;
        Ok(program)
    }

    pub fn validate(&self) -> Result<(), ProgramError> {
        for (index, step) in self.steps.iter().enumerate() {
            if !step.duration.is_finite() {
                return Err(ProgramError::InvalidNumber { index, field: "duration" });
            }
            if step.duration <= 0.0 {
                return Err(ProgramError::NonPositiveDuration {
                    index,
                    duration: step.duration,
                });
            }
            let required = match step.kind.family() {
                StepFamily::Move | StepFamily::Rotate => Some(("distance", step.distance)),
                StepFamily::Scale => Some(("scale", step.scale)),
                StepFamily::Pause => None,
            };
            if let Some((field, value)) = required {
                match value {
                    None => {
                        return Err(ProgramError::MissingParameter {
                            index,
                            kind: step.kind,
                            field,
                        })
                    }
                    Some(value) if !value.is_finite() => {
                        return Err(ProgramError::InvalidNumber { index, field })
                    }
                    Some(_) => {}
                }
            }
        }
        Ok(())
    }
}

impl From<Vec<AnimationStep>> for Program {
    fn from(steps: Vec<AnimationStep>) -> Self {
        Self::from_steps(steps)
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a AnimationStep;
    type IntoIter = std::slice::Iter<'a, AnimationStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}
