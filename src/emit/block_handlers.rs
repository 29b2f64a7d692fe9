//! # Block-Specific Handlers
//!
//! Turns a single primitive block into its animation step.

use crate::error::{CompileWarning, MalformedReason};
use crate::graph::{
    Block, BlockKind, FieldValue, FIELD_AXIS, FIELD_DIRECTION, FIELD_RADIANS, FIELD_TYPE,
    SLOT_ANGLE, SLOT_DISTANCE, SLOT_DURATION, SLOT_SCALE,
};
use crate::program::{AnimationStep, StepFamily, StepKind};
use crate::resolver::ValueResolver;
use std::f64::consts::PI;

pub const DEFAULT_DURATION: f64 = 1.0;
pub const DEFAULT_DISTANCE: f64 = 1.0;
pub const DEFAULT_ANGLE_DEGREES: f64 = 90.0;
pub const DEFAULT_SCALE: f64 = 1.5;
pub const DEFAULT_TIMES: f64 = 1.0;

/// Neighbouring floats tried on each side when inverting the degree conversion.
const DEGREE_SEARCH_ULPS: usize = 4;

pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

pub fn radians_to_degrees(radians: f64) -> f64 {
    radians * 180.0 / PI
}

/// Degrees to write for `radians` when rebuilding a Rotate block.
///
/// Prefers a value that [`degrees_to_radians`] maps back onto `radians`
/// exactly. Not every radian value has one, in which case the plain
/// conversion is returned.
pub fn degrees_for(radians: f64) -> f64 {
    let estimate = radians_to_degrees(radians);
    if !estimate.is_finite() {
        return estimate;
    }
    let (mut below, mut above) = (estimate, estimate);
    for _ in 0..=DEGREE_SEARCH_ULPS {
        if degrees_to_radians(above) == radians {
            return above;
        }
        if degrees_to_radians(below) == radians {
            return below;
        }
        above = adjacent_float(above, true);
        below = adjacent_float(below, false);
    }
    estimate
}

fn adjacent_float(value: f64, up: bool) -> f64 {
    if value == 0.0 {
        let tiny = f64::from_bits(1);
        return if up { tiny } else { -tiny };
    }
    let bits = value.to_bits();
    if (value > 0.0) == up {
        f64::from_bits(bits + 1)
    } else {
        f64::from_bits(bits - 1)
    }
}

/// Radians for a Rotate block whose ANGLE resolved to `degrees`.
///
/// Uses the block's [`FIELD_RADIANS`] hint while the angle is unchanged
/// since the rebuild that wrote it.
fn rotation_radians(block: &Block, degrees: f64) -> f64 {
    block
        .field(FIELD_RADIANS)
        .and_then(FieldValue::as_finite_number)
        .filter(|radians| degrees_for(*radians) == degrees)
        .unwrap_or_else(|| degrees_to_radians(degrees))
}

/// Emit the step for a Move, Rotate, Scale, or Pause block.
///
/// Returns `None` for any other kind, or when the block's discrete field
/// does not name a step of the right family.
pub(crate) fn emit_step(
    block: &Block,
    resolver: &ValueResolver<'_>,
    warnings: &mut Vec<CompileWarning>,
) -> Option<AnimationStep> {
    match block.kind() {
        BlockKind::Move => {
            let kind = discrete_kind(block, FIELD_DIRECTION, StepFamily::Move, warnings)?;
            let duration = param(resolver, warnings, block, SLOT_DURATION, DEFAULT_DURATION);
            let distance = param(resolver, warnings, block, SLOT_DISTANCE, DEFAULT_DISTANCE);
            Some(AnimationStep::movement(kind, duration, distance))
        }
        BlockKind::Rotate => {
            let kind = discrete_kind(block, FIELD_AXIS, StepFamily::Rotate, warnings)?;
            let duration = param(resolver, warnings, block, SLOT_DURATION, DEFAULT_DURATION);
            let degrees = param(resolver, warnings, block, SLOT_ANGLE, DEFAULT_ANGLE_DEGREES);
            Some(AnimationStep::rotation(kind, duration, rotation_radians(block, degrees)))
        }
        BlockKind::Scale => {
            let kind = discrete_kind(block, FIELD_TYPE, StepFamily::Scale, warnings)?;
            let duration = param(resolver, warnings, block, SLOT_DURATION, DEFAULT_DURATION);
            let scale = param(resolver, warnings, block, SLOT_SCALE, DEFAULT_SCALE);
            Some(AnimationStep::scaling(kind, duration, scale))
        }
        BlockKind::Pause => {
            let duration = param(resolver, warnings, block, SLOT_DURATION, DEFAULT_DURATION);
            Some(AnimationStep::pause(duration))
        }
        _ => None,
    }
}

/// Resolve a numeric slot, recording a warning when the default is used.
pub(crate) fn param(
    resolver: &ValueResolver<'_>,
    warnings: &mut Vec<CompileWarning>,
    block: &Block,
    slot: &str,
    default: f64,
) -> f64 {
    let resolved = resolver.resolve_detailed(block, slot, default);
    if let Some(reason) = resolved.fallback {
        let warning = CompileWarning::MalformedValue {
            block: block.id().clone(),
            slot: slot.to_string(),
            reason,
            default,
        };
        if reason == MalformedReason::Missing {
            tracing::debug!("[EMIT] {}", warning);
        } else {
            tracing::warn!("[EMIT] {}", warning);
        }
        warnings.push(warning);
    }
    resolved.value
}

fn discrete_kind(
    block: &Block,
    field: &str,
    family: StepFamily,
    warnings: &mut Vec<CompileWarning>,
) -> Option<StepKind> {
    let kind = block
        .field(field)
        .and_then(|value| value.as_text())
        .and_then(|text| text.parse::<StepKind>().ok())
        .filter(|kind| kind.family() == family);

    if kind.is_none() {
        let warning = CompileWarning::InvalidField {
            block: block.id().clone(),
            field: field.to_string(),
        };
        tracing::warn!("[EMIT] {}", warning);
        warnings.push(warning);
    }
    kind
}
