//! Idle motion of the monster as closed-form functions of elapsed time.
//!
//! Nothing here keeps state: the caller supplies `t` (seconds since mount) and every
//! derived value is recomputed from it, so any frame can be replayed exactly.

use std::f64::consts::PI;

use crate::scene::graph::SceneNode;

/// Breathing rate, in radians per second.
pub const BREATHE_FREQ: f64 = 2.0;
/// Peak change of the body's vertical scale.
pub const BREATHE_AMP: f64 = 0.03;
/// Body sway rate, in radians per second.
pub const SWAY_FREQ: f64 = 1.5;
/// Peak body rotation, in radians.
pub const SWAY_AMP: f64 = 0.02;
/// Rate of the blink wave, in radians per second.
pub const BLINK_FREQ: f64 = 0.5;
/// Eye-group scale-Y while the eyes are shut.
pub const BLINK_SCALE: f64 = 0.1;
/// Arm wave rate, in radians per second.
pub const ARM_FREQ: f64 = 1.5;
/// Peak arm swing, in radians.
pub const ARM_AMP: f64 = 0.4;
/// Resting outward tilt of each arm, in radians.
pub const ARM_BIAS: f64 = 0.2;

const BLINK_HIGH: f64 = 0.9;
const BLINK_LOW: f64 = 0.1;

/// Per-frame transform overrides derived from `t`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct AnimationState {
    /// Elapsed seconds this state was computed for.
    pub t: f64,
    /// Vertical scale of the whole monster.
    pub body_scale_y: f64,
    /// Rotation of the whole monster, clockwise on screen.
    pub body_rotation: f64,
    /// Vertical scale of the eye group; [`BLINK_SCALE`] while blinking.
    pub eye_scale_y: f64,
    /// Rotation of the left arm.
    pub left_arm_rotation: f64,
    /// Rotation of the right arm, half a wave behind the left.
    pub right_arm_rotation: f64,
}

impl AnimationState {
    /// Computes the pose for `t` seconds after mount.
    pub fn at(t: f64) -> Self {
        let arm_phase = t * ARM_FREQ;
        Self {
            t,
            body_scale_y: 1.0 + (t * BREATHE_FREQ).sin() * BREATHE_AMP,
            body_rotation: (t * SWAY_FREQ).sin() * SWAY_AMP,
            eye_scale_y: if eyes_closed(t) { BLINK_SCALE } else { 1.0 },
            left_arm_rotation: arm_phase.sin() * ARM_AMP - ARM_BIAS,
            right_arm_rotation: (arm_phase + PI).sin() * ARM_AMP + ARM_BIAS,
        }
    }
}

/// The blink cycle `(sin(0.5t) + 1) / 2` shuts the eyes near both of its extremes.
pub fn eyes_closed(t: f64) -> bool {
    let cycle = ((t * BLINK_FREQ).sin() + 1.0) / 2.0;
    cycle > BLINK_HIGH || cycle < BLINK_LOW
}

/// Writes the motion for time `t` into the scene's transforms.
///
/// Only scale-Y and rotation fields change; structure and primitives are untouched.
/// Breathing and sway apply to the root so the whole monster moves together. Nodes
/// that are missing from the tree are skipped.
pub fn tick(root: &mut SceneNode, t: f64) -> AnimationState {
    let state = AnimationState::at(t);

    root.transform.scale.y = state.body_scale_y;
    root.transform.rotation_rad = state.body_rotation;

    if let Some(eyes) = root.find_mut("eyes") {
        eyes.transform.scale.y = state.eye_scale_y;
    }
    if let Some(arm) = root.find_mut("left_arm") {
        arm.transform.rotation_rad = state.left_arm_rotation;
    }
    if let Some(arm) = root.find_mut("right_arm") {
        arm.transform.rotation_rad = state.right_arm_rotation;
    }

    state
}

#[cfg(test)]
#[path = "../../tests/unit/animation/clock.rs"]
mod tests;
