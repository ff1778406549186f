//! Destination marker animation
//!
//! The marker hovers above the tapped point, bobbing, pulsing and spinning
//! from the time since it was placed.

use glam::{Quat, Vec3};

const HOVER_HEIGHT: f32 = 0.2;
const BOB_AMPLITUDE: f32 = 0.02;
const BOB_FREQUENCY: f32 = 2.5;
const PULSE_AMPLITUDE: f32 = 0.15;
const PULSE_FREQUENCY: f32 = 3.5;
/// Radians per second about +Y
const SPIN_RATE: f32 = 1.6;

/// Transform of the destination marker at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerPose {
    pub position: Vec3,
    pub scale: f32,
    pub rotation: Quat,
}

/// Destination marker that hovers, pulses and spins above where it was
/// placed. Purely cosmetic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetMarker {
    base: Vec3,
    elapsed: f32,
}

impl TargetMarker {
    pub fn new(base: Vec3) -> Self {
        Self { base, elapsed: 0.0 }
    }

    /// Moves the marker and restarts its animation
    pub fn place(&mut self, base: Vec3) {
        self.base = base;
        self.elapsed = 0.0;
    }

    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt.max(0.0);
    }

    pub fn base(&self) -> Vec3 {
        self.base
    }

    /// Seconds since the marker was placed
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn pose(&self) -> MarkerPose {
        Self::pose_at(self.base, self.elapsed)
    }

    /// Pose `t` seconds after placement at `base`
    pub fn pose_at(base: Vec3, t: f32) -> MarkerPose {
        let bob = BOB_AMPLITUDE * (BOB_FREQUENCY * t).sin();
        MarkerPose {
            position: base + Vec3::new(0.0, HOVER_HEIGHT + bob, 0.0),
            scale: 1.0 + PULSE_AMPLITUDE * (PULSE_FREQUENCY * t).sin(),
            rotation: Quat::from_rotation_y(SPIN_RATE * t),
        }
    }
}
