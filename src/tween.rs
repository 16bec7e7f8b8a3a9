//! Time-driven interpolation advanced by an explicit frame step.
//!
//! Nothing here touches the ECS: components own a [`Tween`] and call
//! [`Tween::advance`] once per frame with `Time::delta_seconds()`.

use bevy::prelude::*;

/// Fraction a block is stretched along its direction of travel.
pub const STRETCH_AMOUNT: f32 = 0.1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Easing {
    #[default]
    Linear,
    EaseInOutCubic,
}

impl Easing {
    /// Maps linear progress in `0.0..=1.0` onto the curve.
    pub fn apply(self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

pub trait Lerp: Copy {
    fn lerp_to(self, to: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp_to(self, to: Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

impl Lerp for Vec2 {
    fn lerp_to(self, to: Self, t: f32) -> Self {
        self.lerp(to, t)
    }
}

impl Lerp for Vec3 {
    fn lerp_to(self, to: Self, t: f32) -> Self {
        self.lerp(to, t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween<T> {
    from: T,
    to: T,
    duration: f32,
    delay: f32,
    elapsed: f32,
    easing: Easing,
}

impl<T: Lerp> Tween<T> {
    pub fn new(from: T, to: T, duration: f32) -> Self {
        Self {
            from,
            to,
            duration,
            delay: 0.0,
            elapsed: 0.0,
            easing: Easing::Linear,
        }
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt;
    }

    pub fn is_started(&self) -> bool {
        self.elapsed >= self.delay
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.delay + self.duration
    }

    /// Linear progress, clamped to `0.0..=1.0`. Zero-length tweens jump to the end.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return if self.is_started() { 1.0 } else { 0.0 };
        }
        ((self.elapsed - self.delay) / self.duration).clamp(0.0, 1.0)
    }

    pub fn value(&self) -> T {
        self.from.lerp_to(self.to, self.easing.apply(self.progress()))
    }
}

/// Scale a block should squash towards while travelling by `translation`.
///
/// The current scale is decomposed along the movement direction and its
/// perpendicular; the first is inflated and the second deflated by `amount`,
/// and each axis of the result stays within `amount` of that axis of `scale`.
pub fn stretch_scale(scale: Vec2, translation: Vec2, amount: f32) -> Vec2 {
    let direction = translation.normalize_or_zero().abs();
    if direction == Vec2::ZERO {
        return scale;
    }
    let perpendicular = Vec2::new(-direction.y, direction.x).abs();

    let along = scale.dot(direction).abs() * (1.0 + amount);
    let across = scale.dot(perpendicular).abs() * (1.0 - amount);

    let shrunk = scale * (1.0 - amount);
    let grown = scale * (1.0 + amount);
    (direction * along + perpendicular * across)
        .max(shrunk.min(grown))
        .min(shrunk.max(grown))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cubic_curve_hits_its_anchors() {
        let ease = Easing::EaseInOutCubic;
        assert_eq!(ease.apply(0.0), 0.0);
        assert_eq!(ease.apply(0.5), 0.5);
        assert_eq!(ease.apply(1.0), 1.0);
        assert!(ease.apply(0.25) < 0.25);
        assert!(ease.apply(0.75) > 0.75);
    }

    #[test]
    fn delayed_tween_holds_its_start_value() {
        let mut tween = Tween::new(0.0_f32, 10.0, 1.0).with_delay(0.5);
        tween.advance(0.25);
        assert!(!tween.is_started());
        assert_eq!(tween.value(), 0.0);

        tween.advance(0.75);
        assert!(tween.is_started());
        assert!((tween.value() - 5.0).abs() < 1e-5);
        assert!(!tween.is_finished());

        tween.advance(1.0);
        assert!(tween.is_finished());
        assert_eq!(tween.value(), 10.0);
    }

    #[test]
    fn zero_length_tween_jumps_to_target() {
        let mut tween = Tween::new(Vec2::ZERO, Vec2::ONE, 0.0);
        assert_eq!(tween.progress(), 1.0);
        tween.advance(0.016);
        assert!(tween.is_finished());
        assert_eq!(tween.value(), Vec2::ONE);
    }

    #[test]
    fn horizontal_move_stretches_x_and_squashes_y() {
        let target = stretch_scale(Vec2::ONE, Vec2::new(100.0, 0.0), STRETCH_AMOUNT);
        assert!((target.x - 1.1).abs() < 1e-5);
        assert!((target.y - 0.9).abs() < 1e-5);

        let target = stretch_scale(Vec2::ONE, Vec2::new(0.0, -3.0), STRETCH_AMOUNT);
        assert!((target.x - 0.9).abs() < 1e-5);
        assert!((target.y - 1.1).abs() < 1e-5);
    }

    #[test]
    fn stretch_is_clamped_relative_to_current_scale() {
        let target = stretch_scale(Vec2::splat(2.0), Vec2::new(1.0, 0.0), STRETCH_AMOUNT);
        assert!((target.x - 2.2).abs() < 1e-5);
        assert!((target.y - 1.8).abs() < 1e-5);

        let target = stretch_scale(Vec2::new(2.0, 0.5), Vec2::new(0.0, 4.0), STRETCH_AMOUNT);
        assert!((target.x - 1.8).abs() < 1e-5);
        assert!((target.y - 0.55).abs() < 1e-5);

        let diagonal = stretch_scale(Vec2::ONE, Vec2::new(1.0, 1.0), STRETCH_AMOUNT);
        assert!((diagonal.x - 1.1).abs() < 1e-5 && (diagonal.y - 1.1).abs() < 1e-5);
    }

    #[test]
    fn collapsed_scale_stays_collapsed() {
        assert_eq!(
            stretch_scale(Vec2::ZERO, Vec2::new(1.0, 0.0), STRETCH_AMOUNT),
            Vec2::ZERO
        );
    }

    #[test]
    fn standing_still_keeps_the_scale() {
        assert_eq!(
            stretch_scale(Vec2::new(0.5, 0.7), Vec2::ZERO, STRETCH_AMOUNT),
            Vec2::new(0.5, 0.7)
        );
    }
}
