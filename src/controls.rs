use bevy::prelude::*;

/// Sum of the arrow keys pressed this frame, y pointing up.
pub fn arrow_direction(keys: &Input<KeyCode>) -> Vec2 {
    let mut direction = Vec2::ZERO;
    if keys.just_pressed(KeyCode::Up) {
        direction += Vec2::Y;
    }
    if keys.just_pressed(KeyCode::Down) {
        direction -= Vec2::Y;
    }
    if keys.just_pressed(KeyCode::Left) {
        direction -= Vec2::X;
    }
    if keys.just_pressed(KeyCode::Right) {
        direction += Vec2::X;
    }
    direction
}

pub fn accept_pressed(keys: &Input<KeyCode>) -> bool {
    keys.any_just_pressed([KeyCode::Return, KeyCode::Space])
}

pub fn cancel_pressed(keys: &Input<KeyCode>) -> bool {
    keys.any_just_pressed([KeyCode::Escape, KeyCode::Back])
}
