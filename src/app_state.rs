use std::str::FromStr;

use bevy::prelude::*;
use thiserror::Error;

/// Top-level scene. Every variant except `Stage` is a standalone preview of a
/// single component that reacts to the arrow, accept and cancel keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, States)]
pub enum AppState {
    #[default]
    Stage,
    BlockPreview,
    ShapePreview,
    CounterPreview,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown scene `{0}`, expected one of: stage, block, shape, counter")]
pub struct SceneParseError(pub String);

impl FromStr for AppState {
    type Err = SceneParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stage" => Ok(AppState::Stage),
            "block" => Ok(AppState::BlockPreview),
            "shape" => Ok(AppState::ShapePreview),
            "counter" => Ok(AppState::CounterPreview),
            _ => Err(SceneParseError(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scene_names() {
        assert_eq!("stage".parse(), Ok(AppState::Stage));
        assert_eq!(" Shape ".parse(), Ok(AppState::ShapePreview));
        assert_eq!("COUNTER".parse(), Ok(AppState::CounterPreview));
        assert_eq!(
            "board".parse::<AppState>(),
            Err(SceneParseError("board".to_owned()))
        );
    }
}
