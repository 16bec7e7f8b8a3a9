use std::env;

use bevy::prelude::*;

use crate::app_state::{AppState, SceneParseError};

pub const SCENE_ENV_VAR: &str = "TACTRIS_SCENE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
    Android,
    Ios,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        Self::from_os_name(env::consts::OS)
    }

    pub fn from_os_name(name: &str) -> Self {
        match name {
            "windows" => Platform::Windows,
            "macos" => Platform::MacOs,
            "linux" => Platform::Linux,
            "android" => Platform::Android,
            "ios" => Platform::Ios,
            _ => Platform::Other,
        }
    }

    /// Platforms whose layouts ignore the display safe area.
    pub fn is_desktop(self) -> bool {
        matches!(self, Platform::Windows | Platform::MacOs)
    }
}

#[derive(Debug, Clone, Resource)]
pub struct TactrisConfig {
    pub start_scene: AppState,
    pub platform: Platform,
}

impl Default for TactrisConfig {
    fn default() -> Self {
        Self {
            start_scene: AppState::default(),
            platform: Platform::current(),
        }
    }
}

impl TactrisConfig {
    /// Reads the start scene from `TACTRIS_SCENE`; unset means the stage.
    pub fn from_env() -> Result<Self, SceneParseError> {
        let start_scene = match env::var(SCENE_ENV_VAR) {
            Ok(name) => name.parse()?,
            Err(_) => AppState::default(),
        };
        Ok(Self {
            start_scene,
            ..default()
        })
    }
}

pub fn log_config(config: Res<TactrisConfig>) {
    info!(
        "starting in {:?} on {:?}",
        config.start_scene, config.platform
    );
}
