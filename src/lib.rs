pub mod app_state;
pub mod block;
pub mod config;
pub mod controls;
pub mod counter;
pub mod shape;
pub mod stage;
pub mod tween;
