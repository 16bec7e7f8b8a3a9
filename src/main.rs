use bevy::{prelude::*, window::close_on_esc, DefaultPlugins};
use tactris::{
    app_state::AppState,
    block::BlockPlugin,
    config::{log_config, TactrisConfig},
    counter::CounterPlugin,
    shape::ShapePlugin,
    stage::StagePlugin,
};

fn main() {
    let config = TactrisConfig::from_env().unwrap_or_else(|err| {
        eprintln!("{err}, starting on the stage");
        TactrisConfig::default()
    });

    App::new()
        .insert_resource(State::new(config.start_scene))
        .insert_resource(config)
        .add_state::<AppState>()
        .add_plugins(DefaultPlugins)
        .add_plugins(BlockPlugin)
        .add_plugins(ShapePlugin)
        .add_plugins(CounterPlugin)
        .add_plugins(StagePlugin)
        .add_systems(Startup, (setup, log_config))
        // escape collapses blocks in the previews
        .add_systems(Update, close_on_esc.run_if(in_state(AppState::Stage)))
        .run();
}

fn setup(mut commands: Commands) {
    commands.spawn(Camera2dBundle::default());
}
