use bevy::prelude::*;

use crate::{
    app_state::AppState,
    config::TactrisConfig,
    counter::{spawn_counter, Counter},
};

pub struct StagePlugin;

impl Plugin for StagePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TactrisConfig>()
            .init_resource::<SafeArea>()
            .add_systems(
                OnEnter(AppState::Stage),
                (
                    setup_stage,
                    apply_deferred,
                    reset_scores,
                    adjust_for_safe_area,
                )
                    .chain(),
            );
    }
}

const MARGIN: f32 = 32.0;
const CAPTION_FONT_SIZE: f32 = 28.0;
const COUNTER_FONT_SIZE: f32 = 64.0;
const CAPTION_COLOR: Color = Color::rgb(0.6, 0.6, 0.6);

/// Region of the screen not covered by notches or rounded corners, in
/// physical pixels with y growing downwards. Filled in by the platform layer;
/// the default means no insets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Resource)]
pub struct SafeArea {
    pub screen: Vec2,
    pub rect: Rect,
}

impl SafeArea {
    pub fn top_inset(&self) -> f32 {
        self.rect.min.y
    }

    pub fn bottom_inset(&self) -> f32 {
        self.screen.y - self.rect.min.y - self.rect.height()
    }
}

#[derive(Debug, Component)]
pub struct MarginContainer;

#[derive(Debug, Component)]
pub struct CurrentScore;

#[derive(Debug, Component)]
pub struct MaxScore;

fn caption(text: &str) -> TextBundle {
    TextBundle::from_section(
        text,
        TextStyle {
            font_size: CAPTION_FONT_SIZE,
            color: CAPTION_COLOR,
            ..default()
        },
    )
}

fn score_column() -> NodeBundle {
    NodeBundle {
        style: Style {
            flex_direction: FlexDirection::Column,
            align_items: AlignItems::Center,
            ..default()
        },
        ..default()
    }
}

fn setup_stage(mut commands: Commands) {
    commands
        .spawn((
            NodeBundle {
                style: Style {
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    justify_content: JustifyContent::SpaceBetween,
                    align_items: AlignItems::FlexStart,
                    padding: UiRect::all(Val::Px(MARGIN)),
                    ..default()
                },
                ..default()
            },
            MarginContainer,
        ))
        .with_children(|margin| {
            margin.spawn(score_column()).with_children(|column| {
                column.spawn(caption("SCORE"));
                spawn_counter(column.spawn(CurrentScore), COUNTER_FONT_SIZE);
            });
            margin.spawn(score_column()).with_children(|column| {
                column.spawn(caption("BEST"));
                spawn_counter(column.spawn(MaxScore), COUNTER_FONT_SIZE);
            });
        });
}

fn reset_scores(mut counters: Query<&mut Counter, Or<(With<CurrentScore>, With<MaxScore>)>>) {
    for mut counter in &mut counters {
        counter.set_value(0);
    }
}

fn grow(val: Val, by: f32) -> Val {
    match val {
        Val::Px(px) => Val::Px(px + by),
        _ => Val::Px(by),
    }
}

fn adjust_for_safe_area(
    config: Res<TactrisConfig>,
    safe_area: Res<SafeArea>,
    mut containers: Query<&mut Style, With<MarginContainer>>,
) {
    if config.platform.is_desktop() {
        return;
    }

    let (top, bottom) = (safe_area.top_inset(), safe_area.bottom_inset());
    for mut style in &mut containers {
        style.padding.top = grow(style.padding.top, top);
        style.padding.bottom = grow(style.padding.bottom, bottom);
    }
    info!("stage margins grown by {top} (top) and {bottom} (bottom) for the safe area");
}

#[cfg(test)]
mod tests {
    use crate::config::Platform;

    use super::*;

    fn stage_app(platform: Platform, safe_area: SafeArea) -> App {
        let mut app = App::new();
        app.init_resource::<Time>()
            .init_resource::<Input<KeyCode>>()
            .insert_resource(TactrisConfig {
                platform,
                ..default()
            })
            .insert_resource(safe_area)
            .add_state::<AppState>()
            .add_plugins((crate::counter::CounterPlugin, StagePlugin));
        app.update();
        app
    }

    fn notched() -> SafeArea {
        SafeArea {
            screen: Vec2::new(1080.0, 2400.0),
            rect: Rect::new(0.0, 100.0, 1080.0, 2200.0),
        }
    }

    fn padding(app: &mut App) -> UiRect {
        app.world
            .query_filtered::<&Style, With<MarginContainer>>()
            .single(&app.world)
            .padding
    }

    #[test]
    fn safe_area_insets() {
        let area = notched();
        assert_eq!(area.top_inset(), 100.0);
        assert_eq!(area.bottom_inset(), 200.0);
        assert_eq!(SafeArea::default().bottom_inset(), 0.0);
    }

    #[test]
    fn stage_spawns_two_zeroed_counters() {
        let mut app = stage_app(Platform::Windows, SafeArea::default());
        let mut counters = app.world.query::<&Counter>();
        let values: Vec<_> = counters.iter(&app.world).map(Counter::value).collect();
        assert_eq!(values, vec![0, 0]);
        assert!(counters.iter(&app.world).all(|c| !c.is_animating()));
    }

    #[test]
    fn mobile_margins_grow_by_the_insets() {
        let mut app = stage_app(Platform::Android, notched());
        let padding = padding(&mut app);
        assert_eq!(padding.top, Val::Px(MARGIN + 100.0));
        assert_eq!(padding.bottom, Val::Px(MARGIN + 200.0));
        assert_eq!(padding.left, Val::Px(MARGIN));
    }

    #[test]
    fn desktop_margins_are_left_alone() {
        let mut app = stage_app(Platform::MacOs, notched());
        let padding = padding(&mut app);
        assert_eq!(padding.top, Val::Px(MARGIN));
        assert_eq!(padding.bottom, Val::Px(MARGIN));
    }
}
