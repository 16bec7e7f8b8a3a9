use bevy::{ecs::system::EntityCommands, prelude::*};

use crate::{app_state::AppState, tween::Tween};

pub struct CounterPlugin;

impl Plugin for CounterPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(AppState::CounterPreview), setup_preview)
            .add_systems(
                Update,
                (
                    preview_input.run_if(in_state(AppState::CounterPreview)),
                    tick_counters,
                    render_counters,
                )
                    .chain(),
            );
    }
}

pub const TOTAL_DIGITS: usize = 4;

const SECONDS_PER_STEP: f32 = 0.05;
const MAX_ROLL_DURATION: f32 = 0.3;

const UNDERLAY_ALPHA: f32 = 0.25;
const NEUTRAL_COLOR: Color = Color::WHITE;
const INCREASE_COLOR: Color = Color::GREEN;
// indian red
const DECREASE_COLOR: Color = Color::rgb(0.804, 0.361, 0.361);

const PREVIEW_FONT_SIZE: f32 = 160.0;

pub fn roll_duration(from: u32, to: u32) -> f32 {
    (from.abs_diff(to) as f32 * SECONDS_PER_STEP).clamp(0.0, MAX_ROLL_DURATION)
}

/// The unfilled leading digits, drawn dimmed behind the value.
pub fn underlay_text(value: u32) -> String {
    "0".repeat(TOTAL_DIGITS.saturating_sub(value.to_string().len()))
}

pub fn overlay_text(value: u32) -> String {
    format!("{:>width$}", value, width = TOTAL_DIGITS)
}

/// Non-negative score display that rolls between values.
///
/// The stored value changes immediately; `displayed` catches up over a short
/// roll while both labels flash green (up) or red (down).
#[derive(Debug, Component)]
pub struct Counter {
    value: u32,
    displayed: u32,
    color: Color,
    roll: Option<Tween<f32>>,
    underlay: Entity,
    overlay: Entity,
}

impl Counter {
    pub fn new(underlay: Entity, overlay: Entity) -> Self {
        Self {
            value: 0,
            displayed: 0,
            color: NEUTRAL_COLOR,
            roll: None,
            underlay,
            overlay,
        }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn displayed(&self) -> u32 {
        self.displayed
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn is_animating(&self) -> bool {
        self.roll.is_some()
    }

    pub fn set_value(&mut self, value: i64) {
        let old = self.value;
        let new = value.clamp(0, i64::from(u32::MAX)) as u32;
        self.value = new;

        // landing on the current value settles any roll in flight
        if new == old {
            self.roll = None;
            self.displayed = new;
            self.color = NEUTRAL_COLOR;
            return;
        }

        // a roll already in flight restarts from whatever is on screen
        self.roll = Some(Tween::new(
            self.displayed as f32,
            new as f32,
            roll_duration(old, new),
        ));
        self.color = if new > old {
            INCREASE_COLOR
        } else {
            DECREASE_COLOR
        };
    }

    pub fn add(&mut self, delta: i64) {
        self.set_value(i64::from(self.value) + delta);
    }

    /// Returns true on the frame the roll lands.
    pub fn tick(&mut self, dt: f32) -> bool {
        let Some(roll) = self.roll.as_mut() else {
            return false;
        };
        roll.advance(dt);
        self.displayed = roll.value().round() as u32;
        if !roll.is_finished() {
            return false;
        }

        self.roll = None;
        self.displayed = self.value;
        self.color = NEUTRAL_COLOR;
        true
    }
}

#[derive(Debug, Component)]
pub struct CounterUnderlay;

#[derive(Debug, Component)]
pub struct CounterOverlay;

#[derive(Debug, Component)]
pub struct CounterPreview;

fn label_style(font_size: f32, color: Color) -> TextStyle {
    TextStyle {
        font_size,
        color,
        ..default()
    }
}

/// Turns `entity` into a counter node with its two labels and returns its id.
/// The overlay is laid out normally; the underlay is pinned behind it.
pub fn spawn_counter(mut entity: EntityCommands, font_size: f32) -> Entity {
    let mut underlay = Entity::PLACEHOLDER;
    let mut overlay = Entity::PLACEHOLDER;
    entity
        .insert(NodeBundle::default())
        .with_children(|labels| {
            underlay = labels
                .spawn((
                    TextBundle::from_section(
                        underlay_text(0),
                        label_style(font_size, NEUTRAL_COLOR.with_a(UNDERLAY_ALPHA)),
                    )
                    .with_style(Style {
                        position_type: PositionType::Absolute,
                        top: Val::Px(0.0),
                        left: Val::Px(0.0),
                        ..default()
                    }),
                    CounterUnderlay,
                ))
                .id();
            overlay = labels
                .spawn((
                    TextBundle::from_section(overlay_text(0), label_style(font_size, NEUTRAL_COLOR)),
                    CounterOverlay,
                ))
                .id();
        });
    entity.insert(Counter::new(underlay, overlay));
    entity.id()
}

fn tick_counters(time: Res<Time>, mut counters: Query<(Entity, &mut Counter)>) {
    let dt = time.delta_seconds();
    for (entity, mut counter) in &mut counters {
        if counter.is_animating() && counter.tick(dt) {
            debug!("counter {:?} settled at {}", entity, counter.value());
        }
    }
}

fn render_counters(counters: Query<&Counter, Changed<Counter>>, mut labels: Query<&mut Text>) {
    for counter in &counters {
        if let Ok(mut text) = labels.get_mut(counter.underlay) {
            if let Some(section) = text.sections.first_mut() {
                section.value = underlay_text(counter.displayed);
                section.style.color = counter.color.with_a(UNDERLAY_ALPHA);
            }
        }
        if let Ok(mut text) = labels.get_mut(counter.overlay) {
            if let Some(section) = text.sections.first_mut() {
                section.value = overlay_text(counter.displayed);
                section.style.color = counter.color.with_a(1.0);
            }
        }
    }
}

fn setup_preview(mut commands: Commands) {
    commands
        .spawn(NodeBundle {
            style: Style {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            ..default()
        })
        .with_children(|root| {
            spawn_counter(root.spawn(CounterPreview), PREVIEW_FONT_SIZE);
        });
    info!("counter preview ready: up/down for +-1, left/right for -+15");
}

fn preview_input(
    keys: Res<Input<KeyCode>>,
    mut counters: Query<&mut Counter, With<CounterPreview>>,
) {
    let mut change = 0;
    if keys.just_pressed(KeyCode::Up) {
        change += 1;
    }
    if keys.just_pressed(KeyCode::Down) {
        change -= 1;
    }
    if keys.just_pressed(KeyCode::Left) {
        change -= 15;
    }
    if keys.just_pressed(KeyCode::Right) {
        change += 15;
    }
    if change == 0 {
        return;
    }
    for mut counter in &mut counters {
        counter.add(change);
    }
}

#[cfg(test)]
mod tests {
    use bevy::utils::{Duration, Instant};

    use super::*;

    fn counter() -> Counter {
        Counter::new(Entity::PLACEHOLDER, Entity::PLACEHOLDER)
    }

    #[test]
    fn formats_with_dim_leading_zeros() {
        assert_eq!(underlay_text(0), "000");
        assert_eq!(overlay_text(0), "   0");
        assert_eq!(underlay_text(42), "00");
        assert_eq!(overlay_text(42), "  42");
        assert_eq!(underlay_text(1234), "");
        assert_eq!(overlay_text(1234), "1234");
        assert_eq!(underlay_text(123456), "");
        assert_eq!(overlay_text(123456), "123456");
    }

    #[test]
    fn roll_duration_scales_with_change_and_caps() {
        assert!((roll_duration(0, 1) - 0.05).abs() < 1e-6);
        assert!((roll_duration(5, 2) - 0.15).abs() < 1e-6);
        assert!((roll_duration(0, 6) - 0.3).abs() < 1e-6);
        assert_eq!(roll_duration(0, 500), 0.3);
        assert_eq!(roll_duration(7, 7), 0.0);
    }

    #[test]
    fn same_value_does_not_animate() {
        let mut counter = counter();
        counter.set_value(0);
        assert!(!counter.is_animating());
        assert_eq!(counter.displayed(), 0);
        assert_eq!(counter.color(), NEUTRAL_COLOR);
    }

    #[test]
    fn same_value_mid_roll_settles_immediately() {
        let mut counter = counter();
        counter.set_value(10);
        counter.tick(0.1);
        assert!(counter.is_animating());
        assert!(counter.displayed() < 10);

        counter.set_value(10);
        assert!(!counter.is_animating());
        assert_eq!(counter.displayed(), 10);
        assert_eq!(counter.color(), NEUTRAL_COLOR);
        assert!(!counter.tick(0.1));
    }

    #[test]
    fn negative_values_clamp_to_zero() {
        let mut counter = counter();
        counter.set_value(-5);
        assert_eq!(counter.value(), 0);
        assert!(!counter.is_animating());

        counter.set_value(3);
        counter.add(-10);
        assert_eq!(counter.value(), 0);
    }

    #[test]
    fn roll_sweeps_and_flashes() {
        let mut counter = counter();
        counter.set_value(4);
        assert_eq!(counter.value(), 4);
        assert_eq!(counter.displayed(), 0);
        assert_eq!(counter.color(), INCREASE_COLOR);

        assert!(!counter.tick(0.1));
        assert_eq!(counter.displayed(), 2);
        assert!(counter.tick(0.1));
        assert_eq!(counter.displayed(), 4);
        assert_eq!(counter.color(), NEUTRAL_COLOR);
        assert!(!counter.is_animating());

        counter.set_value(1);
        assert_eq!(counter.color(), DECREASE_COLOR);
        assert!(counter.tick(1.0));
        assert_eq!(counter.displayed(), 1);
    }

    #[test]
    fn retarget_starts_from_displayed_value() {
        let mut counter = counter();
        counter.set_value(10);
        counter.tick(0.15);
        assert_eq!(counter.displayed(), 5);

        counter.set_value(20);
        assert_eq!(counter.value(), 20);
        counter.tick(0.0);
        assert_eq!(counter.displayed(), 5);
        counter.tick(0.3);
        assert_eq!(counter.displayed(), 20);
    }

    fn label(app: &App, entity: Entity) -> String {
        app.world.get::<Text>(entity).unwrap().sections[0].value.clone()
    }

    #[test]
    fn labels_follow_the_counter() {
        let start = Instant::now();
        let mut app = App::new();
        app.insert_resource(Time::new(start))
            .init_resource::<Input<KeyCode>>()
            .add_state::<AppState>()
            .add_plugins(CounterPlugin)
            .add_systems(Startup, |mut commands: Commands| {
                spawn_counter(commands.spawn_empty(), 48.0);
            });
        app.update();

        let entity = app
            .world
            .query_filtered::<Entity, With<Counter>>()
            .single(&app.world);
        let (underlay, overlay) = {
            let counter = app.world.get::<Counter>(entity).unwrap();
            (counter.underlay, counter.overlay)
        };
        assert_eq!(label(&app, underlay), "000");
        assert_eq!(label(&app, overlay), "   0");

        app.world.get_mut::<Counter>(entity).unwrap().set_value(12);
        {
            let mut time = app.world.resource_mut::<Time>();
            time.update_with_instant(start);
            time.update_with_instant(start + Duration::from_secs(1));
        }
        app.update();

        assert_eq!(label(&app, underlay), "00");
        assert_eq!(label(&app, overlay), "  12");
        let color = app.world.get::<Text>(overlay).unwrap().sections[0].style.color;
        assert_eq!(color, NEUTRAL_COLOR);
    }
}
