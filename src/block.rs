use bevy::{ecs::system::EntityCommands, prelude::*, sprite::Anchor};

use crate::{
    app_state::AppState,
    controls::{accept_pressed, arrow_direction, cancel_pressed},
    tween::{stretch_scale, Easing, Tween, STRETCH_AMOUNT},
};

pub struct BlockPlugin;

impl Plugin for BlockPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<BlockAnimationFinished>()
            .add_systems(OnEnter(AppState::BlockPreview), setup_preview)
            .add_systems(Update, (tick_blocks, sync_block_sprites).chain())
            .add_systems(
                Update,
                preview_input
                    .run_if(in_state(AppState::BlockPreview))
                    .before(tick_blocks),
            );
    }
}

pub const MOVE_DURATION: f32 = 0.5;
pub const RESIZE_DURATION: f32 = 0.1;

const SHADOW_SPREAD: f32 = 0.2;
const SHADOW_GLOW: f32 = 0.35;
const SHADOW_Z: f32 = -0.1;

const PREVIEW_SIZE: f32 = 100.0;

/// Runs once when an animation lands, with the entity that was animated.
/// Queued as a command, so it sees the world after the frame's systems.
pub type OnComplete = Box<dyn FnOnce(&mut World, Entity) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationKind {
    Move,
    Expand,
    Collapse,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlockAction {
    Move(Vec2),
    Expand,
    Collapse,
}

impl BlockAction {
    /// Preview controls: arrows move by `step` per axis, accept expands, cancel collapses.
    pub fn from_keys(keys: &Input<KeyCode>, step: Vec2) -> Option<Self> {
        let direction = arrow_direction(keys);
        if direction != Vec2::ZERO {
            Some(BlockAction::Move(direction * step))
        } else if accept_pressed(keys) {
            Some(BlockAction::Expand)
        } else if cancel_pressed(keys) {
            Some(BlockAction::Collapse)
        } else {
            None
        }
    }

    pub fn start(self, block: &mut Block, transform: &Transform) -> bool {
        match self {
            BlockAction::Move(translation) => block.move_by(transform, translation, None),
            BlockAction::Expand => block.expand(transform, None),
            BlockAction::Collapse => block.collapse(transform, None),
        }
    }
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockAnimationFinished {
    pub entity: Entity,
    pub kind: AnimationKind,
}

enum Motion {
    Translate {
        position: Tween<Vec3>,
        squash: Tween<Vec2>,
        release: Tween<Vec2>,
    },
    Resize(Tween<Vec2>),
}

impl Motion {
    fn advance(&mut self, dt: f32) {
        match self {
            Motion::Translate {
                position,
                squash,
                release,
            } => {
                position.advance(dt);
                squash.advance(dt);
                release.advance(dt);
            }
            Motion::Resize(scale) => scale.advance(dt),
        }
    }

    fn is_finished(&self) -> bool {
        match self {
            Motion::Translate {
                position,
                squash,
                release,
            } => position.is_finished() && squash.is_finished() && release.is_finished(),
            Motion::Resize(scale) => scale.is_finished(),
        }
    }

    fn apply(&self, transform: &mut Transform) {
        let scale = match self {
            Motion::Translate {
                position,
                squash,
                release,
            } => {
                transform.translation = position.value();
                if release.is_started() {
                    release.value()
                } else {
                    squash.value()
                }
            }
            Motion::Resize(scale) => scale.value(),
        };
        transform.scale = scale.extend(transform.scale.z);
    }
}

struct ActiveAnimation {
    kind: AnimationKind,
    motion: Motion,
    on_complete: Option<OnComplete>,
}

pub struct FinishedAnimation {
    pub kind: AnimationKind,
    pub on_complete: Option<OnComplete>,
}

/// A square tile centered on its entity's origin, with a glowing shadow child.
///
/// At most one animation runs at a time; requests made while one is in
/// flight are rejected rather than queued.
#[derive(Component)]
pub struct Block {
    size: f32,
    color: Color,
    shadow: Option<Entity>,
    animation: Option<ActiveAnimation>,
}

impl Default for Block {
    fn default() -> Self {
        Self::new(1.0, Color::WHITE)
    }
}

impl Block {
    pub fn new(size: f32, color: Color) -> Self {
        Self {
            size,
            color,
            shadow: None,
            animation: None,
        }
    }

    pub fn with_shadow(mut self, shadow: Entity) -> Self {
        self.shadow = Some(shadow);
        self
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn set_size(&mut self, size: f32) {
        self.size = size;
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn shadow(&self) -> Option<Entity> {
        self.shadow
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Slides by `translation` while squashing along the direction of travel.
    pub fn move_by(
        &mut self,
        transform: &Transform,
        translation: Vec2,
        on_complete: Option<OnComplete>,
    ) -> bool {
        if self.is_animating() {
            return false;
        }

        let half = MOVE_DURATION / 2.0;
        let initial_scale = transform.scale.truncate();
        let stretched = stretch_scale(initial_scale, translation, STRETCH_AMOUNT);
        let motion = Motion::Translate {
            position: Tween::new(
                transform.translation,
                transform.translation + translation.extend(0.0),
                MOVE_DURATION,
            )
            .with_easing(Easing::EaseInOutCubic),
            squash: Tween::new(initial_scale, stretched, half).with_easing(Easing::EaseInOutCubic),
            release: Tween::new(stretched, initial_scale, half)
                .with_delay(half)
                .with_easing(Easing::EaseInOutCubic),
        };
        self.start(AnimationKind::Move, motion, on_complete);
        true
    }

    pub fn expand(&mut self, transform: &Transform, on_complete: Option<OnComplete>) -> bool {
        self.resize(AnimationKind::Expand, transform, Vec2::ONE, on_complete)
    }

    pub fn collapse(&mut self, transform: &Transform, on_complete: Option<OnComplete>) -> bool {
        self.resize(AnimationKind::Collapse, transform, Vec2::ZERO, on_complete)
    }

    fn resize(
        &mut self,
        kind: AnimationKind,
        transform: &Transform,
        target: Vec2,
        on_complete: Option<OnComplete>,
    ) -> bool {
        if self.is_animating() {
            return false;
        }
        let scale = Tween::new(transform.scale.truncate(), target, RESIZE_DURATION)
            .with_easing(Easing::EaseInOutCubic);
        self.start(kind, Motion::Resize(scale), on_complete);
        true
    }

    fn start(&mut self, kind: AnimationKind, motion: Motion, on_complete: Option<OnComplete>) {
        self.animation = Some(ActiveAnimation {
            kind,
            motion,
            on_complete,
        });
    }

    /// Advances the running animation by `dt` seconds and writes it to `transform`.
    /// Returns the finished animation on the frame it lands.
    pub fn tick(&mut self, dt: f32, transform: &mut Transform) -> Option<FinishedAnimation> {
        let animation = self.animation.as_mut()?;
        animation.motion.advance(dt);
        animation.motion.apply(transform);
        if !animation.motion.is_finished() {
            return None;
        }

        let animation = self.animation.take()?;
        Some(FinishedAnimation {
            kind: animation.kind,
            on_complete: animation.on_complete,
        })
    }
}

#[derive(Debug, Component)]
pub struct BlockShadow;

#[derive(Debug, Component)]
pub struct BlockPreview;

fn block_sprite(size: f32, color: Color) -> Sprite {
    Sprite {
        color,
        custom_size: Some(Vec2::splat(size)),
        anchor: Anchor::Center,
        ..default()
    }
}

fn shadow_sprite(size: f32, color: Color) -> Sprite {
    Sprite {
        color: color.with_a(SHADOW_GLOW),
        custom_size: Some(Vec2::splat(size * (1.0 + SHADOW_SPREAD))),
        anchor: Anchor::Center,
        ..default()
    }
}

/// Turns `entity` into a block with its shadow child and returns its id.
pub fn spawn_block(
    mut entity: EntityCommands,
    size: f32,
    color: Color,
    translation: Vec3,
) -> Entity {
    let mut shadow = Entity::PLACEHOLDER;
    entity
        .insert(SpriteBundle {
            sprite: block_sprite(size, color),
            transform: Transform::from_translation(translation),
            ..default()
        })
        .with_children(|parent| {
            shadow = parent
                .spawn((
                    SpriteBundle {
                        sprite: shadow_sprite(size, color),
                        transform: Transform::from_xyz(0.0, 0.0, SHADOW_Z),
                        ..default()
                    },
                    BlockShadow,
                ))
                .id();
        });
    entity.insert(Block::new(size, color).with_shadow(shadow));
    entity.id()
}

pub fn tick_blocks(
    mut commands: Commands,
    time: Res<Time>,
    mut blocks: Query<(Entity, &mut Block, &mut Transform)>,
    mut finished: EventWriter<BlockAnimationFinished>,
) {
    let dt = time.delta_seconds();
    for (entity, mut block, mut transform) in &mut blocks {
        if !block.is_animating() {
            continue;
        }
        let Some(done) = block.tick(dt, &mut transform) else {
            continue;
        };
        debug!("block {:?} finished {:?}", entity, done.kind);
        if let Some(on_complete) = done.on_complete {
            commands.add(move |world: &mut World| on_complete(world, entity));
        }
        finished.send(BlockAnimationFinished {
            entity,
            kind: done.kind,
        });
    }
}

fn sync_block_sprites(
    blocks: Query<(Entity, &Block), Changed<Block>>,
    mut sprites: Query<&mut Sprite>,
) {
    // ticking marks every animating block changed; only touch sprites that differ
    for (entity, block) in &blocks {
        let size = Some(Vec2::splat(block.size));
        if let Ok(mut sprite) = sprites.get_mut(entity) {
            if sprite.custom_size != size || sprite.color != block.color {
                sprite.custom_size = size;
                sprite.color = block.color;
            }
        }
        let Some(shadow) = block.shadow else {
            continue;
        };
        if let Ok(mut sprite) = sprites.get_mut(shadow) {
            let wanted = shadow_sprite(block.size, block.color);
            if sprite.custom_size != wanted.custom_size || sprite.color != wanted.color {
                *sprite = wanted;
            }
        }
    }
}

fn setup_preview(mut commands: Commands) {
    let entity = spawn_block(
        commands.spawn(BlockPreview),
        PREVIEW_SIZE,
        Color::WHITE,
        Vec3::ZERO,
    );
    info!("block preview ready: {:?}", entity);
}

fn preview_input(
    keys: Res<Input<KeyCode>>,
    mut blocks: Query<(&mut Block, &Transform), With<BlockPreview>>,
) {
    for (mut block, transform) in &mut blocks {
        let step = Vec2::splat(block.size());
        let Some(action) = BlockAction::from_keys(&keys, step) else {
            continue;
        };
        if !action.start(&mut block, transform) {
            debug!("block busy, dropped {:?}", action);
        }
    }
}
