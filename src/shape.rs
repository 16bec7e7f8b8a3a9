use bevy::prelude::*;
use lazy_static::*;
use rand::Rng;

use crate::{
    app_state::AppState,
    block::{spawn_block, tick_blocks, Block, BlockAction},
};

pub struct ShapePlugin;

impl Plugin for ShapePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ShapeAction>()
            .add_systems(OnEnter(AppState::ShapePreview), setup_preview)
            .add_systems(Update, sync_shape_blocks)
            .add_systems(
                Update,
                (
                    preview_input.run_if(in_state(AppState::ShapePreview)),
                    apply_shape_actions,
                )
                    .chain()
                    .before(tick_blocks),
            );
    }
}

const PREVIEW_BLOCK_SIZE: f32 = 100.0;
const PREVIEW_GAP: f32 = 10.0;

/// A group of blocks laid out on a grid. `points` are grid coordinates; block
/// `i` sits at `points[i] * (block_size + gap)` relative to the shape.
#[derive(Debug, Clone, Component)]
pub struct Shape {
    points: Vec<Vec2>,
    block_size: f32,
    gap: f32,
    color: Color,
    layout: u32,
    placement: u32,
}

impl Default for Shape {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            block_size: 1.0,
            gap: 1.0,
            color: Color::WHITE,
            layout: 0,
            placement: 0,
        }
    }
}

impl Shape {
    pub fn new(points: Vec<Vec2>) -> Self {
        Self {
            points,
            ..default()
        }
    }

    pub fn with_block_size(mut self, block_size: f32) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_gap(mut self, gap: f32) -> Self {
        self.gap = gap;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Replaces the layout. Every existing block is despawned and a fresh one
    /// spawned per point on the next sync.
    pub fn set_points(&mut self, points: Vec<Vec2>) {
        self.points = points;
        self.layout = self.layout.wrapping_add(1);
    }

    pub fn block_size(&self) -> f32 {
        self.block_size
    }

    /// Resizes every block and moves it back onto its grid slot.
    pub fn set_block_size(&mut self, block_size: f32) {
        self.block_size = block_size;
        self.placement = self.placement.wrapping_add(1);
    }

    pub fn gap(&self) -> f32 {
        self.gap
    }

    /// Moves every block back onto its grid slot with the new spacing.
    pub fn set_gap(&mut self, gap: f32) {
        self.gap = gap;
        self.placement = self.placement.wrapping_add(1);
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Recolors every block; positions are left alone.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn block_translation(&self, point: Vec2) -> Vec3 {
        (point * (self.block_size + self.gap)).extend(0.0)
    }

    /// Bounding box of the points (folded from the origin) in block units.
    pub fn shape_size(&self) -> Vec2 {
        let (min, max) = self
            .points
            .iter()
            .fold((Vec2::ZERO, Vec2::ZERO), |(min, max), &point| {
                (min.min(point), max.max(point))
            });
        (max - min) * self.block_size
    }
}

/// Block entities owned by a shape, parallel to `Shape::points`.
#[derive(Debug, Default, Component)]
pub struct ShapeBlocks {
    blocks: Vec<Entity>,
    layout: Option<u32>,
    placement: Option<u32>,
}

impl ShapeBlocks {
    pub fn blocks(&self) -> &[Entity] {
        &self.blocks
    }
}

#[derive(Bundle, Default)]
pub struct ShapeBundle {
    pub shape: Shape,
    pub blocks: ShapeBlocks,
    pub spatial: SpatialBundle,
}

/// Starts `action` on every block of `shape`.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ShapeAction {
    pub shape: Entity,
    pub action: BlockAction,
}

#[derive(Debug, Component)]
pub struct ShapePreview;

lazy_static! {
    pub static ref PREVIEW_LAYOUTS: Vec<Vec<Vec2>> = vec![
        // O
        vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0)],
        // I
        vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0), Vec2::new(3.0, 0.0)],
        // J
        vec![Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0), Vec2::new(2.0, 1.0), Vec2::new(2.0, 0.0)],
        // L
        vec![Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0), Vec2::new(2.0, 1.0), Vec2::new(0.0, 0.0)],
        // S
        vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(2.0, 1.0)],
        // Z
        vec![Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0), Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0)],
        // T
        vec![Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0), Vec2::new(2.0, 1.0), Vec2::new(1.0, 0.0)],
    ];
}

pub fn sync_shape_blocks(
    mut commands: Commands,
    mut shapes: Query<(Entity, &Shape, &mut ShapeBlocks), Changed<Shape>>,
    mut blocks: Query<(&mut Block, &mut Transform)>,
) {
    for (entity, shape, mut owned) in &mut shapes {
        if owned.layout != Some(shape.layout) {
            for block in owned.blocks.drain(..) {
                commands.entity(block).despawn_recursive();
            }

            let mut spawned = Vec::with_capacity(shape.points.len());
            commands.entity(entity).with_children(|parent| {
                for &point in &shape.points {
                    spawned.push(spawn_block(
                        parent.spawn_empty(),
                        shape.block_size,
                        shape.color,
                        shape.block_translation(point),
                    ));
                }
            });
            debug!("shape {:?} rebuilt with {} blocks", entity, spawned.len());
            owned.blocks = spawned;
            owned.layout = Some(shape.layout);
            owned.placement = Some(shape.placement);
            continue;
        }

        let replace = owned.placement != Some(shape.placement);
        for (&block_entity, &point) in owned.blocks.iter().zip(&shape.points) {
            let Ok((mut block, mut transform)) = blocks.get_mut(block_entity) else {
                continue;
            };
            if block.color() != shape.color {
                block.set_color(shape.color);
            }
            if replace {
                block.set_size(shape.block_size);
                transform.translation = shape.block_translation(point);
            }
        }
        owned.placement = Some(shape.placement);
    }
}

fn apply_shape_actions(
    mut actions: EventReader<ShapeAction>,
    shapes: Query<&ShapeBlocks>,
    mut blocks: Query<(&mut Block, &Transform)>,
) {
    for &ShapeAction { shape, action } in actions.iter() {
        let Ok(owned) = shapes.get(shape) else {
            warn!("{:?} sent to {:?}, which is not a shape", action, shape);
            continue;
        };
        let mut started = 0;
        for &block_entity in &owned.blocks {
            if let Ok((mut block, transform)) = blocks.get_mut(block_entity) {
                if action.start(&mut block, transform) {
                    started += 1;
                }
            }
        }
        debug!(
            "{:?} started on {}/{} blocks of {:?}",
            action,
            started,
            owned.blocks.len(),
            shape
        );
    }
}

fn setup_preview(mut commands: Commands) {
    let shape = Shape::new(PREVIEW_LAYOUTS[0].clone())
        .with_block_size(PREVIEW_BLOCK_SIZE)
        .with_gap(PREVIEW_GAP)
        .with_color(Color::CYAN);
    let translation = (-shape.shape_size() / 2.0).extend(0.0);
    commands.spawn((
        ShapeBundle {
            shape,
            spatial: SpatialBundle::from_transform(Transform::from_translation(translation)),
            ..default()
        },
        ShapePreview,
    ));
    info!("shape preview ready, press tab for a new layout");
}

fn preview_input(
    keys: Res<Input<KeyCode>>,
    mut shapes: Query<(Entity, &mut Shape), With<ShapePreview>>,
    mut actions: EventWriter<ShapeAction>,
) {
    for (entity, mut shape) in &mut shapes {
        if keys.just_pressed(KeyCode::Tab) {
            let idx = rand::thread_rng().gen_range(0..PREVIEW_LAYOUTS.len());
            shape.set_points(PREVIEW_LAYOUTS[idx].clone());
            debug!("shape preview switched to layout {}", idx);
        }

        if let Some(action) = BlockAction::from_keys(&keys, shape.shape_size()) {
            actions.send(ShapeAction {
                shape: entity,
                action,
            });
        }
    }
}
