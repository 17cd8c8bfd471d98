use bevy::prelude::*;

use super::components::OffenseControl;
use super::stats::AttackSpec;

/// A damage-dealing region. Scans for overlaps only while active; bound
/// to its attack for the duration of one activation window.
///
/// The owner handle is injected when the owning entity constructs the
/// region; ownership is never resolved by walking a hierarchy.
#[derive(Component, Debug)]
pub struct OffenseRegion {
    pub owner: Entity,
    pub attack: Option<AttackSpec>,
    pub active: bool,
    /// Bumped on every rising activation edge. Hit registration is keyed
    /// to this counter, so one swing strikes each target at most once no
    /// matter how many ticks the shapes stay overlapped.
    pub activation: u32,
    /// Local offset from the owner, mirrored by facing.
    pub offset: Vec2,
    pub half_extents: Vec2,
    struck: Vec<(Entity, u32)>,
}

impl OffenseRegion {
    pub fn new(owner: Entity, offset: Vec2, half_extents: Vec2) -> Self {
        Self {
            owner,
            attack: None,
            active: false,
            activation: 0,
            offset,
            half_extents,
            struck: Vec::new(),
        }
    }

    pub fn already_struck(&self, target: Entity) -> bool {
        self.struck
            .iter()
            .any(|&(entity, activation)| entity == target && activation == self.activation)
    }

    pub fn register_strike(&mut self, target: Entity) {
        self.struck.push((target, self.activation));
    }

    fn rearm(&mut self) {
        self.activation = self.activation.wrapping_add(1);
        self.struck.clear();
    }
}

/// A damage-receiving region. Passively detectable, never scans.
#[derive(Component, Debug)]
pub struct DefenseRegion {
    pub owner: Entity,
    pub offset: Vec2,
    pub half_extents: Vec2,
}

impl DefenseRegion {
    pub fn new(owner: Entity, half_extents: Vec2) -> Self {
        Self {
            owner,
            offset: Vec2::ZERO,
            half_extents,
        }
    }
}

/// World-space center of a region given its owner's position and facing.
pub fn region_center(owner_pos: Vec2, facing_right: bool, offset: Vec2) -> Vec2 {
    let x = if facing_right { offset.x } else { -offset.x };
    owner_pos + Vec2::new(x, offset.y)
}

pub fn aabb_overlap(center_a: Vec2, half_a: Vec2, center_b: Vec2, half_b: Vec2) -> bool {
    (center_a.x - center_b.x).abs() <= half_a.x + half_b.x
        && (center_a.y - center_b.y).abs() <= half_a.y + half_b.y
}

pub fn spawn_offense_region(
    commands: &mut Commands,
    owner: Entity,
    offset: Vec2,
    half_extents: Vec2,
) -> Entity {
    commands
        .spawn(OffenseRegion::new(owner, offset, half_extents))
        .id()
}

pub fn spawn_defense_region(
    commands: &mut Commands,
    owner: Entity,
    half_extents: Vec2,
) -> Entity {
    commands
        .spawn(DefenseRegion::new(owner, half_extents))
        .id()
}

/// PhysicsSet: mirror each owner's [`OffenseControl`] onto its region.
/// A rising edge starts a fresh activation cycle and takes a snapshot of
/// the attack bound to the swing.
pub fn sync_offense_regions(
    mut regions: Query<&mut OffenseRegion>,
    owners: Query<&OffenseControl>,
) {
    for mut region in &mut regions {
        let Ok(control) = owners.get(region.owner) else {
            continue;
        };
        if control.active && !region.active {
            region.rearm();
            region.attack = control.attack.clone();
        }
        region.active = control.active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aabb_overlap_edges_touch() {
        let half = Vec2::new(10.0, 10.0);
        assert!(aabb_overlap(Vec2::ZERO, half, Vec2::new(20.0, 0.0), half));
        assert!(!aabb_overlap(Vec2::ZERO, half, Vec2::new(20.1, 0.0), half));
        assert!(!aabb_overlap(Vec2::ZERO, half, Vec2::new(0.0, 25.0), half));
    }

    #[test]
    fn region_center_mirrors_offset_by_facing() {
        let offset = Vec2::new(20.0, 4.0);
        assert_eq!(
            region_center(Vec2::new(100.0, 0.0), true, offset),
            Vec2::new(120.0, 4.0)
        );
        assert_eq!(
            region_center(Vec2::new(100.0, 0.0), false, offset),
            Vec2::new(80.0, 4.0)
        );
    }

    #[test]
    fn strikes_are_keyed_to_the_activation_cycle() {
        let mut world = World::new();
        let owner = world.spawn_empty().id();
        let target = world.spawn_empty().id();

        let mut region = OffenseRegion::new(owner, Vec2::ZERO, Vec2::ONE);
        region.register_strike(target);
        assert!(region.already_struck(target));

        region.rearm();
        assert!(!region.already_struck(target));
    }

    #[test]
    fn sync_rearms_only_on_rising_edge() {
        let mut app = App::new();
        app.add_systems(Update, sync_offense_regions);

        let owner = app
            .world_mut()
            .spawn(OffenseControl {
                active: true,
                attack: Some(AttackSpec::default()),
            })
            .id();
        let region = app
            .world_mut()
            .spawn(OffenseRegion::new(owner, Vec2::ZERO, Vec2::ONE))
            .id();

        app.update();
        let first = app.world().get::<OffenseRegion>(region).unwrap().activation;
        assert!(app.world().get::<OffenseRegion>(region).unwrap().active);
        assert!(app.world().get::<OffenseRegion>(region).unwrap().attack.is_some());

        // Staying active does not re-arm.
        app.update();
        assert_eq!(
            app.world().get::<OffenseRegion>(region).unwrap().activation,
            first
        );

        // Deactivate, then reactivate: a new cycle.
        app.world_mut()
            .get_mut::<OffenseControl>(owner)
            .unwrap()
            .active = false;
        app.update();
        app.world_mut()
            .get_mut::<OffenseControl>(owner)
            .unwrap()
            .active = true;
        app.update();
        assert_eq!(
            app.world().get::<OffenseRegion>(region).unwrap().activation,
            first + 1
        );
    }
}
