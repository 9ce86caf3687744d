//! Agent position, manipulators and booster inventory.

use wrappy_core::{BoosterKind, IllegalCommand, Offset, Point, Rotation};

/// Turns a fast-move booster stays active once spent.
pub const FAST_MOVE_TURNS: u32 = 50;

/// Turns a drill booster stays active once spent.
pub const DRILL_TURNS: u32 = 30;

/// Manipulators the agent starts with: the column of cells east of it.
pub const INITIAL_MANIPULATORS: [Offset; 3] =
    [Offset::new(1, 0), Offset::new(1, 1), Offset::new(1, -1)];

/// The wrapping robot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Agent {
    position: Point,
    manipulators: Vec<Offset>,
    resources: Resources,
}

impl Agent {
    pub(crate) fn new(position: Point) -> Self {
        Self {
            position,
            manipulators: INITIAL_MANIPULATORS.to_vec(),
            resources: Resources::default(),
        }
    }

    /// Cell the agent stands on.
    #[must_use]
    pub const fn position(&self) -> Point {
        self.position
    }

    /// Manipulator offsets in attachment order.
    #[must_use]
    pub fn manipulators(&self) -> &[Offset] {
        &self.manipulators
    }

    /// Booster inventory and active effect countdowns.
    #[must_use]
    pub const fn resources(&self) -> &Resources {
        &self.resources
    }

    pub(crate) fn resources_mut(&mut self) -> &mut Resources {
        &mut self.resources
    }

    pub(crate) fn move_to(&mut self, position: Point) {
        self.position = position;
    }

    pub(crate) fn rotate(&mut self, rotation: Rotation) {
        for offset in &mut self.manipulators {
            *offset = offset.rotated(rotation);
        }
    }

    pub(crate) fn attach(&mut self, offset: Offset) -> Result<(), IllegalCommand> {
        if offset == Offset::new(0, 0) || self.manipulators.contains(&offset) {
            return Err(IllegalCommand::InvalidManipulator);
        }
        self.resources.spend(BoosterKind::ManipulatorExtra)?;
        self.manipulators.push(offset);
        Ok(())
    }
}

/// Unused boosters and remaining turns of active effects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Resources {
    /// Unused extra manipulators.
    pub manipulators: u32,
    /// Unused fast-move boosters.
    pub fast_moves: u32,
    /// Unused drills.
    pub drills: u32,
    /// Unused teleport beacons.
    pub teleports: u32,
    /// Turns of fast-move left, zero when inactive.
    pub fast_move_turns: u32,
    /// Turns of drilling left, zero when inactive.
    pub drill_turns: u32,
}

impl Resources {
    /// Unused boosters of the provided kind. Spawn points are never held.
    #[must_use]
    pub fn count(&self, kind: BoosterKind) -> u32 {
        match kind {
            BoosterKind::ManipulatorExtra => self.manipulators,
            BoosterKind::FastMove => self.fast_moves,
            BoosterKind::Drill => self.drills,
            BoosterKind::TeleportBeaconResource => self.teleports,
            BoosterKind::SpawnPoint => 0,
        }
    }

    /// Reports whether moves currently take two steps.
    #[must_use]
    pub const fn fast_move_active(&self) -> bool {
        self.fast_move_turns > 0
    }

    /// Reports whether walls can currently be drilled through.
    #[must_use]
    pub const fn drill_active(&self) -> bool {
        self.drill_turns > 0
    }

    pub(crate) fn collect(&mut self, kind: BoosterKind) {
        if let Some(counter) = self.counter_mut(kind) {
            *counter = counter.saturating_add(1);
        }
    }

    pub(crate) fn spend(&mut self, kind: BoosterKind) -> Result<(), IllegalCommand> {
        match self.counter_mut(kind) {
            Some(counter) if *counter > 0 => {
                *counter -= 1;
                Ok(())
            }
            _ => Err(IllegalCommand::MissingBooster(kind)),
        }
    }

    /// Counts down active effects at the end of every command.
    pub(crate) fn tick(&mut self) {
        self.fast_move_turns = self.fast_move_turns.saturating_sub(1);
        self.drill_turns = self.drill_turns.saturating_sub(1);
    }

    fn counter_mut(&mut self, kind: BoosterKind) -> Option<&mut u32> {
        match kind {
            BoosterKind::ManipulatorExtra => Some(&mut self.manipulators),
            BoosterKind::FastMove => Some(&mut self.fast_moves),
            BoosterKind::Drill => Some(&mut self.drills),
            BoosterKind::TeleportBeaconResource => Some(&mut self.teleports),
            BoosterKind::SpawnPoint => None,
        }
    }
}
