use tracing::debug;

use crate::config::EngineConfig;
use crate::engine::audio::{self, AudioBackend, Pose, spatial_pose};
use crate::world::{Player, World};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveOutcome {
    Moved,
    Blocked,
}

/// Step the player along one axis. X moves by `-delta`, Y by `+delta`; the
/// result must stay within `[1, size]` or nothing changes.
pub fn try_move(world: &World, player: &mut Player, axis: Axis, delta: f64) -> MoveOutcome {
    let room = match world.rooms.get(&player.room) {
        Some(r) => r,
        None => return MoveOutcome::Blocked,
    };

    let (proposed, limit) = match axis {
        Axis::X => (player.position.x - delta, room.size.width),
        Axis::Y => (player.position.y + delta, room.size.height),
    };

    if !(1.0..=limit).contains(&proposed) {
        return MoveOutcome::Blocked;
    }

    match axis {
        Axis::X => player.position.x = proposed,
        Axis::Y => player.position.y = proposed,
    }
    MoveOutcome::Moved
}

/// [`try_move`] plus its audio: a wall cue when blocked, a new listener pose
/// when moved.
pub fn handle_movement<A: AudioBackend>(
    world: &World,
    player: &mut Player,
    axis: Axis,
    delta: f64,
    audio: &mut A,
    config: &EngineConfig,
) -> MoveOutcome {
    let outcome = try_move(world, player, axis, delta);
    match outcome {
        MoveOutcome::Blocked => {
            debug!(?axis, delta, "blocked by wall");
            audio.play(&config.cue(audio::WALL));
        }
        MoveOutcome::Moved => {
            if let Some(pose) = listener_pose(world, player, config) {
                audio.set_listener_pose(pose);
            }
        }
    }
    outcome
}

pub fn listener_pose(world: &World, player: &Player, config: &EngineConfig) -> Option<Pose> {
    let room = world.rooms.get(&player.room)?;
    Some(spatial_pose(
        room.size,
        player.position,
        config.listener_z,
        config,
    ))
}

/// Per-axis deltas for a device heading, as `(x_delta, y_delta)` to feed to
/// [`try_move`].
pub fn heading_deltas(angle: f64, step: f64) -> (f64, f64) {
    let vx = step * angle.cos();
    let vy = step * angle.sin();
    (-vy, -vx)
}
