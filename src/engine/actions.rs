use std::str::FromStr;

use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::engine::audio::{AmbientLoops, AudioBackend, Pose, spatial_pose};
use crate::engine::conditions::{PredicateError, split_operator};
use crate::engine::movement::listener_pose;
use crate::engine::output::Output;
use crate::error::PlacementError;
use crate::world::{self, Action, Attributes, Placements, Player, World};

/// Attribute mutation carried by an action: `=5`, `+2`, `-1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Delta {
    Set(f64),
    Add(f64),
    Subtract(f64),
}

impl FromStr for Delta {
    type Err = PredicateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (op, value) = split_operator(s)?;
        match op {
            '=' => Ok(Delta::Set(value)),
            '+' => Ok(Delta::Add(value)),
            '-' => Ok(Delta::Subtract(value)),
            other => Err(PredicateError::InvalidOperator(other)),
        }
    }
}

impl Delta {
    /// `+` on a missing attribute starts it at the value; `-` on a missing
    /// attribute does nothing.
    pub fn apply(&self, attributes: &mut Attributes, name: &str) {
        match *self {
            Delta::Set(v) => {
                attributes.insert(name.to_string(), v);
            }
            Delta::Add(v) => {
                *attributes.entry(name.to_string()).or_insert(0.0) += v;
            }
            Delta::Subtract(v) => {
                if let Some(current) = attributes.get_mut(name) {
                    *current -= v;
                }
            }
        }
    }
}

/// Apply every attribute delta of `action`. Unparseable entries are skipped.
pub fn apply_attribute_deltas(action: &Action, attributes: &mut Attributes) {
    for (name, raw) in &action.attributes {
        match raw.parse::<Delta>() {
            Ok(delta) => delta.apply(attributes, name),
            Err(e) => debug!(attribute = %name, raw = %raw, error = %e, "delta ignored"),
        }
    }
}

/// Resolve a chosen action: confirmation cue, attribute deltas, ambient
/// toggles, then any scripted placements.
#[allow(clippy::too_many_arguments)]
pub fn apply_action<A: AudioBackend>(
    out: &mut Output,
    action: &Action,
    world: &World,
    placements: &mut Placements,
    player: &mut Player,
    ambient: &mut AmbientLoops,
    audio: &mut A,
    config: &EngineConfig,
) {
    if !action.sound_file.is_empty() {
        audio.play(&config.cue(&action.sound_file));
    }

    apply_attribute_deltas(action, &mut player.attributes);

    for (object_name, on) in &action.sound_triggers {
        if !on {
            ambient.stop(audio, object_name);
            continue;
        }
        start_object_loop(out, object_name, world, placements, ambient, audio, config);
    }

    for (object_name, dest) in &action.place_objects {
        match world::place_object(world, placements, object_name, &dest.room, dest.x, dest.y) {
            Ok(()) => {
                if let Some(pose) = object_pose(world, placements, object_name, config) {
                    ambient.reposition(audio, object_name, pose);
                }
            }
            Err(e) => {
                warn!(object = %object_name, error = %e, "scripted object placement rejected");
                out.warn(format!("Could not move {}: {}", object_name, e));
            }
        }
    }

    if let Some(dest) = &action.move_player {
        match relocate_player(world, player, ambient, audio, config, &dest.room, dest.x, dest.y) {
            Ok(true) => out.event(format!("You are now in {}.", player.room)),
            Ok(false) => {}
            Err(e) => {
                warn!(error = %e, "scripted player move rejected");
                out.warn(format!("Could not move you: {}", e));
            }
        }
    }
}

/// Place the player and bring the audio along: the listener follows, and
/// the room bed swaps when the room changes. Returns whether it did.
#[allow(clippy::too_many_arguments)]
pub fn relocate_player<A: AudioBackend>(
    world: &World,
    player: &mut Player,
    ambient: &mut AmbientLoops,
    audio: &mut A,
    config: &EngineConfig,
    room: &str,
    x: f64,
    y: f64,
) -> Result<bool, PlacementError> {
    let previous_room = player.room.clone();
    world::place_player(world, player, room, x, y)?;

    let changed = previous_room != player.room;
    if changed {
        let bed = world
            .rooms
            .get(&player.room)
            .and_then(|r| r.sound_file.as_deref())
            .map(|f| config.cue(f));
        ambient.enter_room(audio, &player.room, bed);
    }
    if let Some(pose) = listener_pose(world, player, config) {
        audio.set_listener_pose(pose);
    }
    Ok(changed)
}

/// Source pose for `object_name` at its placed position, in its own room.
pub(crate) fn object_pose(
    world: &World,
    placements: &Placements,
    object_name: &str,
    config: &EngineConfig,
) -> Option<Pose> {
    let placed = placements.get(object_name)?;
    let room = world.rooms.get(placed.room)?;
    Some(spatial_pose(room.size, placed.position, 0.0, config))
}

/// Start `object_name`'s ambient loop at its placed position.
pub fn start_object_loop<A: AudioBackend>(
    out: &mut Output,
    object_name: &str,
    world: &World,
    placements: &Placements,
    ambient: &mut AmbientLoops,
    audio: &mut A,
    config: &EngineConfig,
) {
    let sound = world
        .objects
        .get(object_name)
        .and_then(|o| o.ambient_sound_file.as_deref());
    let pose = object_pose(world, placements, object_name, config);

    match (sound, pose) {
        (Some(sound), Some(pose)) => ambient.start(audio, object_name, &config.cue(sound), pose),
        _ => {
            warn!(object = object_name, "no placed ambient sound to start");
            out.warn(format!("{} has no ambient sound to start.", object_name));
        }
    }
}
