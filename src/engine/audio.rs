use std::collections::{BTreeSet, HashMap};
use std::fmt;

use tracing::debug;

use crate::config::EngineConfig;
use crate::world::{Point, Size, World};

pub const WALL: &str = "wall.mp3";
pub const PING_IN: &str = "pingin.mp3";
pub const PING_OUT: &str = "pingout.mp3";
pub const NOTHING_HERE: &str = "nothinghere.mp3";
pub const GOT: &str = "got.mp3";
pub const START: &str = "start.mp3";

/// Path of a sound under the configured sound root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CueId(String);

impl CueId {
    pub fn new(path: impl Into<String>) -> Self {
        CueId(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl EngineConfig {
    pub fn cue(&self, sound_file: &str) -> CueId {
        CueId(format!(
            "{}/{}",
            self.sound_root.trim_end_matches('/'),
            sound_file
        ))
    }

    /// Spoken "1", "2", ... used to number announcements.
    pub fn number_cue(&self, n: usize) -> CueId {
        self.cue(&format!("{n}.mp3"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Position relative to the room center, scaled into audio space.
pub fn spatial_pose(room: Size, at: Point, z: f64, config: &EngineConfig) -> Pose {
    let center = room.center();
    let scale = config.listener_scale / config.listener_divisor;
    Pose {
        x: (at.x - center.x) * scale,
        y: (at.y - center.y) * scale,
        z,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoopHandle(pub u64);

/// Playback primitives supplied by the host platform.
pub trait AudioBackend {
    fn preload(&mut self, _cues: &[CueId]) {}

    fn play(&mut self, cue: &CueId);

    fn play_looped(&mut self, cue: &CueId, pose: Pose) -> LoopHandle;

    fn stop(&mut self, handle: LoopHandle);

    fn set_listener_pose(&mut self, pose: Pose);

    fn set_source_pose(&mut self, handle: LoopHandle, pose: Pose);

    /// Length of a cue in milliseconds.
    fn duration_of(&self, cue: &CueId) -> u64;
}

#[derive(Debug, Clone, PartialEq)]
pub enum AudioEvent {
    Preload(usize),
    Play(CueId),
    PlayLooped {
        handle: LoopHandle,
        cue: CueId,
        pose: Pose,
    },
    Stop(LoopHandle),
    Listener(Pose),
    SourcePose {
        handle: LoopHandle,
        pose: Pose,
    },
}

/// Backend that records every call instead of making sound. Durations come
/// from a per-cue table with a fallback.
#[derive(Debug, Clone)]
pub struct RecordingAudio {
    events: Vec<AudioEvent>,
    durations: HashMap<CueId, u64>,
    default_duration_ms: u64,
    next_handle: u64,
}

impl RecordingAudio {
    pub fn new(default_duration_ms: u64) -> Self {
        RecordingAudio {
            events: Vec::new(),
            durations: HashMap::new(),
            default_duration_ms,
            next_handle: 0,
        }
    }

    pub fn with_duration(mut self, cue: CueId, ms: u64) -> Self {
        self.durations.insert(cue, ms);
        self
    }

    pub fn events(&self) -> &[AudioEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<AudioEvent> {
        std::mem::take(&mut self.events)
    }

    /// One-shot cues in the order they were played.
    pub fn played(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AudioEvent::Play(cue) => Some(cue.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Loops started and not yet stopped.
    pub fn active_loops(&self) -> Vec<(LoopHandle, &CueId)> {
        let mut live: Vec<(LoopHandle, &CueId)> = Vec::new();
        for e in &self.events {
            match e {
                AudioEvent::PlayLooped { handle, cue, .. } => live.push((*handle, cue)),
                AudioEvent::Stop(handle) => live.retain(|(h, _)| h != handle),
                _ => {}
            }
        }
        live
    }

    pub fn last_listener_pose(&self) -> Option<Pose> {
        self.events.iter().rev().find_map(|e| match e {
            AudioEvent::Listener(pose) => Some(*pose),
            _ => None,
        })
    }
}

impl AudioBackend for RecordingAudio {
    fn preload(&mut self, cues: &[CueId]) {
        self.events.push(AudioEvent::Preload(cues.len()));
    }

    fn play(&mut self, cue: &CueId) {
        self.events.push(AudioEvent::Play(cue.clone()));
    }

    fn play_looped(&mut self, cue: &CueId, pose: Pose) -> LoopHandle {
        self.next_handle += 1;
        let handle = LoopHandle(self.next_handle);
        self.events.push(AudioEvent::PlayLooped {
            handle,
            cue: cue.clone(),
            pose,
        });
        handle
    }

    fn stop(&mut self, handle: LoopHandle) {
        self.events.push(AudioEvent::Stop(handle));
    }

    fn set_listener_pose(&mut self, pose: Pose) {
        self.events.push(AudioEvent::Listener(pose));
    }

    fn set_source_pose(&mut self, handle: LoopHandle, pose: Pose) {
        self.events.push(AudioEvent::SourcePose { handle, pose });
    }

    fn duration_of(&self, cue: &CueId) -> u64 {
        self.durations
            .get(cue)
            .copied()
            .unwrap_or(self.default_duration_ms)
    }
}

/// Running looped sounds: one per object, plus the current room's bed.
#[derive(Debug, Default)]
pub struct AmbientLoops {
    by_object: HashMap<String, LoopHandle>,
    room: Option<(String, LoopHandle)>,
}

impl AmbientLoops {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a loop for `object`, replacing any loop it already had.
    pub fn start<A: AudioBackend>(&mut self, audio: &mut A, object: &str, cue: &CueId, pose: Pose) {
        self.stop(audio, object);
        let handle = audio.play_looped(cue, pose);
        debug!(object, %cue, "ambient loop started");
        self.by_object.insert(object.to_string(), handle);
    }

    /// Returns false when nothing was running for `object`.
    pub fn stop<A: AudioBackend>(&mut self, audio: &mut A, object: &str) -> bool {
        match self.by_object.remove(object) {
            Some(handle) => {
                audio.stop(handle);
                true
            }
            None => false,
        }
    }

    /// Move `object`'s running loop to `pose`. Returns false when nothing was
    /// running for it.
    pub fn reposition<A: AudioBackend>(&mut self, audio: &mut A, object: &str, pose: Pose) -> bool {
        match self.by_object.get(object) {
            Some(&handle) => {
                audio.set_source_pose(handle, pose);
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self, object: &str) -> bool {
        self.by_object.contains_key(object)
    }

    /// Swap the room bed to `room`'s sound, if it is not already playing.
    pub fn enter_room<A: AudioBackend>(&mut self, audio: &mut A, room: &str, cue: Option<CueId>) {
        if matches!(&self.room, Some((current, _)) if current == room) {
            return;
        }
        if let Some((_, handle)) = self.room.take() {
            audio.stop(handle);
        }
        if let Some(cue) = cue {
            let handle = audio.play_looped(&cue, Pose::default());
            self.room = Some((room.to_string(), handle));
        }
    }
}

/// Every cue a session can play, deduplicated and sorted.
pub fn sound_manifest(world: &World, config: &EngineConfig) -> Vec<CueId> {
    let mut files: BTreeSet<CueId> = BTreeSet::new();

    for room in world.rooms.values() {
        if let Some(sound) = &room.sound_file {
            files.insert(config.cue(sound));
        }
    }

    for object in world.objects.values() {
        files.insert(config.cue(&object.sound_file));
        if let Some(ambient) = &object.ambient_sound_file {
            files.insert(config.cue(ambient));
        }
        for choice in &object.choices {
            files.insert(config.cue(&choice.sound_file));
            if !choice.action.sound_file.is_empty() {
                files.insert(config.cue(&choice.action.sound_file));
            }
        }
    }

    for builtin in [WALL, PING_IN, PING_OUT, NOTHING_HERE, GOT, START] {
        files.insert(config.cue(builtin));
    }
    // A menu can never list more entries than there are objects, or than
    // one object has choices.
    let longest_menu = world
        .objects
        .values()
        .map(|o| o.choices.len())
        .chain([world.objects.len(), config.number_cues])
        .max()
        .unwrap_or(0);
    for n in 1..=longest_menu {
        files.insert(config.number_cue(n));
    }

    files.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_world;

    #[test]
    fn cue_paths_follow_sound_root() {
        let mut config = EngineConfig::default();
        assert_eq!(config.cue("chest.mp3").as_str(), "world/sounds/chest.mp3");
        config.sound_root = "assets/".to_string();
        assert_eq!(config.number_cue(3).as_str(), "assets/3.mp3");
    }

    #[test]
    fn pose_is_centered_and_scaled() {
        let config = EngineConfig::default();
        let size = Size {
            width: 100.0,
            height: 100.0,
        };
        let pose = spatial_pose(size, Point::new(90.0, 50.0), 2.0, &config);
        assert!((pose.x - 4.0).abs() < 1e-9);
        assert_eq!(pose.y, 0.0);
        assert_eq!(pose.z, 2.0);
    }

    #[test]
    fn restarting_a_loop_stops_the_old_one() {
        let mut audio = RecordingAudio::new(100);
        let mut loops = AmbientLoops::new();
        let cue = CueId::new("world/sounds/water.mp3");

        loops.start(&mut audio, "fountain", &cue, Pose::default());
        loops.start(&mut audio, "fountain", &cue, Pose::default());
        assert_eq!(audio.active_loops().len(), 1);

        assert!(loops.stop(&mut audio, "fountain"));
        assert!(!loops.stop(&mut audio, "fountain"));
        assert!(audio.active_loops().is_empty());
    }

    #[test]
    fn manifest_includes_builtins_and_object_sounds() {
        let config = EngineConfig::default();
        let manifest = sound_manifest(&test_world(), &config);
        for expected in ["chest.mp3", "water.mp3", "wall.mp3", "pingout.mp3", "5.mp3"] {
            assert!(manifest.contains(&config.cue(expected)), "{expected}");
        }
        assert!(!manifest.contains(&config.number_cue(6)));
    }

    #[test]
    fn manifest_numbers_cover_the_longest_possible_menu() {
        let config = EngineConfig {
            number_cues: 2,
            ..EngineConfig::default()
        };
        let manifest = sound_manifest(&test_world(), &config);
        assert!(manifest.contains(&config.number_cue(3)));
        assert!(!manifest.contains(&config.number_cue(4)));
    }
}
