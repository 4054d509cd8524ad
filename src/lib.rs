pub mod config;
pub mod engine;
pub mod error;
pub mod world;

#[cfg(test)]
mod test_support;

use tracing::info;

use config::EngineConfig;
use engine::actions::{object_pose, relocate_player, start_object_loop};
use engine::interaction::{Interaction, TimerEvent};
use engine::{
    AmbientLoops, AudioBackend, ClickCounter, CueId, Epoch, InputDevice, InteractionState, Output,
    Scheduler, SequenceId, audio, listener_pose, sound_manifest,
};
use error::PlacementError;
use world::{Placements, Player, World};

pub use world::{load_world_from_file, load_world_from_str};

/// Everything a session owns: static world data, live placements, the
/// player, and the machinery that turns device input into play.
pub struct GameState<A: AudioBackend> {
    pub world: World,
    pub placements: Placements,
    pub player: Player,
    pub config: EngineConfig,
    audio: A,
    ambient: AmbientLoops,
    scheduler: Scheduler<TimerEvent>,
    interaction: Interaction,
    clicks: ClickCounter,
    out: Output,
    next_sequence: u64,
    pulse_was_active: bool,
}

impl<A: AudioBackend> GameState<A> {
    /// Bring the world to its ready state. Any placement error here is fatal:
    /// there is no playable partial world.
    pub fn new(world: World, mut audio: A) -> Result<Self, PlacementError> {
        let config = world.engine.clone();
        audio.preload(&sound_manifest(&world, &config));

        let start = world.settings.player_start.clone();
        let player = Player::placed(
            &world,
            &start.room,
            start.x,
            start.y,
            world.settings.player_attributes.clone(),
        )?;

        let mut names: Vec<&String> = world.objects.keys().collect();
        names.sort();
        let mut placements = Placements::new();
        for name in names {
            if let Some(sp) = &world.objects[name].starting_position {
                world::place_object(&world, &mut placements, name, &sp.room, sp.x, sp.y)?;
            }
        }

        let mut state = GameState {
            world,
            placements,
            player,
            config,
            audio,
            ambient: AmbientLoops::new(),
            scheduler: Scheduler::new(),
            interaction: Interaction::default(),
            clicks: ClickCounter::new(),
            out: Output::new(),
            next_sequence: 0,
            pulse_was_active: false,
        };
        state.ready();
        Ok(state)
    }

    fn ready(&mut self) {
        if let Some(pose) = listener_pose(&self.world, &self.player, &self.config) {
            self.audio.set_listener_pose(pose);
        }
        let bed = self
            .world
            .rooms
            .get(&self.player.room)
            .and_then(|r| r.sound_file.as_deref())
            .map(|f| self.config.cue(f));
        self.ambient.enter_room(&mut self.audio, &self.player.room, bed);
        self.audio.play(&self.config.cue(audio::START));

        let mut looping: Vec<&str> = self
            .world
            .objects
            .values()
            .filter(|o| o.ambient_sound_on)
            .filter(|o| {
                o.starting_position
                    .as_ref()
                    .is_some_and(|sp| sp.room == self.player.room)
            })
            .map(|o| o.name.as_str())
            .collect();
        looping.sort();
        for name in looping {
            start_object_loop(
                &mut self.out,
                name,
                &self.world,
                &self.placements,
                &mut self.ambient,
                &mut self.audio,
                &self.config,
            );
        }

        self.scheduler
            .schedule(self.config.tick_ms.max(1), TimerEvent::Tick);
        info!(room = %self.player.room, objects = self.placements.len(), "world ready");
    }

    /// Run the session forward by `ms` of virtual time, sampling `input` on
    /// every tick and firing every timer that falls due, in order.
    pub fn advance<I: InputDevice>(&mut self, ms: u64, input: &mut I) {
        let until = self.scheduler.now().saturating_add(ms);
        while let Some((_, event)) = self.scheduler.pop_due(until) {
            self.dispatch(event, input);
        }
        self.scheduler.advance_to(until);
    }

    fn dispatch<I: InputDevice>(&mut self, event: TimerEvent, input: &mut I) {
        match event {
            TimerEvent::Tick => {
                let snap = input.sample();
                self.handle_tick(snap);
                self.scheduler
                    .schedule(self.config.tick_ms.max(1), TimerEvent::Tick);
            }
            TimerEvent::HoldElapsed { epoch } => self.on_hold_elapsed(epoch),
            TimerEvent::PlayCue { cue, .. } => self.audio.play(&cue),
            TimerEvent::SequenceDone { epoch, then, .. } => self.on_sequence_done(epoch, then),
            TimerEvent::CloseWindow {
                window,
                epoch,
                purpose,
            } => self.on_window_closed(window, epoch, purpose),
            TimerEvent::SettleWindow {
                window,
                epoch,
                purpose,
            } => self.on_window_settled(window, epoch, purpose),
            TimerEvent::RetryChoices { epoch } => self.on_retry_choices(epoch),
        }
    }

    /// Deliver one discrete input pulse. Counts only while a click window is
    /// open.
    pub fn pulse(&mut self) -> bool {
        self.clicks.pulse()
    }

    /// Play cues back to back without blocking the session.
    pub fn play_sequence(&mut self, cues: Vec<CueId>, numbered: bool) -> SequenceId {
        self.start_sequence(cues, numbered, None, engine::interaction::AfterSequence::Nothing)
    }

    /// Drop every cue of `sequence` that has not played yet.
    pub fn cancel_sequence(&mut self, sequence: SequenceId) -> usize {
        self.scheduler
            .cancel_where(|e| e.sequence() == Some(sequence))
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.interaction.paused = paused;
    }

    /// Move the player, with the same audio side effects as a scripted move.
    pub fn place_player(&mut self, room: &str, x: f64, y: f64) -> Result<(), PlacementError> {
        relocate_player(
            &self.world,
            &mut self.player,
            &mut self.ambient,
            &mut self.audio,
            &self.config,
            room,
            x,
            y,
        )?;
        Ok(())
    }

    pub fn place_object(
        &mut self,
        object: &str,
        room: &str,
        x: f64,
        y: f64,
    ) -> Result<(), PlacementError> {
        world::place_object(&self.world, &mut self.placements, object, room, x, y)?;
        if let Some(pose) = object_pose(&self.world, &self.placements, object, &self.config) {
            self.ambient.reposition(&mut self.audio, object, pose);
        }
        Ok(())
    }

    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    pub fn state(&self) -> InteractionState {
        self.interaction.state
    }

    pub fn epoch(&self) -> Epoch {
        self.interaction.epoch()
    }

    pub fn hold_armed(&self) -> bool {
        self.interaction.hold_armed()
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    pub fn output(&self) -> &Output {
        &self.out
    }

    pub fn take_output(&mut self) -> Output {
        self.out.take()
    }
}
