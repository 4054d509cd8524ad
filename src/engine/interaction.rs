use thiserror::Error;
use tracing::{debug, info, warn};

use crate::GameState;
use crate::engine::actions::apply_action;
use crate::engine::audio::{self, AudioBackend, CueId};
use crate::engine::clicks::WindowId;
use crate::engine::conditions::conditions_met;
use crate::engine::input::InputSnapshot;
use crate::engine::movement::{Axis, handle_movement, heading_deltas};
use crate::engine::proximity::{nearby_objects, newly_visible};
use crate::engine::scheduler::TimerId;
use crate::engine::sequence::{SequenceId, plan_sequence, schedule_plan};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    Moving,
    HoldPending,
    OfferingOptions,
    AwaitingSelection,
    AwaitingChoice,
    Resolving,
}

/// Generation of the current interaction attempt. Bumped whenever an attempt
/// is abandoned so late completions can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Epoch(pub u64);

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InteractionError {
    #[error("result from epoch {opened:?} arrived during epoch {current:?}")]
    StaleSelection { opened: Epoch, current: Epoch },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterSequence {
    Nothing,
    OpenSelection,
    OpenChoice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickPurpose {
    Selection,
    Choice,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TimerEvent {
    Tick,
    HoldElapsed {
        epoch: Epoch,
    },
    PlayCue {
        sequence: SequenceId,
        epoch: Option<Epoch>,
        cue: CueId,
    },
    SequenceDone {
        sequence: SequenceId,
        epoch: Option<Epoch>,
        then: AfterSequence,
    },
    CloseWindow {
        window: WindowId,
        epoch: Epoch,
        purpose: ClickPurpose,
    },
    SettleWindow {
        window: WindowId,
        epoch: Epoch,
        purpose: ClickPurpose,
    },
    RetryChoices {
        epoch: Epoch,
    },
}

impl TimerEvent {
    /// The interaction attempt this event belongs to, if any.
    pub fn epoch(&self) -> Option<Epoch> {
        match self {
            TimerEvent::Tick => None,
            TimerEvent::PlayCue { epoch, .. } | TimerEvent::SequenceDone { epoch, .. } => *epoch,
            TimerEvent::HoldElapsed { epoch }
            | TimerEvent::CloseWindow { epoch, .. }
            | TimerEvent::SettleWindow { epoch, .. }
            | TimerEvent::RetryChoices { epoch } => Some(*epoch),
        }
    }

    pub fn sequence(&self) -> Option<SequenceId> {
        match self {
            TimerEvent::PlayCue { sequence, .. } | TimerEvent::SequenceDone { sequence, .. } => {
                Some(*sequence)
            }
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct Interaction {
    pub state: InteractionState,
    epoch: Epoch,
    hold_timer: Option<TimerId>,
    /// Set when the hold trigger fires; re-arming waits for motion or release.
    hold_spent: bool,
    /// Object names announced by the current menu, in announcement order.
    offered: Vec<String>,
    selected: Option<String>,
    /// Indices into the selected object's choices that passed their conditions.
    available: Vec<usize>,
    pub paused: bool,
}

impl Default for Interaction {
    fn default() -> Self {
        Interaction {
            state: InteractionState::Idle,
            epoch: Epoch(0),
            hold_timer: None,
            hold_spent: false,
            offered: Vec::new(),
            selected: None,
            available: Vec::new(),
            paused: false,
        }
    }
}

impl Interaction {
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn hold_armed(&self) -> bool {
        self.hold_timer.is_some()
    }

    pub fn check(&self, opened: Epoch) -> Result<(), InteractionError> {
        if opened == self.epoch {
            Ok(())
        } else {
            Err(InteractionError::StaleSelection {
                opened,
                current: self.epoch,
            })
        }
    }

    fn reset_menu(&mut self) {
        self.offered.clear();
        self.selected = None;
        self.available.clear();
    }
}

impl<A: AudioBackend> GameState<A> {
    pub(crate) fn handle_tick(&mut self, snap: InputSnapshot) {
        if snap.pulse_active && !self.pulse_was_active {
            self.pulse();
        }
        self.pulse_was_active = snap.pulse_active;

        if !snap.held {
            self.interaction.hold_spent = false;
        }

        if snap.distance == 0.0 {
            if self.interaction.state == InteractionState::Moving {
                self.interaction.state = InteractionState::Idle;
            }
            if snap.held {
                self.arm_hold();
            }
        } else if !self.interaction.paused {
            self.cancel_interaction("device moved");
            self.interaction.state = InteractionState::Moving;
            self.interaction.hold_spent = false;
            self.player.angle = Some(snap.angle);

            let (dx, dy) = heading_deltas(snap.angle, self.config.move_step);
            handle_movement(&self.world, &mut self.player, Axis::X, dx, &mut self.audio, &self.config);
            handle_movement(&self.world, &mut self.player, Axis::Y, dy, &mut self.audio, &self.config);
        }

        self.refresh_proximity();
    }

    fn arm_hold(&mut self) {
        let it = &self.interaction;
        if it.hold_timer.is_some() || it.hold_spent || it.state != InteractionState::Idle {
            return;
        }

        let epoch = self.interaction.epoch;
        let id = self
            .scheduler
            .schedule(self.config.hold_delay_ms, TimerEvent::HoldElapsed { epoch });
        self.interaction.hold_timer = Some(id);
        self.interaction.state = InteractionState::HoldPending;
        debug!(?epoch, "hold trigger armed");
    }

    /// Abandon whatever interaction is in flight: disarm the hold trigger,
    /// drop its timers and click window, and move to a new epoch.
    pub(crate) fn cancel_interaction(&mut self, reason: &str) {
        if let Some(id) = self.interaction.hold_timer.take() {
            self.scheduler.cancel(id);
        }

        let old = self.interaction.epoch;
        let dropped = self.scheduler.cancel_where(|e| e.epoch() == Some(old));
        self.clicks.cancel();
        self.interaction.reset_menu();
        self.interaction.epoch = Epoch(old.0 + 1);

        let busy = !matches!(
            self.interaction.state,
            InteractionState::Idle | InteractionState::Moving
        );
        if busy || dropped > 0 {
            info!(reason, ?old, dropped, "interaction cancelled");
        }
        self.interaction.state = InteractionState::Idle;
    }

    fn finish_interaction(&mut self) {
        self.interaction.reset_menu();
        self.interaction.state = InteractionState::Idle;
    }

    pub(crate) fn on_hold_elapsed(&mut self, epoch: Epoch) {
        if let Err(e) = self.interaction.check(epoch) {
            debug!(error = %e, "hold trigger discarded");
            return;
        }
        self.interaction.hold_timer = None;
        self.interaction.hold_spent = true;
        self.interaction.state = InteractionState::OfferingOptions;

        if self.player.options.is_empty() {
            self.audio.play(&self.config.cue(audio::NOTHING_HERE));
            self.out.event("Nothing here.");
            self.finish_interaction();
            return;
        }

        self.interaction.offered = self.player.options.keys().cloned().collect();
        let cues: Vec<CueId> = self
            .interaction
            .offered
            .iter()
            .filter_map(|name| self.world.objects.get(name))
            .map(|o| self.config.cue(&o.sound_file))
            .collect();

        info!(options = ?self.interaction.offered, "offering options");
        self.start_sequence(cues, true, Some(epoch), AfterSequence::OpenSelection);
    }

    pub(crate) fn on_sequence_done(&mut self, epoch: Option<Epoch>, then: AfterSequence) {
        let purpose = match then {
            AfterSequence::Nothing => return,
            AfterSequence::OpenSelection => ClickPurpose::Selection,
            AfterSequence::OpenChoice => ClickPurpose::Choice,
        };
        let epoch = match epoch {
            Some(e) => e,
            None => return,
        };
        if let Err(e) = self.interaction.check(epoch) {
            debug!(error = %e, "announcement completion discarded");
            return;
        }

        self.interaction.state = match purpose {
            ClickPurpose::Selection => InteractionState::AwaitingSelection,
            ClickPurpose::Choice => InteractionState::AwaitingChoice,
        };
        self.open_click_window(epoch, purpose);
    }

    fn open_click_window(&mut self, epoch: Epoch, purpose: ClickPurpose) {
        match self.clicks.open() {
            Ok(window) => {
                self.audio.play(&self.config.cue(audio::PING_IN));
                self.scheduler.schedule(
                    self.config.selection_window_ms,
                    TimerEvent::CloseWindow {
                        window,
                        epoch,
                        purpose,
                    },
                );
            }
            Err(e) => {
                warn!(error = %e, "could not open click window");
                self.out.warn(e.to_string());
                self.finish_interaction();
            }
        }
    }

    pub(crate) fn on_window_closed(&mut self, window: WindowId, epoch: Epoch, purpose: ClickPurpose) {
        if !self.clicks.close(window) {
            return;
        }
        self.audio.play(&self.config.cue(audio::PING_OUT));
        self.scheduler.schedule(
            self.config.settle_ms,
            TimerEvent::SettleWindow {
                window,
                epoch,
                purpose,
            },
        );
    }

    pub(crate) fn on_window_settled(&mut self, window: WindowId, epoch: Epoch, purpose: ClickPurpose) {
        let count = match self.clicks.settle(window) {
            Some(c) => c,
            None => return,
        };
        if let Err(e) = self.interaction.check(epoch) {
            debug!(error = %e, count, "click count discarded");
            return;
        }

        debug!(count, ?purpose, "click window settled");
        match purpose {
            ClickPurpose::Selection => self.resolve_selection(count as usize, epoch),
            ClickPurpose::Choice => self.resolve_choice(count as usize, epoch),
        }
    }

    fn resolve_selection(&mut self, n: usize, epoch: Epoch) {
        if n == 0 || n > self.interaction.offered.len() {
            info!(n, "selection cancelled");
            self.out.event("Cancelled.");
            self.finish_interaction();
            return;
        }

        let name = self.interaction.offered[n - 1].clone();
        self.out.event(format!("Selected {}.", name));

        let object = match self.world.objects.get(&name) {
            Some(o) => o,
            None => {
                self.finish_interaction();
                return;
            }
        };

        let available: Vec<usize> = object
            .choices
            .iter()
            .enumerate()
            .filter(|(_, c)| conditions_met(&c.conditions, &self.player.attributes))
            .map(|(i, _)| i)
            .collect();

        if available.is_empty() {
            self.finish_interaction();
            return;
        }

        self.interaction.selected = Some(name);
        self.interaction.available = available;
        self.announce_choices(epoch);
    }

    fn announce_choices(&mut self, epoch: Epoch) {
        let object = match self
            .interaction
            .selected
            .as_ref()
            .and_then(|name| self.world.objects.get(name))
        {
            Some(o) => o,
            None => {
                self.finish_interaction();
                return;
            }
        };

        let cues: Vec<CueId> = self
            .interaction
            .available
            .iter()
            .map(|&i| self.config.cue(&object.choices[i].sound_file))
            .collect();

        self.interaction.state = InteractionState::OfferingOptions;
        self.start_sequence(cues, true, Some(epoch), AfterSequence::OpenChoice);
    }

    fn resolve_choice(&mut self, n: usize, epoch: Epoch) {
        let picked = n
            .checked_sub(1)
            .and_then(|i| self.interaction.available.get(i))
            .copied();

        let index = match picked {
            Some(i) => i,
            None => {
                debug!(n, "no such choice, asking again");
                self.scheduler
                    .schedule(self.config.choice_retry_ms, TimerEvent::RetryChoices { epoch });
                return;
            }
        };

        let name = match self.interaction.selected.clone() {
            Some(n) => n,
            None => {
                self.finish_interaction();
                return;
            }
        };

        self.interaction.state = InteractionState::Resolving;
        if let Some(choice) = self.world.objects.get(&name).and_then(|o| o.choices.get(index)) {
            info!(object = %name, choice = index + 1, "resolving choice");
            apply_action(
                &mut self.out,
                &choice.action,
                &self.world,
                &mut self.placements,
                &mut self.player,
                &mut self.ambient,
                &mut self.audio,
                &self.config,
            );
        }
        self.finish_interaction();
    }

    pub(crate) fn on_retry_choices(&mut self, epoch: Epoch) {
        if let Err(e) = self.interaction.check(epoch) {
            debug!(error = %e, "choice retry discarded");
            return;
        }
        self.announce_choices(epoch);
    }

    /// Recompute proximity once and compare against the stored snapshot.
    fn refresh_proximity(&mut self) {
        let fresh = nearby_objects(&self.world, &self.placements, &self.player);

        if fresh.len() > self.player.options.len() {
            let found: Vec<String> = newly_visible(&self.player.options, &fresh)
                .into_iter()
                .map(str::to_string)
                .collect();
            let cues: Vec<CueId> = found
                .iter()
                .filter_map(|name| self.world.objects.get(name))
                .map(|o| self.config.cue(&o.sound_file))
                .collect();

            self.audio.play(&self.config.cue(audio::GOT));
            self.out.event(format!("You notice: {}.", found.join(", ")));
            self.start_sequence(cues, false, None, AfterSequence::Nothing);
        }

        self.player.options = fresh;
    }

    pub(crate) fn start_sequence(
        &mut self,
        cues: Vec<CueId>,
        numbered: bool,
        epoch: Option<Epoch>,
        then: AfterSequence,
    ) -> SequenceId {
        self.next_sequence += 1;
        let sequence = SequenceId(self.next_sequence);
        let plan = plan_sequence(&self.audio, &self.config, &cues, numbered);
        schedule_plan(
            &mut self.scheduler,
            plan,
            |cue| TimerEvent::PlayCue {
                sequence,
                epoch,
                cue,
            },
            TimerEvent::SequenceDone {
                sequence,
                epoch,
                then,
            },
        );
        sequence
    }
}
