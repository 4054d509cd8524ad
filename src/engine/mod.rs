pub mod actions;
pub mod audio;
mod clicks;
mod conditions;
pub mod interaction;
mod input;
mod movement;
mod output;
mod proximity;
mod scheduler;
mod sequence;

pub use actions::{Delta, apply_action, apply_attribute_deltas, relocate_player};
pub use audio::{
    AmbientLoops, AudioBackend, AudioEvent, CueId, LoopHandle, Pose, RecordingAudio,
    sound_manifest,
};
pub use clicks::{ClickCounter, ClickError, WindowId};
pub use conditions::{Comparison, Predicate, PredicateError, conditions_met};
pub use input::{InputDevice, InputSnapshot};
pub use interaction::{Epoch, InteractionError, InteractionState};
pub use movement::{Axis, MoveOutcome, handle_movement, heading_deltas, listener_pose, try_move};
pub use output::{Output, OutputBlock};
pub use proximity::{nearby_objects, newly_visible};
pub use scheduler::{Scheduler, TimerId};
pub use sequence::{CueStep, SequenceId, SequencePlan, plan_sequence, schedule_plan};
