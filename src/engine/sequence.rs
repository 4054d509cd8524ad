use super::audio::{AudioBackend, CueId};
use super::scheduler::Scheduler;
use crate::config::EngineConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SequenceId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct CueStep {
    pub offset_ms: u64,
    pub cue: CueId,
}

/// A flat timeline of cue starts, relative to the moment the sequence begins.
#[derive(Debug, Clone, PartialEq)]
pub struct SequencePlan {
    pub steps: Vec<CueStep>,
    /// When the last cue has finished.
    pub total_ms: u64,
}

/// Lay `cues` out back to back.
///
/// Each item gets a fixed lead-in of `cue_gap_ms` before it plays. When
/// `numbered`, the item's number cue plays at the start of that lead-in.
pub fn plan_sequence<A: AudioBackend>(
    audio: &A,
    config: &EngineConfig,
    cues: &[CueId],
    numbered: bool,
) -> SequencePlan {
    let mut steps = Vec::with_capacity(if numbered { cues.len() * 2 } else { cues.len() });
    let mut t = 0u64;

    for (index, cue) in cues.iter().enumerate() {
        let lead = config.cue_gap_ms;
        if numbered {
            steps.push(CueStep {
                offset_ms: t,
                cue: config.number_cue(index + 1),
            });
        }
        steps.push(CueStep {
            offset_ms: t + lead,
            cue: cue.clone(),
        });
        t += lead + audio.duration_of(cue);
    }

    SequencePlan { steps, total_ms: t }
}

/// Arm one timer per step plus the completion event at `total_ms`. An empty
/// plan completes with no delay.
pub fn schedule_plan<E>(
    scheduler: &mut Scheduler<E>,
    plan: SequencePlan,
    mut cue_event: impl FnMut(CueId) -> E,
    done: E,
) {
    for step in plan.steps {
        scheduler.schedule(step.offset_ms, cue_event(step.cue));
    }
    scheduler.schedule(plan.total_ms, done);
}
