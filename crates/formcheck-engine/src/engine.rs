//! The frame analysis engine orchestrating phase tracking and form checks.

use formcheck_core::{
    EngineState, ExercisePhase, FeedbackItem, LandmarkFrame, Result, Timestamp,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::config::EngineConfig;
use crate::events::{EngineEvent, EventBus};
use crate::feedback::FeedbackAggregator;
use crate::movement::MovementAnalyzer;
use crate::phase::{PhaseStateMachine, PhaseStep};
use crate::posture::PostureAnalyzer;

/// State returned after every analyzed frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub phase: ExercisePhase,
    pub last_phase: ExercisePhase,
    pub rep_count: u32,
    pub is_active: bool,
    pub frame_counter: u64,
    /// Whether posture and movement checks ran on this frame
    pub analyzed: bool,
    /// Current cycle's feedback, highest priority first
    pub feedback: Vec<FeedbackItem>,
}

impl EngineSnapshot {
    pub fn top_feedback(&self, n: usize) -> &[FeedbackItem] {
        &self.feedback[..n.min(self.feedback.len())]
    }
}

struct EngineCore {
    phases: PhaseStateMachine,
    feedback: FeedbackAggregator,
}

impl EngineCore {
    fn snapshot(&self, analyzed: bool) -> EngineSnapshot {
        let state = self.phases.state();
        EngineSnapshot {
            phase: state.current_phase,
            last_phase: state.last_phase,
            rep_count: state.rep_count,
            is_active: state.is_active,
            frame_counter: state.frame_counter,
            analyzed,
            feedback: self.feedback.prioritized(),
        }
    }
}

/// Real-time exercise form engine.
///
/// All mutation happens under a single lock, so frames and `reset` calls may
/// arrive from different threads; they are applied one at a time.
pub struct FormEngine {
    config: EngineConfig,
    posture: PostureAnalyzer,
    movement: MovementAnalyzer,
    core: Mutex<EngineCore>,
    events: EventBus,
}

impl FormEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::new_at(config, Timestamp::now())
    }

    /// Create an engine whose dwell timer starts at `now`
    pub fn new_at(config: EngineConfig, now: Timestamp) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, now))
    }

    fn build(config: EngineConfig, now: Timestamp) -> Self {
        let events = EventBus::new(config.event_capacity);
        let core = EngineCore {
            phases: PhaseStateMachine::new(config.min_dwell_nanos(), now),
            feedback: FeedbackAggregator::new(),
        };

        Self {
            config,
            posture: PostureAnalyzer::new(),
            movement: MovementAnalyzer::new(),
            core: Mutex::new(core),
            events,
        }
    }

    /// Analyze a frame observed now
    pub fn analyze_frame(&self, frame: LandmarkFrame) -> EngineSnapshot {
        self.analyze_frame_at(frame, Timestamp::now())
    }

    /// Analyze a frame observed at `now`.
    ///
    /// The phase state machine sees every frame. Posture and movement checks
    /// run on every `analysis_interval`-th frame, starting with the first,
    /// and each such frame opens a new feedback cycle.
    pub fn analyze_frame_at(&self, frame: LandmarkFrame, now: Timestamp) -> EngineSnapshot {
        // Events are published under the lock so subscribers observe them in
        // the same order as the state changes they describe.
        let mut guard = self.core.lock();
        let core = &mut *guard;

        let frame_index = core.phases.state().frame_counter;
        let analyzed = frame_index % self.config.analysis_interval == 0;
        tracing::trace!(
            frame = frame_index + 1,
            landmarks = frame.present_count(),
            analyzed,
            "frame received"
        );

        if analyzed {
            core.feedback.begin_cycle();
        }

        let mut feedback_changed = analyzed;
        if let PhaseStep::Committed(transition) = core.phases.step(&frame, now) {
            self.events.publish(EngineEvent::PhaseChanged {
                from: transition.from,
                to: transition.to,
                at: transition.at,
            });
            if transition.rep_completed {
                self.events.publish(EngineEvent::RepCompleted {
                    count: core.phases.rep_count(),
                    at: transition.at,
                });
            }
            if let Some(item) = transition.feedback {
                self.events.publish(EngineEvent::Announce {
                    message: item.message.clone(),
                });
                core.feedback.push(item);
                feedback_changed = true;
            }
        }

        if analyzed {
            let phase = core.phases.phase();
            core.feedback.extend(self.posture.analyze(&frame, now));
            core.feedback.extend(self.movement.analyze(&frame, phase, now));
            tracing::debug!(
                cycle = core.feedback.cycle(),
                items = core.feedback.len(),
                corrections = core.feedback.has_corrections(),
                "feedback cycle collected"
            );
        }

        if feedback_changed {
            let top = core.feedback.top(self.config.feedback_display_limit);
            if analyzed {
                if let Some(first) = top.first() {
                    self.events.publish(EngineEvent::Announce {
                        message: first.message.clone(),
                    });
                }
            }
            self.events.publish(EngineEvent::FeedbackUpdated { items: top });
        }

        core.snapshot(analyzed)
    }

    /// Restore the construction-time state and drop all feedback
    pub fn reset(&self) {
        self.reset_at(Timestamp::now());
    }

    pub fn reset_at(&self, now: Timestamp) {
        let mut core = self.core.lock();
        core.phases.reset(now);
        core.feedback.clear();
        tracing::info!(subscribers = self.events.subscriber_count(), "engine reset");
        self.events.publish(EngineEvent::Reset);
    }

    /// Mark the session finished; frames are ignored until the next reset
    pub fn finish(&self) -> EngineSnapshot {
        self.finish_at(Timestamp::now())
    }

    pub fn finish_at(&self, now: Timestamp) -> EngineSnapshot {
        let mut core = self.core.lock();
        if let Some(t) = core.phases.finish(now) {
            tracing::info!(reps = core.phases.rep_count(), "session finished");
            self.events.publish(EngineEvent::PhaseChanged {
                from: t.from,
                to: t.to,
                at: t.at,
            });
        }
        core.snapshot(false)
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        self.core.lock().snapshot(false)
    }

    pub fn state(&self) -> EngineState {
        self.core.lock().phases.state().clone()
    }

    /// Current cycle's feedback, highest priority first
    pub fn feedback(&self) -> Vec<FeedbackItem> {
        self.core.lock().feedback.prioritized()
    }

    /// The feedback items meant for display
    pub fn top_feedback(&self) -> Vec<FeedbackItem> {
        self.core.lock().feedback.top(self.config.feedback_display_limit)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl Default for FormEngine {
    fn default() -> Self {
        Self::build(EngineConfig::default(), Timestamp::now())
    }
}
