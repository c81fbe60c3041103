//! One quiz attempt, driven as an explicit state machine.
//!
//! Selecting an option records the answer and parks the session in
//! `AwaitingTransition` until the transition deadline passes; the caller then
//! drives the remaining edges with [`QuizSession::step`] or
//! [`QuizSession::poll`]. Time is always passed in, never read from a global.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use quiz_core::Clock;
use quiz_core::model::{AnswerRecord, OptionId, Question, QuizConfiguration};
use storage::cache::KeyValueCache;

use crate::answers::AnswerTracker;
use crate::error::SessionError;
use crate::results::{ResultOutcome, evaluate};

/// Pause between selecting an option and showing the next question.
pub const DEFAULT_TRANSITION_DELAY: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the user to pick an option for the current question.
    Idle,
    /// An answer was recorded; the next question shows at `ready_at`.
    AwaitingTransition { ready_at: DateTime<Utc> },
    /// The deadline passed; the next step moves on.
    Advancing,
    /// Every question has been answered.
    Complete,
}

/// Progress through the quiz, as shown above the current question.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuizProgress {
    /// One-based number of the current question.
    pub question_number: usize,
    pub total: usize,
    pub percent_complete: f64,
    pub can_go_back: bool,
}

#[derive(Debug)]
pub struct QuizSession {
    config: Arc<QuizConfiguration>,
    tracker: AnswerTracker,
    index: usize,
    state: SessionState,
    transition_delay: Duration,
}

impl QuizSession {
    /// Begin a fresh attempt, discarding any persisted answers.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Tracker` if stale answers cannot be purged.
    pub fn start(
        config: Arc<QuizConfiguration>,
        cache: Arc<dyn KeyValueCache>,
    ) -> Result<Self, SessionError> {
        let mut tracker = AnswerTracker::new(cache);
        tracker.reset()?;
        tracing::debug!(questions = config.question_count(), "quiz session started");
        Ok(Self::from_tracker(config, tracker))
    }

    /// Continue a persisted attempt at its resume index.
    ///
    /// Answers that no longer line up with `config` are discarded and the
    /// attempt restarts from the first question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Tracker` if the cache cannot be read or purged.
    pub fn resume(
        config: Arc<QuizConfiguration>,
        cache: Arc<dyn KeyValueCache>,
    ) -> Result<Self, SessionError> {
        let mut tracker = AnswerTracker::restore(cache)?;
        if !answers_align(&config, tracker.records()) {
            tracing::warn!(
                answers = tracker.len(),
                "stored answers do not match the quiz; starting over"
            );
            tracker.reset()?;
        }
        tracing::debug!(resume_index = tracker.resume_index(), "quiz session resumed");
        Ok(Self::from_tracker(config, tracker))
    }

    #[must_use]
    pub fn with_transition_delay(mut self, delay: Duration) -> Self {
        self.transition_delay = delay;
        self
    }

    fn from_tracker(config: Arc<QuizConfiguration>, tracker: AnswerTracker) -> Self {
        let index = tracker.resume_index();
        let state = if index >= config.question_count() {
            SessionState::Complete
        } else {
            SessionState::Idle
        };
        Self {
            config,
            tracker,
            index,
            state,
            transition_delay: DEFAULT_TRANSITION_DELAY,
        }
    }

    /// Record `option` for the current question and start the transition.
    ///
    /// # Errors
    ///
    /// Returns `AnsweringInProgress` while a transition is pending, `Completed`
    /// once every question is answered, `UnknownOption` if the option is not
    /// offered by the current question, or `Tracker` if the answer cannot be
    /// persisted.
    pub fn select_option(
        &mut self,
        option: &OptionId,
        now: DateTime<Utc>,
    ) -> Result<SessionState, SessionError> {
        match self.state {
            SessionState::Idle => {}
            SessionState::Complete => return Err(SessionError::Completed),
            SessionState::AwaitingTransition { .. } | SessionState::Advancing => {
                return Err(SessionError::AnsweringInProgress);
            }
        }

        let question = self
            .config
            .question_at(self.index)
            .ok_or(SessionError::Completed)?;
        let choice = question
            .option(option)
            .ok_or_else(|| SessionError::UnknownOption(option.clone()))?;
        self.tracker
            .append(AnswerRecord::for_option(question, choice))?;

        let ready_at = Clock::fixed(now).deadline_after(self.transition_delay);
        self.state = SessionState::AwaitingTransition { ready_at };
        tracing::debug!(
            question = %question.id(),
            option = %option,
            "answer recorded; awaiting transition"
        );
        Ok(self.state)
    }

    /// Take at most one state edge. Returns whether the state changed.
    pub fn step(&mut self, now: DateTime<Utc>) -> bool {
        let next = match self.state {
            SessionState::AwaitingTransition { ready_at } if now >= ready_at => {
                SessionState::Advancing
            }
            SessionState::Advancing => {
                self.index += 1;
                if self.index >= self.config.question_count() {
                    SessionState::Complete
                } else {
                    SessionState::Idle
                }
            }
            _ => return false,
        };
        tracing::debug!(from = ?self.state, to = ?next, index = self.index, "session transition");
        self.state = next;
        true
    }

    /// Take every edge available at `now` and return the settled state.
    pub fn poll(&mut self, now: DateTime<Utc>) -> SessionState {
        while self.step(now) {}
        self.state
    }

    /// Return to the previous question, dropping its answer.
    ///
    /// Only allowed while idle on a question after the first; returns `false`
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Tracker` if the shortened sequence cannot be
    /// persisted.
    pub fn go_back(&mut self) -> Result<bool, SessionError> {
        if self.state != SessionState::Idle || self.index == 0 {
            return Ok(false);
        }
        if self.tracker.remove_last()?.is_none() {
            return Ok(false);
        }
        self.index -= 1;
        Ok(true)
    }

    /// Discard all answers and go back to the first question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Tracker` if the persisted answers cannot be purged.
    pub fn restart(&mut self) -> Result<(), SessionError> {
        self.tracker.reset()?;
        self.index = 0;
        self.state = SessionState::Idle;
        tracing::debug!("quiz session restarted");
        Ok(())
    }

    /// The question on screen; `None` once complete.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        match self.state {
            SessionState::Complete => None,
            _ => self.config.question_at(self.index),
        }
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        let total = self.config.question_count();
        let question_number = (self.index + 1).min(total);
        #[allow(clippy::cast_precision_loss)]
        let percent_complete = if total == 0 {
            0.0
        } else {
            question_number as f64 / total as f64 * 100.0
        };
        QuizProgress {
            question_number,
            total,
            percent_complete,
            can_go_back: self.state == SessionState::Idle && self.index > 0,
        }
    }

    /// Score the attempt and decide where the result view goes.
    ///
    /// A redirect ends the attempt, so the persisted answers are cleared.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Tracker` if clearing the answers fails.
    pub fn resolve_outcome(&mut self) -> Result<ResultOutcome, SessionError> {
        let outcome = evaluate(&self.config, self.tracker.records());
        if matches!(outcome, ResultOutcome::Redirect { .. }) {
            self.tracker.reset()?;
        }
        Ok(outcome)
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn answers(&self) -> &[AnswerRecord] {
        self.tracker.records()
    }

    #[must_use]
    pub fn config(&self) -> &QuizConfiguration {
        &self.config
    }

    #[must_use]
    pub fn transition_delay(&self) -> Duration {
        self.transition_delay
    }
}

fn answers_align(config: &QuizConfiguration, answers: &[AnswerRecord]) -> bool {
    answers.len() <= config.question_count()
        && answers.iter().enumerate().all(|(index, answer)| {
            config
                .question_at(index)
                .is_some_and(|q| q.id() == &answer.question_id)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::defaults::default_configuration;
    use quiz_core::time::fixed_now;
    use storage::cache::InMemoryCache;

    fn option(id: &str) -> OptionId {
        OptionId::new(id).unwrap()
    }

    fn session(cache: &InMemoryCache) -> QuizSession {
        QuizSession::start(Arc::new(default_configuration()), Arc::new(cache.clone())).unwrap()
    }

    #[test]
    fn selection_waits_for_deadline() {
        let mut s = session(&InMemoryCache::new());
        let now = fixed_now();
        let state = s.select_option(&option("c"), now).unwrap();
        let SessionState::AwaitingTransition { ready_at } = state else {
            panic!("expected pending transition, got {state:?}");
        };
        assert_eq!(ready_at - now, chrono::Duration::milliseconds(400));

        assert!(!s.step(now));
        assert!(matches!(
            s.select_option(&option("d"), now),
            Err(SessionError::AnsweringInProgress)
        ));
        assert_eq!(s.answers().len(), 1);

        assert_eq!(s.poll(ready_at), SessionState::Idle);
        assert_eq!(s.index(), 1);
        assert_eq!(s.current_question().unwrap().id().as_str(), "q2");
    }

    #[test]
    fn unknown_option_is_rejected_without_recording() {
        let mut s = session(&InMemoryCache::new());
        let err = s.select_option(&option("z"), fixed_now()).unwrap_err();
        assert!(matches!(err, SessionError::UnknownOption(_)));
        assert!(s.answers().is_empty());
        assert_eq!(s.state(), SessionState::Idle);
    }

    #[test]
    fn go_back_pops_last_answer() {
        let mut s = session(&InMemoryCache::new()).with_transition_delay(Duration::ZERO);
        assert!(!s.go_back().unwrap());

        s.select_option(&option("a"), fixed_now()).unwrap();
        s.poll(fixed_now());
        assert!(s.progress().can_go_back);

        assert!(s.go_back().unwrap());
        assert_eq!(s.index(), 0);
        assert!(s.answers().is_empty());
    }

    #[test]
    fn progress_reports_position() {
        let mut s = session(&InMemoryCache::new()).with_transition_delay(Duration::ZERO);
        let p = s.progress();
        assert_eq!((p.question_number, p.total), (1, 11));
        assert!(!p.can_go_back);

        s.select_option(&option("b"), fixed_now()).unwrap();
        s.poll(fixed_now());
        let p = s.progress();
        assert_eq!(p.question_number, 2);
        assert!((p.percent_complete - 2.0 / 11.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn last_answer_completes_session() {
        let mut s = session(&InMemoryCache::new()).with_transition_delay(Duration::ZERO);
        for _ in 0..11 {
            s.select_option(&option("c"), fixed_now()).unwrap();
            s.poll(fixed_now());
        }
        assert_eq!(s.state(), SessionState::Complete);
        assert!(s.current_question().is_none());
        assert!(matches!(
            s.select_option(&option("c"), fixed_now()),
            Err(SessionError::Completed)
        ));
        assert_eq!(s.progress().percent_complete, 100.0);

        let outcome = s.resolve_outcome().unwrap();
        assert_eq!(outcome.tier().unwrap().name(), "Steadfast");
    }

    #[test]
    fn restart_clears_answers() {
        let cache = InMemoryCache::new();
        let mut s = session(&cache).with_transition_delay(Duration::ZERO);
        s.select_option(&option("e"), fixed_now()).unwrap();
        s.poll(fixed_now());

        s.restart().unwrap();
        assert_eq!(s.index(), 0);
        assert_eq!(s.state(), SessionState::Idle);
        assert!(AnswerTracker::restore(Arc::new(cache)).unwrap().is_empty());
    }
}
