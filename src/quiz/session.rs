use std::time::Instant;

use chrono::Local;
use tracing::{debug, info};

use super::{
    generator::QuestionSource,
    grader::{grade, Grade},
    model::{Digits, Operation, Question, QuestionCount, QuizConfig, SessionRecord},
    timer::{Timer, TimerState},
};
use crate::{sink::SinkError, util::round2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Configuring,
    Ready,
    Running,
    Paused,
    Completed,
}

/// A user action, already decoded from whatever input produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SetOperation(Operation),
    SetDigitsA(Digits),
    SetDigitsB(Digits),
    SetQuestionCount(QuestionCount),
    ToggleTimer,
    Answer { index: usize, value: Option<i64> },
    Submit,
    Restart,
}

/// What happened when the record was handed to the result sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkStatus {
    Saved,
    Failed(String),
}

/// Graded outcome of a completed batch
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub grade: Grade,
    pub elapsed_secs: f64,
    pub record: SessionRecord,
}

/// One quiz session: configuration, batch, answers, timer and result.
///
/// All state changes go through [`Session::apply`]. The answer slate is
/// always as long as the batch, and a batch is generated only when empty.
#[derive(Debug, Clone)]
pub struct Session {
    config: QuizConfig,
    questions: Vec<Question>,
    answers: Vec<Option<i64>>,
    timer: Timer,
    completion: Option<Completion>,
    sink_status: Option<SinkStatus>,
    batch_id: u64,
    launch_config: QuizConfig,
    source: QuestionSource,
}

impl Session {
    pub fn new(config: QuizConfig, seed: Option<u64>) -> Self {
        Self {
            config,
            questions: Vec::new(),
            answers: Vec::new(),
            timer: Timer::new(),
            completion: None,
            sink_status: None,
            batch_id: 0,
            launch_config: config,
            source: QuestionSource::from_seed(seed),
        }
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[Option<i64>] {
        &self.answers
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn completion(&self) -> Option<&Completion> {
        self.completion.as_ref()
    }

    pub fn sink_status(&self) -> Option<&SinkStatus> {
        self.sink_status.as_ref()
    }

    /// Increments every time a new batch is generated
    pub fn batch_id(&self) -> u64 {
        self.batch_id
    }

    pub fn is_completed(&self) -> bool {
        self.completion.is_some()
    }

    pub fn phase(&self) -> Phase {
        if self.completion.is_some() {
            return Phase::Completed;
        }
        if self.questions.is_empty() {
            return Phase::Configuring;
        }
        match self.timer.state() {
            TimerState::Running => Phase::Running,
            TimerState::Paused => Phase::Paused,
            TimerState::Stopped | TimerState::Finished => Phase::Ready,
        }
    }

    /// Fill the batch if it is empty. Returns true when a batch was generated.
    pub fn ensure_questions(&mut self) -> bool {
        if !self.questions.is_empty() || self.is_completed() {
            return false;
        }
        self.questions = self.source.generate(&self.config);
        self.answers = vec![None; self.questions.len()];
        self.batch_id += 1;
        debug!(
            batch = self.batch_id,
            operation = %self.config.operation,
            count = self.questions.len(),
            "generated questions"
        );
        true
    }

    pub fn apply(&mut self, action: Action) -> Option<SessionRecord> {
        self.apply_at(action, Instant::now())
    }

    /// Apply `action` with `now` as the current time.
    ///
    /// Returns the session record when `action` completes the batch, so the
    /// caller can hand it to a sink. Actions that do not fit the current
    /// phase are ignored.
    pub fn apply_at(&mut self, action: Action, now: Instant) -> Option<SessionRecord> {
        match action {
            Action::SetOperation(operation) => self.reconfigure(QuizConfig {
                operation,
                ..self.config
            }),
            Action::SetDigitsA(digits_a) => self.reconfigure(QuizConfig {
                digits_a,
                ..self.config
            }),
            Action::SetDigitsB(digits_b) => self.reconfigure(QuizConfig {
                digits_b,
                ..self.config
            }),
            Action::SetQuestionCount(question_count) => self.reconfigure(QuizConfig {
                question_count,
                ..self.config
            }),
            Action::ToggleTimer => {
                if matches!(self.phase(), Phase::Ready | Phase::Running | Phase::Paused) {
                    if let Ok(state) = self.timer.toggle_at(now) {
                        debug!(%state, "timer toggled");
                    }
                }
            }
            Action::Answer { index, value } => {
                if self.phase() == Phase::Running {
                    if let Some(slot) = self.answers.get_mut(index) {
                        *slot = value;
                    }
                }
            }
            Action::Submit => return self.submit(now),
            Action::Restart => {
                info!("restarting session");
                *self = Self::new(self.launch_config, self.source.seed());
            }
        }
        None
    }

    /// Remember what the sink made of the record. Never changes the phase.
    pub fn record_sink_result(&mut self, result: Result<(), SinkError>) {
        if !self.is_completed() {
            return;
        }
        self.sink_status = Some(match result {
            Ok(()) => SinkStatus::Saved,
            Err(e) => SinkStatus::Failed(e.to_string()),
        });
    }

    fn reconfigure(&mut self, config: QuizConfig) {
        if self.is_completed() {
            return;
        }
        self.config = config;
        self.questions.clear();
        self.answers.clear();
        self.timer.reset();
        self.ensure_questions();
    }

    fn submit(&mut self, now: Instant) -> Option<SessionRecord> {
        if !matches!(self.phase(), Phase::Running | Phase::Paused) {
            return None;
        }

        // Finished is unreachable here, the phase check above rules it out
        let _ = self.timer.finish_at(now);
        let elapsed_secs = round2(self.timer.elapsed_at(now).as_secs_f64());
        let grade = grade(&self.questions, &self.answers);

        let record = SessionRecord {
            date: Local::now().date_naive().to_string(),
            operation: self.config.operation,
            elapsed_secs,
            correct: grade.correct,
            total: grade.total,
            accuracy_percent: grade.accuracy_percent,
        };

        info!(
            operation = %record.operation,
            elapsed_secs,
            correct = grade.correct,
            total = grade.total,
            accuracy = grade.accuracy_percent,
            "batch graded"
        );

        self.completion = Some(Completion {
            grade,
            elapsed_secs,
            record: record.clone(),
        });
        Some(record)
    }
}
