//! Quiz core: batch generation, timing, grading and the session state machine.

pub mod generator;
pub mod grader;
pub mod model;
pub mod session;
pub mod timer;

pub use model::{Digits, Operation, Question, QuestionCount, QuizConfig, SessionRecord};
pub use session::{Action, Completion, Phase, Session, SinkStatus};
