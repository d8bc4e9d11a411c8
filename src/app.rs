use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::warn;

use crate::{
    quiz::{Action, Phase, QuizConfig, Session, SessionRecord},
    sink::ResultSink,
};

/// Widest answer a user can type, sign included
const MAX_ANSWER_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    /// A graded record is waiting; draw, then call [`App::save_pending`]
    Save,
    Quit,
}

/// The running program: a quiz session, where its results go, and the
/// editing state of the answer fields.
pub struct App {
    pub session: Session,
    sink: Box<dyn ResultSink>,
    selected: usize,
    drafts: Vec<String>,
    drafts_batch: u64,
    pending: Option<SessionRecord>,
}

impl App {
    pub fn new(config: QuizConfig, seed: Option<u64>, sink: Box<dyn ResultSink>) -> Self {
        let mut app = Self {
            session: Session::new(config, seed),
            sink,
            selected: 0,
            drafts: Vec::new(),
            drafts_batch: 0,
            pending: None,
        };
        app.sync();
        app
    }

    pub fn sink_name(&self) -> &str {
        self.sink.name()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Text typed so far for question `index`
    pub fn draft(&self, index: usize) -> &str {
        self.drafts.get(index).map(String::as_str).unwrap_or("")
    }

    /// Make sure a batch exists and the drafts belong to it
    pub fn sync(&mut self) {
        self.session.ensure_questions();
        if self.session.batch_id() != self.drafts_batch {
            self.drafts = vec![String::new(); self.session.questions().len()];
            self.drafts_batch = self.session.batch_id();
            self.selected = 0;
        }
    }

    /// True while a graded record has not reached the sink yet
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Hand the waiting record to the sink and note the outcome on the session.
    /// May block for as long as the sink takes.
    pub fn save_pending(&mut self) {
        let Some(record) = self.pending.take() else {
            return;
        };
        let result = self.sink.send(&record);
        if let Err(e) = &result {
            warn!(sink = self.sink.name(), error = %e, "failed to save record");
        }
        self.session.record_sink_result(result);
    }

    pub fn dispatch(&mut self, action: Action) {
        if action == Action::Restart {
            // batch ids start over with the fresh session
            self.drafts_batch = u64::MAX;
        }
        if let Some(record) = self.session.apply(action) {
            self.pending = Some(record);
        }
        self.sync();
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Control {
        // a record left over from the last key is never dropped
        self.save_pending();

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Control::Quit;
        }

        let phase = self.session.phase();
        let config = *self.session.config();

        match key.code {
            KeyCode::Esc => return Control::Quit,
            KeyCode::Char(' ') => self.dispatch(Action::ToggleTimer),
            KeyCode::Enter => self.dispatch(Action::Submit),
            KeyCode::Up | KeyCode::BackTab => self.move_selection(-1),
            KeyCode::Down | KeyCode::Tab => self.move_selection(1),
            KeyCode::Backspace if phase == Phase::Running => self.edit(|draft| {
                draft.pop();
            }),
            KeyCode::Char(c) if phase == Phase::Running && (c.is_ascii_digit() || c == '-') => {
                self.edit(|draft| push_answer_char(draft, c))
            }
            KeyCode::Char('r') => self.dispatch(Action::Restart),
            KeyCode::Char('o') => self.dispatch(Action::SetOperation(config.operation.next())),
            KeyCode::Char('a') => self.dispatch(Action::SetDigitsA(config.digits_a.next())),
            KeyCode::Char('b') => self.dispatch(Action::SetDigitsB(config.digits_b.next())),
            KeyCode::Char('c') => {
                self.dispatch(Action::SetQuestionCount(config.question_count.next()))
            }
            _ => {}
        }

        if self.has_pending() {
            Control::Save
        } else {
            Control::Continue
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.session.questions().len();
        if len == 0 {
            return;
        }
        self.selected = (self.selected as isize + delta).rem_euclid(len as isize) as usize;
    }

    fn edit<F: FnOnce(&mut String)>(&mut self, f: F) {
        let index = self.selected;
        let Some(draft) = self.drafts.get_mut(index) else {
            return;
        };
        f(draft);
        let value = draft.parse::<i64>().ok();
        self.dispatch(Action::Answer { index, value });
    }
}

fn push_answer_char(draft: &mut String, c: char) {
    if draft.len() >= MAX_ANSWER_LEN {
        return;
    }
    // A minus sign only makes sense in front
    if c == '-' && !draft.is_empty() {
        return;
    }
    draft.push(c);
}
