//! Event loop that drives an [`App`] from terminal input.

use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};
use tracing::debug;

use crate::app::{App, Control};

/// Redraw interval while nothing else happens, keeps the timer display live
pub const TICK_RATE: Duration = Duration::from_millis(100);

#[derive(Clone, Debug)]
pub enum QuizEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Forward crossterm input to a channel from a background thread.
/// The channel closes when the terminal stops delivering events.
pub fn terminal_events() -> Receiver<QuizEvent> {
    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || loop {
        let ev = match event::read() {
            // Windows reports releases too; only presses drive the quiz
            Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => QuizEvent::Key(key),
            Ok(CtEvent::Resize(_, _)) => QuizEvent::Resize,
            Ok(_) => continue,
            Err(e) => {
                debug!(error = %e, "terminal input closed");
                break;
            }
        };
        if tx.send(ev).is_err() {
            break;
        }
    });

    rx
}

/// Feeds events into an [`App`] and redraws after each one
pub struct Runner {
    events: Receiver<QuizEvent>,
    tick: Duration,
}

impl Runner {
    pub fn new(events: Receiver<QuizEvent>, tick: Duration) -> Self {
        Self { events, tick }
    }

    /// Runner over live terminal input
    pub fn terminal() -> Self {
        Self::new(terminal_events(), TICK_RATE)
    }

    /// Next event, `Tick` when the interval passes quietly, `None` once the
    /// input channel is closed and drained.
    pub fn step(&self) -> Option<QuizEvent> {
        match self.events.recv_timeout(self.tick) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout) => Some(QuizEvent::Tick),
            Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Run until the app asks to quit or input runs out.
    ///
    /// A graded batch is drawn before its record goes to the sink, so a slow
    /// or unreachable sink never hides the score.
    pub fn run<F>(&self, app: &mut App, mut draw: F) -> io::Result<()>
    where
        F: FnMut(&App) -> io::Result<()>,
    {
        draw(&*app)?;

        while let Some(ev) = self.step() {
            match ev {
                // the elapsed time is recomputed on every draw
                QuizEvent::Tick | QuizEvent::Resize => {}
                QuizEvent::Key(key) => match app.on_key(key) {
                    Control::Continue => {}
                    Control::Save => {
                        draw(&*app)?;
                        app.save_pending();
                    }
                    Control::Quit => return Ok(()),
                },
            }
            draw(&*app)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::{Phase, QuizConfig, SessionRecord, SinkStatus};
    use crate::sink::{NoopSink, ResultSink, SinkError};
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::sync::{Arc, Mutex};

    fn key(code: KeyCode) -> QuizEvent {
        QuizEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    /// Runner over a fixed list of events; the channel closes after them
    fn scripted(events: Vec<QuizEvent>) -> Runner {
        let (tx, rx) = mpsc::channel();
        for ev in events {
            tx.send(ev).unwrap();
        }
        Runner::new(rx, Duration::from_millis(1))
    }

    /// Logs sends into the same journal the draw closure writes to
    struct JournalSink {
        journal: Arc<Mutex<Vec<String>>>,
    }

    impl ResultSink for JournalSink {
        fn name(&self) -> &str {
            "journal"
        }

        fn send(&mut self, _record: &SessionRecord) -> Result<(), SinkError> {
            self.journal.lock().unwrap().push("send".to_string());
            Ok(())
        }
    }

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let runner = Runner::new(rx, Duration::from_millis(1));
        assert!(matches!(runner.step(), Some(QuizEvent::Tick)));
    }

    #[test]
    fn step_drains_then_ends() {
        let runner = scripted(vec![key(KeyCode::Char(' '))]);

        match runner.step() {
            Some(QuizEvent::Key(k)) => assert_eq!(k.code, KeyCode::Char(' ')),
            other => panic!("expected key event, got {:?}", other),
        }
        assert!(runner.step().is_none());
    }

    #[test]
    fn run_stops_on_quit() {
        let runner = scripted(vec![
            key(KeyCode::Char(' ')),
            key(KeyCode::Esc),
            key(KeyCode::Enter),
        ]);
        let mut app = App::new(QuizConfig::default(), Some(1), Box::new(NoopSink));

        runner.run(&mut app, |_| Ok(())).unwrap();

        // the enter after escape is never read
        assert_eq!(app.session.phase(), Phase::Running);
    }

    #[test]
    fn run_ends_when_input_closes() {
        let runner = scripted(vec![key(KeyCode::Char(' '))]);
        let mut app = App::new(QuizConfig::default(), Some(1), Box::new(NoopSink));
        let mut draws = 0;

        runner
            .run(&mut app, |_| {
                draws += 1;
                Ok(())
            })
            .unwrap();

        assert_eq!(app.session.phase(), Phase::Running);
        assert_eq!(draws, 2);
    }

    #[test]
    fn score_is_drawn_before_the_sink_is_called() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let sink = JournalSink {
            journal: journal.clone(),
        };
        let runner = scripted(vec![key(KeyCode::Char(' ')), key(KeyCode::Enter)]);
        let mut app = App::new(QuizConfig::default(), Some(1), Box::new(sink));

        runner
            .run(&mut app, |app| {
                let status = match app.session.sink_status() {
                    None => "none",
                    Some(SinkStatus::Saved) => "saved",
                    Some(SinkStatus::Failed(_)) => "failed",
                };
                journal
                    .lock()
                    .unwrap()
                    .push(format!("draw {} {}", app.session.phase(), status));
                Ok(())
            })
            .unwrap();

        let journal = journal.lock().unwrap();
        let send_at = journal.iter().position(|e| e == "send").unwrap();
        assert_eq!(journal[send_at - 1], "draw Completed none");
        assert_eq!(journal[send_at + 1], "draw Completed saved");
        assert_eq!(journal.iter().filter(|e| *e == "send").count(), 1);
    }

    #[test]
    fn draw_errors_stop_the_loop() {
        let runner = scripted(vec![key(KeyCode::Char(' '))]);
        let mut app = App::new(QuizConfig::default(), Some(1), Box::new(NoopSink));

        let err = runner
            .run(&mut app, |_| Err(io::Error::new(io::ErrorKind::Other, "gone")))
            .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::Other);
        assert_eq!(app.session.phase(), Phase::Ready);
    }
}
