use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use mmath::{
    app::App,
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore, SinkKind},
    logging,
    quiz::{Digits, Operation, QuestionCount},
    runtime::Runner,
    sink,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
};
use tracing::{info, warn};

/// mental math trainer tui
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Timed arithmetic drills in the terminal. Answers are graded on submit and the result is recorded to Notion, a local CSV log, or nowhere."
)]
pub struct Cli {
    /// operation to drill
    #[clap(short = 'o', long, value_enum)]
    operation: Option<Operation>,

    /// digits in the first operand (1-3)
    #[clap(short = 'a', long, value_parser = clap::value_parser!(u8).range(1..=3))]
    digits_a: Option<u8>,

    /// digits in the second operand (1-3)
    #[clap(short = 'b', long, value_parser = clap::value_parser!(u8).range(1..=3))]
    digits_b: Option<u8>,

    /// number of questions in a batch
    #[clap(short = 'n', long, value_enum)]
    questions: Option<QuestionCount>,

    /// seed the question generator for a repeatable batch
    #[clap(long)]
    seed: Option<u64>,

    /// where to record completed sessions
    #[clap(long, value_enum)]
    sink: Option<SinkKind>,

    /// csv file used by the csv sink
    #[clap(long)]
    csv_path: Option<PathBuf>,

    /// config file to use instead of the default location
    #[clap(long)]
    config: Option<PathBuf>,
}

impl Cli {
    /// Layer command line flags over file and environment settings
    fn apply_to(&self, config: &mut Config) {
        if let Some(operation) = self.operation {
            config.quiz.operation = operation;
        }
        if let Some(d) = self.digits_a.and_then(Digits::new) {
            config.quiz.digits_a = d;
        }
        if let Some(d) = self.digits_b.and_then(Digits::new) {
            config.quiz.digits_b = d;
        }
        if let Some(count) = self.questions {
            config.quiz.question_count = count;
        }
        if let Some(sink) = self.sink {
            config.sink = sink;
        }
        if let Some(path) = &self.csv_path {
            config.csv_path = Some(path.clone());
        }
    }

    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(path) = AppDirs::log_path() {
        // the quiz runs fine without a log file
        let _ = logging::init(&path);
    }

    let store = cli.config_store();
    let mut config = store.load();
    config.apply_env();
    cli.apply_to(&mut config);

    info!(sink = %config.sink, quiz = ?config.quiz, "starting");

    let mut app = App::new(config.quiz, cli.seed, sink::from_config(&config));

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app, &Runner::terminal());

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // remember the last settings, credentials stay as they were in the file
    let mut saved = store.load();
    saved.quiz = *app.session.config();
    if let Err(e) = store.save(&saved) {
        warn!(error = %e, path = %store.path().display(), "could not save settings");
    }

    result?;
    Ok(())
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner,
) -> io::Result<()> {
    runner.run(app, |app| {
        terminal.draw(|f| f.render_widget(app, f.area()))?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use mmath::{quiz::Phase, runtime::QuizEvent, sink::NoopSink};
    use ratatui::backend::TestBackend;
    use std::{sync::mpsc, time::Duration};

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["mmath"]);

        assert_eq!(cli.operation, None);
        assert_eq!(cli.digits_a, None);
        assert_eq!(cli.questions, None);
        assert_eq!(cli.seed, None);
        assert_eq!(cli.sink, None);
    }

    #[test]
    fn test_cli_quiz_flags() {
        let cli = Cli::parse_from(["mmath", "-o", "mul", "-a", "3", "-b", "2", "-n", "25"]);

        assert_eq!(cli.operation, Some(Operation::Mul));
        assert_eq!(cli.digits_a, Some(3));
        assert_eq!(cli.digits_b, Some(2));
        assert_eq!(cli.questions, Some(QuestionCount::TwentyFive));
    }

    #[test]
    fn test_cli_rejects_bad_values() {
        assert!(Cli::try_parse_from(["mmath", "--digits-a", "4"]).is_err());
        assert!(Cli::try_parse_from(["mmath", "--digits-b", "0"]).is_err());
        assert!(Cli::try_parse_from(["mmath", "--questions", "10"]).is_err());
        assert!(Cli::try_parse_from(["mmath", "--operation", "div"]).is_err());
    }

    #[test]
    fn test_cli_sink_flags() {
        let cli = Cli::parse_from(["mmath", "--sink", "csv", "--csv-path", "/tmp/x.csv"]);
        assert_eq!(cli.sink, Some(SinkKind::Csv));
        assert_eq!(cli.csv_path, Some(PathBuf::from("/tmp/x.csv")));
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from(["mmath", "-o", "sub", "-n", "50", "--sink", "none"]);
        let mut config = Config::default();
        config.quiz.digits_b = Digits::new(2).unwrap();

        cli.apply_to(&mut config);

        assert_eq!(config.quiz.operation, Operation::Sub);
        assert_eq!(config.quiz.question_count, QuestionCount::Fifty);
        assert_eq!(config.quiz.digits_b.get(), 2);
        assert_eq!(config.sink, SinkKind::None);
    }

    #[test]
    fn test_start_tui_quits_on_escape() {
        let (tx, rx) = mpsc::channel();
        let runner = Runner::new(rx, Duration::from_millis(1));
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        let mut app = App::new(Default::default(), Some(3), Box::new(NoopSink));

        for code in [KeyCode::Char(' '), KeyCode::Enter, KeyCode::Esc] {
            tx.send(QuizEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
                .unwrap();
        }

        start_tui(&mut terminal, &mut app, &runner).unwrap();
        assert_eq!(app.session.phase(), Phase::Completed);

        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(screen.contains("Results saved to nowhere!"));
    }
}
