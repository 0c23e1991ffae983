//! Blockfall - terminal front end
//!
//! Wires the engine to crossterm input, ratatui rendering and the on-disk
//! stores. The engine reports back only through its event bus.

use blockfall::highscores::{HighScoreStore, ScoreEntry};
use blockfall::input::InputHandler;
use blockfall::menu::{Menu, MenuAction, MenuBackdrop, MenuScreen};
use blockfall::scheduler::{LoopKind, Scheduler};
use blockfall::settings::Settings;
use blockfall::{ui, EventKind, Game, GameEvent, GameOverInfo, Phase};
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use std::cell::RefCell;
use std::io::{self, stdout};
use std::rc::Rc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Target frame rate
const TARGET_FPS: u64 = 60;
const FRAME_DURATION: Duration = Duration::from_micros(1_000_000 / TARGET_FPS);

/// Get the blockfall temp directory, creating it if needed
fn blockfall_temp_dir() -> std::path::PathBuf {
    let dir = std::env::temp_dir().join("blockfall");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn main() -> io::Result<()> {
    let session_id: u32 = rand::random();
    let log_dir = blockfall_temp_dir();
    let log_file = format!("{:08x}.log", session_id);

    // Setup tracing to log file
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("blockfall=debug")),
        )
        .with_ansi(false)
        .init();

    tracing::info!(
        "blockfall starting up, session={:08x}, log={}",
        session_id,
        log_dir.join(&log_file).display()
    );

    let settings = Settings::load();
    let scores = HighScoreStore::load_default();

    // Setup terminal
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    // Release events let held keys stop the moment they are let go
    let enhanced = supports_keyboard_enhancement().unwrap_or(false);
    if enhanced {
        execute!(
            stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let size = terminal.size()?;
    let mut app = App::new(settings, scores, enhanced, size.width, size.height);
    let result = app.run(&mut terminal);

    // Restore terminal
    if enhanced {
        execute!(stdout(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;

    result?;
    println!("\nThanks for playing blockfall!");
    if let Some(best) = app.scores.best() {
        println!("Best score: {}", best);
    }
    tracing::info!("shutting down");
    Ok(())
}

/// What the engine reported since the front end last looked
#[derive(Debug, Default)]
struct Inbox {
    phase: Option<Phase>,
    game_over: Option<GameOverInfo>,
}

struct App {
    settings: Settings,
    scores: HighScoreStore,
    game: Game,
    input: InputHandler,
    menu: Menu,
    backdrop: MenuBackdrop,
    scheduler: Scheduler,
    inbox: Rc<RefCell<Inbox>>,
    /// The finished game beat the table
    new_high_score: bool,
}

impl App {
    fn new(
        settings: Settings,
        scores: HighScoreStore,
        release_events: bool,
        width: u16,
        height: u16,
    ) -> Self {
        let mut game = Game::new();
        let inbox = Rc::new(RefCell::new(Inbox::default()));

        let sink = Rc::clone(&inbox);
        game.events_mut().subscribe(EventKind::StateChanged, move |event| {
            if let GameEvent::StateChanged(phase) = event {
                sink.borrow_mut().phase = Some(*phase);
            }
        });
        let sink = Rc::clone(&inbox);
        game.events_mut().subscribe(EventKind::GameOver, move |event| {
            if let GameEvent::GameOver(info) = event {
                sink.borrow_mut().game_over = Some(*info);
            }
        });
        game.events_mut()
            .subscribe_all(|event| tracing::trace!(?event, "game event"));

        let mut scheduler = Scheduler::new();
        scheduler.follow(game.phase());

        Self {
            input: InputHandler::from_settings(&settings).with_release_events(release_events),
            settings,
            scores,
            game,
            menu: Menu::new(),
            backdrop: MenuBackdrop::new(width / 2, height),
            scheduler,
            inbox,
            new_high_score: false,
        }
    }

    fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
        loop {
            let Some((kind, dt)) = self.scheduler.frame() else {
                return Ok(());
            };
            match kind {
                LoopKind::Menu => self.backdrop.update(dt),
                LoopKind::Game => {
                    if Scheduler::simulates(self.game.phase()) {
                        for action in self.input.update(dt) {
                            self.game.apply(action);
                        }
                        self.game.update(dt);
                    }
                }
            }
            self.drain_events();

            terminal.draw(|frame| self.render(frame))?;

            if event::poll(FRAME_DURATION)? {
                match event::read()? {
                    Event::Key(key) => {
                        if !self.handle_key(key) {
                            self.scheduler.stop();
                        }
                    }
                    Event::Resize(width, height) => self.backdrop.resize(width / 2, height),
                    _ => {}
                }
                self.drain_events();
            }
        }
    }

    fn render(&self, frame: &mut Frame) {
        match self.scheduler.active() {
            Some(LoopKind::Game) => {
                ui::render_game(frame, &self.game.snapshot(), &self.settings, self.new_high_score);
            }
            Some(LoopKind::Menu) | None => {
                ui::render_menu(frame, &self.menu, &self.backdrop, self.scores.entries());
            }
        }
    }

    /// React to engine events collected by the listeners
    fn drain_events(&mut self) {
        let Inbox { phase, game_over } = std::mem::take(&mut *self.inbox.borrow_mut());

        if let Some(info) = game_over {
            self.new_high_score = self.scores.is_high_score(info.score);
            self.scores.add(ScoreEntry::from_game_over(info));
        }
        if let Some(phase) = phase {
            // held keys never carry over a phase change
            self.input.clear();
            if self.scheduler.active().is_some() {
                self.scheduler.follow(phase);
            }
        }
    }

    fn start_game(&mut self) {
        let release_events = self.input.reports_releases();
        self.input = InputHandler::from_settings(&self.settings).with_release_events(release_events);
        self.new_high_score = false;
        self.game.start_game();
    }

    /// Returns false when the player asked to quit
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        let pressed = key.kind == KeyEventKind::Press;
        match self.game.phase() {
            Phase::Menu => !pressed || self.handle_menu_key(key),
            Phase::Playing => {
                if pressed && self.input.is_quit(&key) {
                    return false;
                }
                for action in self.input.handle(key) {
                    self.game.apply(action);
                }
                true
            }
            Phase::Paused => {
                if !pressed {
                    return true;
                }
                if self.input.is_quit(&key) {
                    return false;
                }
                if key.code == KeyCode::Char('m') {
                    self.game.return_to_menu();
                } else {
                    for action in self.input.handle(key) {
                        self.game.apply(action);
                    }
                }
                true
            }
            Phase::GameOver => {
                if !pressed {
                    return true;
                }
                match key.code {
                    KeyCode::Enter => self.start_game(),
                    KeyCode::Char('m') | KeyCode::Esc => self.game.return_to_menu(),
                    _ => return !self.input.is_quit(&key),
                }
                true
            }
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Up => self.menu.move_up(),
            KeyCode::Down => self.menu.move_down(),
            KeyCode::Left => self.menu.adjust_left(&mut self.settings),
            KeyCode::Right => self.menu.adjust_right(&mut self.settings),
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(action) = self.menu.select() {
                    return self.menu_action(action);
                }
            }
            KeyCode::Char('q') | KeyCode::Esc => {
                if self.menu.screen == MenuScreen::Main {
                    return false;
                }
                self.menu.go_back(&self.settings);
            }
            _ => return !self.input.is_quit(&key),
        }
        true
    }

    fn menu_action(&mut self, action: MenuAction) -> bool {
        match action {
            MenuAction::StartGame => self.start_game(),
            MenuAction::GoToScreen(screen) => self.menu.go_to(screen, &self.settings),
            MenuAction::Back => self.menu.go_back(&self.settings),
            MenuAction::SaveSettings => match self.settings.save() {
                Ok(()) => tracing::info!("settings saved"),
                Err(e) => tracing::warn!("could not save settings: {}", e),
            },
            MenuAction::Quit => return false,
        }
        true
    }
}
