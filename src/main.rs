use std::{
    fs::File,
    io::stdout,
    path::{Path, PathBuf},
    sync::Mutex,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use nestris::{
    constants::FRAME_POLL,
    game::{Game, PieceCatalog},
    input::{handle_input, InputState},
    ui::ui,
    GameConfig, Rules,
};

#[derive(Parser)]
#[command(name = "nestris")]
#[command(about = "Falling-block game with NES gravity, DAS and entry delay")]
struct Args {
    /// Starting level (clamped to 0..=29)
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    level: i32,

    /// Seed for the piece sequence
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON piece catalog to use instead of the built-in tetrominoes
    #[arg(short, long)]
    pieces: Option<PathBuf>,

    /// JSON file overriding the timing tables
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// Write tracing output to this file (filter with RUST_LOG)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_tracing(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        init_tracing(path)?;
    }

    let catalog = match &args.pieces {
        Some(path) => PieceCatalog::load(path)?,
        None => PieceCatalog::classic()?,
    };
    let rules = match &args.rules {
        Some(path) => Rules::load(path)?,
        None => Rules::default(),
    };
    let config = GameConfig {
        level: args.level,
        seed: args.seed,
        rules,
    };
    // Fail on bad configuration before touching the terminal.
    let game = Game::new(config.clone(), catalog.clone(), Instant::now())?;

    // Setup terminal
    terminal::enable_raw_mode().context("failed to enable raw mode")?;
    let mut keyboard_enhancement_active = false;
    let result = play(game, &config, &catalog, &mut keyboard_enhancement_active);

    // Cleanup runs whether setup or the game loop failed
    let mut stdout = stdout();
    if keyboard_enhancement_active {
        execute!(stdout, PopKeyboardEnhancementFlags)?;
    }
    terminal::disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen, cursor::Show)?;

    result
}

fn play(
    game: Game,
    config: &GameConfig,
    catalog: &PieceCatalog,
    keyboard_enhancement_active: &mut bool,
) -> Result<()> {
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Key release events make held-key detection exact
    *keyboard_enhancement_active = matches!(
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        ),
        Ok(())
    );
    tracing::info!(
        keyboard_enhancement_active = *keyboard_enhancement_active,
        "terminal ready"
    );

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    run(&mut terminal, game, config, catalog, *keyboard_enhancement_active)
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    mut game: Game,
    config: &GameConfig,
    catalog: &PieceCatalog,
    keyboard_enhancement_active: bool,
) -> Result<()> {
    let mut input = InputState::new(Instant::now());
    input.keyboard_enhancement_active = keyboard_enhancement_active;

    loop {
        terminal.draw(|f| ui(f, &game))?;

        // Drain every pending event so held state is current for this frame
        let mut timeout = Duration::from_millis(FRAME_POLL);
        while event::poll(timeout)? {
            timeout = Duration::ZERO;
            if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
                let now = Instant::now();
                match code {
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                        if kind == KeyEventKind::Press {
                            return Ok(());
                        }
                    }
                    KeyCode::Char('r') | KeyCode::Char('R') => {
                        if kind == KeyEventKind::Press {
                            game = Game::new(config.clone(), catalog.clone(), now)?;
                            input = InputState::new(now);
                            input.keyboard_enhancement_active = keyboard_enhancement_active;
                        }
                    }
                    _ => handle_input(&mut input, code, kind, now),
                }
            }
        }

        let now = Instant::now();
        input.check_timeouts(now);
        game.update(&input, now);
    }
}
