use color_eyre::eyre::WrapErr;
use crossterm::{
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::fs::File;
use std::io::stdout;

use shardfield::app::App;
use shardfield::config::{DisplayConfig, GameConfig};
use shardfield::world::Viewport;

/// World units per terminal cell; braille gives 2x4 dots per cell.
const CELL_WIDTH: f64 = 8.0;
const CELL_HEIGHT: f64 = 16.0;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let config = GameConfig::load()?;
    init_logging(&config.display)?;
    let config = config.sanitized();
    info!("starting with {config:?}");

    let supports_keyboard_enhancement = matches!(
        crossterm::terminal::supports_keyboard_enhancement(),
        Ok(true)
    );
    info!("keyboard enhancement supported: {supports_keyboard_enhancement}");

    let viewport = viewport_for(&config.display)?;
    info!("viewport {} x {}", viewport.width, viewport.height);

    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    // Setup terminal manually for full control
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Enable keyboard enhancement AFTER entering alternate screen
    if supports_keyboard_enhancement {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result =
        App::new(&config, viewport, rng, supports_keyboard_enhancement).run(&mut terminal);

    // Cleanup runs whether or not the loop failed
    if supports_keyboard_enhancement {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Sends `log` output to the configured file; the terminal belongs to the UI.
fn init_logging(display: &DisplayConfig) -> color_eyre::Result<()> {
    let file = File::create(&display.log_file)
        .wrap_err_with(|| format!("failed to create {}", display.log_file.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

/// Fixed size from the config, otherwise the terminal size at startup minus
/// the header and footer rows.
fn viewport_for(display: &DisplayConfig) -> color_eyre::Result<Viewport> {
    let (columns, rows) = crossterm::terminal::size().wrap_err("failed to read terminal size")?;
    let width = display
        .viewport_width
        .unwrap_or(f64::from(columns) * CELL_WIDTH);
    let height = display
        .viewport_height
        .unwrap_or(f64::from(rows.saturating_sub(2)) * CELL_HEIGHT);
    Ok(Viewport::new(width, height))
}
