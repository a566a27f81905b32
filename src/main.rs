mod app;
mod braille;
mod ui;

use anyhow::{bail, Context, Result};
use app::{App, Focus};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dla_stepper::config::AppConfig;
use dla_stepper::presets::PresetManager;
use dla_stepper::{BatchOutcome, RespawnStrategy, SimulationEngine, SimulationSettings};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Grid size for headless runs that do not set one
const HEADLESS_GRID: (usize, usize) = (160, 160);

#[derive(Parser, Debug)]
#[command(name = "dla-stepper")]
#[command(about = "Step-controlled diffusion-limited aggregation in the terminal")]
struct Args {
    /// Grid width in cells (default: fit the terminal)
    #[arg(long)]
    width: Option<usize>,

    /// Grid height in cells (default: fit the terminal)
    #[arg(long)]
    height: Option<usize>,

    /// Number of diffusing particles
    #[arg(short = 'p', long)]
    particles: Option<usize>,

    /// Respawn strategy (boxy, radial)
    #[arg(long)]
    strategy: Option<String>,

    /// RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Sweeps per batch
    #[arg(long = "batch-size")]
    batch_size: Option<usize>,

    /// Steps to run (pre-filled in the TUI, required work in headless mode)
    #[arg(short = 'n', long)]
    steps: Option<u64>,

    /// Start from a named preset
    #[arg(long)]
    preset: Option<String>,

    /// List available presets and exit
    #[arg(long = "list-presets")]
    list_presets: bool,

    /// Config file to load (default: the user config file, if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective configuration and continue
    #[arg(long = "save-config")]
    save_config: bool,

    /// Run without a terminal UI
    #[arg(long)]
    headless: bool,

    /// Print the final snapshot as JSON (headless only)
    #[arg(long)]
    json: bool,

    /// Write logs to this file (TUI mode logs nowhere otherwise)
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,
}

fn init_tracing(headless: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else if headless {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

/// defaults -> config file -> preset -> CLI flags
fn resolve_config(args: &Args, presets: &PresetManager) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => match AppConfig::default_path().filter(|p| p.exists()) {
            Some(path) => AppConfig::load_from_file(&path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => AppConfig::default(),
        },
    };

    if let Some(name) = &args.preset {
        let Some(preset) = presets.find(name) else {
            bail!(
                "unknown preset '{name}' (available: {})",
                presets.preset_names().join(", ")
            );
        };
        info!(preset = %preset.name, "applying preset");
        config.settings = preset.settings.clone();
    }

    let settings = &mut config.settings;
    if args.width.is_some() {
        settings.grid_width = args.width;
    }
    if args.height.is_some() {
        settings.grid_height = args.height;
    }
    if let Some(particles) = args.particles {
        settings.num_particles = particles;
    }
    if let Some(strategy) = &args.strategy {
        settings.strategy = RespawnStrategy::parse(strategy)?;
    }
    if args.seed.is_some() {
        settings.rng_seed = args.seed;
    }
    if let Some(batch_size) = args.batch_size {
        settings.batch_size = batch_size;
    }
    if let Some(steps) = args.steps {
        config.default_steps = steps;
    }
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.headless, args.log_file.as_deref())?;

    let presets = PresetManager::new();
    if args.list_presets {
        for preset in presets.all_presets() {
            println!("{:<14} {}", preset.name, preset.description);
        }
        return Ok(());
    }

    let config = resolve_config(&args, &presets)?;
    if args.save_config {
        let path = match &args.config {
            Some(path) => path.clone(),
            None => AppConfig::default_path().context("could not determine config directory")?,
        };
        config.save_to_file(&path)?;
    }

    if args.headless {
        run_headless(config.settings, config.default_steps, args.json)
    } else {
        run_tui(config)
    }
}

fn run_headless(settings: SimulationSettings, steps: u64, json: bool) -> Result<()> {
    let settings = settings.with_default_size(HEADLESS_GRID.0, HEADLESS_GRID.1);
    let mut engine = SimulationEngine::new(settings).context("failed to build simulation")?;
    engine.run(steps)?;

    let outcome = loop {
        match engine.step_batch() {
            Ok(BatchOutcome::Pending { .. }) => continue,
            Ok(_) => break Ok(()),
            Err(err) => break Err(err),
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
    } else {
        let region = engine.region();
        println!("steps:     {}", engine.cur_step());
        println!("fixed:     {}", engine.fixed_count());
        println!("particles: {}", engine.particles().len());
        println!(
            "region:    ({}, {})..=({}, {})",
            region.min_x, region.min_y, region.max_x, region.max_y
        );
        println!("strategy:  {}", engine.strategy_name());
        println!("seed:      {}", engine.rng_seed());
    }

    outcome.with_context(|| format!("run stopped after {} steps", engine.cur_step()))
}

fn run_tui(config: AppConfig) -> Result<()> {
    let mut stdout = io::stdout();
    enable_raw_mode().context("failed to enable raw mode")?;
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to build terminal backend")?;
    terminal.hide_cursor().ok();

    let result = build_app(&terminal, config).and_then(|mut app| run_app(&mut terminal, &mut app));

    terminal.show_cursor().ok();
    if let Err(err) = disable_raw_mode() {
        error!(?err, "failed to disable raw mode");
    }
    if let Err(err) = execute!(terminal.backend_mut(), LeaveAlternateScreen) {
        error!(?err, "failed to leave alternate screen");
    }

    result
}

/// Size an unsized grid to the initial canvas and create the app
fn build_app<B: ratatui::backend::Backend>(terminal: &Terminal<B>, config: AppConfig) -> Result<App> {
    let size = terminal.size()?;
    let frame_rect = Rect {
        x: 0,
        y: 0,
        width: size.width,
        height: size.height,
    };
    let (canvas_width, canvas_height) = ui::get_canvas_size(frame_rect, false);
    let (width, height) = braille::calculate_simulation_size(canvas_width, canvas_height);

    let settings = config.settings.with_default_size(width, height);
    let engine = SimulationEngine::new(settings).context("failed to build simulation")?;
    Ok(App::new(engine, config.default_steps))
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    // Target ~60fps for smooth animation
    const FRAME_DURATION: Duration = Duration::from_millis(16);

    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(FRAME_DURATION)? {
            if let Event::Key(key) = event::read()? {
                // Only process Press events
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                // A notice blocks everything until dismissed
                if app.notice.is_some() {
                    match key.code {
                        KeyCode::Enter | KeyCode::Esc => app.dismiss_notice(),
                        KeyCode::Char('r') | KeyCode::Char('R') => app.reset(),
                        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                        _ => {}
                    }
                    continue;
                }

                if app.focus == Focus::StepEntry {
                    match key.code {
                        KeyCode::Char(c) if c.is_ascii_digit() => app.push_input(c),
                        KeyCode::Backspace => app.pop_input(),
                        KeyCode::Enter => app.submit_steps(),
                        KeyCode::Tab | KeyCode::Esc => app.next_focus(),
                        _ => {}
                    }
                    continue;
                }

                match key.code {
                    KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                    KeyCode::Enter => app.submit_steps(),
                    KeyCode::Char(' ') => app.toggle_run(),
                    KeyCode::Char('s') | KeyCode::Char('S') => app.stop(),
                    KeyCode::Char('r') | KeyCode::Char('R') => app.reset(),
                    KeyCode::Char('t') | KeyCode::Char('T') => app.cycle_strategy(),
                    KeyCode::Char('p') | KeyCode::Char('P') => app.toggle_particles(),
                    KeyCode::Char('+') | KeyCode::Char('=') => app.adjust_particles(10),
                    KeyCode::Char('-') | KeyCode::Char('_') => app.adjust_particles(-10),
                    KeyCode::Char('v') | KeyCode::Char('V') => app.toggle_fullscreen(),
                    KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?') => app.toggle_help(),
                    KeyCode::Tab => app.next_focus(),
                    KeyCode::Esc => {
                        if app.show_help {
                            app.toggle_help();
                        }
                    }
                    KeyCode::Char('j') | KeyCode::Char('J') | KeyCode::Down => {
                        if app.show_help {
                            app.scroll_help_down(ui::HELP_CONTENT_LINES);
                        }
                    }
                    KeyCode::Char('k') | KeyCode::Char('K') | KeyCode::Up => {
                        if app.show_help {
                            app.scroll_help_up();
                        }
                    }
                    _ => {}
                }
            }
        }

        // One engine batch per frame
        app.tick();
    }
}
