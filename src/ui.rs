use crate::app::{App, Focus, NoticeKind};
use crate::braille;
use dla_stepper::stepper::RunState;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const SIDEBAR_WIDTH: u16 = 24;

/// Max scroll for help content (generous to account for text wrapping on small screens)
pub const HELP_CONTENT_LINES: u16 = 40;

// UI color scheme
const BORDER_COLOR: Color = Color::Cyan;
const HIGHLIGHT_COLOR: Color = Color::Yellow;
const TEXT_COLOR: Color = Color::White;
const DIM_TEXT_COLOR: Color = Color::Gray;
const ERROR_COLOR: Color = Color::Red;

/// Creates a standard styled block with rounded borders
fn styled_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_COLOR))
        .title(title)
}

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if app.fullscreen_mode {
        render_canvas(frame, area, app);
    } else {
        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .split(area);

        render_sidebar(frame, layout[0], app);
        render_canvas(frame, layout[1], app);
    }

    if app.show_help {
        render_help_overlay(frame, area, app);
    }
    if app.notice.is_some() {
        render_notice(frame, area, app);
    }
}

/// Calculate the canvas size (excluding borders)
pub fn get_canvas_size(frame_area: Rect, fullscreen: bool) -> (u16, u16) {
    if fullscreen {
        (frame_area.width.saturating_sub(2), frame_area.height.saturating_sub(2))
    } else {
        let canvas_width = frame_area.width.saturating_sub(SIDEBAR_WIDTH + 2);
        let canvas_height = frame_area.height.saturating_sub(2);
        (canvas_width, canvas_height)
    }
}

fn render_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(10), // Status
            Constraint::Length(3),  // Step entry
            Constraint::Min(6),     // Controls
        ])
        .split(area);

    render_status_box(frame, sections[0], app);
    render_step_entry(frame, sections[1], app);
    render_controls_box(frame, sections[2], app);
}

fn render_status_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" DLA Stepper ");
    let engine = &app.engine;

    let state = engine.run_state();
    let (status_text, status_color) = match state {
        RunState::Running => (state.name(), Color::Green),
        RunState::Stopped if engine.is_saturated() => ("SATURATED", ERROR_COLOR),
        RunState::Stopped => (state.name(), HIGHLIGHT_COLOR),
    };

    let region = engine.region();
    let row = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{label:<9}"), Style::default().fg(DIM_TEXT_COLOR)),
            Span::styled(value, Style::default().fg(TEXT_COLOR)),
        ])
    };

    let content = vec![
        Line::from(Span::styled(status_text, Style::default().fg(status_color))),
        row("Step", engine.cur_step().to_string()),
        row("Left", engine.remaining_steps().to_string()),
        row("Respawn", engine.strategy_name().to_string()),
        row("Fixed", engine.fixed_count().to_string()),
        row("Walkers", engine.particles().len().to_string()),
        row(
            "Region",
            format!(
                "{}x{}",
                region.max_x - region.min_x + 1,
                region.max_y - region.min_y + 1
            ),
        ),
        row("Seed", engine.rng_seed().to_string()),
    ];

    let paragraph = Paragraph::new(content).block(block);
    frame.render_widget(paragraph, area);
}

fn render_step_entry(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::StepEntry;
    let block = if focused {
        styled_block(" Steps (Enter) ").border_style(Style::default().fg(HIGHLIGHT_COLOR))
    } else {
        styled_block(" Steps (Tab) ")
    };

    let cursor = if focused { "_" } else { "" };
    let style = if focused {
        Style::default().fg(HIGHLIGHT_COLOR)
    } else {
        Style::default().fg(TEXT_COLOR)
    };
    let paragraph = Paragraph::new(Line::from(Span::styled(
        format!("{}{}", app.step_input, cursor),
        style,
    )))
    .block(block);
    frame.render_widget(paragraph, area);
}

fn render_controls_box(frame: &mut Frame, area: Rect, app: &App) {
    let key_style = Style::default().fg(HIGHLIGHT_COLOR);
    let desc_style = Style::default().fg(DIM_TEXT_COLOR);

    let make_control = |key: &str, desc: String| -> Line<'_> {
        Line::from(vec![
            Span::styled(format!("{:>5}", key), key_style),
            Span::styled(format!(" {}", desc), desc_style),
        ])
    };

    let particles = if app.show_particles { "hide" } else { "show" };
    let content = vec![
        make_control("Enter", "run steps".to_string()),
        make_control("Space", "stop/run".to_string()),
        make_control("Tab", "edit steps".to_string()),
        make_control("R", "reset".to_string()),
        make_control("T", format!("respawn: {}", app.engine.strategy_name())),
        make_control("+/-", "walkers".to_string()),
        make_control("P", format!("{particles} walkers")),
        make_control("V", "fullscreen".to_string()),
        make_control("H/?", "help".to_string()),
        make_control("Q", "quit".to_string()),
    ];

    let paragraph = Paragraph::new(content).block(styled_block(" Controls "));
    frame.render_widget(paragraph, area);
}

fn render_canvas(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block("");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cells = braille::render_to_braille(&app.engine, inner.width, inner.height, app.show_particles);

    for cell in cells {
        let x = inner.x + cell.x;
        let y = inner.y + cell.y;

        if x < inner.x + inner.width && y < inner.y + inner.height {
            let cell_rect = Rect {
                x,
                y,
                width: 1,
                height: 1,
            };
            let span = Span::styled(cell.char.to_string(), Style::default().fg(cell.color));
            let paragraph = Paragraph::new(Line::from(span));
            frame.render_widget(paragraph, cell_rect);
        }
    }
}

/// Rect of `width` x `height` centered over the canvas part of `area`
fn centered_over_canvas(area: Rect, fullscreen: bool, width: u16, height: u16) -> Rect {
    let canvas_x = if fullscreen { 0 } else { SIDEBAR_WIDTH };
    let canvas_width = area.width.saturating_sub(canvas_x);

    let width = width.min(canvas_width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    Rect {
        x: area.x + canvas_x + canvas_width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    }
}

fn render_notice(frame: &mut Frame, area: Rect, app: &App) {
    let Some(notice) = &app.notice else { return };
    let popup = centered_over_canvas(area, app.fullscreen_mode, 48, 8);
    frame.render_widget(Clear, popup);

    let color = match notice.kind {
        NoticeKind::InvalidInput => HIGHLIGHT_COLOR,
        NoticeKind::Saturated | NoticeKind::Failure => ERROR_COLOR,
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(color))
        .title(notice.title());

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(notice.message.as_str(), Style::default().fg(TEXT_COLOR))),
        Line::from(""),
        Line::from(Span::styled(notice.hint(), Style::default().fg(DIM_TEXT_COLOR))),
        Line::from(Span::styled("Enter/Esc to dismiss", Style::default().fg(DIM_TEXT_COLOR))),
    ];

    let paragraph = Paragraph::new(content).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup);
}

fn render_help_overlay(frame: &mut Frame, area: Rect, app: &App) {
    let help_area = centered_over_canvas(area, app.fullscreen_mode, 56, 32);
    let help_height = help_area.height;

    // Clear the background
    frame.render_widget(Clear, help_area);

    let heading = Style::default().fg(HIGHLIGHT_COLOR);
    let content = vec![
        Line::from(""),
        Line::from(Span::styled("DIFFUSION-LIMITED AGGREGATION", Style::default().fg(BORDER_COLOR))),
        Line::from(""),
        Line::from("Walkers wander one cell at a time inside a box around the structure. A walker that touches the structure freezes in place and a new one appears."),
        Line::from(""),
        Line::from(Span::styled("RUNNING:", heading)),
        Line::from("Type a step count in the Steps box and press Enter. The run advances in batches and can be stopped between them. Running again continues the step count."),
        Line::from(""),
        Line::from(Span::styled("RESPAWN (T, only while stopped):", heading)),
        Line::from("Boxy: anywhere in the bounding box"),
        Line::from("Radial: on a ring around the seed sized to the structure"),
        Line::from(""),
        Line::from(Span::styled("SATURATION:", heading)),
        Line::from("When no free spot can be found for a new walker the run stops. Press R to start over."),
        Line::from(""),
        Line::from(Span::styled("BASIC CONTROLS:", heading)),
        Line::from("Enter=Run, Space=Stop/Run, Tab=Edit steps, R=Reset, T=Respawn, +/-=Walkers, P=Show walkers, V=Fullscreen, Q=Quit"),
        Line::from(""),
    ];

    let content_height = content.len() as u16;
    let visible_height = help_height.saturating_sub(2); // minus borders
    let is_scrollable = content_height > visible_height;

    let title = if is_scrollable {
        " Help (J/K scroll, H to close) "
    } else {
        " Help (H to close) "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(HIGHLIGHT_COLOR))
        .title(title);

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.help_scroll, 0));

    frame.render_widget(paragraph, help_area);
}
