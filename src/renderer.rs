use crate::entities::GameState;
use crate::surface::{DrawList, TextAlign, TextBaseline};
use crate::world::Viewport;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Block, Borders, Paragraph,
        canvas::{Canvas, Line as CanvasLine},
    },
};

/// View struct that holds all game state needed for rendering
pub struct RenderView<'a> {
    pub game_state: GameState,
    /// Geometry recorded by the world this frame
    pub drawing: &'a DrawList,
    pub viewport: Viewport,
    pub score: u64,
    pub enemy_count: usize,
    pub enemy_mass: f64,
    pub mass_budget: f64,
    pub fps: u32,
    /// Red background after the ship was destroyed
    pub flashing: bool,
    pub area: Rect,
}

/// Handles all rendering responsibilities for the game
pub struct GameRenderer {
    background: Color,
    flash: Color,
}

impl Default for GameRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRenderer {
    /// Creates a new GameRenderer
    pub fn new() -> Self {
        Self {
            background: Color::Reset,
            flash: Color::Red,
        }
    }

    /// Main render method that dispatches to state-specific renderers
    pub fn render(&self, frame: &mut Frame, view: &RenderView) {
        match view.game_state {
            GameState::Playing => self.render_game(frame, view),
            GameState::Paused => self.render_paused(frame, view),
        }
    }

    /// Rows between the header and the footer hold the playfield.
    pub fn playfield(area: Rect) -> Rect {
        Rect {
            x: area.x,
            y: area.y + 1,
            width: area.width,
            height: area.height.saturating_sub(2),
        }
    }

    /// Renders the active gameplay screen
    fn render_game(&self, frame: &mut Frame, view: &RenderView) {
        let area = view.area;
        let field = Self::playfield(area);

        let Viewport { width, height } = view.viewport;
        // World units covered by one terminal cell, used to place text.
        let (cell_width, cell_height) = if field.width > 0 && field.height > 0 {
            (
                width / f64::from(field.width),
                height / f64::from(field.height),
            )
        } else {
            (0.0, 0.0)
        };

        let canvas = Canvas::default()
            .marker(Marker::Braille)
            .background_color(if view.flashing {
                self.flash
            } else {
                self.background
            })
            .x_bounds([0.0, width])
            .y_bounds([0.0, height])
            .paint(|ctx| {
                // The world grows downwards, the canvas upwards.
                for line in view.drawing.lines() {
                    ctx.draw(&CanvasLine::new(
                        line.from.x,
                        height - line.from.y,
                        line.to.x,
                        height - line.to.y,
                        line.color,
                    ));
                }
                for text in view.drawing.texts() {
                    let span = text.text.chars().count() as f64 * cell_width;
                    let x = match text.align {
                        TextAlign::Left => text.at.x,
                        TextAlign::Center => text.at.x - span / 2.0,
                        TextAlign::Right => text.at.x - span,
                    };
                    let row_middle = match text.baseline {
                        TextBaseline::Hanging => text.at.y + cell_height / 2.0,
                        TextBaseline::Middle => text.at.y,
                        TextBaseline::Bottom => text.at.y - cell_height / 2.0,
                    };
                    let y = height - row_middle;
                    ctx.print(
                        x,
                        y,
                        Line::from(text.text.clone()).style(
                            Style::default()
                                .fg(text.color)
                                .add_modifier(Modifier::BOLD),
                        ),
                    );
                }
            });
        frame.render_widget(canvas, field);

        // Stats overlay at the top
        let mass_style = if view.enemy_mass < view.mass_budget {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Yellow)
        };
        let stats = Line::from(vec![
            Span::styled("Score: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{}", view.score),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("  Enemies: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{}", view.enemy_count),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("  Mass: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{:.0}/{:.0}", view.enemy_mass, view.mass_budget),
                mass_style.add_modifier(Modifier::BOLD),
            ),
            Span::styled("  FPS: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{}", view.fps),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        ]);

        let stats_area = Rect {
            x: area.x + 1,
            y: area.y,
            width: area.width.saturating_sub(2),
            height: 1,
        };

        frame.render_widget(Paragraph::new(stats), stats_area);

        // Controls hint at bottom
        let controls = Line::from(vec![Span::styled(
            "[A/D/Arrows: Turn] [W/Up: Thrust] [Space: Fire] [P: Pause] [Q: Quit]",
            Style::default().fg(Color::DarkGray),
        )]);

        let controls_area = Rect {
            x: area.x + 1,
            y: area.y + area.height.saturating_sub(1),
            width: area.width.saturating_sub(2),
            height: 1,
        };

        frame.render_widget(Paragraph::new(controls).centered(), controls_area);
    }

    /// Renders the pause screen with overlay
    fn render_paused(&self, frame: &mut Frame, view: &RenderView) {
        // First render the frozen playfield
        self.render_game(frame, view);

        let area = view.area;
        let pause_text = vec![
            Line::from(""),
            Line::from("PAUSED").centered().bold().yellow(),
            Line::from(""),
            Line::from("Press P to resume").centered().white(),
        ];

        let pause_area = Rect {
            x: area.x + (area.width / 2).saturating_sub(15),
            y: area.y + (area.height / 2).saturating_sub(3),
            width: area.width.min(30),
            height: area.height.min(6),
        };

        frame.render_widget(
            Paragraph::new(pause_text)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Yellow)),
                )
                .alignment(Alignment::Center),
            pause_area,
        );
    }
}
