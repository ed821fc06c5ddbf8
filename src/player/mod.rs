//! Player: the live terminal preview of the walkthrough.
//!
//! Mounts a `ScenePlan` on an in-memory backend, then runs the frame loop:
//! each frame the walkthrough pushes a fresh `LoopState`, the backend's scene
//! is rasterized as a top-down map, and only the changed cells are written.

pub mod backend;
mod menubar;

use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Result, bail};
use crossterm::event::{KeyCode, KeyEventKind};
use crossterm::{cursor, event, execute, queue, style, terminal};

use crate::engine::ScenePlan;
use crate::renderer::Walkthrough;
use crate::renderer::map::{self, MapProjection};
use crate::types::{Cell, Color, LoopState, NamedColor, Style};
use backend::TerminalBackend;

/// Rows reserved above the map for the menu bar.
const MAP_OFFSET: u16 = 1;
/// Rows below the map: brand overlay and status.
const FOOTER_ROWS: u16 = 2;
const FRAME_INTERVAL: Duration = Duration::from_millis(33);
const MIN_COLS: u16 = 30;
const MIN_ROWS: u16 = 10;

pub struct Player {
    backend: TerminalBackend,
    walkthrough: Walkthrough,
    projection: MapProjection,
    grid: Vec<Vec<Cell>>,
    claim: String,
}

impl Player {
    pub fn new(plan: ScenePlan) -> Result<Self> {
        let mut backend = TerminalBackend::new();
        let claim = plan.brand.claim.clone();
        let room = plan.room;
        let walkthrough = Walkthrough::mount(plan, &mut backend)?;
        Ok(Self {
            backend,
            walkthrough,
            projection: MapProjection::fit(room, MIN_COLS, MIN_ROWS),
            grid: Vec::new(),
            claim,
        })
    }

    /// Run the walkthrough in the terminal until the user quits.
    ///
    /// Sets up the terminal, enters the frame loop, and restores the terminal
    /// on exit (even on error).
    pub fn play(&mut self) -> Result<()> {
        let (term_w, term_h) = terminal::size()?;
        if term_w < MIN_COLS || term_h < MIN_ROWS {
            bail!(
                "Terminal too small: need {}x{}, have {}x{}",
                MIN_COLS,
                MIN_ROWS,
                term_w,
                term_h,
            );
        }

        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All),
        )?;

        let result = self.run_loop(&mut stdout);

        // Always restore terminal state.
        let _ = execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();

        result
    }

    // -----------------------------------------------------------------------
    // Frame loop
    // -----------------------------------------------------------------------

    fn run_loop(&mut self, stdout: &mut io::Stdout) -> Result<()> {
        self.layout(stdout)?;

        loop {
            if event::poll(FRAME_INTERVAL)? {
                match event::read()? {
                    event::Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        KeyCode::Char(' ') => self.backend.clock.toggle_pause(),
                        KeyCode::Char('r') => {
                            let now = self.backend.clock.now();
                            self.walkthrough.restart(now);
                        }
                        KeyCode::Char('w') => {
                            let water = self.walkthrough.water_mesh();
                            self.backend.toggle_visible(water);
                        }
                        _ => {}
                    },
                    event::Event::Resize(_, _) => self.layout(stdout)?,
                    _ => {}
                }
            }

            let state = self.walkthrough.frame(&mut self.backend);
            self.render_map(stdout)?;
            self.render_footer(stdout, &state)?;
            stdout.flush()?;
        }

        Ok(())
    }

    /// Refit the map to the terminal and repaint everything.
    fn layout(&mut self, stdout: &mut io::Stdout) -> Result<()> {
        let (term_w, term_h) = terminal::size()?;
        let rows = term_h.saturating_sub(MAP_OFFSET + FOOTER_ROWS).max(3);
        self.projection = MapProjection::fit(self.walkthrough.plan().room, term_w, rows);
        self.grid = vec![vec![Cell::default(); term_w as usize]; rows as usize];

        queue!(stdout, terminal::Clear(terminal::ClearType::All))?;
        menubar::render_menubar(stdout, menubar::HINTS)?;
        self.render_full(stdout)?;
        stdout.flush()?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Terminal output
    // -----------------------------------------------------------------------

    fn render_full(&self, stdout: &mut io::Stdout) -> Result<()> {
        for (y, row) in self.grid.iter().enumerate() {
            queue!(stdout, cursor::MoveTo(0, y as u16 + MAP_OFFSET))?;
            for cell in row {
                queue!(
                    stdout,
                    style::PrintStyledContent(style::StyledContent::new(to_content_style(&cell.style), cell.ch))
                )?;
            }
        }
        Ok(())
    }

    fn render_map(&mut self, stdout: &mut io::Stdout) -> Result<()> {
        let ops = self.backend.map_ops(&self.projection);
        let next = map::rasterize(&ops, self.projection.cols, self.projection.rows);
        for change in map::diff(&self.grid, &next) {
            queue!(
                stdout,
                cursor::MoveTo(change.x, change.y + MAP_OFFSET),
                style::PrintStyledContent(style::StyledContent::new(
                    to_content_style(&change.cell.style),
                    change.cell.ch,
                )),
            )?;
        }
        self.grid = next;
        Ok(())
    }

    fn render_footer(&self, stdout: &mut io::Stdout, state: &LoopState) -> Result<()> {
        let claim_y = self.projection.rows + MAP_OFFSET;
        let status_y = claim_y + 1;
        let (_, term_h) = terminal::size()?;
        if status_y >= term_h {
            return Ok(()); // No room for the footer.
        }

        // The terminal has no opacity; approximate it with intensity.
        let alpha = self.backend.overlay_alpha;
        let mut overlay = style::ContentStyle::default();
        overlay.foreground_color = Some(style::Color::White);
        if alpha >= 0.5 {
            overlay.attributes.set(style::Attribute::Bold);
        } else {
            overlay.attributes.set(style::Attribute::Dim);
        }
        let claim = if alpha > 0.0 { self.claim.as_str() } else { "" };
        queue!(
            stdout,
            cursor::MoveTo(0, claim_y),
            terminal::Clear(terminal::ClearType::CurrentLine),
            style::PrintStyledContent(style::StyledContent::new(overlay, format!(" {claim}"))),
        )?;

        let water = self.backend.entry(self.walkthrough.water_mesh()).visible;
        let timeline = self.walkthrough.scheduler().timeline();
        let p = state.camera_position;
        let status = format!(
            " {:6.1}s/{:.0}s | seg {}/{} | alpha {:.2} | water {} | cam {:+.2} {:+.2} {:+.2}{}",
            state.phase,
            timeline.loop_duration,
            state.segment + 1,
            timeline.segments.len(),
            state.overlay_alpha,
            if water { "on " } else { "off" },
            p.x,
            p.y,
            p.z,
            if self.backend.clock.is_paused() { " | PAUSED" } else { "" },
        );
        let mut dim = style::ContentStyle::default();
        dim.attributes.set(style::Attribute::Dim);
        queue!(
            stdout,
            cursor::MoveTo(0, status_y),
            terminal::Clear(terminal::ClearType::CurrentLine),
            style::PrintStyledContent(style::StyledContent::new(dim, status)),
        )?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Style conversion
// ---------------------------------------------------------------------------

pub fn to_content_style(s: &Style) -> style::ContentStyle {
    let mut cs = style::ContentStyle::default();
    if let Some(fg) = &s.fg {
        cs.foreground_color = Some(to_ct_color(fg));
    }
    if let Some(bg) = &s.bg {
        cs.background_color = Some(to_ct_color(bg));
    }
    if s.bold {
        cs.attributes.set(style::Attribute::Bold);
    }
    if s.dim {
        cs.attributes.set(style::Attribute::Dim);
    }
    cs
}

pub fn to_ct_color(c: &Color) -> style::Color {
    match c {
        Color::Named(n) => match n {
            NamedColor::Black => style::Color::Black,
            NamedColor::Red => style::Color::Red,
            NamedColor::Green => style::Color::Green,
            NamedColor::Yellow => style::Color::Yellow,
            NamedColor::Blue => style::Color::Blue,
            NamedColor::Magenta => style::Color::Magenta,
            NamedColor::Cyan => style::Color::Cyan,
            NamedColor::White => style::Color::White,
        },
        Color::Rgb { r, g, b } => style::Color::Rgb { r: *r, g: *g, b: *b },
    }
}
