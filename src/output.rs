//! Text rendering of a collapsed grid.

use crate::error::AppError;
use anyhow::Context;
use colored::{Color, Colorize};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use wfc_core::{Grid, GridDrawable, StateId};
use wfc_rules::AssetHandle;

/// Glyph used for cells without a tile.
const EMPTY_GLYPH: char = '.';

const PALETTE: [Color; 8] = [
    Color::Blue,
    Color::Green,
    Color::Yellow,
    Color::Red,
    Color::Cyan,
    Color::Magenta,
    Color::BrightGreen,
    Color::BrightBlue,
];

/// Where a [`TextDrawable`] writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderTarget {
    Stdout,
    File(PathBuf),
}

/// Draws a grid as one character per cell: the first character of the
/// tile's asset handle, or `.` for cells without a tile.
///
/// Each Y layer is printed as a block of rows, one row per Z and one column
/// per X. Colours are only used on stdout.
#[derive(Debug)]
pub struct TextDrawable {
    target: RenderTarget,
    color: bool,
    frame: Option<(Grid<StateId>, Vec<Option<AssetHandle>>)>,
}

impl TextDrawable {
    pub fn new(target: RenderTarget, color: bool) -> Self {
        Self {
            target,
            color,
            frame: None,
        }
    }

    /// Whether a grid has been sent.
    pub fn has_frame(&self) -> bool {
        self.frame.is_some()
    }

    /// The last grid sent, as text.
    ///
    /// Returns `None` if nothing has been sent yet.
    pub fn render(&self, color: bool) -> Option<String> {
        let (states, assets) = self.frame.as_ref()?;
        let (width, height, depth) = states.dimensions();
        let mut out = String::with_capacity((width + 1) * height * depth + 16 * height);

        for y in 0..height {
            if height > 1 {
                if y > 0 {
                    out.push('\n');
                }
                out.push_str(&format!("y = {y}\n"));
            }
            for z in 0..depth {
                for x in 0..width {
                    let state = states.get(x, y, z).copied().unwrap_or(StateId::MAX);
                    out.push_str(&cell_text(state, assets, color));
                }
                out.push('\n');
            }
        }
        Some(out)
    }

    fn write_to(&self, writer: &mut impl Write, color: bool) -> Result<(), AppError> {
        let text = self
            .render(color)
            .ok_or_else(|| AppError::Render("no grid has been sent to the renderer".to_string()))?;
        writer.write_all(text.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

fn glyph(state: StateId, assets: &[Option<AssetHandle>]) -> char {
    assets
        .get(usize::from(state))
        .and_then(Option::as_ref)
        .and_then(|asset| asset.as_str().chars().next())
        .unwrap_or(EMPTY_GLYPH)
}

fn cell_text(state: StateId, assets: &[Option<AssetHandle>], color: bool) -> String {
    let glyph = glyph(state, assets);
    let text = glyph.to_string();
    if !color {
        return text;
    }
    if glyph == EMPTY_GLYPH {
        return text.as_str().dimmed().to_string();
    }
    let shade = PALETTE[usize::from(state) % PALETTE.len()];
    text.as_str().color(shade).bold().to_string()
}

impl GridDrawable for TextDrawable {
    type Error = AppError;

    fn send_tiles(&mut self, states: Grid<StateId>, assets: Vec<Option<AssetHandle>>) {
        log::debug!(
            "Renderer received a {:?} grid with {} assets",
            states.dimensions(),
            assets.len()
        );
        self.frame = Some((states, assets));
    }

    fn draw_tiles(&mut self) -> Result<(), Self::Error> {
        match &self.target {
            RenderTarget::Stdout => {
                let stdout = io::stdout();
                let mut lock = stdout.lock();
                self.write_to(&mut lock, self.color)
            }
            RenderTarget::File(path) => {
                log::info!("Writing grid to {}", path.display());
                let file = File::create(path)
                    .with_context(|| format!("Failed to create output file: {}", path.display()))?;
                let mut writer = io::BufWriter::new(file);
                self.write_to(&mut writer, false)?;
                log::info!("Successfully saved grid to {}", path.display());
                Ok(())
            }
        }
    }
}
