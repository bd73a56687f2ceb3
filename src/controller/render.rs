//! Render pipeline - paints a board snapshot onto a 2-D drawing surface.
//!
//! Every call is a full redraw: the board is small and fixed-size, so there is
//! no partial invalidation. The surface is only ever written here; nothing
//! reads state back from it.

use std::collections::HashMap;
use std::path::Path;

use log::warn;

use crate::domain::chess::{BoardSnapshot, Cell, Move, Piece, PieceColor, PieceKind, SquareTint};
use crate::domain::transform::{Orientation, Point, Rect, cell_to_pixel};

// Board colors
pub const LIGHT_SQUARE: u32 = 0xEFD9B5;
pub const DARK_SQUARE: u32 = 0xB48764;
pub const LAST_MOVE_MARKER: u32 = 0xF6F669;
pub const CAPTURE_MARKER: u32 = 0xFF0000;
pub const SELECTION_OUTLINE: u32 = 0x000000;

pub const OPAQUE: f32 = 1.0;
pub const GHOST_OPACITY: f32 = 0.4;
pub const CAPTURE_OPACITY: f32 = 0.25;
pub const LAST_MOVE_OPACITY: f32 = 0.5;
pub const PIECE_SCALE: f32 = 0.98; // piece size relative to square
pub const OUTLINE_WIDTH: f32 = 4.0;

/// A 2-D drawing surface with a global alpha, in the spirit of a canvas
/// context. Coordinates are surface-local pixels.
pub trait DrawSurface {
    /// Start a new frame of the given size
    fn clear(&mut self, width: f32, height: f32);
    fn alpha(&self) -> f32;
    fn set_alpha(&mut self, alpha: f32);
    fn fill_rect(&mut self, rect: Rect, color: u32);
    fn stroke_rect(&mut self, rect: Rect, color: u32, line_width: f32);
    fn draw_image(&mut self, path: &str, rect: Rect);
}

/// One recorded drawing operation, with the alpha in effect when it was issued
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Fill {
        rect: Rect,
        color: u32,
        alpha: f32,
    },
    Stroke {
        rect: Rect,
        color: u32,
        line_width: f32,
        alpha: f32,
    },
    Image {
        rect: Rect,
        path: String,
        alpha: f32,
    },
}

/// Recording surface. The board view replays it as GPUI elements.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayList {
    width: f32,
    height: f32,
    alpha: f32,
    ops: Vec<DrawOp>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            alpha: OPAQUE,
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }
}

impl Default for DisplayList {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawSurface for DisplayList {
    fn clear(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.ops.clear();
    }

    fn alpha(&self) -> f32 {
        self.alpha
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    fn fill_rect(&mut self, rect: Rect, color: u32) {
        self.ops.push(DrawOp::Fill {
            rect,
            color,
            alpha: self.alpha,
        });
    }

    fn stroke_rect(&mut self, rect: Rect, color: u32, line_width: f32) {
        self.ops.push(DrawOp::Stroke {
            rect,
            color,
            line_width,
            alpha: self.alpha,
        });
    }

    fn draw_image(&mut self, path: &str, rect: Rect) {
        self.ops.push(DrawOp::Image {
            rect,
            path: path.to_string(),
            alpha: self.alpha,
        });
    }
}

/// Image paths for each piece. A piece without an entry is not drawn.
#[derive(Clone, Debug, Default)]
pub struct PieceSet {
    paths: HashMap<Piece, String>,
}

impl PieceSet {
    /// Asset path for a piece relative to the assets directory
    pub fn file_name(piece: Piece) -> String {
        format!(
            "{}-{}.svg",
            piece.kind.name().to_lowercase(),
            piece.color.name().to_lowercase()
        )
    }

    fn all_pieces() -> impl Iterator<Item = Piece> {
        [PieceColor::White, PieceColor::Black].into_iter().flat_map(|color| {
            [
                PieceKind::Pawn,
                PieceKind::Rook,
                PieceKind::Knight,
                PieceKind::Bishop,
                PieceKind::Queen,
                PieceKind::King,
            ]
            .into_iter()
            .map(move |kind| Piece::new(kind, color))
        })
    }

    /// Full set under `dir`, without checking the files exist
    pub fn standard(dir: &str) -> Self {
        let paths = Self::all_pieces()
            .map(|p| (p, format!("{}/{}", dir, Self::file_name(p))))
            .collect();
        Self { paths }
    }

    /// Only the pieces whose image exists under `base/dir`
    pub fn discover(base: &Path, dir: &str) -> Self {
        let mut paths = HashMap::new();
        for piece in Self::all_pieces() {
            let file = Self::file_name(piece);
            if base.join(dir).join(&file).is_file() {
                paths.insert(piece, format!("{}/{}", dir, file));
            } else {
                warn!("missing piece image {}/{}", dir, file);
            }
        }
        Self { paths }
    }

    #[cfg(test)]
    pub fn without(mut self, piece: Piece) -> Self {
        self.paths.remove(&piece);
        self
    }

    pub fn path(&self, piece: Piece) -> Option<&str> {
        self.paths.get(&piece).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }
}

/// Overlays drawn on top of the plain board
#[derive(Clone, Debug, Default)]
pub struct Highlight<'a> {
    /// Square the piece is being dragged from (drawn dimmed)
    pub current: Option<Cell>,
    /// Legal destination currently under the pointer (outlined)
    pub selected: Option<Cell>,
    pub legal_destinations: &'a [Cell],
    /// Piece whose destinations are shown, drawn as a ghost on empty ones
    pub moving: Option<Piece>,
    pub last_move: Option<Move>,
}

/// Piece following the pointer during a drag, in surface-local pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LiftedPiece {
    pub piece: Piece,
    pub position: Point,
}

/// Draw with a reduced alpha and restore the previous alpha afterwards
fn with_alpha<S: DrawSurface + ?Sized>(surface: &mut S, alpha: f32, draw: impl FnOnce(&mut S)) {
    let previous = surface.alpha();
    surface.set_alpha(alpha);
    draw(surface);
    surface.set_alpha(previous);
}

fn piece_rect(square: Rect) -> Rect {
    let size = square.width * PIECE_SCALE;
    let offset = (square.width - size) / 2.0;
    Rect::new(square.left + offset, square.top + offset, size, size)
}

fn draw_piece<S: DrawSurface + ?Sized>(surface: &mut S, pieces: &PieceSet, piece: Piece, rect: Rect) {
    // a missing image leaves the square blank
    if let Some(path) = pieces.path(piece) {
        surface.draw_image(path, rect);
    }
}

fn tint_color(tint: SquareTint) -> u32 {
    match tint {
        SquareTint::Light => LIGHT_SQUARE,
        SquareTint::Dark => DARK_SQUARE,
    }
}

/// Paint the full board with its overlays.
pub fn render<S: DrawSurface + ?Sized>(
    surface: &mut S,
    snapshot: &BoardSnapshot,
    square_size: f32,
    orientation: Orientation,
    pieces: &PieceSet,
    highlight: &Highlight<'_>,
    lifted: Option<LiftedPiece>,
) {
    let board_size = square_size * 8.0;
    surface.clear(board_size, board_size);
    surface.set_alpha(OPAQUE);

    for square in snapshot.squares() {
        let rect = cell_to_pixel(square.cell, square_size, orientation);
        surface.fill_rect(rect, tint_color(square.tint));

        if highlight.last_move.is_some_and(|m| m.touches(square.cell)) {
            with_alpha(surface, LAST_MOVE_OPACITY, |s| s.fill_rect(rect, LAST_MOVE_MARKER));
        }

        if let Some(piece) = square.piece {
            if highlight.current == Some(square.cell) {
                with_alpha(surface, GHOST_OPACITY, |s| {
                    draw_piece(s, pieces, piece, piece_rect(rect))
                });
            } else {
                draw_piece(surface, pieces, piece, piece_rect(rect));
            }
        }
    }

    for &dest in highlight.legal_destinations {
        let rect = cell_to_pixel(dest, square_size, orientation);
        if snapshot.piece_at(dest).is_some() {
            with_alpha(surface, CAPTURE_OPACITY, |s| s.fill_rect(rect, CAPTURE_MARKER));
        } else if let Some(moving) = highlight.moving {
            with_alpha(surface, GHOST_OPACITY, |s| {
                draw_piece(s, pieces, moving, piece_rect(rect))
            });
        }
    }

    if let Some(selected) = highlight.selected {
        let rect = cell_to_pixel(selected, square_size, orientation);
        surface.stroke_rect(rect, SELECTION_OUTLINE, OUTLINE_WIDTH);
    }

    // drag ghost ignores the grid and always goes on top
    if let Some(lifted) = lifted {
        let half = square_size / 2.0;
        let square = Rect::new(
            lifted.position.x - half,
            lifted.position.y - half,
            square_size,
            square_size,
        );
        with_alpha(surface, GHOST_OPACITY, |s| {
            draw_piece(s, pieces, lifted.piece, piece_rect(square))
        });
    }
}
