//! Pixel <-> cell conversion and perspective flipping.
//!
//! Drawing and hit-testing both go through this module so that they never
//! disagree at cell boundaries.

use crate::domain::chess::{BOARD_LENGTH, Cell, PieceColor};

/// Which side the human plays; the board is drawn from that side.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Orientation {
    #[default]
    PlayingWhite,
    PlayingBlack,
}

impl Orientation {
    pub fn from_color(color: PieceColor) -> Self {
        match color {
            PieceColor::White => Orientation::PlayingWhite,
            PieceColor::Black => Orientation::PlayingBlack,
        }
    }

    pub fn player_color(&self) -> PieceColor {
        match self {
            Orientation::PlayingWhite => PieceColor::White,
            Orientation::PlayingBlack => PieceColor::Black,
        }
    }

    pub fn flipped(&self) -> Self {
        match self {
            Orientation::PlayingWhite => Orientation::PlayingBlack,
            Orientation::PlayingBlack => Orientation::PlayingWhite,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }
}

/// Identity when playing white, point reflection through the centre otherwise.
/// Applying it twice yields the original cell.
pub fn flip(cell: Cell, orientation: Orientation) -> Cell {
    match orientation {
        Orientation::PlayingWhite => cell,
        Orientation::PlayingBlack => {
            Cell::new(BOARD_LENGTH - 1 - cell.row, BOARD_LENGTH - 1 - cell.col)
        }
    }
}

/// Hit-test a raw pointer position against the board surface.
///
/// The result may lie outside the board; callers must check
/// [`Cell::is_on_board`].
pub fn pixel_to_cell(
    point: Point,
    surface: Rect,
    square_size: f32,
    orientation: Orientation,
) -> Cell {
    let row = ((point.y - surface.top) / square_size).floor() as i32;
    let col = ((point.x - surface.left) / square_size).floor() as i32;
    flip(Cell::new(row, col), orientation)
}

/// Surface-local pixel block occupied by `cell` on screen.
pub fn cell_to_pixel(cell: Cell, square_size: f32, orientation: Orientation) -> Rect {
    let screen = flip(cell, orientation);
    Rect::new(
        screen.col as f32 * square_size,
        screen.row as f32 * square_size,
        square_size,
        square_size,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SURFACE: Rect = Rect::new(20.0, 40.0, 400.0, 400.0);
    const SIZE: f32 = 50.0;

    fn all_cells() -> impl Iterator<Item = Cell> {
        (0..8).flat_map(|row| (0..8).map(move |col| Cell::new(row, col)))
    }

    #[test]
    fn test_flip_is_involution() {
        for orientation in [Orientation::PlayingWhite, Orientation::PlayingBlack] {
            for cell in all_cells() {
                assert_eq!(flip(flip(cell, orientation), orientation), cell);
            }
        }
    }

    #[test]
    fn test_flip_black_mirrors_corners() {
        assert_eq!(flip(Cell::new(0, 0), Orientation::PlayingBlack), Cell::new(7, 7));
        assert_eq!(flip(Cell::new(6, 4), Orientation::PlayingBlack), Cell::new(1, 3));
        assert_eq!(flip(Cell::new(6, 4), Orientation::PlayingWhite), Cell::new(6, 4));
    }

    #[test]
    fn test_round_trip_hits_same_cell() {
        for orientation in [Orientation::PlayingWhite, Orientation::PlayingBlack] {
            for cell in all_cells() {
                let local = cell_to_pixel(cell, SIZE, orientation);
                let center = local.center();
                let raw = Point::new(center.x + SURFACE.left, center.y + SURFACE.top);
                assert_eq!(pixel_to_cell(raw, SURFACE, SIZE, orientation), cell);

                // top-left corner belongs to the cell, not its neighbour
                let corner = Point::new(local.left + SURFACE.left, local.top + SURFACE.top);
                assert_eq!(pixel_to_cell(corner, SURFACE, SIZE, orientation), cell);
            }
        }
    }

    #[test]
    fn test_outside_board_is_reported_not_clamped() {
        let above = Point::new(SURFACE.left + 10.0, SURFACE.top - 1.0);
        let cell = pixel_to_cell(above, SURFACE, SIZE, Orientation::PlayingWhite);
        assert_eq!(cell.row, -1);
        assert!(!cell.is_on_board());

        let right = Point::new(SURFACE.left + 8.0 * SIZE + 1.0, SURFACE.top + 10.0);
        let cell = pixel_to_cell(right, SURFACE, SIZE, Orientation::PlayingWhite);
        assert_eq!(cell.col, 8);
        assert!(!cell.is_on_board());
    }

    #[test]
    fn test_black_perspective_top_left_is_h1() {
        let p = Point::new(SURFACE.left + 1.0, SURFACE.top + 1.0);
        assert_eq!(
            pixel_to_cell(p, SURFACE, SIZE, Orientation::PlayingBlack),
            Cell::new(7, 7)
        );
    }
}
