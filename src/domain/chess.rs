//! Pure chess domain types and utilities.
//! No GPUI dependencies - this is the domain layer.

use shakmaty::{Color as SColor, File, Rank, Role, Square as SSquare};

/// Number of rows and columns on the board
pub const BOARD_LENGTH: i32 = 8;

/// A board cell in engine coordinates (row 0 = rank 8, col 0 = file a).
///
/// Hit-testing may produce cells outside the board; those are valid values
/// meaning "no cell" and are filtered with [`Cell::is_on_board`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn is_on_board(&self) -> bool {
        (0..BOARD_LENGTH).contains(&self.row) && (0..BOARD_LENGTH).contains(&self.col)
    }

    /// Row 0 and row 7 are the promotion ranks
    pub fn is_last_rank(&self) -> bool {
        self.row == 0 || self.row == BOARD_LENGTH - 1
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PieceKind {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}

impl PieceKind {
    /// Pieces a pawn may promote to, in the order the picker shows them
    pub const PROMOTION_CHOICES: [PieceKind; 4] = [
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PieceKind::Pawn => "Pawn",
            PieceKind::Rook => "Rook",
            PieceKind::Knight => "Knight",
            PieceKind::Bishop => "Bishop",
            PieceKind::Queen => "Queen",
            PieceKind::King => "King",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PieceColor {
    White,
    Black,
}

impl PieceColor {
    pub fn opposite(&self) -> Self {
        match self {
            PieceColor::White => PieceColor::Black,
            PieceColor::Black => PieceColor::White,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PieceColor::White => "White",
            PieceColor::Black => "Black",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: PieceColor,
}

impl Piece {
    pub const fn new(kind: PieceKind, color: PieceColor) -> Self {
        Self { kind, color }
    }
}

/// Checkerboard tint of a square, independent of the piece standing on it
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SquareTint {
    Light,
    Dark,
}

impl SquareTint {
    pub fn of(cell: Cell) -> Self {
        if (cell.row + cell.col) % 2 == 0 {
            SquareTint::Light
        } else {
            SquareTint::Dark
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Square {
    pub cell: Cell,
    pub piece: Option<Piece>,
    pub tint: SquareTint,
}

/// Full 8x8 board as last reported by the engine, indexed `[row][col]`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BoardSnapshot {
    squares: [[Square; 8]; 8],
}

impl BoardSnapshot {
    /// Build a snapshot by asking `piece_at` for every cell
    pub fn from_fn(mut piece_at: impl FnMut(Cell) -> Option<Piece>) -> Self {
        let squares = std::array::from_fn(|row| {
            std::array::from_fn(|col| {
                let cell = Cell::new(row as i32, col as i32);
                Square {
                    cell,
                    piece: piece_at(cell),
                    tint: SquareTint::of(cell),
                }
            })
        });
        Self { squares }
    }

    pub fn empty() -> Self {
        Self::from_fn(|_| None)
    }

    /// Square at `cell`, or `None` for cells outside the board
    pub fn square(&self, cell: Cell) -> Option<&Square> {
        if !cell.is_on_board() {
            return None;
        }
        Some(&self.squares[cell.row as usize][cell.col as usize])
    }

    pub fn piece_at(&self, cell: Cell) -> Option<Piece> {
        self.square(cell).and_then(|s| s.piece)
    }

    /// All squares in row-major order
    pub fn squares(&self) -> impl Iterator<Item = &Square> {
        self.squares.iter().flat_map(|row| row.iter())
    }
}

impl Default for BoardSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Move {
    pub start: Cell,
    pub end: Cell,
}

impl Move {
    /// Wire value engines use for "no move has been played yet"
    pub const NONE_SENTINEL: Move = Move {
        start: Cell::new(-1, -1),
        end: Cell::new(-1, -1),
    };

    pub const fn new(start: Cell, end: Cell) -> Self {
        Self { start, end }
    }

    /// Map the sentinel to `None`
    pub fn from_reported(reported: Move) -> Option<Move> {
        (reported != Move::NONE_SENTINEL).then_some(reported)
    }

    pub fn touches(&self, cell: Cell) -> bool {
        self.start == cell || self.end == cell
    }
}

/// Game status string as published by the engine.
///
/// An empty string means the game is still in progress.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct GameStatus(String);

impl GameStatus {
    pub const NEW_GAME: &'static str = "New Game";

    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn in_progress() -> Self {
        Self(String::new())
    }

    pub fn is_in_progress(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Convert engine cell to shakmaty Square (row 0 = rank 8, row 7 = rank 1)
pub fn to_square(cell: Cell) -> SSquare {
    let file = File::new(cell.col as u32);
    let rank = Rank::new((BOARD_LENGTH - 1 - cell.row) as u32);
    SSquare::from_coords(file, rank)
}

/// Convert shakmaty Square back to an engine cell
pub fn from_square(square: SSquare) -> Cell {
    let row = BOARD_LENGTH - 1 - u32::from(square.rank()) as i32;
    let col = u32::from(square.file()) as i32;
    Cell::new(row, col)
}

pub fn role_to_kind(role: Role) -> PieceKind {
    match role {
        Role::Pawn => PieceKind::Pawn,
        Role::Knight => PieceKind::Knight,
        Role::Bishop => PieceKind::Bishop,
        Role::Rook => PieceKind::Rook,
        Role::Queen => PieceKind::Queen,
        Role::King => PieceKind::King,
    }
}

pub fn kind_to_role(kind: PieceKind) -> Role {
    match kind {
        PieceKind::Pawn => Role::Pawn,
        PieceKind::Knight => Role::Knight,
        PieceKind::Bishop => Role::Bishop,
        PieceKind::Rook => Role::Rook,
        PieceKind::Queen => Role::Queen,
        PieceKind::King => Role::King,
    }
}

pub fn from_shakmaty_color(color: SColor) -> PieceColor {
    match color {
        SColor::White => PieceColor::White,
        SColor::Black => PieceColor::Black,
    }
}

/// Convert shakmaty piece to our domain Piece
pub fn shakmaty_to_piece(piece: shakmaty::Piece) -> Piece {
    Piece::new(role_to_kind(piece.role), from_shakmaty_color(piece.color))
}
