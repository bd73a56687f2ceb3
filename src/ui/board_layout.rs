//! Board layout calculations - turns the measured panel into board geometry.

use gpui::{Bounds, Pixels, point, px, size};

use crate::controller::Geometry;
use crate::domain::transform::Rect;
use crate::ui::theme::{BOARD_PADDING, INITIAL_LEFT_PANEL};

/// Smallest square the board shrinks to
pub const MIN_SQUARE_SIZE: f32 = 30.0;

/// Handles all layout calculations for the chess board
#[derive(Clone, Copy, Debug)]
pub struct BoardLayout {
    /// Board panel bounds in window coordinates
    pub panel_bounds: Bounds<Pixels>,
}

impl BoardLayout {
    pub fn new(panel_bounds: Bounds<Pixels>) -> Self {
        Self { panel_bounds }
    }

    /// Calculate square size from measured panel dimensions
    pub fn square_size(&self) -> f32 {
        let panel_width: f32 = self.panel_bounds.size.width.into();
        let panel_height: f32 = self.panel_bounds.size.height.into();
        let available_width = panel_width - BOARD_PADDING * 2.0;
        let available_height = panel_height - BOARD_PADDING * 2.0;
        (available_width.min(available_height) / 8.0).max(MIN_SQUARE_SIZE)
    }

    /// Get the total size of the board (8 squares)
    pub fn board_total_size(&self) -> f32 {
        self.square_size() * 8.0
    }

    /// Board drawing surface in window coordinates, inset by the padding
    pub fn geometry(&self) -> Geometry {
        let left: f32 = self.panel_bounds.origin.x.into();
        let top: f32 = self.panel_bounds.origin.y.into();
        let board = self.board_total_size();
        Geometry {
            surface: Rect::new(left + BOARD_PADDING, top + BOARD_PADDING, board, board),
            square_size: self.square_size(),
        }
    }
}

impl Default for BoardLayout {
    fn default() -> Self {
        Self::new(Bounds {
            origin: point(px(0.0), px(0.0)),
            size: size(px(INITIAL_LEFT_PANEL), px(600.0)),
        })
    }
}
