//! Theme constants and colors for the chess UI.

// Layout constants
pub const BOARD_PADDING: f32 = 20.0;

// Initial panel sizes
pub const INITIAL_LEFT_PANEL: f32 = 600.0;
pub const INITIAL_RIGHT_PANEL: f32 = 260.0;

// Panel colors
pub const PANEL_BG: u32 = 0x2a2a2a;
pub const SIDE_PANEL_BG: u32 = 0x1e1e1e;
pub const BORDER_COLOR: u32 = 0x4a4a4a;
pub const TEXT_PRIMARY: u32 = 0xffffff;
pub const TEXT_SECONDARY: u32 = 0x888888;
pub const PICKER_BG: u32 = 0x3a3a3a;
