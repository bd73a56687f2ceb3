//! Domain layer: board types, coordinate transform, engine contract and the
//! UCI protocol. Nothing here depends on GPUI.

pub mod chess;
pub mod engine;
pub mod transform;
pub mod uci;
