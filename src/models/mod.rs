pub mod engine;
pub mod game;
pub mod local_engine;

pub use engine::UciEngine;
pub use game::{GameModel, PromotionPrompt};
pub use local_engine::LocalEngine;
