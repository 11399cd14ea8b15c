pub mod actions;
pub mod api;
pub mod cache;
pub mod context;
pub mod events;
pub mod nicks;
pub mod parser;
pub mod player;
pub mod reader;
pub mod rows;
pub mod settings;
pub mod stars;
pub mod state;
pub mod workers;

#[cfg(test)]
mod test_utils;

// Re-exports for convenience
pub use context::OverlayContext;
pub use events::{Event, PartyRole, fast_forward_state, process_event, process_lines};
pub use player::{KnownPlayer, Player, sort_players};
pub use state::OverlayState;
