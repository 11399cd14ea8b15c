//! Log events and the state machine that consumes them.

pub mod event;
pub mod processor;


pub use event::{Event, PartyRole};
pub use processor::{fast_forward_state, process_event, process_line, process_lines};
