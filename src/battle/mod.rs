//! The battle context and its presentation collaborator.
//!
//! - `Battle`: state, effect containers, registry, data, presenter and RNG
//!   for one battle, passed explicitly to every mediator and hook
//! - `Presenter`: indicator, message and animation requests
//! - turn boundaries: `begin_action`, `end_of_turn`, `flee`

mod context;
mod presenter;
mod turn;

pub use context::Battle;
pub use presenter::{NullPresenter, PresentationCall, Presenter, RecordingPresenter};
