//! The effect object model.
//!
//! Effects are standing rules (abilities, held items, status conditions,
//! side and field conditions) that observe and intercept battle-state
//! transitions:
//! - `Effect`: the hook contract, every hook defaulting to abstain
//! - `EffectInstance`: a behavior bound to an owner with its countdown
//! - `EffectContainer` / `EffectStore`: ordered per-owner storage
//! - `dispatch`: the one fold all mediators share
//! - `EffectRegistry`: identifier to constructor lookup
//!
//! ## Hook results
//!
//! Every hook answers with [`HookResult`]: abstain, veto (with presentation
//! cues), or override the value under consideration. The contract is the
//! same for every hook so [`dispatch`] serves all of them.

mod container;
mod dispatch;
mod effect;
mod hook;
mod id;
mod registry;
mod store;

pub use container::{AddOutcome, EffectContainer};
pub use dispatch::{dispatch, Dispatch};
pub use effect::{Effect, EffectHandle, EffectInstance, NoOpEffect};
pub use hook::{
    abstain, announced_veto, override_with, veto, veto_with, Cue, Cues, Hook, HookResult, Message,
};
pub use id::EffectId;
pub use registry::{install, installed, Constructor, EffectArgs, EffectRegistry};
pub use store::EffectStore;
