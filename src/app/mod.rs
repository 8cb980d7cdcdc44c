mod core;
mod effects;
mod event_bus;
mod event_loop;
mod export_ops;
mod input_ops;
mod job_ops;
mod state;
pub(crate) mod terminal_session;


pub use core::App;
pub use effects::{Effect, EffectQueue};
pub use state::{
    CommittedSearch, JqFocus, JqSession, Mode, ModeKind, SearchHistory, SearchScope,
    SearchSession, StatusState, ViewFlags, ViewerState,
};
