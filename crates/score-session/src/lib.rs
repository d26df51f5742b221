//! Scoring session lifecycle.
//!
//! - `SelectingScheme` → `Answering` on [`Session::select_scheme`]
//! - `Answering` → `Computed` on [`Session::submit`] once nothing required is
//!   missing
//! - `Computed` → `Computed` on [`Session::rescore`]
//! - `Answering`/`Computed` → `Answering` on [`Session::reset`], keeping the
//!   scheme
//! - `Answering`/`Computed` → `SelectingScheme` on [`Session::reselect`]
//! - any state → `Terminated` on [`Session::terminate`]; every later action
//!   fails with `SessionClosed`
//!
//! A session is single-owner; every transition takes `&mut self` and an
//! action that is not valid in the current state fails without changing it.

#![deny(unsafe_code)]

mod clock;
mod history;
mod session;
mod state;

pub use clock::{Clock, FixedClock, SystemClock};
pub use history::{HistoryEntry, HistorySink, MemoryHistory, SinkError};
pub use session::Session;
pub use state::SessionState;
