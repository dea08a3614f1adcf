//! Location-gated invocation scheduler.
//!
//! Turns a stream of location samples into gated, mode-aware calls to a
//! [`SearchProvider`](nearby_core::SearchProvider) and hands the mapped results
//! to a [`ResultSink`].
//!
//! ```text
//! Disabled ──enable──▶ Armed ──sample──▶ gate ──accepted──▶ Invoking ──▶ deliver / report
//!    ▲                   ▲                 │ rejected                        │
//!    │                   └─── Scheduled ───┴─────────────────────────────────┤
//!    └────────────────────── OneShot ─────────────────────────────────────────┘
//! ```

mod error;
mod event;
mod handle;
mod ports;
mod scheduler;
mod settings;
mod state;

pub use error::SchedulerError;
pub use handle::SchedulerHandle;
pub use ports::{ArmRequest, LocationSource, ResultSink, SampleSender};
pub use scheduler::InvocationScheduler;
pub use settings::{SchedulerSettings, DEFAULT_DURATION_SECS, DEFAULT_INTERVAL_SECS};
pub use state::{Mode, Phase, SchedulerStatus};
