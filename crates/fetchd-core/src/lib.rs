//! fetchd core: bounded-concurrency periodic URL fetching.
//!
//! Sessions (a prefix, a list of suffixes, a concurrency cap and optional
//! timings) are run by the [`scheduler::Scheduler`]; each batch of outcomes
//! lands on one shared result channel.

pub mod config;
pub mod control;
pub mod fetch;
pub mod gate;
pub mod logging;
pub mod scheduler;
pub mod sequential;
pub mod session;
pub mod time_window;

#[cfg(test)]
pub(crate) mod test_support;
