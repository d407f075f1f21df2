//! Deterministic execution kernel for a single-instrument market backtester.
//!
//! Consumes a stream of market tick events and open-order instructions and
//! produces, at every step, a fully reconciled account snapshot: cash,
//! position, average entry price, realized and unrealized profit-and-loss,
//! and equity. This is the numeric core a strategy layer drives to simulate
//! the monetary consequences of trading decisions against historical data.
//!
//! Deliberately out of scope (external collaborators): ingestion of raw
//! trade/aggregate data, tick-size inference, bucketing of trades into
//! ticks, configuration-file parsing, command-line handling, persistence,
//! reporting/visualization, and file I/O of any kind. The kernel reads no
//! files, writes no files, and performs no logging.

mod error;
mod kernel;

pub use error::KernelError;
pub use kernel::{
    Config, Kernel, NewOrder, OrderKind, Side, Snapshot, Tick, DEFAULT_ORDER_CAPACITY,
};
