//! Error taxonomy for the execution kernel.
//!
//! Flat and recoverable. Every operation is total: it either succeeds and
//! mutates state, or fails and leaves state unchanged. There are no partial
//! successes and no fatal errors. A `Kernel` remains usable after any
//! failure.

use thiserror::Error;

/// A single failure mode of a kernel operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum KernelError {
    /// `tick_size <= 0`, or a fee/spread/cash field is not finite.
    #[error("invalid config: tick_size must be positive and all fees/spread/cash must be finite")]
    InvalidConfig,

    /// `qty <= 0`, a limit order with `price_tick <= 0`, or an unknown kind.
    #[error("invalid order: qty must be positive and limit orders require a positive price_tick")]
    InvalidOrder,

    /// An order with this id is already live.
    #[error("order id {0} is already live")]
    DuplicateId(u64),

    /// The open-order set is at capacity.
    #[error("order book is full (capacity {0})")]
    OrderBookFull(usize),

    /// No live order has this id.
    #[error("no live order with id {0}")]
    NotFound(u64),

    /// A tick carries a non-finite quantity.
    #[error("invalid tick: qty must be finite")]
    InvalidTick,

    /// `step_batch` arrays differ in length.
    #[error("batch arrays have mismatched lengths")]
    LengthMismatch,
}
