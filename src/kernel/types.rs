//! Numeric primitives and value types for the execution kernel.
//!
//! Prices are integer tick counts (`monetary price = price_tick * tick_size`).
//! Quantities cross the public boundary as `f64` but are stored internally as
//! [`MicroQty`]: signed 64-bit micro-units (real quantity * 1_000_000,
//! truncated toward zero). Position aggregation and equality comparisons are
//! exact integer operations this way, rather than float accumulation.

use crate::error::KernelError;

/// Scale factor between a real quantity and its [`MicroQty`] representation.
pub const MICRO: i64 = 1_000_000;

/// Signed quantity stored in micro-units (real quantity * 1_000_000, truncated).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct MicroQty(i64);

impl MicroQty {
    pub const ZERO: MicroQty = MicroQty(0);

    /// Build from a real, strictly positive quantity (boundary conversion).
    pub fn from_real(qty: f64) -> Self {
        MicroQty((qty * MICRO as f64).trunc() as i64)
    }

    /// Real-valued view, for the public snapshot surface.
    pub fn to_real(self) -> f64 {
        self.0 as f64 / MICRO as f64
    }

    pub fn raw(self) -> i64 {
        self.0
    }

    pub fn from_raw(v: i64) -> Self {
        MicroQty(v)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn signum(self) -> i64 {
        self.0.signum()
    }

    pub fn abs(self) -> Self {
        MicroQty(self.0.abs())
    }
}

impl std::ops::Add for MicroQty {
    type Output = MicroQty;
    fn add(self, rhs: MicroQty) -> MicroQty {
        MicroQty(self.0 + rhs.0)
    }
}

impl std::ops::Sub for MicroQty {
    type Output = MicroQty;
    fn sub(self, rhs: MicroQty) -> MicroQty {
        MicroQty(self.0 - rhs.0)
    }
}

impl std::ops::Neg for MicroQty {
    type Output = MicroQty;
    fn neg(self) -> MicroQty {
        MicroQty(-self.0)
    }
}

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

/// Order kind. Stop and stop-limit orders are not part of this kernel; only
/// limit and market fills are synthesized from tick crossings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKind {
    Limit,
    Market,
}

/// Immutable configuration, set at [`crate::Kernel::new`] and preserved across
/// [`crate::Kernel::reset`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    pub maker_fee_bps: f64,
    pub taker_fee_bps: f64,
    pub spread_bps: f64,
    pub initial_cash: f64,
    pub tick_size: f64,
}

impl Config {
    pub(crate) fn validate(&self) -> Result<(), KernelError> {
        let finite = self.maker_fee_bps.is_finite()
            && self.taker_fee_bps.is_finite()
            && self.spread_bps.is_finite()
            && self.initial_cash.is_finite();
        if self.tick_size > 0.0 && finite {
            Ok(())
        } else {
            Err(KernelError::InvalidConfig)
        }
    }
}

/// A single market observation driving one `step_tick`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub ts_ms: i64,
    pub price_tick: i64,
    pub qty: f64,
    pub side: Side,
}

/// Caller-facing order placement request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewOrder {
    pub order_id: u64,
    pub kind: OrderKind,
    pub side: Side,
    pub qty: f64,
    /// Ignored for `OrderKind::Market`.
    pub price_tick: i64,
}

/// Live order record held in the open-order set.
///
/// `active` defers removal to the next tick's compaction pass instead of
/// removing an order mid-scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Order {
    pub order_id: u64,
    pub kind: OrderKind,
    pub side: Side,
    pub qty: MicroQty,
    pub price_tick: i64,
    pub active: bool,
}

/// Mutable account state, zeroed at construction/reset except `cash`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct AccountState {
    pub current_ts_ms: i64,
    pub cash: f64,
    /// Signed, in micro-units.
    pub position: MicroQty,
    /// In tick units; 0 when `position` is flat (invariant 3).
    pub avg_entry_price_tick: f64,
    pub realized_pnl: f64,
    pub last_tick_price: i64,
}

impl AccountState {
    pub fn new(initial_cash: f64) -> Self {
        AccountState {
            current_ts_ms: 0,
            cash: initial_cash,
            position: MicroQty::ZERO,
            avg_entry_price_tick: 0.0,
            realized_pnl: 0.0,
            last_tick_price: 0,
        }
    }
}

/// Read-only account view returned by [`crate::Kernel::snapshot`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub ts_ms: i64,
    pub cash: f64,
    pub position: f64,
    pub avg_entry_price: f64,
    pub realized_pnl: f64,
    pub unrealized_pnl: f64,
    pub equity: f64,
}
