//! Spread application and position accounting.
//!
//! Widens a fill price against the taker and folds one fill into the
//! account: cash, signed position, weighted-average entry price, and
//! realized P&L.

use super::types::{AccountState, MicroQty, Side};

/// `offset_ticks = ceil(|price_tick| * spread_bps / 10000)`, always >= 0.
///
/// Ceiling is applied so any non-zero fractional offset rounds away from
/// zero. The market never gets tightened by accident.
pub(crate) fn spread_offset_ticks(price_tick: i64, spread_bps: f64) -> i64 {
    let s = spread_bps / 10_000.0;
    (price_tick.unsigned_abs() as f64 * s).ceil() as i64
}

/// Widen `price_tick` symmetrically against the taker: buys pay more, sells
/// receive less.
pub(crate) fn apply_spread(side: Side, price_tick: i64, spread_bps: f64) -> i64 {
    let offset = spread_offset_ticks(price_tick, spread_bps);
    match side {
        Side::Buy => price_tick + offset,
        Side::Sell => price_tick - offset,
    }
}

/// Execute one fill against the account: update cash, position, weighted
/// average entry price, and realized P&L. Infallible. Once an order is
/// accepted its fill cannot fail.
pub(crate) fn execute_fill(
    account: &mut AccountState,
    side: Side,
    fill_qty: MicroQty,
    fill_tick: i64,
    tick_size: f64,
    taker_fee_bps: f64,
) {
    let q = fill_qty.to_real();
    let p = fill_tick as f64 * tick_size;
    let notional = p * q;
    let fee = notional * (taker_fee_bps / 10_000.0);

    match side {
        Side::Buy => account.cash -= notional + fee,
        Side::Sell => account.cash += notional - fee,
    }

    let delta = match side {
        Side::Buy => fill_qty,
        Side::Sell => -fill_qty,
    };
    let old = account.position;
    let new = old + delta;

    if old.is_zero() {
        // Opening.
        account.avg_entry_price_tick = fill_tick as f64;
    } else if old.signum() == delta.signum() {
        // Adding: weighted average in tick units, keyed by micro-unit qty.
        let old_w = old.raw() as f64;
        let delta_w = delta.raw() as f64;
        let new_w = new.raw() as f64;
        account.avg_entry_price_tick =
            (old_w * account.avg_entry_price_tick + delta_w * fill_tick as f64) / new_w;
    } else if delta.abs().raw() <= old.abs().raw() {
        // Reducing (possibly to flat).
        realize(account, old, fill_qty, fill_tick, tick_size);
        if new.is_zero() {
            account.avg_entry_price_tick = 0.0;
        }
    } else {
        // Flipping: fully reduce |old|, then open the residual at fill_tick.
        realize(account, old, old.abs(), fill_tick, tick_size);
        account.avg_entry_price_tick = fill_tick as f64;
    }

    account.position = new;
}

/// Realize gross P&L on reducing `r` (micro-units, <= |old|) of the existing
/// position `old` at `fill_tick`. Does not touch `avg_entry_price_tick` or
/// `position`; callers update those themselves (the flip case reuses this
/// for the reduction half only).
fn realize(account: &mut AccountState, old: MicroQty, r: MicroQty, fill_tick: i64, tick_size: f64) {
    let r_real = r.to_real();
    let exit_value = r_real * fill_tick as f64 * tick_size;
    let entry_value = r_real * account.avg_entry_price_tick * tick_size;
    account.realized_pnl += if old.raw() > 0 {
        exit_value - entry_value
    } else {
        entry_value - exit_value
    };
}
