//! The execution kernel: handle lifecycle, order book, tick stepping, and
//! snapshot computation.

mod fill;
mod types;

pub use types::{Config, NewOrder, OrderKind, Side, Snapshot, Tick};

use crate::error::KernelError;
use fill::{apply_spread, execute_fill};
use types::{AccountState, MicroQty, Order};

/// Default open-order capacity. A different bound can be chosen at
/// construction; this default keeps the set a plain inline `Vec` without
/// needing a growth policy for the expected workload.
pub const DEFAULT_ORDER_CAPACITY: usize = 1024;

/// The stateful handle driving one backtest run.
///
/// Owns its configuration, account state, and open-order set exclusively.
/// Orders and ticks passed in are copied at acceptance; the caller retains
/// no aliasing. Single-threaded and non-suspending: callers must not invoke
/// two operations on the same `Kernel` concurrently, but distinct `Kernel`s
/// are fully independent.
#[derive(Debug, Clone)]
pub struct Kernel {
    config: Config,
    account: AccountState,
    orders: Vec<Order>,
    capacity: usize,
}

impl Kernel {
    /// Create a new handle with the reference open-order capacity
    /// ([`DEFAULT_ORDER_CAPACITY`]). Fails with [`KernelError::InvalidConfig`]
    /// if `tick_size <= 0` or any fee/spread/cash field is non-finite.
    pub fn new(config: Config) -> Result<Self, KernelError> {
        Self::with_capacity(config, DEFAULT_ORDER_CAPACITY)
    }

    /// Create a new handle with an explicit open-order capacity bound.
    pub fn with_capacity(config: Config, capacity: usize) -> Result<Self, KernelError> {
        config.validate()?;
        Ok(Kernel {
            account: AccountState::new(config.initial_cash),
            config,
            orders: Vec::with_capacity(capacity.min(4096)),
            capacity,
        })
    }

    /// Restore the initial account state and clear the open-order set,
    /// preserving configuration.
    pub fn reset(&mut self) {
        self.account = AccountState::new(self.config.initial_cash);
        self.orders.clear();
    }

    /// Consume the handle, releasing its resources. Ordinary ownership
    /// already makes use-after-destroy a compile error; this method exists
    /// so callers have an explicit name for ending a handle's lifetime.
    pub fn destroy(self) {
        drop(self);
    }

    /// Number of currently live orders.
    pub fn live_order_count(&self) -> usize {
        self.orders.iter().filter(|o| o.active).count()
    }

    /// Place a new order. Becomes eligible for fills starting at the next
    /// `step_tick`/`step_batch` call.
    pub fn place_order(&mut self, order: NewOrder) -> Result<(), KernelError> {
        if order.qty <= 0.0 || !order.qty.is_finite() {
            return Err(KernelError::InvalidOrder);
        }
        if matches!(order.kind, OrderKind::Limit) && order.price_tick <= 0 {
            return Err(KernelError::InvalidOrder);
        }
        if self.orders.iter().any(|o| o.active && o.order_id == order.order_id) {
            return Err(KernelError::DuplicateId(order.order_id));
        }
        if self.live_order_count() >= self.capacity {
            return Err(KernelError::OrderBookFull(self.capacity));
        }

        self.orders.push(Order {
            order_id: order.order_id,
            kind: order.kind,
            side: order.side,
            qty: MicroQty::from_real(order.qty),
            price_tick: order.price_tick,
            active: true,
        });
        Ok(())
    }

    /// Mark a live order inactive. Compaction of the open-order set is
    /// deferred to the next tick step.
    pub fn cancel_order(&mut self, order_id: u64) -> Result<(), KernelError> {
        match self.orders.iter_mut().find(|o| o.active && o.order_id == order_id) {
            Some(o) => {
                o.active = false;
                Ok(())
            }
            None => Err(KernelError::NotFound(order_id)),
        }
    }

    /// Advance simulated time by one tick: record time/price, fill every
    /// eligible open order in insertion order, then compact the open-order
    /// set.
    pub fn step_tick(&mut self, tick: Tick) -> Result<(), KernelError> {
        if !tick.qty.is_finite() {
            return Err(KernelError::InvalidTick);
        }

        self.account.current_ts_ms = tick.ts_ms;
        self.account.last_tick_price = tick.price_tick;

        // Two-phase: decide eligibility against the tick's own price first,
        // then apply fills in insertion order. An earlier fill's effect on
        // `avg_entry_price`/position sign is visible to later fills in the
        // same tick, but no order's fill decision depends on a sibling's
        // fill.
        for i in 0..self.orders.len() {
            if !self.orders[i].active {
                continue;
            }
            let order = self.orders[i];
            if !fills(&order, tick.price_tick) {
                continue;
            }

            let base_tick = match order.kind {
                OrderKind::Market => tick.price_tick,
                OrderKind::Limit => order.price_tick,
            };
            let fill_tick = apply_spread(order.side, base_tick, self.config.spread_bps);

            execute_fill(
                &mut self.account,
                order.side,
                order.qty,
                fill_tick,
                self.config.tick_size,
                self.config.taker_fee_bps,
            );

            self.orders[i].active = false;
        }

        self.orders.retain(|o| o.active);
        Ok(())
    }

    /// Apply many ticks in one call, exactly equivalent to invoking
    /// `step_tick` on each in order.
    pub fn step_batch(&mut self, ticks: &[Tick]) -> Result<(), KernelError> {
        for &tick in ticks {
            self.step_tick(tick)?;
        }
        Ok(())
    }

    /// Compute the current reconciled account snapshot.
    pub fn snapshot(&self) -> Snapshot {
        let position_real = self.account.position.to_real();
        let unrealized_pnl = if self.account.position.is_zero() {
            0.0
        } else {
            position_real * self.account.last_tick_price as f64 * self.config.tick_size
                - position_real * self.account.avg_entry_price_tick * self.config.tick_size
        };

        Snapshot {
            ts_ms: self.account.current_ts_ms,
            cash: self.account.cash,
            position: position_real,
            avg_entry_price: self.account.avg_entry_price_tick,
            realized_pnl: self.account.realized_pnl,
            unrealized_pnl,
            equity: self.account.cash + unrealized_pnl,
        }
    }
}

/// Fill eligibility at `tick_price`.
fn fills(order: &Order, tick_price: i64) -> bool {
    match (order.kind, order.side) {
        (OrderKind::Market, _) => true,
        (OrderKind::Limit, Side::Buy) => tick_price <= order.price_tick,
        (OrderKind::Limit, Side::Sell) => tick_price >= order.price_tick,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> Config {
        Config {
            maker_fee_bps: 0.0,
            taker_fee_bps: 0.0,
            spread_bps: 0.0,
            initial_cash: 100_000.0,
            tick_size: 1.0,
        }
    }

    #[test]
    fn new_rejects_bad_config() {
        let mut bad = cfg();
        bad.tick_size = 0.0;
        assert_eq!(Kernel::new(bad).unwrap_err(), KernelError::InvalidConfig);

        let mut bad = cfg();
        bad.initial_cash = f64::NAN;
        assert_eq!(Kernel::new(bad).unwrap_err(), KernelError::InvalidConfig);
    }

    #[test]
    fn place_order_validates() {
        let mut k = Kernel::new(cfg()).unwrap();
        assert_eq!(
            k.place_order(NewOrder {
                order_id: 1,
                kind: OrderKind::Market,
                side: Side::Buy,
                qty: 0.0,
                price_tick: 0,
            }),
            Err(KernelError::InvalidOrder)
        );
        assert_eq!(
            k.place_order(NewOrder {
                order_id: 1,
                kind: OrderKind::Limit,
                side: Side::Buy,
                qty: 1.0,
                price_tick: 0,
            }),
            Err(KernelError::InvalidOrder)
        );
    }

    #[test]
    fn duplicate_id_rejected() {
        let mut k = Kernel::new(cfg()).unwrap();
        let order = NewOrder {
            order_id: 1,
            kind: OrderKind::Market,
            side: Side::Buy,
            qty: 1.0,
            price_tick: 0,
        };
        k.place_order(order).unwrap();
        assert_eq!(k.place_order(order), Err(KernelError::DuplicateId(1)));
    }

    #[test]
    fn capacity_is_enforced() {
        let mut k = Kernel::with_capacity(cfg(), 2).unwrap();
        for id in 0..2 {
            k.place_order(NewOrder {
                order_id: id,
                kind: OrderKind::Limit,
                side: Side::Buy,
                qty: 1.0,
                price_tick: 10,
            })
            .unwrap();
        }
        assert_eq!(
            k.place_order(NewOrder {
                order_id: 99,
                kind: OrderKind::Limit,
                side: Side::Buy,
                qty: 1.0,
                price_tick: 10,
            }),
            Err(KernelError::OrderBookFull(2))
        );
    }

    #[test]
    fn cancel_unknown_order_not_found() {
        let mut k = Kernel::new(cfg()).unwrap();
        assert_eq!(k.cancel_order(42), Err(KernelError::NotFound(42)));
    }

    #[test]
    fn reset_restores_initial_state_keeps_config() {
        let mut k = Kernel::new(cfg()).unwrap();
        k.place_order(NewOrder {
            order_id: 1,
            kind: OrderKind::Market,
            side: Side::Buy,
            qty: 1.0,
            price_tick: 0,
        })
        .unwrap();
        k.step_tick(Tick {
            ts_ms: 1,
            price_tick: 100,
            qty: 1.0,
            side: Side::Buy,
        })
        .unwrap();
        k.reset();
        let snap = k.snapshot();
        assert_eq!(snap.cash, 100_000.0);
        assert_eq!(snap.position, 0.0);
        assert_eq!(k.live_order_count(), 0);
    }

    #[test]
    fn limit_order_triggers_exactly_at_cross() {
        let mut k = Kernel::new(cfg()).unwrap();
        k.place_order(NewOrder {
            order_id: 1,
            kind: OrderKind::Limit,
            side: Side::Buy,
            qty: 1.0,
            price_tick: 100,
        })
        .unwrap();

        k.step_tick(Tick { ts_ms: 1, price_tick: 101, qty: 1.0, side: Side::Buy })
            .unwrap();
        assert_eq!(k.live_order_count(), 1);
        assert_eq!(k.snapshot().position, 0.0);

        k.step_tick(Tick { ts_ms: 2, price_tick: 100, qty: 1.0, side: Side::Buy })
            .unwrap();
        assert_eq!(k.live_order_count(), 0);
        assert_eq!(k.snapshot().position, 1.0);

        // Order is gone; nothing further happens even though price keeps moving.
        k.step_tick(Tick { ts_ms: 3, price_tick: 99, qty: 1.0, side: Side::Buy })
            .unwrap();
        assert_eq!(k.snapshot().position, 1.0);
    }
}
