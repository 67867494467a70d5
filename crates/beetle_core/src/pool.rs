//! Nectar pools.
//!
//! Two fixed-position pools hold the match's whole nectar endowment.
//! Quantities are whole units, so a withdrawal can never take more than
//! the pool holds and the conservation check in the tick is exact.

use serde::{Deserialize, Serialize};

use crate::math::Vec2Fixed;

/// Which of the two pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolId {
    /// Left pool.
    First,
    /// Right pool.
    Second,
}

/// A depletable nectar pool at a fixed point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NectarPool {
    /// Pool centre.
    pub position: Vec2Fixed,
    quantity: u32,
}

impl NectarPool {
    /// Create a pool holding `quantity` nectar.
    #[must_use]
    pub const fn new(position: Vec2Fixed, quantity: u32) -> Self {
        Self { position, quantity }
    }

    /// Nectar remaining.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Whether the pool has any nectar.
    #[must_use]
    pub const fn has_stock(&self) -> bool {
        self.quantity > 0
    }

    /// Take up to `max` nectar; returns the amount actually taken.
    pub fn withdraw(&mut self, max: u32) -> u32 {
        let amount = max.min(self.quantity);
        self.quantity -= amount;
        amount
    }

    /// Put nectar back.
    pub fn restore(&mut self, amount: u32) {
        self.quantity = self.quantity.saturating_add(amount);
    }
}

/// The pair of pools in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NectarPools {
    first: NectarPool,
    second: NectarPool,
}

impl NectarPools {
    /// Create both pools with the same initial quantity.
    #[must_use]
    pub const fn new(first: Vec2Fixed, second: Vec2Fixed, quantity: u32) -> Self {
        Self {
            first: NectarPool::new(first, quantity),
            second: NectarPool::new(second, quantity),
        }
    }

    /// Borrow a pool.
    #[must_use]
    pub const fn get(&self, id: PoolId) -> &NectarPool {
        match id {
            PoolId::First => &self.first,
            PoolId::Second => &self.second,
        }
    }

    /// Mutably borrow a pool.
    pub fn get_mut(&mut self, id: PoolId) -> &mut NectarPool {
        match id {
            PoolId::First => &mut self.first,
            PoolId::Second => &mut self.second,
        }
    }

    /// Quantities of both pools, first then second.
    #[must_use]
    pub const fn quantities(&self) -> (u32, u32) {
        (self.first.quantity, self.second.quantity)
    }

    /// Total nectar across both pools.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.first.quantity + self.second.quantity
    }

    /// Nearer pool regardless of stock. Equal distances pick the second.
    #[must_use]
    pub fn nearest(&self, point: Vec2Fixed) -> PoolId {
        let d1 = point.distance_squared(self.first.position);
        let d2 = point.distance_squared(self.second.position);
        if d1 < d2 {
            PoolId::First
        } else {
            PoolId::Second
        }
    }

    /// Nearer pool that still has nectar, if any.
    ///
    /// With both stocked the nearer wins (equal distances pick the second);
    /// with one stocked that one wins.
    #[must_use]
    pub fn nearest_stocked(&self, point: Vec2Fixed) -> Option<PoolId> {
        match (self.first.has_stock(), self.second.has_stock()) {
            (true, true) => Some(self.nearest(point)),
            (true, false) => Some(PoolId::First),
            (false, true) => Some(PoolId::Second),
            (false, false) => None,
        }
    }
}
