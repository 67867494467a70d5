//! Match tuning constants and field geometry.
//!
//! Every constant the tick uses lives in [`MatchConfig`]. Fractional
//! constants are stored in permille so the struct stays integer-only and
//! reads naturally in RON; accessors convert to [`Fixed`] on demand.
//!
//! # Example
//!
//! ```
//! use beetle_core::config::MatchConfig;
//!
//! let config = MatchConfig::from_ron("match.ron", "(knockout_ticks: 120)").unwrap();
//! assert_eq!(config.knockout_ticks, 120);
//! assert_eq!(config.width, 800);
//! ```

use serde::{Deserialize, Serialize};

use crate::agent::Team;
use crate::error::{GameError, Result};
use crate::math::{ratio, Fixed, Vec2Fixed};

/// Largest field side, and largest value of any distance constant.
///
/// Keeps the squared diagonal of the field inside the `Fixed` range.
pub const MAX_FIELD_SIDE: u32 = 30_000;

/// Largest value of any permille constant.
pub const MAX_PERMILLE: u32 = 1_000_000;

/// Largest starting quantity of a pool.
pub const MAX_INITIAL_NECTAR: u32 = 1_000_000;

/// Tuning constants for a single match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Field width.
    pub width: u32,
    /// Field height.
    pub height: u32,
    /// Horizontal position of the first pool, permille of width.
    pub first_pool_x_permille: u32,
    /// Horizontal position of the second pool, permille of width.
    pub second_pool_x_permille: u32,
    /// Visual radius of a nectar pool.
    pub pool_radius: u32,
    /// Extra distance beyond the pool radius at which collection fires.
    pub approach_margin: u32,
    /// Nectar each pool starts with.
    pub initial_nectar: u32,
    /// Distance of each goal from its team's own field edge.
    pub goal_offset: u32,
    /// Radius around the goal inside which carried nectar is delivered.
    pub delivery_radius: u32,
    /// Radius around the home goal that classifies a command as "deliver".
    pub goal_click_radius: u32,
    /// Distance at which a manual move counts as arrived.
    pub arrival_threshold: u32,
    /// Extra reach added to the sum of radii for combat.
    pub combat_range_bonus: u32,
    /// Damage scale per tick, permille.
    pub damage_multiplier_permille: u32,
    /// Ticks an agent stays knocked out.
    pub knockout_ticks: u32,
    /// Health regenerated per tick, permille.
    pub regen_permille: u32,
    /// Extra spacing added to the sum of radii for separation.
    pub overlap_padding: u32,
    /// Fraction of overlap depth corrected per tick, permille.
    pub push_strength_permille: u32,
    /// Velocity retained after each integration step, permille.
    pub damping_permille: u32,
    /// Minimum per-axis speed that updates facing, permille.
    pub facing_threshold_permille: u32,
    /// Inset of respawn corners from the field edges.
    pub respawn_inset: u32,
    /// Depth of the band agents spawn in.
    pub spawn_band_depth: u32,
    /// Distance of the spawn band from the team's own edge.
    pub spawn_band_offset: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            first_pool_x_permille: 250,
            second_pool_x_permille: 750,
            pool_radius: 60,
            approach_margin: 20,
            initial_nectar: 150,
            goal_offset: 50,
            delivery_radius: 50,
            goal_click_radius: 70,
            arrival_threshold: 10,
            combat_range_bonus: 10,
            damage_multiplier_permille: 100,
            knockout_ticks: 300,
            regen_permille: 50,
            overlap_padding: 5,
            push_strength_permille: 300,
            damping_permille: 900,
            facing_threshold_permille: 100,
            respawn_inset: 50,
            spawn_band_depth: 100,
            spawn_band_offset: 50,
        }
    }
}

impl MatchConfig {
    /// Parse a config from RON. Missing fields take their defaults.
    pub fn from_ron(source_name: &str, text: &str) -> Result<Self> {
        let config: Self = ron::from_str(text).map_err(|e| GameError::DataParseError {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the field is usable.
    ///
    /// Every distance is capped at [`MAX_FIELD_SIDE`] and every permille
    /// constant at [`MAX_PERMILLE`], so fixed-point distances and products
    /// stay in range.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(GameError::InvalidConfig(format!(
                "field dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width > MAX_FIELD_SIDE || self.height > MAX_FIELD_SIDE {
            return Err(GameError::InvalidConfig(format!(
                "field sides are limited to {MAX_FIELD_SIDE}, got {}x{}",
                self.width, self.height
            )));
        }
        for (name, value) in self.distances() {
            if value > MAX_FIELD_SIDE {
                return Err(GameError::InvalidConfig(format!(
                    "{name} is limited to {MAX_FIELD_SIDE}, got {value}"
                )));
            }
        }
        for (name, value) in self.permilles() {
            if value > MAX_PERMILLE {
                return Err(GameError::InvalidConfig(format!(
                    "{name} is limited to {MAX_PERMILLE} permille, got {value}"
                )));
            }
        }
        if self.first_pool_x_permille > 1000 || self.second_pool_x_permille > 1000 {
            return Err(GameError::InvalidConfig(
                "pool positions must lie inside the field".into(),
            ));
        }
        if self.damping_permille > 1000 || self.push_strength_permille > 1000 {
            return Err(GameError::InvalidConfig(
                "velocity damping and push strength cannot exceed 1".into(),
            ));
        }
        if self.initial_nectar > MAX_INITIAL_NECTAR {
            return Err(GameError::InvalidConfig(format!(
                "initial nectar is limited to {MAX_INITIAL_NECTAR}, got {}",
                self.initial_nectar
            )));
        }
        if self.goal_offset > self.height / 2 || self.respawn_inset > self.width.min(self.height) / 2
        {
            return Err(GameError::InvalidConfig(
                "goal offset and respawn inset must fit the field".into(),
            ));
        }
        Ok(())
    }

    /// Check that agents up to `max_radius` fit between the field edges.
    pub fn validate_radius(&self, max_radius: Fixed) -> Result<()> {
        let diameter = max_radius.saturating_mul(Fixed::from_num(2));
        if Fixed::from_num(self.width.min(self.height)) < diameter {
            return Err(GameError::InvalidConfig(format!(
                "a {}x{} field cannot hold an agent of radius {max_radius}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    fn distances(&self) -> [(&'static str, u32); 10] {
        [
            ("pool_radius", self.pool_radius),
            ("approach_margin", self.approach_margin),
            ("goal_offset", self.goal_offset),
            ("delivery_radius", self.delivery_radius),
            ("goal_click_radius", self.goal_click_radius),
            ("arrival_threshold", self.arrival_threshold),
            ("combat_range_bonus", self.combat_range_bonus),
            ("overlap_padding", self.overlap_padding),
            ("spawn_band_depth", self.spawn_band_depth),
            ("spawn_band_offset", self.spawn_band_offset),
        ]
    }

    fn permilles(&self) -> [(&'static str, u32); 7] {
        [
            ("first_pool_x_permille", self.first_pool_x_permille),
            ("second_pool_x_permille", self.second_pool_x_permille),
            ("damage_multiplier_permille", self.damage_multiplier_permille),
            ("regen_permille", self.regen_permille),
            ("push_strength_permille", self.push_strength_permille),
            ("damping_permille", self.damping_permille),
            ("facing_threshold_permille", self.facing_threshold_permille),
        ]
    }

    /// Damage scale per tick.
    #[must_use]
    pub fn damage_multiplier(&self) -> Fixed {
        permille(self.damage_multiplier_permille)
    }

    /// Health regenerated per tick.
    #[must_use]
    pub fn regen_per_tick(&self) -> Fixed {
        permille(self.regen_permille)
    }

    /// Fraction of overlap corrected per tick.
    #[must_use]
    pub fn push_strength(&self) -> Fixed {
        permille(self.push_strength_permille)
    }

    /// Velocity retained per tick.
    #[must_use]
    pub fn damping(&self) -> Fixed {
        permille(self.damping_permille)
    }

    /// Minimum per-axis speed that updates facing.
    #[must_use]
    pub fn facing_threshold(&self) -> Fixed {
        permille(self.facing_threshold_permille)
    }

    /// Distance from a pool centre at which collection fires.
    #[must_use]
    pub fn collect_radius(&self) -> Fixed {
        Fixed::from_num(self.pool_radius + self.approach_margin)
    }

    /// Derived positions for this config.
    #[must_use]
    pub fn layout(&self) -> FieldLayout {
        FieldLayout::new(self)
    }
}

fn permille(value: u32) -> Fixed {
    ratio(i32::try_from(value).unwrap_or(i32::MAX), 1000)
}

/// Fixed positions derived from a [`MatchConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLayout {
    /// Field width.
    pub width: Fixed,
    /// Field height.
    pub height: Fixed,
    /// Centre of the first pool.
    pub first_pool: Vec2Fixed,
    /// Centre of the second pool.
    pub second_pool: Vec2Fixed,
    inset: Fixed,
    goal_offset: Fixed,
}

impl FieldLayout {
    fn new(config: &MatchConfig) -> Self {
        let width = Fixed::from_num(config.width);
        let height = Fixed::from_num(config.height);
        let mid_y = height / Fixed::from_num(2);
        Self {
            width,
            height,
            first_pool: Vec2Fixed::new(width * permille(config.first_pool_x_permille), mid_y),
            second_pool: Vec2Fixed::new(width * permille(config.second_pool_x_permille), mid_y),
            inset: Fixed::from_num(config.respawn_inset),
            goal_offset: Fixed::from_num(config.goal_offset),
        }
    }

    /// Delivery point for a team: centred horizontally, near its own edge.
    ///
    /// Team A defends the bottom edge and team B the top.
    #[must_use]
    pub fn goal(&self, team: Team) -> Vec2Fixed {
        let x = self.width / Fixed::from_num(2);
        match team {
            Team::A => Vec2Fixed::new(x, self.height - self.goal_offset),
            Team::B => Vec2Fixed::new(x, self.goal_offset),
        }
    }

    /// The two respawn corners on a team's own half.
    #[must_use]
    pub fn respawn_corners(&self, team: Team) -> [Vec2Fixed; 2] {
        let left = self.inset;
        let right = self.width - self.inset;
        let y = match team {
            Team::A => self.height - self.inset,
            Team::B => self.inset,
        };
        [Vec2Fixed::new(left, y), Vec2Fixed::new(right, y)]
    }

    /// Clamp bounds for an agent of the given radius.
    #[must_use]
    pub fn bounds(&self, radius: Fixed) -> (Vec2Fixed, Vec2Fixed) {
        (
            Vec2Fixed::new(radius, radius),
            Vec2Fixed::new(self.width - radius, self.height - radius),
        )
    }
}
