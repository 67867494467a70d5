//! Agent archetype catalog.
//!
//! The catalog is the read-only table of beetle archetypes: base stats,
//! rarity tier, CPU spawn multiplicity, deck cost, purchase price and
//! collision radius. It is constructed once and passed by reference to
//! every consumer; there is no global instance.
//!
//! Archetypes are authored as [`ArchetypeData`] rows (plain integers, easy
//! to write in RON) and converted to fixed-point [`Archetype`] entries when
//! the catalog is built.
//!
//! # Example
//!
//! ```
//! use beetle_core::catalog::{Catalog, Rarity};
//!
//! let catalog = Catalog::builtin();
//! let kanabun = catalog.by_key("kanabun").unwrap();
//! assert_eq!(kanabun.rarity, Rarity::new(1).unwrap());
//! assert_eq!(catalog.tier_members(Rarity::new(6).unwrap()).len(), 2);
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::math::{fixed_serde, ratio, Fixed};

/// Highest rarity tier.
pub const MAX_RARITY: u8 = 6;

/// Largest base health, attack, defense or carry in a catalog row.
pub const MAX_STAT: u32 = 100_000;

/// Largest base speed, hundredths of a unit per tick.
pub const MAX_SPEED_CENTI: u32 = 100_000;

/// Largest collision radius, tenths of a unit.
pub const MAX_RADIUS_DECI: u32 = 100_000;

/// Largest CPU spawn count for one archetype.
pub const MAX_SPAWN_COUNT: u32 = 1_000;

/// Numeric identifier for an archetype.
///
/// Assigned from catalog load order, so it is stable for a given catalog
/// and cheap to copy, hash and compare.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArchetypeId(u16);

impl ArchetypeId {
    /// Create an archetype id from its catalog index.
    #[must_use]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Catalog index of this archetype.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ArchetypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "archetype#{}", self.0)
    }
}

/// Rarity tier, 1 (common) through 6 (rarest).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rarity(u8);

impl TryFrom<u8> for Rarity {
    type Error = GameError;

    fn try_from(tier: u8) -> Result<Self> {
        Self::new(tier).ok_or_else(|| {
            GameError::InvalidConfig(format!("rarity {tier} outside 1..={MAX_RARITY}"))
        })
    }
}

impl From<Rarity> for u8 {
    fn from(rarity: Rarity) -> Self {
        rarity.0
    }
}

impl Rarity {
    /// Create a rarity tier, rejecting values outside `1..=6`.
    #[must_use]
    pub const fn new(tier: u8) -> Option<Self> {
        if tier >= 1 && tier <= MAX_RARITY {
            Some(Self(tier))
        } else {
            None
        }
    }

    /// Create a rarity tier, clamping into `1..=6`.
    #[must_use]
    pub const fn clamped(tier: u8) -> Self {
        if tier < 1 {
            Self(1)
        } else if tier > MAX_RARITY {
            Self(MAX_RARITY)
        } else {
            Self(tier)
        }
    }

    /// Tier number.
    #[must_use]
    pub const fn tier(self) -> u8 {
        self.0
    }

    /// Zero-based index into per-tier tables.
    #[must_use]
    pub const fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    /// All tiers from common to rarest.
    pub fn all() -> impl DoubleEndedIterator<Item = Self> {
        (1..=MAX_RARITY).map(Self)
    }

    /// Display name used by the shop and gacha screens.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self.0 {
            1 => "Normal",
            2 => "Rare",
            3 => "High Rare",
            4 => "Top Rare",
            5 => "Special",
            _ => "Phantom",
        }
    }
}

/// Base stats of an archetype, before upgrades or level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    /// Maximum health.
    #[serde(with = "fixed_serde")]
    pub health: Fixed,
    /// Attack.
    #[serde(with = "fixed_serde")]
    pub attack: Fixed,
    /// Defense.
    #[serde(with = "fixed_serde")]
    pub defense: Fixed,
    /// Nectar carry capacity.
    #[serde(with = "fixed_serde")]
    pub carry: Fixed,
    /// Movement speed in field units per tick.
    #[serde(with = "fixed_serde")]
    pub speed: Fixed,
}

/// Catalog row as authored in data files.
///
/// Speed is in hundredths of a field unit per tick and radius in tenths of
/// a field unit, so rows stay integer-only.
///
/// # Example RON
///
/// ```ron
/// ArchetypeData(
///     key: "kanabun",
///     name: "Kanabun",
///     rarity: 1,
///     health: 20,
///     attack: 5,
///     defense: 3,
///     carry: 2,
///     speed_centi: 40,
///     spawn_count: 6,
///     deck_cost: 10,
///     purchase_price: None,
///     radius_deci: 145,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchetypeData {
    /// Unique string key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Rarity tier (1-6).
    pub rarity: u8,
    /// Base health.
    pub health: u32,
    /// Base attack.
    pub attack: u32,
    /// Base defense.
    pub defense: u32,
    /// Base carry capacity.
    pub carry: u32,
    /// Base speed, hundredths of a unit per tick.
    pub speed_centi: u32,
    /// Number of copies on the CPU team.
    #[serde(default)]
    pub spawn_count: u32,
    /// Deck cost units.
    pub deck_cost: u32,
    /// Direct purchase price in SG; `None` when not for sale.
    #[serde(default)]
    pub purchase_price: Option<u64>,
    /// Collision radius, tenths of a unit.
    pub radius_deci: u32,
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Archetype {
    /// Numeric id (catalog index).
    pub id: ArchetypeId,
    /// Unique string key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Rarity tier.
    pub rarity: Rarity,
    /// Base stats.
    pub base: BaseStats,
    /// Number of copies on the CPU team.
    pub spawn_count: u32,
    /// Deck cost units.
    pub deck_cost: u32,
    /// Direct purchase price in SG.
    pub purchase_price: Option<u64>,
    /// Collision radius.
    #[serde(with = "fixed_serde")]
    pub radius: Fixed,
}

/// Top-level shape of a catalog data file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogData {
    /// Archetype rows, in id order.
    pub archetypes: Vec<ArchetypeData>,
}

/// Read-only archetype table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    archetypes: Vec<Archetype>,
    by_key: HashMap<String, ArchetypeId>,
}

impl Catalog {
    /// The standard beetle roster: 17 archetypes across six tiers.
    #[must_use]
    pub fn builtin() -> Self {
        Self::build(builtin_rows())
    }

    /// Parse and validate a catalog from RON text.
    pub fn from_ron(source_name: &str, text: &str) -> Result<Self> {
        let data: CatalogData = ron::from_str(text).map_err(|e| GameError::DataParseError {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })?;
        Self::from_data(data.archetypes)
    }

    /// Validate rows and build a catalog.
    pub fn from_data(rows: Vec<ArchetypeData>) -> Result<Self> {
        validate_rows(&rows)?;
        Ok(Self::build(rows))
    }

    fn build(rows: Vec<ArchetypeData>) -> Self {
        let mut archetypes = Vec::with_capacity(rows.len());
        let mut by_key = HashMap::with_capacity(rows.len());

        for (index, row) in rows.into_iter().enumerate() {
            let id = ArchetypeId::new(index as u16);
            by_key.insert(row.key.clone(), id);
            archetypes.push(Archetype {
                id,
                rarity: Rarity::clamped(row.rarity),
                base: BaseStats {
                    health: Fixed::from_num(row.health),
                    attack: Fixed::from_num(row.attack),
                    defense: Fixed::from_num(row.defense),
                    carry: Fixed::from_num(row.carry),
                    speed: ratio(to_i32(row.speed_centi), 100),
                },
                spawn_count: row.spawn_count,
                deck_cost: row.deck_cost,
                purchase_price: row.purchase_price,
                radius: ratio(to_i32(row.radius_deci), 10),
                key: row.key,
                name: row.name,
            });
        }

        Self { archetypes, by_key }
    }

    /// Look up an archetype by id.
    #[must_use]
    pub fn get(&self, id: ArchetypeId) -> Option<&Archetype> {
        self.archetypes.get(id.index())
    }

    /// Look up an archetype by id, as an error when missing.
    pub fn require(&self, id: ArchetypeId) -> Result<&Archetype> {
        self.get(id)
            .ok_or_else(|| GameError::UnknownArchetype(id.to_string()))
    }

    /// Look up an archetype by string key.
    #[must_use]
    pub fn by_key(&self, key: &str) -> Option<&Archetype> {
        self.by_key.get(key).and_then(|id| self.get(*id))
    }

    /// All archetypes in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Archetype> {
        self.archetypes.iter()
    }

    /// Number of archetypes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }

    /// Largest collision radius of any archetype.
    #[must_use]
    pub fn max_radius(&self) -> Fixed {
        self.archetypes
            .iter()
            .map(|a| a.radius)
            .max()
            .unwrap_or(Fixed::ZERO)
    }

    /// Archetype ids of a given tier, in id order.
    #[must_use]
    pub fn tier_members(&self, rarity: Rarity) -> Vec<ArchetypeId> {
        self.archetypes
            .iter()
            .filter(|a| a.rarity == rarity)
            .map(|a| a.id)
            .collect()
    }
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn validate_rows(rows: &[ArchetypeData]) -> Result<()> {
    if rows.is_empty() {
        return Err(GameError::InvalidConfig("catalog has no archetypes".into()));
    }
    if rows.len() > usize::from(u16::MAX) {
        return Err(GameError::InvalidConfig("catalog is too large".into()));
    }

    let mut seen = HashMap::new();
    for row in rows {
        if seen.insert(row.key.as_str(), ()).is_some() {
            return Err(GameError::InvalidConfig(format!(
                "duplicate archetype key '{}'",
                row.key
            )));
        }
        let Some(rarity) = Rarity::new(row.rarity) else {
            return Err(GameError::InvalidConfig(format!(
                "archetype '{}' has rarity {} outside 1..={MAX_RARITY}",
                row.key, row.rarity
            )));
        };
        if rarity.tier() == MAX_RARITY && row.purchase_price.is_some() {
            return Err(GameError::InvalidConfig(format!(
                "tier-{MAX_RARITY} archetype '{}' cannot have a purchase price",
                row.key
            )));
        }
        if row.radius_deci == 0 {
            return Err(GameError::InvalidConfig(format!(
                "archetype '{}' has zero radius",
                row.key
            )));
        }
        let limits = [
            ("health", row.health, MAX_STAT),
            ("attack", row.attack, MAX_STAT),
            ("defense", row.defense, MAX_STAT),
            ("carry", row.carry, MAX_STAT),
            ("speed_centi", row.speed_centi, MAX_SPEED_CENTI),
            ("radius_deci", row.radius_deci, MAX_RADIUS_DECI),
            ("spawn_count", row.spawn_count, MAX_SPAWN_COUNT),
        ];
        for (field, value, limit) in limits {
            if value > limit {
                return Err(GameError::InvalidConfig(format!(
                    "archetype '{}' has {field} {value}, limit is {limit}",
                    row.key
                )));
            }
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn row(
    key: &str,
    name: &str,
    rarity: u8,
    stats: [u32; 4],
    speed_centi: u32,
    spawn_count: u32,
    deck_cost: u32,
    purchase_price: Option<u64>,
    radius_deci: u32,
) -> ArchetypeData {
    let [health, attack, defense, carry] = stats;
    ArchetypeData {
        key: key.to_string(),
        name: name.to_string(),
        rarity,
        health,
        attack,
        defense,
        carry,
        speed_centi,
        spawn_count,
        deck_cost,
        purchase_price,
        radius_deci,
    }
}

fn builtin_rows() -> Vec<ArchetypeData> {
    vec![
        // Tier 1
        row("kanabun", "Kanabun", 1, [20, 5, 3, 2], 40, 6, 10, None, 145),
        // Tier 2
        row("japanese", "Japanese Rhinoceros Beetle", 2, [60, 15, 10, 2], 35, 3, 20, Some(20_000), 178),
        row("gohontsuno", "Five-horned Rhinoceros Beetle", 2, [60, 16, 10, 2], 30, 0, 22, Some(20_000), 180),
        row("saturn", "Saturn Beetle", 2, [60, 17, 10, 2], 30, 0, 23, Some(20_000), 188),
        // Tier 3
        row("atlas", "Atlas Beetle", 3, [80, 20, 15, 2], 25, 2, 30, Some(50_000), 188),
        row("ookuwa", "Giant Stag Beetle", 3, [78, 22, 13, 2], 22, 0, 29, Some(50_000), 180),
        row("elephas", "Elephant Beetle", 3, [110, 20, 23, 2], 15, 0, 35, Some(50_000), 225),
        row("neptune", "Neptune Beetle", 3, [85, 22, 16, 2], 22, 0, 32, Some(50_000), 195),
        // Tier 4
        row("hercules", "Hercules Beetle", 4, [100, 25, 20, 3], 20, 1, 40, Some(200_000), 208),
        row("caucasus", "Caucasus Beetle", 4, [95, 26, 19, 3], 22, 0, 39, Some(200_000), 198),
        row("palawan", "Palawan Stag Beetle", 4, [94, 27, 17, 2], 23, 0, 38, Some(200_000), 192),
        row("tarandus", "Tarandus Stag Beetle", 4, [94, 28, 16, 2], 22, 0, 38, Some(200_000), 188),
        // Tier 5
        row("kinghercules", "King Hercules", 5, [110, 28, 22, 3], 20, 0, 50, Some(500_000), 205),
        row("superiorcaucasus", "Superior Caucasus", 5, [105, 30, 20, 3], 20, 0, 50, Some(500_000), 205),
        row("niki", "Golden Niki", 5, [30, 8, 3, 2], 50, 0, 15, Some(500_000), 148),
        // Tier 6
        row("perfecthercules", "Perfect Hercules", 6, [120, 32, 26, 2], 20, 0, 60, None, 218),
        row("marvelous", "Marvelous Beetle", 6, [120, 34, 28, 2], 20, 0, 62, None, 222),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_rows_validate() {
        assert!(validate_rows(&builtin_rows()).is_ok());
    }

    #[test]
    fn test_builtin_tiers() {
        let catalog = Catalog::builtin();
        let counts: Vec<usize> = Rarity::all()
            .map(|r| catalog.tier_members(r).len())
            .collect();
        assert_eq!(counts, vec![1, 3, 4, 4, 3, 2]);
    }

    #[test]
    fn test_tier_six_not_for_sale() {
        let catalog = Catalog::builtin();
        for id in catalog.tier_members(Rarity::new(6).unwrap()) {
            assert!(catalog.get(id).unwrap().purchase_price.is_none());
        }
    }

    #[test]
    fn test_fractional_stats_convert() {
        let catalog = Catalog::builtin();
        let kanabun = catalog.by_key("kanabun").unwrap();
        assert_eq!(kanabun.base.speed, ratio(40, 100));
        assert_eq!(kanabun.radius, ratio(145, 10));
        assert_eq!(kanabun.base.health, Fixed::from_num(20));
    }

    #[test]
    fn test_rarity_bounds() {
        assert!(Rarity::new(0).is_none());
        assert!(Rarity::new(7).is_none());
        assert_eq!(Rarity::new(3).unwrap().index(), 2);
    }

    #[test]
    fn test_deserialized_rarity_is_checked() {
        let bytes = bincode::serialize(&Rarity::new(4).unwrap()).unwrap();
        assert_eq!(bincode::deserialize::<Rarity>(&bytes).unwrap(), Rarity::new(4).unwrap());
        assert!(bincode::deserialize::<Rarity>(&[0]).is_err());
        assert!(ron::from_str::<Rarity>("7").is_err());
        assert_eq!(ron::from_str::<Rarity>("2").unwrap().index(), 1);
    }

    #[test]
    fn test_rejects_out_of_range_rows() {
        let mutations: [fn(&mut ArchetypeData); 5] = [
            |r| r.health = u32::MAX,
            |r| r.attack = MAX_STAT + 1,
            |r| r.speed_centi = u32::MAX,
            |r| r.radius_deci = u32::MAX,
            |r| r.spawn_count = MAX_SPAWN_COUNT + 1,
        ];
        for mutate in mutations {
            let mut rows = builtin_rows();
            mutate(&mut rows[0]);
            assert!(matches!(
                Catalog::from_data(rows),
                Err(GameError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_max_radius() {
        assert_eq!(Catalog::builtin().max_radius(), ratio(225, 10));
    }

    #[test]
    fn test_from_ron() {
        let text = r#"(
            archetypes: [
                (
                    key: "scout",
                    name: "Scout",
                    rarity: 1,
                    health: 10,
                    attack: 2,
                    defense: 1,
                    carry: 4,
                    speed_centi: 150,
                    spawn_count: 2,
                    deck_cost: 5,
                    radius_deci: 100,
                ),
            ],
        )"#;
        let catalog = Catalog::from_ron("inline", text).unwrap();
        assert_eq!(catalog.len(), 1);
        let scout = catalog.by_key("scout").unwrap();
        assert_eq!(scout.base.speed, ratio(150, 100));
        assert_eq!(scout.purchase_price, None);
    }

    #[test]
    fn test_rejects_bad_rarity() {
        let mut rows = builtin_rows();
        rows[0].rarity = 7;
        assert!(matches!(
            Catalog::from_data(rows),
            Err(GameError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_priced_tier_six() {
        let mut rows = builtin_rows();
        let last = rows.len() - 1;
        rows[last].purchase_price = Some(1);
        assert!(Catalog::from_data(rows).is_err());
    }

    #[test]
    fn test_rejects_duplicate_keys() {
        let mut rows = builtin_rows();
        rows[1].key = "kanabun".into();
        assert!(Catalog::from_data(rows).is_err());
    }

    #[test]
    fn test_malformed_ron_reports_source() {
        let err = Catalog::from_ron("beetles.ron", "(archetypes: [").unwrap_err();
        match err {
            GameError::DataParseError { source_name, .. } => assert_eq!(source_name, "beetles.ron"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
