//! Block archetype catalog
//!
//! Static table of every block template: base health, coin value and color.
//! The first 108 entries are the randomly drawn archetypes in unlock order;
//! `gold` and `specialGold` only appear through level rules.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A block template
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Archetype {
    pub name: &'static str,
    pub health: u32,
    pub value: u64,
    /// 0xRRGGBB
    pub color: u32,
}

const fn arch(name: &'static str, health: u32, value: u64, color: u32) -> Archetype {
    Archetype {
        name,
        health,
        value,
        color,
    }
}

/// Index into [`ARCHETYPES`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArchetypeId(pub u16);

impl ArchetypeId {
    pub const COMMON: ArchetypeId = ArchetypeId(0);
    pub const GOLD: ArchetypeId = ArchetypeId(108);
    pub const SPECIAL_GOLD: ArchetypeId = ArchetypeId(109);

    #[inline]
    pub fn get(self) -> &'static Archetype {
        ARCHETYPES
            .get(self.0 as usize)
            .unwrap_or(&ARCHETYPES[Self::COMMON.0 as usize])
    }

    #[inline]
    pub fn name(self) -> &'static str {
        self.get().name
    }

    /// Gold-family blocks raise the gold signal when destroyed
    #[inline]
    pub fn is_gold(self) -> bool {
        self == Self::GOLD || self == Self::SPECIAL_GOLD
    }
}

pub static ARCHETYPES: [Archetype; 110] = [
    // Basics
    arch("common", 1, 1, 0x0080FF),
    arch("reinforced", 3, 3, 0x00FF00),
    arch("resistant", 5, 8, 0xFF0000),
    arch("armored", 10, 20, 0x808080),
    arch("crystal", 7, 15, 0xFF00FF),
    arch("neon", 4, 12, 0x00FFFF),
    arch("diamond", 25, 75, 0xB9F2FF),
    arch("ruby", 20, 60, 0xE0115F),
    // Metals
    arch("copper", 8, 18, 0xB87333),
    arch("bronze", 12, 25, 0xCD7F32),
    arch("silver", 18, 45, 0xC0C0C0),
    arch("platinum", 30, 90, 0xE5E4E2),
    arch("titanium", 35, 105, 0x878681),
    arch("steel", 22, 55, 0x71797E),
    arch("iron", 15, 35, 0xA19D94),
    arch("aluminum", 6, 14, 0xA8A8A8),
    arch("zinc", 9, 20, 0x7A7A7A),
    arch("lead", 13, 28, 0x2F4F4F),
    // Elements
    arch("fire", 16, 40, 0xFF4500),
    arch("ice", 14, 35, 0x87CEEB),
    arch("earth", 24, 65, 0x8B4513),
    arch("wind", 11, 30, 0xE6E6FA),
    arch("lightning", 19, 50, 0xFFFF00),
    arch("water", 13, 32, 0x0077BE),
    arch("shadow", 21, 58, 0x2F2F2F),
    arch("light", 17, 42, 0xFFFACD),
    arch("poison", 15, 38, 0x32CD32),
    arch("plasma", 28, 80, 0xFF69B4),
    // Vibrant
    arch("crimson", 18, 45, 0xDC143C),
    arch("azure", 16, 40, 0x007FFF),
    arch("emerald", 22, 60, 0x50C878),
    arch("violet", 20, 52, 0x8A2BE2),
    arch("orange", 14, 36, 0xFF8C00),
    arch("turquoise", 17, 43, 0x40E0D0),
    arch("coral", 15, 38, 0xFF7F50),
    arch("lime", 12, 30, 0x32CD32),
    arch("indigo", 19, 48, 0x4B0082),
    arch("magenta", 16, 41, 0xFF00FF),
    // Pastels
    arch("pastelPink", 10, 25, 0xFFB6C1),
    arch("pastelBlue", 11, 28, 0xB0E0E6),
    arch("pastelGreen", 12, 30, 0x98FB98),
    arch("pastelYellow", 9, 22, 0xFFFFE0),
    arch("pastelPurple", 13, 32, 0xDDA0DD),
    arch("pastelOrange", 10, 26, 0xFFDAB9),
    arch("pastelRed", 14, 35, 0xFFA07A),
    arch("pastelCyan", 11, 27, 0xE0FFFF),
    arch("pastelLavender", 12, 29, 0xE6E6FA),
    arch("pastelMint", 10, 24, 0xF0FFFF),
    // Neon
    arch("neonPink", 15, 38, 0xFF1493),
    arch("neonGreen", 16, 40, 0x39FF14),
    arch("neonBlue", 17, 42, 0x1B03A3),
    arch("neonYellow", 14, 36, 0xFFFF33),
    arch("neonOrange", 15, 38, 0xFF6600),
    arch("neonPurple", 18, 45, 0xBF00FF),
    arch("neonRed", 16, 40, 0xFF073A),
    arch("neonCyan", 17, 43, 0x00FFFF),
    arch("neonLime", 15, 37, 0xCCFF00),
    arch("neonMagenta", 16, 41, 0xFF00CC),
    // Dark
    arch("darkRed", 25, 70, 0x8B0000),
    arch("darkBlue", 26, 72, 0x00008B),
    arch("darkGreen", 24, 68, 0x006400),
    arch("darkPurple", 27, 75, 0x301934),
    arch("darkOrange", 23, 65, 0xFF8C00),
    arch("darkCyan", 25, 70, 0x008B8B),
    arch("darkYellow", 22, 62, 0xB8860B),
    arch("darkPink", 24, 67, 0xC71585),
    arch("darkGray", 28, 78, 0x2F2F2F),
    arch("darkBrown", 26, 73, 0x654321),
    // Crystals
    arch("quartzCrystal", 30, 85, 0xE6E6FA),
    arch("amethystCrystal", 32, 90, 0x9966CC),
    arch("topazCrystal", 28, 80, 0xFFC87C),
    arch("sapphireCrystal", 35, 100, 0x0F52BA),
    arch("emeraldCrystal", 33, 95, 0x50C878),
    arch("rubyCrystal", 34, 98, 0xE0115F),
    arch("diamondCrystal", 40, 120, 0xB9F2FF),
    arch("opalCrystal", 29, 82, 0xA8C3BC),
    arch("peridotCrystal", 27, 78, 0xE6E200),
    arch("garnetCrystal", 31, 88, 0x733635),
    // Specials
    arch("rainbow", 45, 150, 0xFF69B4),
    arch("holographic", 38, 125, 0xC0C0C0),
    arch("cosmic", 50, 180, 0x483D8B),
    arch("ethereal", 42, 140, 0xF0F8FF),
    arch("mystic", 46, 160, 0x8A2BE2),
    arch("ancient", 55, 200, 0x8B4513),
    arch("divine", 60, 220, 0xFFD700),
    arch("infernal", 48, 170, 0xDC143C),
    arch("celestial", 52, 190, 0x87CEEB),
    arch("void", 65, 250, 0x000000),
    // Legendary
    arch("legendary1", 70, 300, 0xFF6347),
    arch("legendary2", 72, 310, 0x4169E1),
    arch("legendary3", 75, 320, 0x32CD32),
    arch("legendary4", 78, 330, 0xFF1493),
    arch("legendary5", 80, 340, 0xFF8C00),
    arch("legendary6", 82, 350, 0x9370DB),
    arch("legendary7", 85, 360, 0x00CED1),
    arch("legendary8", 88, 370, 0xFFD700),
    arch("legendary9", 90, 380, 0xDC143C),
    arch("legendary10", 95, 400, 0x8A2BE2),
    // Mythic
    arch("mythic1", 100, 450, 0xFF0000),
    arch("mythic2", 105, 475, 0x0000FF),
    arch("mythic3", 110, 500, 0x00FF00),
    arch("mythic4", 115, 525, 0xFFFF00),
    arch("mythic5", 120, 550, 0xFF00FF),
    arch("mythic6", 125, 575, 0x00FFFF),
    arch("mythic7", 130, 600, 0xFFA500),
    arch("mythic8", 135, 625, 0x800080),
    arch("mythic9", 140, 650, 0x008000),
    arch("mythic10", 150, 700, 0x000000),
    // Level rules only
    arch("gold", 15, 50, 0xFFD700),
    arch("specialGold", 50, 100, 0xFFD700),
];

/// Level at which each slice of the catalog joins the random pool
const UNLOCK_TIERS: [(u32, Range<u16>); 13] = [
    (0, 0..1),
    (5, 1..3),
    (10, 3..8),
    (15, 8..18),
    (25, 18..28),
    (35, 28..38),
    (45, 38..48),
    (55, 48..58),
    (65, 58..68),
    (75, 68..78),
    (85, 78..88),
    (95, 88..98),
    (105, 98..108),
];

/// Find an archetype by name; unknown names fall back to `common`
pub fn lookup(name: &str) -> ArchetypeId {
    ARCHETYPES
        .iter()
        .position(|a| a.name == name)
        .map(|i| ArchetypeId(i as u16))
        .unwrap_or(ArchetypeId::COMMON)
}

/// Archetypes that may be rolled for an ordinary grid cell at `level`
pub fn unlocked(level: u32) -> Vec<ArchetypeId> {
    UNLOCK_TIERS
        .iter()
        .filter(|(min_level, _)| level >= *min_level)
        .flat_map(|(_, range)| range.clone().map(ArchetypeId))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_and_unknown() {
        let id = lookup("armored");
        assert_eq!(id.get().health, 10);
        assert_eq!(id.get().value, 20);
        assert_eq!(lookup("no-such-block"), ArchetypeId::COMMON);
        assert_eq!(lookup("specialGold"), ArchetypeId::SPECIAL_GOLD);
        assert_eq!(lookup("gold"), ArchetypeId::GOLD);
    }

    #[test]
    fn test_unlock_tiers() {
        assert_eq!(unlocked(1), vec![ArchetypeId::COMMON]);
        assert_eq!(unlocked(4).len(), 1);
        assert_eq!(unlocked(5).len(), 3);
        assert_eq!(unlocked(10).len(), 8);
        assert_eq!(unlocked(15).len(), 18);
        assert_eq!(unlocked(24).len(), 18);
        assert_eq!(unlocked(105).len(), 108);
        assert_eq!(unlocked(500).len(), 108);
    }

    #[test]
    fn test_pool_has_each_archetype_once() {
        let pool = unlocked(500);
        for (i, id) in pool.iter().enumerate() {
            assert!(!pool[i + 1..].contains(id), "{} rolled twice", id.name());
        }
        assert_eq!(pool.iter().filter(|&&id| id == ArchetypeId::COMMON).count(), 1);

        assert!(!unlocked(14).contains(&lookup("lead")));
        assert!(unlocked(15).contains(&lookup("lead")));
        assert!(!unlocked(104).contains(&lookup("mythic10")));
        assert!(unlocked(105).contains(&lookup("mythic10")));
    }

    #[test]
    fn test_gold_never_rolled() {
        let pool = unlocked(1000);
        assert!(!pool.contains(&ArchetypeId::GOLD));
        assert!(!pool.contains(&ArchetypeId::SPECIAL_GOLD));
        assert!(ArchetypeId::GOLD.is_gold());
        assert!(!ArchetypeId::COMMON.is_gold());
    }

    #[test]
    fn test_names_unique() {
        for (i, a) in ARCHETYPES.iter().enumerate() {
            assert_eq!(lookup(a.name).0 as usize, i, "duplicate name {}", a.name);
        }
    }
}
