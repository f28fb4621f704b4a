//! Game configuration.
//!
//! Every balance table the engine consults lives in [`GameConfig`]: the
//! recognized attributes, combat-power weights, experience curve, world
//! tiers, equipment slots and qualities, hunt presets, retreat and sign-in
//! rewards, battle and sect rules. The configuration is immutable for the
//! lifetime of a process and passed explicitly to every engine call, so
//! tests can swap in alternate tables.
//!
//! ## File format
//!
//! Configuration is TOML. Every section is optional and falls back to the
//! defaults:
//!
//! ```toml
//! default_currency = "下品灵石"
//!
//! [hunt]
//! drop_rate = 0.2
//!
//! [[hunt.presets]]
//! difficulty = "easy"
//! name = "简单"
//! injury_rate = 5.0
//! reward_multiplier = 1.0
//! ```

use crate::attr_id::{
    AttrId, ACCURACY, ATTACK, CRIT_RATE, DEFENSE, EVASION, HEALTH, LUCK, MANA, SPEED,
    SPELL_POWER, TENACITY,
};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Hunt difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    /// All difficulties, easiest first.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        };
        f.write_str(name)
    }
}

impl FromStr for Difficulty {
    type Err = String;

    /// Accepts the English names and the in-game names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" | "简单" => Ok(Difficulty::Easy),
            "normal" | "普通" => Ok(Difficulty::Normal),
            "hard" | "困难" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {}", other)),
        }
    }
}

/// Weight of one attribute in the combat-power sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatWeight {
    pub attribute: AttrId,
    pub weight: f64,
}

/// Inclusive range of the random growth an attribute gains per level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthRange {
    pub attribute: AttrId,
    pub min: i64,
    pub max: i64,
}

/// A world tier and the character levels it spans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldTier {
    pub tier: u32,
    pub min_level: u32,
    pub max_level: u32,
    pub name: String,
}

/// Equipment slot family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    Gear,
    Accessory,
}

/// An equipment slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotConfig {
    pub id: String,
    pub label: String,
    pub kind: SlotKind,
}

/// Injury risk and reward scaling of one hunt difficulty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HuntPreset {
    pub difficulty: Difficulty,
    pub name: String,
    /// Injury chance in percent (0..=100).
    pub injury_rate: f64,
    pub reward_multiplier: f64,
}

/// Starting kit of a new character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewPlayerConfig {
    pub name: String,
    pub attributes: BTreeMap<AttrId, f64>,
    pub currencies: BTreeMap<String, i64>,
}

impl Default for NewPlayerConfig {
    fn default() -> Self {
        let attributes = [
            (ATTACK, 100.0),
            (DEFENSE, 100.0),
            (HEALTH, 1000.0),
            (MANA, 500.0),
            (SPEED, 100.0),
            (CRIT_RATE, 5.0),
            (EVASION, 5.0),
            (ACCURACY, 90.0),
            (SPELL_POWER, 50.0),
            (TENACITY, 10.0),
            (LUCK, 1.0),
        ]
        .into_iter()
        .map(|(attr, v)| (AttrId::from_str(attr), v))
        .collect();
        let currencies = [
            ("下品灵石", 1000),
            ("中品灵石", 100),
            ("上品灵石", 10),
            ("极品灵石", 1),
        ]
        .into_iter()
        .map(|(c, v)| (c.to_string(), v))
        .collect();
        Self {
            name: "修仙者".to_string(),
            attributes,
            currencies,
        }
    }
}

/// Experience curve and level-up growth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    /// Experience per level of the threshold. Must be positive so the
    /// threshold grows with every level.
    pub exp_per_level: u64,
    /// Every `milestone_interval` levels the threshold gains `milestone_bonus`.
    pub milestone_interval: u32,
    pub milestone_bonus: u64,
    pub levels_per_world: u32,
    pub growth: Vec<GrowthRange>,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        let growth = [
            (ATTACK, 5, 15),
            (DEFENSE, 3, 12),
            (HEALTH, 20, 50),
            (MANA, 10, 30),
            (SPEED, 1, 5),
        ]
        .into_iter()
        .map(|(attr, min, max)| GrowthRange {
            attribute: AttrId::from_str(attr),
            min,
            max,
        })
        .collect();
        Self {
            exp_per_level: 100,
            milestone_interval: 10,
            milestone_bonus: 500,
            levels_per_world: 100,
            growth,
        }
    }
}

/// Hunting rewards and injury rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HuntConfig {
    /// Experience per character level, before the reward multiplier.
    pub exp_per_level: u64,
    /// Currency per character level, before the reward multiplier.
    pub currency_per_level: i64,
    /// Equipment drop chance before the reward multiplier.
    pub drop_rate: f64,
    /// Injury length at level 0.
    pub injury_base_hours: u32,
    /// Each this many levels shortens injuries by one hour.
    pub levels_per_injury_hour: u32,
    /// Floor on injury length.
    pub min_injury_hours: u32,
    /// Exactly one preset per [`Difficulty`].
    pub presets: Vec<HuntPreset>,
}

impl HuntConfig {
    /// The preset for `difficulty`, if configured.
    pub fn preset(&self, difficulty: Difficulty) -> Option<&HuntPreset> {
        self.presets.iter().find(|p| p.difficulty == difficulty)
    }
}

impl Default for HuntConfig {
    fn default() -> Self {
        Self {
            exp_per_level: 10,
            currency_per_level: 5,
            drop_rate: 0.1,
            injury_base_hours: 6,
            levels_per_injury_hour: 20,
            min_injury_hours: 1,
            presets: vec![
                HuntPreset {
                    difficulty: Difficulty::Easy,
                    name: "简单".to_string(),
                    injury_rate: 10.0,
                    reward_multiplier: 1.0,
                },
                HuntPreset {
                    difficulty: Difficulty::Normal,
                    name: "普通".to_string(),
                    injury_rate: 30.0,
                    reward_multiplier: 1.5,
                },
                HuntPreset {
                    difficulty: Difficulty::Hard,
                    name: "困难".to_string(),
                    injury_rate: 60.0,
                    reward_multiplier: 2.0,
                },
            ],
        }
    }
}

/// Secluded cultivation rewards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetreatConfig {
    pub currency_per_level_hour: i64,
    /// Reward factor per world tier.
    pub world_multiplier: f64,
    /// Durations a retreat may last, in hours.
    pub hour_options: Vec<u32>,
}

impl Default for RetreatConfig {
    fn default() -> Self {
        Self {
            currency_per_level_hour: 2,
            world_multiplier: 1.5,
            hour_options: vec![1, 3, 6, 12, 24, 48],
        }
    }
}

/// Daily sign-in reward: `base_reward + level * reward_per_level`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigninConfig {
    pub base_reward: i64,
    pub reward_per_level: i64,
}

impl Default for SigninConfig {
    fn default() -> Self {
        Self {
            base_reward: 50,
            reward_per_level: 5,
        }
    }
}

/// Duel rewards: `max(min_exp, target level * exp_per_target_level)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    pub min_exp: u64,
    pub exp_per_target_level: u64,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            min_exp: 10,
            exp_per_target_level: 2,
        }
    }
}

/// Sect limits and the defensive array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectConfig {
    /// Member cap given to newly founded sects.
    pub max_members: u32,
    /// Contributions a sect's defensive array can hold.
    pub max_artifacts: usize,
    /// Slot of equipment that can be contributed to the defensive array.
    pub artifact_slot: String,
    /// Contribution value per quality step, starting at the lowest quality.
    pub contribution_per_quality: i64,
}

impl Default for SectConfig {
    fn default() -> Self {
        Self {
            max_members: 50,
            max_artifacts: 10,
            artifact_slot: "法器".to_string(),
            contribution_per_quality: 10,
        }
    }
}

/// The complete balance configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Currency used by worlds without their own.
    pub default_currency: String,
    pub max_name_len: usize,
    /// Attribute names items may raise.
    pub attributes: Vec<AttrId>,
    /// Equipment qualities, lowest first.
    pub qualities: Vec<String>,
    /// Combat-power weights, summed in this order.
    pub combat_weights: Vec<CombatWeight>,
    pub new_player: NewPlayerConfig,
    pub progression: ProgressionConfig,
    pub worlds: Vec<WorldTier>,
    pub slots: Vec<SlotConfig>,
    pub hunt: HuntConfig,
    pub retreat: RetreatConfig,
    pub signin: SigninConfig,
    pub battle: BattleConfig,
    pub sect: SectConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        let attributes = [
            ATTACK,
            DEFENSE,
            HEALTH,
            MANA,
            SPEED,
            CRIT_RATE,
            EVASION,
            ACCURACY,
            SPELL_POWER,
            TENACITY,
            LUCK,
        ]
        .into_iter()
        .map(AttrId::from_str)
        .collect();

        let qualities = [
            "破损", "粗糙", "普通", "精良", "稀有", "史诗", "传说", "神话", "太古",
            "混沌", "鸿蒙",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let combat_weights = [
            (ATTACK, 1.5),
            (DEFENSE, 1.2),
            (HEALTH, 0.8),
            (SPEED, 0.5),
            (SPELL_POWER, 1.0),
            (CRIT_RATE, 10.0),
            (EVASION, 8.0),
        ]
        .into_iter()
        .map(|(attr, weight)| CombatWeight {
            attribute: AttrId::from_str(attr),
            weight,
        })
        .collect();

        let worlds = ["一级世界", "二级世界", "三级世界", "四级世界", "五级世界"]
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let tier = i as u32 + 1;
                WorldTier {
                    tier,
                    min_level: (tier - 1) * 100 + 1,
                    max_level: tier * 100,
                    name: name.to_string(),
                }
            })
            .collect();

        let gear = [
            ("头饰", "头部装备"),
            ("服饰", "身体装备"),
            ("腿部", "腿部装备"),
            ("手部", "手部装备"),
            ("鞋子", "脚部装备"),
            ("武器", "武器装备"),
            ("法器", "法器装备"),
        ];
        let accessories = [
            ("戒指", "戒指饰品"),
            ("手串", "手串饰品"),
            ("腰带", "腰带饰品"),
            ("挂件", "挂件饰品"),
            ("项链", "项链饰品"),
            ("玉牌", "玉牌饰品"),
            ("香囊", "香囊饰品"),
            ("称号", "称号饰品"),
            ("护符", "护符饰品"),
            ("符篆", "符篆饰品"),
        ];
        let slots = gear
            .into_iter()
            .map(|s| (s, SlotKind::Gear))
            .chain(accessories.into_iter().map(|s| (s, SlotKind::Accessory)))
            .map(|((id, label), kind)| SlotConfig {
                id: id.to_string(),
                label: label.to_string(),
                kind,
            })
            .collect();

        Self {
            default_currency: "下品灵石".to_string(),
            max_name_len: 20,
            attributes,
            qualities,
            combat_weights,
            new_player: NewPlayerConfig::default(),
            progression: ProgressionConfig::default(),
            worlds,
            slots,
            hunt: HuntConfig::default(),
            retreat: RetreatConfig::default(),
            signin: SigninConfig::default(),
            battle: BattleConfig::default(),
            sect: SectConfig::default(),
        }
    }
}

impl GameConfig {
    /// Load and validate a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        log::info!("loaded game config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as a TOML document.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check the invariants the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.default_currency.trim().is_empty() {
            return invalid("default_currency is empty".into());
        }
        if self.attributes.is_empty() {
            return invalid("no attributes configured".into());
        }
        if self.qualities.is_empty() {
            return invalid("no equipment qualities configured".into());
        }
        if self.slots.is_empty() {
            return invalid("no equipment slots configured".into());
        }
        if let Some(w) = self.combat_weights.iter().find(|w| !w.weight.is_finite()) {
            return invalid(format!("combat weight of {} is not finite", w.attribute));
        }

        let progression = &self.progression;
        if progression.exp_per_level == 0 {
            return invalid("exp_per_level must be positive".into());
        }
        if progression.milestone_interval == 0 || progression.levels_per_world == 0 {
            return invalid("progression intervals must be positive".into());
        }
        if let Some(g) = progression.growth.iter().find(|g| g.min > g.max) {
            return invalid(format!("growth range of {} is empty", g.attribute));
        }

        if self.worlds.is_empty() {
            return invalid("no world tiers configured".into());
        }
        for (i, world) in self.worlds.iter().enumerate() {
            if world.tier != i as u32 + 1 {
                return invalid(format!(
                    "world tiers must be 1..=n in order, found {}",
                    world.tier
                ));
            }
            if world.min_level > world.max_level {
                return invalid(format!(
                    "world tier {} has an empty level range",
                    world.tier
                ));
            }
        }

        let hunt = &self.hunt;
        let difficulties: BTreeSet<Difficulty> =
            hunt.presets.iter().map(|p| p.difficulty).collect();
        if hunt.presets.len() != Difficulty::ALL.len()
            || difficulties.len() != Difficulty::ALL.len()
        {
            return invalid("hunt presets must cover easy, normal and hard exactly once".into());
        }
        for preset in &hunt.presets {
            if !(0.0..=100.0).contains(&preset.injury_rate) {
                return invalid(format!(
                    "injury rate of {} must be within 0..=100",
                    preset.difficulty
                ));
            }
            if !preset.reward_multiplier.is_finite() || preset.reward_multiplier < 0.0 {
                return invalid(format!(
                    "reward multiplier of {} is invalid",
                    preset.difficulty
                ));
            }
        }
        if !(0.0..=1.0).contains(&hunt.drop_rate) {
            return invalid("drop_rate must be within 0..=1".into());
        }
        if hunt.levels_per_injury_hour == 0 {
            return invalid("levels_per_injury_hour must be positive".into());
        }

        if self.retreat.hour_options.is_empty() || self.retreat.hour_options.contains(&0) {
            return invalid("retreat hour options must be non-empty and positive".into());
        }

        Ok(())
    }

    /// Whether `name` is a recognized player attribute.
    pub fn is_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.as_str() == name)
    }

    /// Position of `quality` in the quality ladder (0 = lowest).
    pub fn quality_index(&self, quality: &str) -> Option<usize> {
        self.qualities.iter().position(|q| q == quality)
    }

    /// The slot with id `id`.
    pub fn slot(&self, id: &str) -> Option<&SlotConfig> {
        self.slots.iter().find(|s| s.id == id)
    }

    /// Information on world tier `tier`.
    pub fn world_tier(&self, tier: u32) -> Option<&WorldTier> {
        self.worlds.iter().find(|w| w.tier == tier)
    }

    /// Highest configured world tier.
    pub fn max_world_tier(&self) -> u32 {
        self.worlds.iter().map(|w| w.tier).max().unwrap_or(1)
    }
}
