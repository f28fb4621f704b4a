//! # xianlu - Deterministic Cultivation RPG Progression Engine
//!
//! The rules behind a persistent-character cultivation game:
//! - **Effective attributes** from base stats, equipment and sect buffs,
//!   with a full breakdown of every contribution
//! - **Combat power** as a weighted sum of effective attributes
//! - **Progression**: experience curve, level-up growth, world tiers
//! - **Items and equipment**: equip validation and effect application
//! - **Activities**: hunting, secluded cultivation, daily sign-in, travel
//! - **Duels** between players and **sect** membership
//!
//! ## Core Concepts
//!
//! ### Attribute Pipeline
//!
//! ```text
//! [AttributeSource] → [AttributeTransform] → [ResolvedAttribute]
//! ```
//!
//! 1. **Sources** contribute additive values (base, each equipped item, the sect)
//! 2. **Transforms** derive attributes from others (combat power)
//! 3. **ResolvedAttribute** holds the final value with its breakdown
//!
//! Dependencies between derived attributes are ordered with a graph and
//! cycles are rejected.
//!
//! ### Engine Operations
//!
//! Operations take the player record, a [`Catalog`] of content records, the
//! [`GameConfig`], the current time and a random number generator. They
//! validate before writing, so an `Err` leaves every record untouched. No
//! operation performs I/O.
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use xianlu::*;
//!
//! let config = GameConfig::default();
//! let mut catalog = MemoryCatalog::new();
//! catalog.add_item(Item::consumable("悟道丹", vec![Effect::Experience(150)]));
//!
//! let now = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(8, 0, 0).unwrap();
//! let mut player = Player::new(1, "韩立", &config, now);
//! player.grant("悟道丹", 1);
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! use_item(&mut player, "悟道丹", &catalog, &config, &mut rng).unwrap();
//! let gains = resolve_level_ups(&mut player, &config, &mut rng);
//!
//! assert_eq!(gains.len(), 1);
//! assert_eq!((player.level, player.exp), (2, 50));
//! ```
//!
//! ## Modules
//!
//! - [`attr_id`] - Attribute identifier type
//! - [`source`] - Attribute sources (additive contributions)
//! - [`transform`] - Attribute transforms (derived attributes)
//! - [`resolver`] - Attribute resolver
//! - [`resolved`] - Resolved attributes and sheets
//! - [`graph`] - Dependency graph management
//! - [`aggregate`] - Effective attributes of a player
//! - [`power`] - Combat power
//! - [`progression`] - Experience and levels
//! - [`items`] - Equipping and item use
//! - [`activity`] - Hunting, secluded cultivation, sign-in, travel
//! - [`battle`] - Player duels
//! - [`sect`] - Sect membership and contributions
//! - [`player`] - Player records
//! - [`catalog`] - Content records and lookup
//! - [`config`] - Balance configuration
//! - [`error`] - Error types

pub mod activity;
pub mod aggregate;
pub mod attr_id;
pub mod battle;
pub mod catalog;
pub mod config;
pub mod error;
pub mod graph;
pub mod items;
pub mod player;
pub mod power;
pub mod progression;
pub mod resolved;
pub mod resolver;
pub mod sect;
pub mod source;
pub mod transform;

// Re-export main types for convenience
pub use attr_id::AttrId;
pub use catalog::{Catalog, Effect, Equipment, Item, ItemKind, MemoryCatalog, Sect, World};
pub use config::{Difficulty, GameConfig};
pub use error::{ActionError, ConfigError, ErrorKind, StatError};
pub use player::{ActivityState, Player, PlayerId, SectId, SectRole};
pub use resolved::{AttributeSheet, ResolvedAttribute};
pub use resolver::AttributeResolver;

// Re-export engine operations
pub use activity::{
    finish_retreat, hunt, sign_in, start_retreat, travel, HuntReport, RetreatReport, SigninReport,
};
pub use aggregate::{aggregate, effective_attributes};
pub use battle::{resolve_battle, win_probability, BattleReport};
pub use items::{can_equip, equip_item, use_item, EquipOutcome, ItemUseOutcome};
pub use power::{combat_power, player_combat_power};
pub use progression::{can_level_up, level_up, required_exp, resolve_level_ups, LevelGain};
pub use sect::{contribute_artifact, join_sect, leave_sect, sect_defense, withdraw_artifact};
