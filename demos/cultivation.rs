//! Cultivation example: one day in the life of a cultivator
//!
//! This example demonstrates:
//! - Building a catalog of items, equipment, worlds and sects
//! - Using items and leveling up
//! - Equipping gear and reading the attribute breakdown
//! - Hunting, secluded cultivation and sign-in
//! - A duel between two players

use chrono::{Duration, Local};
use rand::rngs::StdRng;
use rand::SeedableRng;
use xianlu::*;

fn main() -> Result<(), ActionError> {
    env_logger::init();

    let config = GameConfig::default();
    let mut catalog = MemoryCatalog::new();
    catalog.add_item(Item::consumable("筑基丹", vec![Effect::Experience(350)]));
    catalog.add_equipment(
        Equipment::new("青锋剑", "武器", "精良")
            .with_attribute("攻击力", 30.0)
            .with_attribute("暴击率", 2.0),
    );
    catalog.add_world(World {
        name: "天南".into(),
        world_level: 1,
        description: "越国七派所在".into(),
        currency: None,
    });
    catalog.add_sect(Sect::new(1, "黄枫谷", 2, &config).with_buff("防御力", 15.0));

    let mut rng = StdRng::seed_from_u64(7);
    let now = Local::now().naive_local();

    println!("=== Cultivation Demo ===\n");

    let mut han = Player::new(1, "韩立", &config, now);
    let mut rival = Player::new(2, "李化元", &config, now);
    travel(&mut han, "天南", &catalog)?;

    // Sect membership
    let sect = catalog.sect_mut(1).ok_or(ActionError::SectNotFound(1))?;
    join_sect(&mut han, sect)?;
    join_sect(&mut rival, sect)?;

    // Items and levels
    han.grant("筑基丹", 1);
    let outcome = use_item(&mut han, "筑基丹", &catalog, &config, &mut rng)?;
    println!("{}", outcome);
    for gain in resolve_level_ups(&mut han, &config, &mut rng) {
        println!("  {}", gain);
    }

    // Equipment and attribute breakdown
    han.grant("青锋剑", 1);
    println!("{}", equip_item(&mut han, "青锋剑", &catalog, &config)?);
    let sheet = effective_attributes(&han, &catalog)?;
    for attr in ["攻击力", "防御力", "暴击率"] {
        if let Some(resolved) = sheet.breakdown(attr) {
            println!(
                "  {}: {} + {} = {}",
                attr,
                resolved.base(),
                resolved.bonus(),
                resolved.value
            );
        }
    }
    println!("  战斗力: {}\n", combat_power(&sheet, &config)?);

    // Activities
    println!("{}", sign_in(&mut han, now, &catalog, &config)?);
    match hunt(&mut han, Difficulty::Normal, now, &catalog, &config, &mut rng) {
        Ok(report) => println!("{}", report),
        Err(err) => println!("hunt refused: {}", err),
    }
    match start_retreat(&mut han, 6, now + Duration::hours(8), &catalog, &config) {
        Ok(report) => println!("{}", report),
        Err(err) => println!("retreat refused: {}", err),
    }

    // Duel
    let report = resolve_battle(&mut rival, &han, now, &catalog, &config, &mut rng);
    match report {
        Ok(report) => println!("\n{}", report),
        Err(err) => println!("\nduel refused: {}", err),
    }

    Ok(())
}
