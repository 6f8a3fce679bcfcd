//! Loading level descriptions from disk.

use delve::{DelveError, DelveResult, DungeonGenerator, GenerationConfig, LevelDescription};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_level(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write level");
    file
}

#[test]
fn test_saved_level_loads_and_generates() -> DelveResult<()> {
    let level = LevelDescription::demo();
    let file = write_level(&level.to_json()?);

    let loaded = LevelDescription::load(file.path())?;
    assert_eq!(loaded, level);

    let layout = DungeonGenerator::new().generate_level(&loaded, &GenerationConfig::new(77))?;
    assert!(layout.boss_room().is_some());

    Ok(())
}

#[test]
fn test_optional_flags_default_to_enabled() -> DelveResult<()> {
    let json = r#"{
        "name": "minimal",
        "width": 24,
        "height": 24,
        "cell_size": 2.0,
        "min_rooms": 2,
        "max_rooms": 4,
        "archetypes": [
            { "name": "start", "room_type": "Start", "size": { "width": 2, "height": 2 } },
            { "name": "room", "room_type": "Normal", "size": { "width": 3, "height": 2 } },
            { "name": "boss", "room_type": "Boss", "size": { "width": 3, "height": 3 } }
        ]
    }"#;
    let file = write_level(json);

    let level = LevelDescription::load(file.path())?;
    assert!(level.include_treasure && level.include_shop && level.include_secret);
    assert_eq!(level.boss_archetype, None);

    // No treasure/shop/secret archetypes: those rooms are skipped, not fatal
    let layout = DungeonGenerator::new().generate_level(&level, &GenerationConfig::new(1))?;
    assert!(layout.treasure_rooms().is_empty());
    assert!(layout.shop_rooms().is_empty());

    Ok(())
}

#[test]
fn test_load_errors() {
    let missing = LevelDescription::load("/definitely/not/here/level.json");
    assert!(matches!(missing, Err(DelveError::Io(_))));

    let garbage = write_level("{ not json");
    assert!(matches!(LevelDescription::load(garbage.path()), Err(DelveError::Serde(_))));

    let mut level = LevelDescription::demo();
    level.min_rooms = 20;
    level.max_rooms = 2;
    let invalid = write_level(&level.to_json().unwrap());
    assert!(matches!(LevelDescription::load(invalid.path()), Err(DelveError::InvalidLevel(_))));
}
