use eatman::agent::Strategy;
use eatman::error::{GameError, ParseError};
use eatman::map::parser::{LevelData, LevelParser};
use eatman::map::point::Point;
use eatman::map::tile::Tile;
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

mod common;

const CONFIGURED: &str = "\
set wall 33 33 222
set door 255 184 255

ghost 3 color=red home=7,0 strategy=pursuer speedFactor=1.25 seekChance=0.5
ghost 0 strategy=Whimsical fireChance=0.1
*********
*.......*
*.**=**.*
*.*012*.*
*.*****.*
*O..e..3*
*********
";

#[test]
fn test_parse_configured_level() {
    let level = LevelParser::parse(CONFIGURED).unwrap();

    assert_eq!(level.colors["wall"], [33, 33, 222]);
    assert_eq!(level.colors["door"], [255, 184, 255]);

    let pursuer = &level.config.ghosts[&3];
    assert_eq!(pursuer.color.as_deref(), Some("red"));
    assert_eq!(pursuer.home, Point::new(0, 7));
    assert_eq!(pursuer.strategy, Strategy::Pursuer);
    assert_eq!(pursuer.speed_factor, 1.25);
    assert_eq!(pursuer.seek_chance, 0.5);

    let whimsical = &level.config.ghosts[&0];
    assert_eq!(whimsical.strategy, Strategy::Whimsical);
    assert_eq!(whimsical.fire_chance, 0.1);

    // Ghosts without a line get defaults.
    assert_that(&level.config.ghosts.len()).is_equal_to(4);
    assert_eq!(level.config.ghosts[&1].strategy, Strategy::default_for(1));
    assert_eq!(level.grid.tile_at(Point::new(5, 1)), Some(Tile::BigBean));
}

#[test]
fn test_level_text_round_trips() {
    let level = LevelParser::parse(CONFIGURED).unwrap();
    let text = level.to_level_text();
    let reparsed = LevelData::parse(&text).unwrap();
    assert_eq!(reparsed, level);
    assert_eq!(reparsed.to_level_text(), text);
}

#[test]
fn test_with_level_clamps_to_one() {
    let level = common::parse(common::PEN).with_level(0);
    assert_that(&level.config.level).is_equal_to(1);
    let level = level.with_level(4);
    assert_that(&level.config.level).is_equal_to(4);
}

#[test]
fn test_grid_errors() {
    let cases: [(&str, ParseError); 6] = [
        (
            "*****\n*e0=*\n****\n",
            ParseError::RowLength {
                row: 2,
                expected: 5,
                found: 4,
            },
        ),
        ("*****\n*e0**\n*****\n", ParseError::DoorCount(0)),
        ("*****\n*e0==\n*****\n", ParseError::DoorCount(2)),
        ("*****\n*.0=*\n*****\n", ParseError::PlayerSpawnCount(0)),
        ("*****\n*e.=*\n*****\n", ParseError::NoGhostSpawn),
        ("*****\nTe0=*\n*****\n", ParseError::TeleportCount(1)),
    ];
    for (text, expected) in cases {
        assert_eq!(LevelParser::parse(text).unwrap_err(), expected, "for {text:?}");
    }
}

#[test]
fn test_unknown_symbol_reports_position() {
    let err = LevelParser::parse("*****\n*e0=*\n**x**\n").unwrap_err();
    assert_eq!(
        err,
        ParseError::UnknownCharacter {
            symbol: 'x',
            row: 2,
            col: 2
        }
    );
}

#[test]
fn test_duplicate_ghost_spawn() {
    let err = LevelParser::parse("******\n*e00=*\n******\n").unwrap_err();
    assert_eq!(err, ParseError::DuplicateGhostSpawn(0));
}

#[test]
fn test_bad_ghost_lines() {
    let grid = "*****\n*e0=*\n*****\n";
    for line in [
        "ghost",
        "ghost x",
        "ghost 0 speedFactor=0",
        "ghost 0 seekChance=1.5",
        "ghost 0 home=3",
        "ghost 0 mood=grumpy",
        "ghost 0 color",
    ] {
        let err = LevelParser::parse(&format!("{line}\n{grid}")).unwrap_err();
        assert!(matches!(err, ParseError::GhostLine(_)), "{line:?} gave {err:?}");
    }

    let err = LevelParser::parse(&format!("ghost 0 strategy=sneaky\n{grid}")).unwrap_err();
    assert_eq!(err, ParseError::UnknownStrategy("sneaky".to_string()));
}

#[test]
fn test_row_of_spaces_is_a_grid_row() {
    let text = "*******\n*e0=..*\n       \n*******\n";
    let level = LevelParser::parse(text).unwrap();
    assert_that(&level.grid.rows()).is_equal_to(4);
    assert_eq!(level.grid.tile_at(Point::new(2, 3)), Some(Tile::Empty));
    assert_eq!(level.grid.to_string(), text);
}

#[test]
fn test_load_reads_level_file() {
    let path = std::env::temp_dir().join(format!("eatman-load-{}.txt", std::process::id()));
    std::fs::write(&path, CONFIGURED).unwrap();
    let loaded = LevelData::load(&path);
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded.unwrap(), LevelParser::parse(CONFIGURED).unwrap());

    let missing = LevelData::load(std::env::temp_dir().join("eatman-no-such-level.txt"));
    assert!(matches!(missing, Err(GameError::Io(_))));
}
