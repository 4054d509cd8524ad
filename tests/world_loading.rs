use std::fs;

use listen::engine::{AudioEvent, RecordingAudio};
use listen::error::{LoadError, PlacementError};
use listen::world::validate_world;
use listen::{GameState, load_world_from_file, load_world_from_str};
use proptest::prelude::*;

const MAIN: &str = r#"
[settings]
room_files = ["rooms.toml"]
object_files = ["objects.toml"]
player_attributes = { gold = 2 }

[settings.player_start]
room = "hall"
x = 10
y = 10

[engine]
hold_delay_ms = 1500
sound_root = "assets"
"#;

const ROOMS: &str = r#"
[[room]]
name = "hall"
width = 100
height = 50
sound_file = "hall.mp3"

[[room]]
name = "yard"
width = 30
height = 30
"#;

const OBJECTS: &str = r#"
[[object]]
name = "well"
sound_file = "well.mp3"
trigger_distance = 15
ambient_sound_file = "drip.mp3"
ambient_sound_on = true
starting_position = { room = "hall", x = 80, y = 25 }

[[object]]
name = "gate"
sound_file = "gate.mp3"
trigger_distance = 5
starting_position = { room = "yard", x = 1, y = 1 }
"#;

#[test]
fn fragments_are_resolved_next_to_the_world_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("world.toml"), MAIN).unwrap();
    fs::write(dir.path().join("rooms.toml"), ROOMS).unwrap();
    fs::write(dir.path().join("objects.toml"), OBJECTS).unwrap();

    let world = load_world_from_file(&dir.path().join("world.toml")).unwrap();

    assert_eq!(world.rooms.len(), 2);
    assert_eq!(world.objects.len(), 2);
    assert_eq!(world.engine.hold_delay_ms, 1500);
    assert_eq!(world.engine.cue_gap_ms, 600);
    assert_eq!(world.settings.player_attributes.get("gold"), Some(&2.0));
    assert!(validate_world(&world).is_empty());
}

#[test]
fn missing_fragment_reports_its_path() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("world.toml"), MAIN).unwrap();
    fs::write(dir.path().join("rooms.toml"), ROOMS).unwrap();

    let err = load_world_from_file(&dir.path().join("world.toml")).unwrap_err();
    match err {
        LoadError::Io { path, .. } => assert!(path.ends_with("objects.toml")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn start_up_enters_room_and_starts_ambient_loops() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("world.toml"), MAIN).unwrap();
    fs::write(dir.path().join("rooms.toml"), ROOMS).unwrap();
    fs::write(dir.path().join("objects.toml"), OBJECTS).unwrap();
    let world = load_world_from_file(&dir.path().join("world.toml")).unwrap();

    let game = GameState::new(world, RecordingAudio::new(500)).unwrap();
    let audio = game.audio();

    assert!(matches!(audio.events()[0], AudioEvent::Preload(n) if n > 0));
    assert_eq!(audio.played(), vec!["assets/start.mp3"]);

    let loops: Vec<&str> = audio
        .active_loops()
        .into_iter()
        .map(|(_, cue)| cue.as_str())
        .collect();
    assert_eq!(loops, vec!["assets/hall.mp3", "assets/drip.mp3"]);
    assert!(game.placements.get("gate").is_some());
}

#[test]
fn placing_the_player_in_another_room_swaps_the_room_bed() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("world.toml"), MAIN).unwrap();
    fs::write(dir.path().join("rooms.toml"), ROOMS).unwrap();
    fs::write(dir.path().join("objects.toml"), OBJECTS).unwrap();
    let world = load_world_from_file(&dir.path().join("world.toml")).unwrap();
    let mut game = GameState::new(world, RecordingAudio::new(500)).unwrap();

    game.place_player("yard", 15.0, 15.0).unwrap();

    let loops: Vec<&str> = game
        .audio()
        .active_loops()
        .into_iter()
        .map(|(_, cue)| cue.as_str())
        .collect();
    assert_eq!(loops, vec!["assets/drip.mp3"]);
    assert_eq!(game.player.room, "yard");

    game.place_player("hall", 50.0, 25.0).unwrap();
    let beds = game
        .audio()
        .active_loops()
        .into_iter()
        .filter(|(_, cue)| cue.as_str() == "assets/hall.mp3")
        .count();
    assert_eq!(beds, 1);
}

#[test]
fn start_position_outside_room_is_fatal() {
    let world = load_world_from_str(
        r#"
        [settings.player_start]
        room = "closet"
        x = 20
        y = 5

        [[room]]
        name = "closet"
        width = 10
        height = 10
        "#,
    )
    .unwrap();

    let err = GameState::new(world, RecordingAudio::new(100)).err().unwrap();
    assert!(matches!(err, PlacementError::OutOfBounds { .. }));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = load_world_from_str("[settings\nplayer_start = 3").unwrap_err();
    assert!(matches!(err, LoadError::Parse { .. }));
}

fn box_world() -> GameState<RecordingAudio> {
    let world = load_world_from_str(
        r#"
        [settings.player_start]
        room = "box"
        x = 1
        y = 1

        [[room]]
        name = "box"
        width = 40
        height = 20

        [[object]]
        name = "marble"
        sound_file = "marble.mp3"
        trigger_distance = 3
        "#,
    )
    .unwrap();
    GameState::new(world, RecordingAudio::new(100)).unwrap()
}

proptest! {
    #[test]
    fn object_placement_respects_room_bounds(x in -10.0f64..60.0, y in -10.0f64..40.0) {
        let mut game = box_world();
        let inside = x > 0.0 && x <= 40.0 && y > 0.0 && y <= 20.0;

        let result = game.place_object("marble", "box", x, y);

        if inside {
            prop_assert!(result.is_ok());
            let placed = game.placements.get("marble").unwrap();
            prop_assert_eq!(placed.room, "box");
            prop_assert_eq!(placed.position.x, x);
        } else {
            let is_out_of_bounds = matches!(result, Err(PlacementError::OutOfBounds { .. }));
            prop_assert!(is_out_of_bounds);
            prop_assert!(game.placements.get("marble").is_none());
        }
    }

    #[test]
    fn player_placement_respects_room_bounds(x in -10.0f64..60.0, y in -10.0f64..40.0) {
        let mut game = box_world();
        let before = game.player.position;
        let inside = x > 0.0 && x <= 40.0 && y > 0.0 && y <= 20.0;

        let result = game.place_player("box", x, y);

        if inside {
            prop_assert!(result.is_ok());
            prop_assert_eq!(game.player.position.x, x);
            prop_assert_eq!(game.player.position.y, y);
        } else {
            let is_out_of_bounds = matches!(result, Err(PlacementError::OutOfBounds { .. }));
            prop_assert!(is_out_of_bounds);
            prop_assert_eq!(game.player.position, before);
        }
        prop_assert_eq!(game.player.room.as_str(), "box");
    }
}
