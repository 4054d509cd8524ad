use crate::world::{World, load_world_from_str};

/// Two rooms (`hall` 100x100, `cellar` 40x40) and a few objects, none placed.
pub(crate) fn test_world() -> World {
    load_world_from_str(
        r#"
        [settings.player_start]
        room = "hall"
        x = 50
        y = 50

        [[room]]
        name = "hall"
        width = 100
        height = 100

        [[room]]
        name = "cellar"
        width = 40
        height = 40

        [[object]]
        name = "chest"
        sound_file = "chest.mp3"
        trigger_distance = 20

        [[object]]
        name = "lamp"
        sound_file = "lamp.mp3"
        trigger_distance = 10
        conditions = { oil = ">0" }

        [[object]]
        name = "fountain"
        sound_file = "fountain.mp3"
        trigger_distance = 30
        ambient_sound_file = "water.mp3"
        "#,
    )
    .expect("test world parses")
}
