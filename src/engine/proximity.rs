use crate::engine::conditions::conditions_met;
use crate::world::{Nearby, Options, Placements, Player, World};

/// Objects in the player's room that are visible to them and strictly
/// inside their trigger distance. Pure; returns a fresh snapshot.
pub fn nearby_objects(world: &World, placements: &Placements, player: &Player) -> Options {
    let mut found = Options::new();

    for (name, position) in placements.in_room(&player.room) {
        let object = match world.objects.get(name) {
            Some(o) => o,
            None => continue,
        };

        if !conditions_met(&object.conditions, &player.attributes) {
            continue;
        }

        let distance = position.distance_to(player.position);
        if distance < object.trigger_distance {
            found.insert(name.to_string(), Nearby { distance });
        }
    }

    found
}

/// Names present in `current` but not in `previous`.
pub fn newly_visible<'a>(previous: &Options, current: &'a Options) -> Vec<&'a str> {
    current
        .keys()
        .filter(|name| !previous.contains_key(*name))
        .map(String::as_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_world;
    use crate::world::{Attributes, place_object};

    fn setup() -> (World, Placements, Player) {
        let world = test_world();
        let player = Player::placed(&world, "hall", 50.0, 50.0, Attributes::new()).unwrap();
        (world, Placements::new(), player)
    }

    #[test]
    fn object_inside_trigger_distance_is_found() {
        let (world, mut placements, player) = setup();
        place_object(&world, &mut placements, "chest", "hall", 55.0, 50.0).unwrap();

        let near = nearby_objects(&world, &placements, &player);
        assert_eq!(near.get("chest"), Some(&Nearby { distance: 5.0 }));
    }

    #[test]
    fn trigger_distance_is_exclusive() {
        let (world, mut placements, player) = setup();
        place_object(&world, &mut placements, "chest", "hall", 70.0, 50.0).unwrap();
        assert!(nearby_objects(&world, &placements, &player).is_empty());

        place_object(&world, &mut placements, "chest", "hall", 69.9, 50.0).unwrap();
        assert!(nearby_objects(&world, &placements, &player).contains_key("chest"));
    }

    #[test]
    fn other_rooms_and_hidden_objects_are_excluded() {
        let (world, mut placements, mut player) = setup();
        place_object(&world, &mut placements, "chest", "cellar", 5.0, 5.0).unwrap();
        place_object(&world, &mut placements, "lamp", "hall", 51.0, 50.0).unwrap();

        assert!(nearby_objects(&world, &placements, &player).is_empty());

        player.attributes.insert("oil".to_string(), 1.0);
        let near = nearby_objects(&world, &placements, &player);
        assert_eq!(near.keys().collect::<Vec<_>>(), vec!["lamp"]);
    }

    #[test]
    fn newly_visible_lists_only_additions() {
        let mut before = Options::new();
        before.insert("chest".to_string(), Nearby { distance: 1.0 });
        let mut after = before.clone();
        after.insert("lamp".to_string(), Nearby { distance: 2.0 });

        assert_eq!(newly_visible(&before, &after), vec!["lamp"]);
        assert!(newly_visible(&after, &before).is_empty());
    }
}
