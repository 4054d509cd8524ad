use std::collections::HashMap;

use tracing::debug;

use super::model::{Attributes, Options, Player, Point, Room, World};
use crate::error::PlacementError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement<'a> {
    pub room: &'a str,
    pub position: Point,
}

/// Authoritative object -> (room, position) map.
///
/// An object name has at most one entry, so placing it somewhere new removes
/// it from wherever it was before.
#[derive(Debug, Default, Clone)]
pub struct Placements {
    by_object: HashMap<String, (String, Point)>,
}

impl Placements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, object: &str) -> Option<Placement<'_>> {
        self.by_object.get(object).map(|(room, position)| Placement {
            room: room.as_str(),
            position: *position,
        })
    }

    pub fn room_of(&self, object: &str) -> Option<&str> {
        self.by_object.get(object).map(|(room, _)| room.as_str())
    }

    /// Objects currently placed in `room`, sorted by name.
    pub fn in_room(&self, room: &str) -> Vec<(&str, Point)> {
        let mut found: Vec<(&str, Point)> = self
            .by_object
            .iter()
            .filter(|(_, (r, _))| r == room)
            .map(|(name, (_, pos))| (name.as_str(), *pos))
            .collect();
        found.sort_by(|a, b| a.0.cmp(b.0));
        found
    }

    pub fn len(&self) -> usize {
        self.by_object.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_object.is_empty()
    }
}

fn fitting_room<'a>(world: &'a World, room: &str, x: f64, y: f64) -> Result<&'a Room, PlacementError> {
    let target = world
        .rooms
        .get(room)
        .ok_or_else(|| PlacementError::UnknownRoom(room.to_string()))?;

    if !target.size.contains(Point::new(x, y)) {
        return Err(PlacementError::OutOfBounds {
            room: room.to_string(),
            x,
            y,
            width: target.size.width,
            height: target.size.height,
        });
    }

    Ok(target)
}

impl Player {
    /// Create the player already standing in `room`.
    pub fn placed(
        world: &World,
        room: &str,
        x: f64,
        y: f64,
        attributes: Attributes,
    ) -> Result<Player, PlacementError> {
        fitting_room(world, room, x, y)?;
        Ok(Player {
            position: Point::new(x, y),
            angle: None,
            room: room.to_string(),
            attributes,
            options: Options::new(),
        })
    }
}

/// Move the player into `room` at `(x, y)`. On error nothing changes.
pub fn place_player(
    world: &World,
    player: &mut Player,
    room: &str,
    x: f64,
    y: f64,
) -> Result<(), PlacementError> {
    fitting_room(world, room, x, y)?;

    player.room = room.to_string();
    player.position = Point::new(x, y);
    debug!(room, x, y, "player placed");
    Ok(())
}

/// Put `object` into `room` at `(x, y)`, removing it from any other room.
pub fn place_object(
    world: &World,
    placements: &mut Placements,
    object: &str,
    room: &str,
    x: f64,
    y: f64,
) -> Result<(), PlacementError> {
    fitting_room(world, room, x, y)?;
    if !world.objects.contains_key(object) {
        return Err(PlacementError::UnknownObject(object.to_string()));
    }

    placements
        .by_object
        .insert(object.to_string(), (room.to_string(), Point::new(x, y)));
    debug!(object, room, x, y, "object placed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_world;

    #[test]
    fn object_moves_exclusively_between_rooms() {
        let world = test_world();
        let mut placements = Placements::new();

        place_object(&world, &mut placements, "chest", "hall", 10.0, 10.0).unwrap();
        place_object(&world, &mut placements, "chest", "cellar", 5.0, 5.0).unwrap();

        assert_eq!(placements.room_of("chest"), Some("cellar"));
        assert!(placements.in_room("hall").iter().all(|(n, _)| *n != "chest"));
        assert_eq!(placements.in_room("cellar"), vec![("chest", Point::new(5.0, 5.0))]);
    }

    #[test]
    fn replacing_in_same_room_updates_position() {
        let world = test_world();
        let mut placements = Placements::new();

        place_object(&world, &mut placements, "chest", "hall", 10.0, 10.0).unwrap();
        place_object(&world, &mut placements, "chest", "hall", 20.0, 30.0).unwrap();

        assert_eq!(placements.len(), 1);
        assert_eq!(
            placements.get("chest"),
            Some(Placement {
                room: "hall",
                position: Point::new(20.0, 30.0)
            })
        );
    }

    #[test]
    fn unknown_room_and_object_are_rejected() {
        let world = test_world();
        let mut placements = Placements::new();

        assert_eq!(
            place_object(&world, &mut placements, "chest", "attic", 1.0, 1.0),
            Err(PlacementError::UnknownRoom("attic".to_string()))
        );
        assert_eq!(
            place_object(&world, &mut placements, "ghost", "hall", 1.0, 1.0),
            Err(PlacementError::UnknownObject("ghost".to_string()))
        );
        assert!(placements.is_empty());
    }

    #[test]
    fn failed_player_placement_keeps_previous_state() {
        let world = test_world();
        let mut player = Player::placed(&world, "hall", 50.0, 50.0, Attributes::new()).unwrap();

        let err = place_player(&world, &mut player, "cellar", 41.0, 5.0).unwrap_err();
        assert!(matches!(err, PlacementError::OutOfBounds { .. }));
        assert_eq!(player.room, "hall");
        assert_eq!(player.position, Point::new(50.0, 50.0));

        assert_eq!(
            place_player(&world, &mut player, "attic", 1.0, 1.0),
            Err(PlacementError::UnknownRoom("attic".to_string()))
        );
        assert_eq!(player.room, "hall");
    }

    #[test]
    fn room_edges_are_inclusive_zero_is_not() {
        let world = test_world();
        let mut player = Player::placed(&world, "hall", 50.0, 50.0, Attributes::new()).unwrap();

        assert!(place_player(&world, &mut player, "hall", 100.0, 100.0).is_ok());
        assert!(place_player(&world, &mut player, "hall", 0.0, 10.0).is_err());
        assert_eq!(player.position, Point::new(100.0, 100.0));
    }
}
