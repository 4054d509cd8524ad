use thiserror::Error;

use super::model::{Action, Conditions, Location, Point, World};
use crate::engine::Predicate;
use crate::engine::actions::Delta;

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    fn new(msg: impl Into<String>) -> Self {
        ValidationError {
            message: msg.into(),
        }
    }
}

pub fn validate_world(world: &World) -> Vec<ValidationError> {
    let mut errors: Vec<ValidationError> = Vec::new();

    // Rooms must not be empty
    if world.rooms.is_empty() {
        errors.push(ValidationError::new("world has no rooms"));
    }

    for (name, room) in &world.rooms {
        if room.size.width <= 0.0 || room.size.height <= 0.0 {
            errors.push(ValidationError::new(format!(
                "room '{}' has a non-positive size {} x {}",
                name, room.size.width, room.size.height
            )));
        }
    }

    // Player start must exist and fit
    validate_location(
        world,
        &world.settings.player_start,
        "player_start",
        &mut errors,
    );

    for (name, object) in &world.objects {
        if object.trigger_distance <= 0.0 {
            errors.push(ValidationError::new(format!(
                "object '{}' has a non-positive trigger_distance",
                name
            )));
        }

        if let Some(start) = &object.starting_position {
            validate_location(
                world,
                start,
                &format!("object '{}' starting_position", name),
                &mut errors,
            );
        }

        validate_conditions(&object.conditions, &format!("object '{}'", name), &mut errors);

        for (i, choice) in object.choices.iter().enumerate() {
            let label = format!("object '{}' choice {}", name, i + 1);
            validate_conditions(&choice.conditions, &label, &mut errors);
            validate_action(world, &choice.action, &label, &mut errors);
        }
    }

    errors
}

fn validate_location(world: &World, loc: &Location, label: &str, errors: &mut Vec<ValidationError>) {
    match world.rooms.get(&loc.room) {
        None => errors.push(ValidationError::new(format!(
            "{} room '{}' not found",
            label, loc.room
        ))),
        Some(room) => {
            if !room.size.contains(Point::new(loc.x, loc.y)) {
                errors.push(ValidationError::new(format!(
                    "{} ({}, {}) is outside room '{}'",
                    label, loc.x, loc.y, loc.room
                )));
            }
        }
    }
}

fn validate_conditions(conditions: &Conditions, label: &str, errors: &mut Vec<ValidationError>) {
    for (attribute, raw) in conditions {
        if let Err(e) = raw.parse::<Predicate>() {
            errors.push(ValidationError::new(format!(
                "{} condition '{}' = '{}': {}",
                label, attribute, raw, e
            )));
        }
    }
}

fn validate_action(world: &World, action: &Action, label: &str, errors: &mut Vec<ValidationError>) {
    for (attribute, raw) in &action.attributes {
        if let Err(e) = raw.parse::<Delta>() {
            errors.push(ValidationError::new(format!(
                "{} action attribute '{}' = '{}': {}",
                label, attribute, raw, e
            )));
        }
    }

    for target in action.sound_triggers.keys() {
        match world.objects.get(target) {
            None => errors.push(ValidationError::new(format!(
                "{} sound trigger references missing object '{}'",
                label, target
            ))),
            Some(obj) if obj.ambient_sound_file.is_none() => {
                errors.push(ValidationError::new(format!(
                    "{} sound trigger object '{}' has no ambient_sound_file",
                    label, target
                )))
            }
            Some(_) => {}
        }
    }

    if let Some(dest) = &action.move_player {
        validate_location(world, dest, &format!("{} move_player", label), errors);
    }

    for (object, dest) in &action.place_objects {
        if !world.objects.contains_key(object) {
            errors.push(ValidationError::new(format!(
                "{} place_objects references missing object '{}'",
                label, object
            )));
        }
        validate_location(world, dest, &format!("{} place_objects '{}'", label, object), errors);
    }
}
