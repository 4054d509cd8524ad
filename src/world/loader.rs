use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use super::model::{
    Action, Attributes, Choice, Conditions, Location, Room, Settings, Size, World, WorldObject,
};
use crate::config::EngineConfig;
use crate::error::LoadError;

////////////////////
/// TOML STRUCTS ///
////////////////////

#[derive(Deserialize)]
struct WorldFile {
    settings: SettingsConfig,
    #[serde(default)]
    engine: EngineConfig,
    #[serde(default)]
    room: Vec<RoomConfig>, // [[room]] blocks
    #[serde(default)]
    object: Vec<ObjectConfig>, // [[object]] blocks
}

/// Extra room/object files listed by `settings.room_files` / `object_files`.
#[derive(Deserialize)]
struct FragmentFile {
    #[serde(default)]
    room: Vec<RoomConfig>,
    #[serde(default)]
    object: Vec<ObjectConfig>,
}

#[derive(Deserialize)]
struct SettingsConfig {
    player_start: LocationConfig,
    #[serde(default)]
    player_attributes: Attributes,
    #[serde(default)]
    room_files: Vec<String>,
    #[serde(default)]
    object_files: Vec<String>,
}

#[derive(Deserialize, Clone)]
struct LocationConfig {
    room: String,
    x: f64,
    y: f64,
}

#[derive(Deserialize)]
struct RoomConfig {
    name: String,
    width: f64,
    height: f64,
    #[serde(default)]
    sound_file: Option<String>,
}

#[derive(Deserialize)]
struct ObjectConfig {
    name: String,
    sound_file: String,
    trigger_distance: f64,

    #[serde(default)]
    conditions: Conditions,

    #[serde(default)]
    ambient_sound_file: Option<String>,

    #[serde(default)]
    ambient_sound_on: bool,

    #[serde(default)]
    starting_position: Option<LocationConfig>,

    #[serde(default)]
    choice: Vec<ChoiceConfig>, // [[object.choice]]
}

#[derive(Deserialize)]
struct ChoiceConfig {
    sound_file: String,

    #[serde(default)]
    conditions: Conditions,

    action: ActionConfig,
}

#[derive(Deserialize)]
struct ActionConfig {
    sound_file: String,

    #[serde(default)]
    attributes: BTreeMap<String, String>,

    #[serde(default)]
    sound_triggers: BTreeMap<String, bool>,

    #[serde(default)]
    move_player: Option<LocationConfig>,

    #[serde(default)]
    place_objects: BTreeMap<String, LocationConfig>,
}

impl From<LocationConfig> for Location {
    fn from(l: LocationConfig) -> Self {
        Location {
            room: l.room,
            x: l.x,
            y: l.y,
        }
    }
}

/////////////////////////////
/// TOML PARSER FUNCTIONS ///
/////////////////////////////

/// Load a world from a single TOML document. `room_files`/`object_files`
/// are not followed; use [`load_world_from_file`] for multi-file worlds.
pub fn load_world_from_str(contents: &str) -> Result<World, LoadError> {
    let world_file = parse::<WorldFile>(contents, Path::new("<string>"))?;
    if !world_file.settings.room_files.is_empty() || !world_file.settings.object_files.is_empty() {
        return Err(LoadError::Invalid(
            "room_files/object_files need a file path to resolve against".to_string(),
        ));
    }
    build_world(world_file, Vec::new())
}

/// Load a world from a .toml file on disk, following its fragment files
/// relative to the file's directory.
pub fn load_world_from_file(path: &Path) -> Result<World, LoadError> {
    let contents = read(path)?;
    let world_file = parse::<WorldFile>(&contents, path)?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let mut fragments = Vec::new();
    let listed = world_file
        .settings
        .room_files
        .iter()
        .chain(world_file.settings.object_files.iter());

    for rel in listed {
        let fragment_path: PathBuf = base.join(rel);
        let text = read(&fragment_path)?;
        fragments.push(parse::<FragmentFile>(&text, &fragment_path)?);
    }

    build_world(world_file, fragments)
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse<T: for<'de> Deserialize<'de>>(contents: &str, path: &Path) -> Result<T, LoadError> {
    toml::from_str(contents).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn build_world(world_file: WorldFile, fragments: Vec<FragmentFile>) -> Result<World, LoadError> {
    let mut room_cfgs = world_file.room;
    let mut object_cfgs = world_file.object;
    for fragment in fragments {
        room_cfgs.extend(fragment.room);
        object_cfgs.extend(fragment.object);
    }

    // Build rooms map
    let mut rooms: HashMap<String, Room> = HashMap::new();

    for rc in room_cfgs {
        if rc.name.trim().is_empty() {
            return Err(LoadError::Invalid("room.name may not be empty".to_string()));
        }
        if rooms.contains_key(&rc.name) {
            return Err(LoadError::Invalid(format!("Duplicate room name: {}", rc.name)));
        }

        rooms.insert(
            rc.name.clone(),
            Room {
                name: rc.name,
                size: Size {
                    width: rc.width,
                    height: rc.height,
                },
                sound_file: non_empty(rc.sound_file),
            },
        );
    }

    // The engine cannot start without somewhere to put the player
    let start = world_file.settings.player_start;
    if !rooms.contains_key(&start.room) {
        return Err(LoadError::Invalid(format!(
            "player_start room '{}' not found among rooms",
            start.room
        )));
    }

    // Build objects map
    let mut objects: HashMap<String, WorldObject> = HashMap::new();

    for oc in object_cfgs {
        if oc.name.trim().is_empty() {
            return Err(LoadError::Invalid("object.name may not be empty".to_string()));
        }
        if objects.contains_key(&oc.name) {
            return Err(LoadError::Invalid(format!("Duplicate object name: {}", oc.name)));
        }

        let choices = oc.choice.into_iter().map(build_choice).collect();

        objects.insert(
            oc.name.clone(),
            WorldObject {
                name: oc.name,
                trigger_distance: oc.trigger_distance,
                conditions: oc.conditions,
                sound_file: oc.sound_file,
                ambient_sound_file: non_empty(oc.ambient_sound_file),
                ambient_sound_on: oc.ambient_sound_on,
                choices,
                starting_position: oc.starting_position.map(Location::from),
            },
        );
    }

    Ok(World {
        settings: Settings {
            player_start: start.into(),
            player_attributes: world_file.settings.player_attributes,
        },
        engine: world_file.engine,
        rooms,
        objects,
    })
}

fn build_choice(cc: ChoiceConfig) -> Choice {
    let ac = cc.action;
    Choice {
        conditions: cc.conditions,
        sound_file: cc.sound_file,
        action: Action {
            sound_file: ac.sound_file,
            attributes: ac.attributes,
            sound_triggers: ac.sound_triggers,
            move_player: ac.move_player.map(Location::from),
            place_objects: ac
                .place_objects
                .into_iter()
                .map(|(name, loc)| (name, loc.into()))
                .collect(),
        },
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}
