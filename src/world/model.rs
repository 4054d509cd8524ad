use std::collections::{BTreeMap, HashMap};

use crate::config::EngineConfig;

//////////////////////////////
/// GAME STRUCTS AND ENUMS ///
//////////////////////////////

/// Named numeric player attributes (`gold`, `hp`, `has_key`, ...).
pub type Attributes = HashMap<String, f64>;

/// Attribute name -> predicate string such as `"<5"`. All entries are ANDed.
pub type Conditions = BTreeMap<String, String>;

/// Proximity snapshot keyed by object name, ordered by name.
pub type Options = BTreeMap<String, Nearby>;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// Placement bounds: `0 < x <= width`, `0 < y <= height`.
    pub fn contains(&self, p: Point) -> bool {
        p.x > 0.0 && p.x <= self.width && p.y > 0.0 && p.y <= self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// A room name plus a position inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub room: String,
    pub x: f64,
    pub y: f64,
}

/// Static world definitions, built once by the loader.
#[derive(Debug)]
pub struct World {
    pub settings: Settings,
    pub engine: EngineConfig,
    pub rooms: HashMap<String, Room>,
    pub objects: HashMap<String, WorldObject>,
}

#[derive(Debug)]
pub struct Settings {
    pub player_start: Location,
    pub player_attributes: Attributes,
}

#[derive(Debug)]
pub struct Room {
    pub name: String,
    pub size: Size,
    pub sound_file: Option<String>,
}

#[derive(Debug)]
pub struct WorldObject {
    pub name: String,
    pub trigger_distance: f64,
    pub conditions: Conditions,
    pub sound_file: String,
    pub ambient_sound_file: Option<String>,
    pub ambient_sound_on: bool,
    pub choices: Vec<Choice>,
    pub starting_position: Option<Location>,
}

#[derive(Debug, Clone)]
pub struct Choice {
    pub conditions: Conditions,
    pub sound_file: String,
    pub action: Action,
}

#[derive(Debug, Clone, Default)]
pub struct Action {
    pub sound_file: String,
    /// Attribute name -> delta string: `"=5"`, `"+2"`, `"-1"`.
    pub attributes: BTreeMap<String, String>,
    /// Object name -> start (`true`) or stop (`false`) its ambient loop.
    pub sound_triggers: BTreeMap<String, bool>,
    pub move_player: Option<Location>,
    pub place_objects: BTreeMap<String, Location>,
}

/// The single player of a session.
#[derive(Debug, Clone)]
pub struct Player {
    pub position: Point,
    /// Heading of the last movement, in radians.
    pub angle: Option<f64>,
    pub room: String,
    pub attributes: Attributes,
    /// Proximity snapshot stored by the last tick.
    pub options: Options,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearby {
    pub distance: f64,
}
