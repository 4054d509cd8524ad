mod loader;
mod model;
mod placement;
mod validator;

pub use loader::{load_world_from_file, load_world_from_str};

pub use model::{
    Action, Attributes, Choice, Conditions, Location, Nearby, Options, Player, Point, Room,
    Settings, Size, World, WorldObject,
};
pub use placement::{Placement, Placements, place_object, place_player};
pub use validator::{ValidationError, validate_world};
