//! Casting domain records and the change payloads the store accepts.
mod actor;
mod movie;

pub use actor::{Actor, ActorPatch, NewActor};
pub use movie::{Movie, MoviePatch, NewMovie, RELEASE_DATE_FORMAT, parse_release_date};
