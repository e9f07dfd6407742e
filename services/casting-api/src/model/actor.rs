use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub name: String,
    pub age: i32,
    pub gender: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActor {
    pub name: String,
    pub age: i32,
    pub gender: String,
}

/// Fields to overwrite on an existing actor; `None` leaves the field as is.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct ActorPatch {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
}

impl ActorPatch {
    pub fn apply(self, actor: &mut Actor) {
        if let Some(name) = self.name {
            actor.name = name;
        }
        if let Some(age) = self.age {
            actor.age = age;
        }
        if let Some(gender) = self.gender {
            actor.gender = gender;
        }
    }
}
