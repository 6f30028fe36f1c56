//! Console commands issued by the reconciler.
//!
//! The exact strings belong to the game server; only their ordering within a tick matters here.
use std::fmt;

use kc_model::EntityLabel;
use rand::Rng;

/// Visual stand-in for a workload instance. Purely cosmetic.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntityKind {
    Pig,
    Cow,
    Turtle,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Pig, EntityKind::Cow, EntityKind::Turtle];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Pig => "pig",
            EntityKind::Cow => "cow",
            EntityKind::Turtle => "turtle",
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// Block coordinates where new entities appear.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            x: -201,
            y: 64,
            z: -499,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    /// Remove dropped items left behind by killed entities.
    Cleanup,
    Spawn {
        kind: EntityKind,
        position: Position,
        label: EntityLabel,
    },
    Despawn {
        label: EntityLabel,
    },
}

impl Command {
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Cleanup => f.write_str("/kill @e[type=item]"),
            Command::Spawn {
                kind,
                position: Position { x, y, z },
                label,
            } => write!(
                f,
                r#"/summon {} {x} {y} {z} {{CustomName:"\"{label}\"",CustomNameVisible:1}}"#,
                kind.as_str()
            ),
            Command::Despawn { label } => write!(f, r#"/kill @e[name="\"{label}\""]"#),
        }
    }
}
