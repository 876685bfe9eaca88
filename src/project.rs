//! Project document model.
//!
//! A [`Project`] is the declarative input of a run: global variables, object
//! definitions with their event/action trees, rooms with instance
//! placements, and resource metadata. Documents arrive as JSON produced and
//! validated by the authoring layer; this module only deserializes them.
//!
//! # Document shape
//!
//! ```json
//! {
//!   "version": 1,
//!   "variables": [{ "id": "lives", "name": "Lives", "type": "number", "initial": 3 }],
//!   "objects": [{
//!     "id": "player", "name": "Player", "solid": true, "width": 16, "height": 16,
//!     "events": [{ "type": "step", "items": [
//!       { "kind": "action", "type": "move", "dx": { "literal": 1 }, "dy": { "literal": 0 } }
//!     ]}]
//!   }],
//!   "rooms": [{ "id": "main", "name": "Main", "width": 320, "height": 240,
//!     "instances": [{ "id": "p1", "objectId": "player", "x": 10, "y": 10 }] }]
//! }
//! ```
//!
//! The interpreter never mutates a `Project`; it compiles one into a
//! [`Program`](crate::resources::program::Program) at run start.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RuntimeError;

/// Declared type of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VarType {
    Number,
    String,
    Boolean,
}

/// A runtime value. Serialized untagged so literals read naturally in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Default for Value {
    fn default() -> Self {
        Value::Number(0.0)
    }
}

/// A typed variable declaration, global or per object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub var_type: VarType,
    #[serde(default)]
    pub initial: Value,
}

/// Where a variable reference is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Scope {
    Global,
    Object,
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Global => write!(f, "global"),
            Scope::Object => write!(f, "object"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableRef {
    pub scope: Scope,
    pub id: String,
}

impl VariableRef {
    pub fn global(id: impl Into<String>) -> Self {
        Self {
            scope: Scope::Global,
            id: id.into(),
        }
    }

    pub fn object(id: impl Into<String>) -> Self {
        Self {
            scope: Scope::Object,
            id: id.into(),
        }
    }
}

/// Which edge of a key an input operand reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyState {
    #[default]
    Held,
    Pressed,
    Released,
}

/// Right- or left-hand side of a condition, or a numeric action field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    Literal {
        literal: Value,
    },
    Variable {
        variable: VariableRef,
    },
    Key {
        key: String,
        #[serde(default)]
        state: KeyState,
    },
}

impl Operand {
    pub fn number(n: f64) -> Self {
        Operand::Literal {
            literal: Value::Number(n),
        }
    }

    pub fn text(s: impl Into<String>) -> Self {
        Operand::Literal {
            literal: Value::Text(s.into()),
        }
    }

    pub fn boolean(b: bool) -> Self {
        Operand::Literal {
            literal: Value::Bool(b),
        }
    }

    pub fn var(variable: VariableRef) -> Self {
        Operand::Variable { variable }
    }

    pub fn key(key: impl Into<String>, state: KeyState) -> Self {
        Operand::Key {
            key: key.into(),
            state,
        }
    }
}

/// Comparison operator of an [`IfBlock`] condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub left: Operand,
    pub op: CmpOp,
    pub right: Operand,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IfBlock {
    pub condition: Condition,
    #[serde(default)]
    pub then_actions: Vec<Item>,
    #[serde(default)]
    pub else_actions: Vec<Item>,
}

/// One entry of an event's ordered item list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Item {
    Action(Action),
    If(IfBlock),
}

/// Animation used when switching rooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransitionKind {
    #[default]
    None,
    Fade,
    SlideLeft,
    SlideRight,
}

/// How `changeVariable` combines the current value with the operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeOp {
    #[default]
    Set,
    Add,
    Subtract,
    Multiply,
    Divide,
    Toggle,
}

/// Every executable effect. The interpreter matches this exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Action {
    Move {
        dx: Operand,
        dy: Operand,
    },
    SetVelocity {
        vx: Operand,
        vy: Operand,
    },
    Rotate {
        degrees: Operand,
    },
    MoveToward {
        x: Operand,
        y: Operand,
        speed: Operand,
    },
    ClampToRoom,
    Teleport {
        x: Operand,
        y: Operand,
    },
    DestroySelf,
    DestroyOther,
    SpawnObject {
        object_id: String,
        x: Operand,
        y: Operand,
        #[serde(default)]
        relative: bool,
    },
    ChangeScore {
        delta: Operand,
    },
    EndGame {
        #[serde(default)]
        message: String,
    },
    Message {
        text: String,
        #[serde(default)]
        duration_ms: Option<Operand>,
    },
    PlaySound {
        sound_id: String,
    },
    ChangeVariable {
        target: VariableRef,
        #[serde(default)]
        op: ChangeOp,
        value: Operand,
    },
    RandomizeVariable {
        target: VariableRef,
        min: Operand,
        max: Operand,
        #[serde(default)]
        integer: bool,
    },
    CopyVariable {
        source: VariableRef,
        target: VariableRef,
    },
    GoToRoom {
        room_id: String,
        #[serde(default)]
        transition: TransitionKind,
    },
    RestartRoom {
        #[serde(default)]
        transition: TransitionKind,
    },
    Wait {
        duration_ms: Operand,
    },
    EmitCustomEvent {
        name: String,
    },
}

/// Trigger kind of an [`Event`], with the data each kind needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EventKind {
    Create,
    Step,
    Collision {
        target: String,
    },
    Custom {
        name: String,
        #[serde(default)]
        source_object: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(flatten)]
    pub kind: EventKind,
    #[serde(default)]
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDefinition {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sprite_id: Option<String>,
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
    #[serde(default)]
    pub solid: bool,
    #[serde(default)]
    pub variables: Vec<Variable>,
    #[serde(default)]
    pub events: Vec<Event>,
}

/// Placement of one instance in a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstancePlacement {
    pub id: String,
    pub object_id: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub layer: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDefinition {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub instances: Vec<InstancePlacement>,
}

/// Sprite metadata. Only the dimensions matter to the runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpriteResource {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundResource {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub variables: Vec<Variable>,
    #[serde(default)]
    pub objects: Vec<ObjectDefinition>,
    #[serde(default)]
    pub rooms: Vec<RoomDefinition>,
    #[serde(default)]
    pub sprites: Vec<SpriteResource>,
    #[serde(default)]
    pub sounds: Vec<SoundResource>,
}

impl Project {
    /// Parse a project document from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, RuntimeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a project document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RuntimeError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn room(&self, id: &str) -> Option<&RoomDefinition> {
        self.rooms.iter().find(|r| r.id == id)
    }

    pub fn object(&self, id: &str) -> Option<&ObjectDefinition> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn sprite(&self, id: &str) -> Option<&SpriteResource> {
        self.sprites.iter().find(|s| s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_if_blocks_and_actions() {
        let json = r#"{
            "version": 2,
            "variables": [{ "id": "score", "type": "number", "initial": 0 }],
            "objects": [{
                "id": "player",
                "solid": true,
                "events": [
                    { "type": "step", "items": [
                        { "kind": "if",
                          "condition": {
                              "left": { "key": "ArrowRight", "state": "held" },
                              "op": "==",
                              "right": { "literal": true }
                          },
                          "thenActions": [
                              { "kind": "action", "type": "move",
                                "dx": { "literal": 2 }, "dy": { "literal": 0 } }
                          ],
                          "elseActions": [
                              { "kind": "action", "type": "wait", "durationMs": { "literal": 100 } }
                          ]
                        }
                    ]},
                    { "type": "collision", "target": "wall", "items": [
                        { "kind": "action", "type": "goToRoom", "roomId": "b", "transition": "slideLeft" }
                    ]},
                    { "type": "custom", "name": "boom", "sourceObject": "bomb", "items": [] }
                ]
            }],
            "rooms": [{ "id": "a", "width": 100, "height": 80,
                "instances": [{ "id": "i1", "objectId": "player", "x": 1, "y": 2, "layer": 3 }] }]
        }"#;

        let project = Project::from_json_str(json).unwrap();
        assert_eq!(project.version, 2);
        let player = project.object("player").unwrap();
        assert!(player.solid);
        assert_eq!(player.events.len(), 3);
        assert_eq!(player.events[0].kind, EventKind::Step);
        assert_eq!(
            player.events[1].kind,
            EventKind::Collision {
                target: "wall".into()
            }
        );
        assert_eq!(
            player.events[2].kind,
            EventKind::Custom {
                name: "boom".into(),
                source_object: Some("bomb".into())
            }
        );

        let Item::If(block) = &player.events[0].items[0] else {
            panic!("expected if block");
        };
        assert_eq!(block.condition.op, CmpOp::Eq);
        assert_eq!(
            block.condition.left,
            Operand::key("ArrowRight", KeyState::Held)
        );
        assert_eq!(block.then_actions.len(), 1);
        assert!(matches!(
            block.else_actions[0],
            Item::Action(Action::Wait { .. })
        ));

        let Item::Action(Action::GoToRoom {
            room_id,
            transition,
        }) = &player.events[1].items[0]
        else {
            panic!("expected goToRoom");
        };
        assert_eq!(room_id, "b");
        assert_eq!(*transition, TransitionKind::SlideLeft);

        let room = project.room("a").unwrap();
        assert_eq!(room.instances[0].layer, Some(3));
    }

    #[test]
    fn unit_actions_and_defaults() {
        let json = r#"[
            { "kind": "action", "type": "destroySelf" },
            { "kind": "action", "type": "clampToRoom" },
            { "kind": "action", "type": "restartRoom" },
            { "kind": "action", "type": "changeVariable",
              "target": { "scope": "object", "id": "hp" },
              "value": { "literal": "5" } }
        ]"#;
        let items: Vec<Item> = serde_json::from_str(json).unwrap();
        assert_eq!(items[0], Item::Action(Action::DestroySelf));
        assert_eq!(items[1], Item::Action(Action::ClampToRoom));
        assert_eq!(
            items[2],
            Item::Action(Action::RestartRoom {
                transition: TransitionKind::None
            })
        );
        let Item::Action(Action::ChangeVariable { target, op, value }) = &items[3] else {
            panic!("expected changeVariable");
        };
        assert_eq!(*target, VariableRef::object("hp"));
        assert_eq!(*op, ChangeOp::Set);
        assert_eq!(*value, Operand::text("5"));
    }

    #[test]
    fn unknown_action_type_is_a_document_error() {
        let err = Project::from_json_str(
            r#"{ "objects": [{ "id": "o", "events": [{ "type": "step", "items": [
                { "kind": "action", "type": "fly" } ] }] }] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, RuntimeError::Document(_)));
    }
}
