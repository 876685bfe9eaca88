//! Compiled form of a project's objects and event trees.
//!
//! The document nests item lists inside `IfBlock`s. For execution the
//! [`Program`] flattens every list into an arena: items become [`Node`]s
//! addressed by [`ItemId`], and each ordered list becomes a `Vec<ItemId>`
//! addressed by [`ListId`]. A suspended `wait` then only has to remember
//! `(ListId, next index)` pairs, and queued spawn/destroy effects never hold
//! references into the tree.
//!
//! The program is built once per run and shared behind an `Arc`, so the
//! interpreter can read it while mutating the world.

use std::sync::Arc;

use bevy_ecs::prelude::Resource;
use glam::Vec2;
use rustc_hash::FxHashMap;

use crate::error::RuntimeError;
use crate::project::{Action, Condition, EventKind, Item, Project, Variable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectIndex(pub u32);

/// One arena entry.
#[derive(Debug, Clone)]
pub enum Node {
    Action(Action),
    If {
        condition: Condition,
        then_list: ListId,
        else_list: ListId,
    },
}

#[derive(Debug, Clone)]
pub struct CompiledEvent {
    pub kind: EventKind,
    pub body: ListId,
}

#[derive(Debug, Clone)]
pub struct CompiledObject {
    pub id: String,
    pub name: String,
    pub solid: bool,
    /// Collision box size resolved from explicit size, sprite, or default.
    pub size: Vec2,
    pub variables: Vec<Variable>,
    /// Events in declaration order; an index here is the event's slot.
    pub events: Vec<CompiledEvent>,
}

impl CompiledObject {
    /// Slots of events matching `pred`, in declaration order.
    pub fn slots_where(&self, pred: impl Fn(&EventKind) -> bool) -> Vec<usize> {
        self.events
            .iter()
            .enumerate()
            .filter(|(_, e)| pred(&e.kind))
            .map(|(i, _)| i)
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Program {
    nodes: Vec<Node>,
    lists: Vec<Vec<ItemId>>,
    objects: Vec<CompiledObject>,
    object_index: FxHashMap<String, ObjectIndex>,
}

impl Program {
    /// Compile every object of `project`. Objects without an explicit size
    /// or a sprite get `default_size`.
    ///
    /// Fails on a `spriteId` the project does not declare, and on a
    /// Collision target or Custom source filter naming a missing object.
    pub fn compile(project: &Project, default_size: Vec2) -> Result<Self, RuntimeError> {
        let mut program = Program::default();
        for (i, object) in project.objects.iter().enumerate() {
            program
                .object_index
                .insert(object.id.clone(), ObjectIndex(i as u32));
        }

        for object in &project.objects {
            let sprite = match object.sprite_id.as_deref() {
                Some(id) => Some(
                    project
                        .sprite(id)
                        .ok_or_else(|| RuntimeError::UnknownSprite(id.to_string()))?,
                ),
                None => None,
            };
            let width = object
                .width
                .or(sprite.map(|s| s.width))
                .unwrap_or(default_size.x);
            let height = object
                .height
                .or(sprite.map(|s| s.height))
                .unwrap_or(default_size.y);

            let mut events = Vec::with_capacity(object.events.len());
            for event in &object.events {
                program.check_object_refs(&event.kind)?;
                events.push(CompiledEvent {
                    kind: event.kind.clone(),
                    body: program.compile_list(&event.items),
                });
            }

            program.objects.push(CompiledObject {
                id: object.id.clone(),
                name: object.name.clone(),
                solid: object.solid,
                size: Vec2::new(width, height),
                variables: object.variables.clone(),
                events,
            });
        }
        Ok(program)
    }

    fn check_object_refs(&self, kind: &EventKind) -> Result<(), RuntimeError> {
        let referenced = match kind {
            EventKind::Collision { target } => Some(target),
            EventKind::Custom {
                source_object: Some(source),
                ..
            } => Some(source),
            _ => None,
        };
        match referenced {
            Some(id) if self.object_index(id).is_none() => {
                Err(RuntimeError::UnknownObject(id.clone()))
            }
            _ => Ok(()),
        }
    }

    fn compile_list(&mut self, items: &[Item]) -> ListId {
        let ids = items
            .iter()
            .map(|item| {
                let node = match item {
                    Item::Action(action) => Node::Action(action.clone()),
                    Item::If(block) => Node::If {
                        condition: block.condition.clone(),
                        then_list: self.compile_list(&block.then_actions),
                        else_list: self.compile_list(&block.else_actions),
                    },
                };
                let id = ItemId(self.nodes.len() as u32);
                self.nodes.push(node);
                id
            })
            .collect();
        let list = ListId(self.lists.len() as u32);
        self.lists.push(ids);
        list
    }

    pub fn list(&self, id: ListId) -> &[ItemId] {
        &self.lists[id.0 as usize]
    }

    pub fn node(&self, id: ItemId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    pub fn object(&self, index: ObjectIndex) -> &CompiledObject {
        &self.objects[index.0 as usize]
    }

    pub fn object_index(&self, id: &str) -> Option<ObjectIndex> {
        self.object_index.get(id).copied()
    }
}

/// Resource holding the program of the current run.
#[derive(Resource, Debug, Clone, Default)]
pub struct ProgramRes(pub Arc<Program>);

/// Resource holding the document of the current run, for room lookups.
#[derive(Resource, Debug, Clone, Default)]
pub struct ProjectRes(pub Arc<Project>);
