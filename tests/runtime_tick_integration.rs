//! Runtime tick integration tests: event dispatch order, waits, collisions,
//! deferred spawn/destroy, room transitions, custom events, and errors.

use serde_json::{Value as Json, json};

use playforge::error::RuntimeError;
use playforge::project::{InstancePlacement, Project, Value};
use playforge::resources::runstate::RunState;
use playforge::resources::runtimeconfig::RuntimeConfig;
use playforge::runtime::Runtime;

const TICK: f64 = 20.0;
const EPSILON: f32 = 1e-4;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn lit(v: Json) -> Json {
    json!({ "literal": v })
}

fn global(id: &str) -> Json {
    json!({ "scope": "global", "id": id })
}

fn act(mut v: Json) -> Json {
    v["kind"] = json!("action");
    v
}

fn score(delta: f64) -> Json {
    act(json!({ "type": "changeScore", "delta": lit(json!(delta)) }))
}

fn add_global(id: &str, delta: f64) -> Json {
    act(json!({
        "type": "changeVariable", "target": global(id), "op": "add", "value": lit(json!(delta))
    }))
}

fn set_global(id: &str, value: Json) -> Json {
    act(json!({ "type": "changeVariable", "target": global(id), "op": "set", "value": lit(value) }))
}

fn object(id: &str, solid: bool, events: Json) -> Json {
    json!({ "id": id, "name": id, "width": 32, "height": 32, "solid": solid, "events": events })
}

fn place(id: &str, object_id: &str, x: f32, y: f32) -> Json {
    json!({ "id": id, "objectId": object_id, "x": x, "y": y })
}

fn room(id: &str, instances: Json) -> Json {
    json!({ "id": id, "name": id, "width": 320, "height": 240, "instances": instances })
}

fn project(variables: Json, objects: Json, rooms: Json) -> Project {
    serde_json::from_value(json!({
        "version": 1, "variables": variables, "objects": objects, "rooms": rooms
    }))
    .unwrap()
}

fn started(project: &Project, room_id: &str) -> Runtime {
    started_with(RuntimeConfig::new().with_seed(7), project, room_id)
}

fn started_with(config: RuntimeConfig, project: &Project, room_id: &str) -> Runtime {
    let mut runtime = Runtime::new(config);
    runtime.start(project, room_id).unwrap();
    runtime
}

fn run_ticks(runtime: &mut Runtime, n: usize) {
    for _ in 0..n {
        runtime.tick(TICK).unwrap();
    }
}

fn global_value(runtime: &mut Runtime, id: &str) -> Value {
    runtime.snapshot().globals[id].clone()
}

#[test]
fn start_places_instances_in_order() {
    let p = project(
        json!([]),
        json!([object("a", false, json!([])), object("b", false, json!([]))]),
        json!([room(
            "r",
            json!([place("first", "b", 10.0, 20.0), place("second", "a", 30.0, 40.0)])
        )]),
    );
    let mut runtime = started(&p, "r");
    assert_eq!(runtime.state(), RunState::Running);

    let snap = runtime.snapshot();
    assert_eq!(snap.room.as_deref(), Some("r"));
    assert_eq!(snap.instances.len(), 2);
    assert_eq!(snap.instances[0].id.0, 1);
    assert_eq!(snap.instances[0].object_id, "b");
    assert_eq!(snap.instances[0].placement_id.as_deref(), Some("first"));
    assert_eq!(snap.instances[1].id.0, 2);
    assert!(approx_eq(snap.instances[1].x, 30.0));
    assert!(approx_eq(snap.instances[1].y, 40.0));
}

#[test]
fn start_with_unknown_room_fails_and_counts() {
    let p = project(json!([]), json!([]), json!([room("r", json!([]))]));
    let mut runtime = Runtime::default();
    let err = runtime.start(&p, "nope").unwrap_err();
    assert!(matches!(err, RuntimeError::UnknownRoom(_)));
    assert_eq!(runtime.error_count(), 1);
    assert_eq!(runtime.state(), RunState::Stopped);
}

#[test]
fn start_rejects_unknown_sprite_and_event_target() {
    let mut p = project(
        json!([]),
        json!([{ "id": "ghost", "spriteId": "missing-sprite", "events": [] }]),
        json!([room("r", json!([place("g", "ghost", 0.0, 0.0)]))]),
    );
    let mut runtime = Runtime::default();
    let err = runtime.start(&p, "r").unwrap_err();
    assert!(matches!(err, RuntimeError::UnknownSprite(ref id) if id == "missing-sprite"));
    assert!(err.is_configuration());
    assert_eq!(runtime.error_count(), 1);
    assert_eq!(runtime.state(), RunState::Stopped);

    p = project(
        json!([]),
        json!([object(
            "player",
            true,
            json!([{ "type": "collision", "target": "ghost", "items": [score(1.0)] }])
        )]),
        json!([room("r", json!([place("p", "player", 0.0, 0.0)]))]),
    );
    let err = runtime.start(&p, "r").unwrap_err();
    assert!(matches!(err, RuntimeError::UnknownObject(ref id) if id == "ghost"));
    assert_eq!(runtime.error_count(), 2);
    assert!(runtime.snapshot().instances.is_empty());
}

#[test]
fn placement_check_honours_exclude() {
    let p = project(
        json!([]),
        json!([object("wall", true, json!([]))]),
        json!([room("r", json!([place("w1", "wall", 100.0, 100.0)]))]),
    );
    let runtime = Runtime::default();
    let moved: InstancePlacement = serde_json::from_value(place("w1", "wall", 110.0, 100.0)).unwrap();
    assert!(runtime.placement_blocked(&p, "r", &moved, None).unwrap());
    assert!(!runtime.placement_blocked(&p, "r", &moved, Some("w1")).unwrap());
}

#[test]
fn collision_fires_once_per_ordered_pair_on_first_tick() {
    let p = project(
        json!([]),
        json!([
            object(
                "player",
                false,
                json!([{ "type": "collision", "target": "wall", "items": [score(1.0)] }])
            ),
            object("wall", true, json!([]))
        ]),
        json!([room(
            "r",
            json!([place("p", "player", 0.0, 0.0), place("w", "wall", 16.0, 0.0)])
        )]),
    );
    let mut runtime = started(&p, "r");
    runtime.tick(TICK).unwrap();
    assert_eq!(runtime.snapshot().score, 1.0);
    runtime.tick(TICK).unwrap();
    assert_eq!(runtime.snapshot().score, 2.0);
}

#[test]
fn collision_between_two_solids_fires_once_each_way() {
    let p = project(
        json!([]),
        json!([
            object(
                "player",
                true,
                json!([{ "type": "collision", "target": "wall", "items": [score(1.0)] }])
            ),
            object(
                "wall",
                true,
                json!([{ "type": "collision", "target": "player", "items": [score(10.0)] }])
            )
        ]),
        json!([room(
            "r",
            json!([place("p", "player", 0.0, 0.0), place("w", "wall", 16.0, 0.0)])
        )]),
    );
    let mut runtime = started(&p, "r");
    runtime.tick(TICK).unwrap();
    assert_eq!(runtime.snapshot().score, 11.0);
    runtime.tick(TICK).unwrap();
    assert_eq!(runtime.snapshot().score, 22.0);
}

#[test]
fn destroyed_partner_gets_no_collision_dispatch() {
    let p = project(
        json!([]),
        json!([
            object(
                "player",
                true,
                json!([{ "type": "collision", "target": "wall", "items": [
                    act(json!({ "type": "destroyOther" }))
                ]}])
            ),
            object(
                "wall",
                true,
                json!([{ "type": "collision", "target": "player", "items": [score(1.0)] }])
            )
        ]),
        json!([room(
            "r",
            json!([place("p", "player", 0.0, 0.0), place("w", "wall", 16.0, 0.0)])
        )]),
    );
    let mut runtime = started(&p, "r");
    runtime.tick(TICK).unwrap();
    let snap = runtime.snapshot();
    assert_eq!(snap.score, 0.0);
    assert_eq!(snap.instances.len(), 1);
    assert_eq!(snap.instances[0].object_id, "player");
}

#[test]
fn collision_skips_pairs_whose_other_side_was_destroyed() {
    let p = project(
        json!([]),
        json!([
            object(
                "wall",
                true,
                json!([{ "type": "collision", "target": "player", "items": [
                    act(json!({ "type": "destroySelf" }))
                ]}])
            ),
            object(
                "player",
                true,
                json!([{ "type": "collision", "target": "wall", "items": [score(1.0)] }])
            )
        ]),
        json!([room(
            "r",
            json!([place("w", "wall", 16.0, 0.0), place("p", "player", 0.0, 0.0)])
        )]),
    );
    let mut runtime = started(&p, "r");
    runtime.tick(TICK).unwrap();
    let snap = runtime.snapshot();
    assert_eq!(snap.score, 0.0);
    assert_eq!(snap.instances.len(), 1);
}

#[test]
fn overlap_between_non_solids_does_not_collide() {
    let p = project(
        json!([]),
        json!([
            object(
                "player",
                false,
                json!([{ "type": "collision", "target": "coin", "items": [score(1.0)] }])
            ),
            object("coin", false, json!([]))
        ]),
        json!([room(
            "r",
            json!([place("p", "player", 0.0, 0.0), place("c", "coin", 8.0, 8.0)])
        )]),
    );
    let mut runtime = started(&p, "r");
    run_ticks(&mut runtime, 3);
    assert_eq!(runtime.snapshot().score, 0.0);
}

#[test]
fn touching_edges_do_not_collide() {
    let p = project(
        json!([]),
        json!([
            object(
                "player",
                false,
                json!([{ "type": "collision", "target": "wall", "items": [score(1.0)] }])
            ),
            object("wall", true, json!([]))
        ]),
        json!([room(
            "r",
            json!([place("p", "player", 0.0, 0.0), place("w", "wall", 32.0, 0.0)])
        )]),
    );
    let mut runtime = started(&p, "r");
    runtime.tick(TICK).unwrap();
    assert_eq!(runtime.snapshot().score, 0.0);
}

#[test]
fn destroy_other_removes_partner_after_commit() {
    let p = project(
        json!([]),
        json!([
            object(
                "bullet",
                false,
                json!([{ "type": "collision", "target": "enemy", "items": [
                    act(json!({ "type": "destroyOther" })),
                    act(json!({ "type": "destroySelf" })),
                    score(10.0)
                ]}])
            ),
            object("enemy", true, json!([]))
        ]),
        json!([room(
            "r",
            json!([place("b", "bullet", 0.0, 0.0), place("e", "enemy", 4.0, 4.0)])
        )]),
    );
    let mut runtime = started(&p, "r");
    runtime.tick(TICK).unwrap();
    let snap = runtime.snapshot();
    assert!(snap.instances.is_empty());
    assert_eq!(snap.score, 10.0);
}

#[test]
fn wait_suspends_step_until_duration_elapses() {
    let p = project(
        json!([
            { "id": "before", "type": "number", "initial": 0 },
            { "id": "after", "type": "number", "initial": 0 }
        ]),
        json!([object(
            "timer",
            false,
            json!([{ "type": "step", "items": [
                add_global("before", 1.0),
                act(json!({ "type": "wait", "durationMs": lit(json!(500)) })),
                add_global("after", 1.0)
            ]}])
        )]),
        json!([room("r", json!([place("t", "timer", 0.0, 0.0)]))]),
    );
    let mut runtime = started(&p, "r");

    runtime.tick(TICK).unwrap();
    assert_eq!(global_value(&mut runtime, "before"), Value::Number(1.0));
    assert_eq!(runtime.snapshot().instances[0].suspended, 1);

    // 24 more ticks: 480ms elapsed since the wait was issued.
    run_ticks(&mut runtime, 24);
    assert_eq!(global_value(&mut runtime, "before"), Value::Number(1.0));
    assert_eq!(global_value(&mut runtime, "after"), Value::Number(0.0));

    // Tick 26 reaches 500ms: resume, then a fresh Step invocation.
    runtime.tick(TICK).unwrap();
    assert_eq!(global_value(&mut runtime, "after"), Value::Number(1.0));
    assert_eq!(global_value(&mut runtime, "before"), Value::Number(2.0));
}

#[test]
fn wait_inside_if_block_resumes_after_the_block() {
    let p = project(
        json!([{ "id": "trace", "type": "string", "initial": "" }]),
        json!([object(
            "o",
            false,
            json!([{ "type": "create", "items": [
                { "kind": "if",
                  "condition": { "left": lit(json!(1)), "op": "<", "right": lit(json!(2)) },
                  "thenActions": [
                      act(json!({ "type": "changeVariable", "target": global("trace"),
                                  "op": "add", "value": lit(json!("a")) })),
                      act(json!({ "type": "wait", "durationMs": lit(json!(40)) })),
                      act(json!({ "type": "changeVariable", "target": global("trace"),
                                  "op": "add", "value": lit(json!("b")) }))
                  ],
                  "elseActions": [
                      act(json!({ "type": "changeVariable", "target": global("trace"),
                                  "op": "add", "value": lit(json!("x")) }))
                  ]
                },
                act(json!({ "type": "changeVariable", "target": global("trace"),
                            "op": "add", "value": lit(json!("c")) }))
            ]}])
        )]),
        json!([room("r", json!([place("o", "o", 0.0, 0.0)]))]),
    );
    let mut runtime = started(&p, "r");
    run_ticks(&mut runtime, 2);
    assert_eq!(global_value(&mut runtime, "trace"), Value::Text("a".into()));
    runtime.tick(TICK).unwrap();
    assert_eq!(global_value(&mut runtime, "trace"), Value::Text("abc".into()));
}

#[test]
fn destroyed_by_resumed_wait_skips_own_step_events() {
    let p = project(
        json!([{ "id": "steps", "type": "number", "initial": 0 }]),
        json!([object(
            "fuse",
            false,
            json!([
                { "type": "step", "items": [
                    act(json!({ "type": "wait", "durationMs": lit(json!(20)) })),
                    act(json!({ "type": "destroySelf" }))
                ]},
                { "type": "step", "items": [add_global("steps", 1.0)] }
            ])
        )]),
        json!([room("r", json!([place("f", "fuse", 0.0, 0.0)]))]),
    );
    let mut runtime = started(&p, "r");

    runtime.tick(TICK).unwrap();
    assert_eq!(global_value(&mut runtime, "steps"), Value::Number(1.0));

    runtime.tick(TICK).unwrap();
    let snap = runtime.snapshot();
    assert!(snap.instances.is_empty());
    assert_eq!(snap.globals["steps"], Value::Number(1.0));
}

#[test]
fn spawn_is_deferred_and_gets_create_next_tick() {
    let p = project(
        json!([{ "id": "created", "type": "boolean", "initial": false }]),
        json!([
            object(
                "spawner",
                false,
                json!([{ "type": "create", "items": [
                    act(json!({ "type": "spawnObject", "objectId": "bullet",
                                "x": lit(json!(5)), "y": lit(json!(6)), "relative": true })),
                    act(json!({ "type": "destroySelf" })),
                    score(1.0)
                ]}])
            ),
            object(
                "bullet",
                false,
                json!([{ "type": "create", "items": [set_global("created", json!(true))] }])
            )
        ]),
        json!([room("r", json!([place("s", "spawner", 100.0, 50.0)]))]),
    );
    let mut runtime = started(&p, "r");

    runtime.tick(TICK).unwrap();
    let snap = runtime.snapshot();
    assert_eq!(snap.score, 1.0);
    assert_eq!(snap.instances.len(), 1);
    assert!(snap.instance(1).is_none());
    let bullet = snap.instance(2).unwrap();
    assert_eq!(bullet.object_id, "bullet");
    assert_eq!(bullet.placement_id, None);
    assert!(approx_eq(bullet.x, 105.0));
    assert!(approx_eq(bullet.y, 56.0));
    assert_eq!(snap.globals["created"], Value::Bool(false));

    runtime.tick(TICK).unwrap();
    assert_eq!(global_value(&mut runtime, "created"), Value::Bool(true));
}

#[test]
fn velocity_integrates_in_units_per_second() {
    let p = project(
        json!([]),
        json!([object(
            "mover",
            false,
            json!([{ "type": "create", "items": [
                act(json!({ "type": "setVelocity", "vx": lit(json!(100)), "vy": lit(json!(-50)) }))
            ]}])
        )]),
        json!([room("r", json!([place("m", "mover", 10.0, 10.0)]))]),
    );
    let mut runtime = started(&p, "r");
    runtime.tick(TICK).unwrap();
    let snap = runtime.snapshot();
    assert!(approx_eq(snap.instances[0].x, 12.0));
    assert!(approx_eq(snap.instances[0].y, 9.0));
    run_ticks(&mut runtime, 4);
    let snap = runtime.snapshot();
    assert!(approx_eq(snap.instances[0].x, 20.0));
}

#[test]
fn clamp_to_room_keeps_box_inside() {
    let p = project(
        json!([]),
        json!([object(
            "o",
            false,
            json!([{ "type": "step", "items": [
                act(json!({ "type": "move", "dx": lit(json!(1000)), "dy": lit(json!(-1000)) })),
                act(json!({ "type": "clampToRoom" }))
            ]}])
        )]),
        json!([room("r", json!([place("o", "o", 10.0, 10.0)]))]),
    );
    let mut runtime = started(&p, "r");
    runtime.tick(TICK).unwrap();
    let snap = runtime.snapshot();
    assert!(approx_eq(snap.instances[0].x, 288.0));
    assert!(approx_eq(snap.instances[0].y, 0.0));
}

#[test]
fn key_pressed_edge_is_seen_for_one_tick() {
    let p = project(
        json!([]),
        json!([object(
            "o",
            false,
            json!([{ "type": "step", "items": [
                { "kind": "if",
                  "condition": {
                      "left": { "key": "Space", "state": "pressed" },
                      "op": "==",
                      "right": lit(json!(true))
                  },
                  "thenActions": [score(1.0)] }
            ]}])
        )]),
        json!([room("r", json!([place("o", "o", 0.0, 0.0)]))]),
    );
    let mut runtime = started(&p, "r");
    runtime.key_down("Space");
    runtime.tick(TICK).unwrap();
    assert_eq!(runtime.snapshot().score, 1.0);

    runtime.key_down("Space");
    runtime.tick(TICK).unwrap();
    assert_eq!(runtime.snapshot().score, 1.0);

    runtime.key_up("Space");
    runtime.key_down("Space");
    runtime.tick(TICK).unwrap();
    assert_eq!(runtime.snapshot().score, 2.0);

    runtime.release_all_keys();
    runtime.key_down("Space");
    runtime.tick(TICK).unwrap();
    assert_eq!(runtime.snapshot().score, 3.0);
}

#[test]
fn go_to_room_with_fade_suspends_dispatch_for_transition() {
    let p = project(
        json!([
            { "id": "steps", "type": "number", "initial": 0 },
            { "id": "entered", "type": "boolean", "initial": false }
        ]),
        json!([
            object(
                "door",
                false,
                json!([{ "type": "step", "items": [
                    add_global("steps", 1.0),
                    act(json!({ "type": "goToRoom", "roomId": "b", "transition": "fade" }))
                ]}])
            ),
            object(
                "marker",
                false,
                json!([{ "type": "create", "items": [set_global("entered", json!(true))] }])
            )
        ]),
        json!([
            room("a", json!([place("d", "door", 0.0, 0.0)])),
            room("b", json!([place("m", "marker", 0.0, 0.0)]))
        ]),
    );
    let mut runtime = started(&p, "a");

    runtime.tick(TICK).unwrap();
    let snap = runtime.snapshot();
    assert_eq!(snap.state, RunState::Transitioning);
    assert_eq!(snap.globals["steps"], Value::Number(1.0));
    assert_eq!(snap.transition.remaining_ms(), 220.0);

    // Ticks 2..=11: 200ms into the transition, still in room a.
    run_ticks(&mut runtime, 10);
    let snap = runtime.snapshot();
    assert_eq!(snap.state, RunState::Transitioning);
    assert_eq!(snap.room.as_deref(), Some("a"));
    assert_eq!(snap.globals["steps"], Value::Number(1.0));

    // Tick 12 completes the 220ms and swaps rooms.
    runtime.tick(TICK).unwrap();
    let snap = runtime.snapshot();
    assert_eq!(snap.state, RunState::Running);
    assert_eq!(snap.room.as_deref(), Some("b"));
    assert_eq!(snap.instances.len(), 1);
    assert_eq!(snap.instances[0].object_id, "marker");
    assert_eq!(snap.globals["entered"], Value::Bool(false));

    runtime.tick(TICK).unwrap();
    assert_eq!(global_value(&mut runtime, "entered"), Value::Bool(true));
    assert_eq!(global_value(&mut runtime, "steps"), Value::Number(1.0));
}

#[test]
fn go_to_room_without_transition_swaps_at_end_of_tick() {
    let p = project(
        json!([]),
        json!([
            object(
                "door",
                false,
                json!([{ "type": "create", "items": [
                    act(json!({ "type": "goToRoom", "roomId": "b" }))
                ]}])
            ),
            object("marker", false, json!([]))
        ]),
        json!([
            room("a", json!([place("d", "door", 0.0, 0.0)])),
            room("b", json!([place("m", "marker", 0.0, 0.0)]))
        ]),
    );
    let mut runtime = started(&p, "a");
    runtime.tick(TICK).unwrap();
    let snap = runtime.snapshot();
    assert_eq!(snap.state, RunState::Running);
    assert_eq!(snap.room.as_deref(), Some("b"));
    assert_eq!(snap.instances[0].id.0, 2);
}

#[test]
fn end_game_halts_remaining_actions_and_ticks() {
    let p = project(
        json!([]),
        json!([object(
            "o",
            false,
            json!([{ "type": "step", "items": [
                score(10.0),
                act(json!({ "type": "endGame", "message": "You win" })),
                score(100.0)
            ]}])
        )]),
        json!([room("r", json!([place("o", "o", 0.0, 0.0), place("o2", "o", 50.0, 0.0)]))]),
    );
    let mut runtime = started(&p, "r");
    runtime.tick(TICK).unwrap();
    let snap = runtime.snapshot();
    assert_eq!(snap.state, RunState::Stopped);
    assert_eq!(snap.ended.as_deref(), Some("You win"));
    assert_eq!(snap.score, 10.0);

    runtime.tick(TICK).unwrap();
    let after = runtime.snapshot();
    assert_eq!(after.frame, snap.frame);
    assert_eq!(after.score, 10.0);
    assert_eq!(runtime.error_count(), 0);
}

#[test]
fn invalid_deltas_stop_the_run_and_are_counted() {
    let p = project(json!([]), json!([]), json!([room("r", json!([]))]));
    let mut runtime = started(&p, "r");

    let err = runtime.tick(-1.0).unwrap_err();
    assert!(matches!(err, RuntimeError::NegativeDelta(_)));
    assert_eq!(runtime.state(), RunState::Stopped);
    assert_eq!(runtime.error_count(), 1);

    let err = runtime.tick(f64::NAN).unwrap_err();
    assert!(matches!(err, RuntimeError::NonFiniteDelta));
    assert_eq!(runtime.error_count(), 2);

    runtime.reset();
    assert_eq!(runtime.state(), RunState::Idle);
    assert_eq!(runtime.error_count(), 2);
    runtime.tick(TICK).unwrap();
    assert_eq!(runtime.snapshot().frame, 0);
}

#[test]
fn unknown_variable_is_a_fatal_error() {
    let p = project(
        json!([]),
        json!([object("o", false, json!([{ "type": "step", "items": [add_global("ghost", 1.0)] }]))]),
        json!([room("r", json!([place("o", "o", 0.0, 0.0)]))]),
    );
    let mut runtime = started(&p, "r");
    let err = runtime.tick(TICK).unwrap_err();
    assert!(matches!(err, RuntimeError::UnknownVariable { .. }));
    assert!(err.is_configuration());
    assert_eq!(runtime.state(), RunState::Stopped);
    assert_eq!(runtime.error_count(), 1);
}

#[test]
fn change_variable_coerces_to_declared_type() {
    let p = project(
        json!([
            { "id": "n", "type": "number", "initial": 5 },
            { "id": "s", "type": "string", "initial": "" },
            { "id": "b", "type": "boolean", "initial": true },
            { "id": "b2", "type": "boolean", "initial": false }
        ]),
        json!([object(
            "o",
            false,
            json!([{ "type": "create", "items": [
                set_global("n", json!("abc")),
                set_global("s", json!(3)),
                set_global("b", json!("yes")),
                set_global("b2", json!("true"))
            ]}])
        )]),
        json!([room("r", json!([place("o", "o", 0.0, 0.0)]))]),
    );
    let mut runtime = started(&p, "r");
    runtime.tick(TICK).unwrap();
    let snap = runtime.snapshot();
    assert_eq!(snap.globals["n"], Value::Number(0.0));
    assert_eq!(snap.globals["s"], Value::Text("3".into()));
    assert_eq!(snap.globals["b"], Value::Bool(false));
    assert_eq!(snap.globals["b2"], Value::Bool(true));
}

#[test]
fn object_variables_are_per_instance_and_copyable() {
    let p = project(
        json!([{ "id": "last", "type": "number", "initial": 0 }]),
        json!([{
            "id": "counter", "width": 8, "height": 8,
            "variables": [{ "id": "hits", "type": "number", "initial": 1 }],
            "events": [{ "type": "step", "items": [
                act(json!({ "type": "changeVariable",
                            "target": { "scope": "object", "id": "hits" },
                            "op": "multiply", "value": lit(json!(2)) })),
                act(json!({ "type": "copyVariable",
                            "source": { "scope": "object", "id": "hits" },
                            "target": global("last") }))
            ]}]
        }]),
        json!([room(
            "r",
            json!([place("a", "counter", 0.0, 0.0), place("b", "counter", 100.0, 0.0)])
        )]),
    );
    let mut runtime = started(&p, "r");
    run_ticks(&mut runtime, 3);
    let snap = runtime.snapshot();
    for instance in &snap.instances {
        assert_eq!(instance.variables["hits"], Value::Number(8.0));
    }
    assert_eq!(snap.globals["last"], Value::Number(8.0));
}

#[test]
fn randomize_variable_stays_in_integer_range() {
    let p = project(
        json!([{ "id": "roll", "type": "number", "initial": 0 }]),
        json!([object(
            "dice",
            false,
            json!([{ "type": "step", "items": [
                act(json!({ "type": "randomizeVariable", "target": global("roll"),
                            "min": lit(json!(1)), "max": lit(json!(6)), "integer": true }))
            ]}])
        )]),
        json!([room("r", json!([place("d", "dice", 0.0, 0.0)]))]),
    );
    let mut runtime = started(&p, "r");
    for _ in 0..50 {
        runtime.tick(TICK).unwrap();
        let Value::Number(roll) = global_value(&mut runtime, "roll") else {
            panic!("roll is not a number");
        };
        assert!((1.0..=6.0).contains(&roll));
        assert_eq!(roll.fract(), 0.0);
    }
}

#[test]
fn custom_events_respect_source_filter() {
    let p = project(
        json!([]),
        json!([
            object(
                "emitter",
                false,
                json!([{ "type": "create", "items": [
                    act(json!({ "type": "emitCustomEvent", "name": "ping" }))
                ]}])
            ),
            object(
                "listener",
                false,
                json!([
                    { "type": "custom", "name": "ping", "items": [score(1.0)] },
                    { "type": "custom", "name": "ping", "sourceObject": "emitter",
                      "items": [score(10.0)] },
                    { "type": "custom", "name": "ping", "sourceObject": "someone",
                      "items": [score(100.0)] }
                ])
            ),
            object("someone", false, json!([]))
        ]),
        json!([room(
            "r",
            json!([place("e", "emitter", 0.0, 0.0), place("l", "listener", 100.0, 0.0)])
        )]),
    );
    let mut runtime = started(&p, "r");
    runtime.tick(TICK).unwrap();
    assert_eq!(runtime.snapshot().score, 11.0);
    runtime.tick(TICK).unwrap();
    assert_eq!(runtime.snapshot().score, 11.0);
}

#[test]
fn custom_event_cascade_is_capped_per_tick() {
    let p = project(
        json!([]),
        json!([object(
            "echo",
            false,
            json!([
                { "type": "create", "items": [
                    act(json!({ "type": "emitCustomEvent", "name": "loop" }))
                ]},
                { "type": "custom", "name": "loop", "items": [
                    score(1.0),
                    act(json!({ "type": "emitCustomEvent", "name": "loop" }))
                ]}
            ])
        )]),
        json!([room("r", json!([place("e", "echo", 0.0, 0.0)]))]),
    );
    let mut config = RuntimeConfig::new().with_seed(1);
    config.max_custom_event_rounds = 4;
    let mut runtime = started_with(config, &p, "r");
    runtime.tick(TICK).unwrap();
    assert_eq!(runtime.snapshot().score, 4.0);
    runtime.tick(TICK).unwrap();
    assert_eq!(runtime.snapshot().score, 8.0);
}

#[test]
fn messages_and_sounds_reach_the_host() {
    let p = project(
        json!([]),
        json!([object(
            "o",
            false,
            json!([{ "type": "create", "items": [
                act(json!({ "type": "message", "text": "hello", "durationMs": lit(json!(100)) })),
                act(json!({ "type": "message", "text": "again" })),
                act(json!({ "type": "playSound", "soundId": "jump" }))
            ]}])
        )]),
        json!([room("r", json!([place("o", "o", 0.0, 0.0)]))]),
    );
    let mut runtime = started(&p, "r");
    runtime.tick(TICK).unwrap();

    let sounds = runtime.drain_sounds();
    assert_eq!(sounds.len(), 1);
    assert_eq!(sounds[0].sound_id, "jump");
    assert!(runtime.drain_sounds().is_empty());

    let snap = runtime.snapshot();
    let active = snap.toast.active().unwrap();
    assert_eq!(active.text, "hello");
    assert!((active.remaining_ms - 80.0).abs() < 1e-9);
    assert_eq!(snap.toast.queued().len(), 1);
}

#[test]
fn stop_keeps_instances_and_reset_clears_everything() {
    let p = project(
        json!([{ "id": "g", "type": "number", "initial": 0 }]),
        json!([object("o", false, json!([{ "type": "step", "items": [
            add_global("g", 1.0),
            act(json!({ "type": "wait", "durationMs": lit(json!(1000)) }))
        ]}]))]),
        json!([room("r", json!([place("o", "o", 0.0, 0.0)]))]),
    );
    let mut runtime = started(&p, "r");
    runtime.key_down("A");
    runtime.tick(TICK).unwrap();

    runtime.stop();
    let snap = runtime.snapshot();
    assert_eq!(snap.state, RunState::Stopped);
    assert_eq!(snap.instances.len(), 1);
    assert_eq!(snap.instances[0].suspended, 0);

    runtime.reset();
    let snap = runtime.snapshot();
    assert_eq!(snap.state, RunState::Idle);
    assert!(snap.instances.is_empty());
    assert!(snap.globals.is_empty());
    assert_eq!(snap.room, None);

    runtime.start(&p, "r").unwrap();
    let snap = runtime.snapshot();
    assert_eq!(snap.instances[0].id.0, 1);
    assert_eq!(snap.globals["g"], Value::Number(0.0));
}
