#![cfg(target_arch = "wasm32")]

use peepshow_engine::{Command, GalleryEvent, GroupId, PeepshowEngine};
use wasm_bindgen_test::wasm_bindgen_test;

fn commands(json: &str) -> Vec<Command> {
    serde_json::from_str(json).unwrap()
}

fn engine_with_group(options: &str) -> (PeepshowEngine, u32) {
    let mut engine = PeepshowEngine::new(&format!(r#"{{"options":{options}}}"#)).unwrap();
    let group = engine
        .add_group(
            r#"{"images":[
                {"src":"thumb.jpg","width":200,"height":200,"thumbnail":true},
                {"src":"a.jpg","width":400,"height":300,"caption":"First"},
                {"src":"b.jpg","width":640,"height":480}
            ]}"#,
        )
        .unwrap();
    (engine, group)
}

#[wasm_bindgen_test]
fn malformed_init_is_a_js_error() {
    assert!(PeepshowEngine::new("{not json").is_err());
}

#[wasm_bindgen_test]
fn empty_group_is_a_js_error() {
    let mut engine = PeepshowEngine::new("{}").unwrap();
    assert!(engine.add_group(r#"{"images":[]}"#).is_err());
    assert!(engine.add_group("[]").is_err());
}

#[wasm_bindgen_test]
fn malformed_batch_is_a_js_error() {
    let mut engine = PeepshowEngine::new("{}").unwrap();
    assert!(engine.process_events(r#"{"now":0,"events":[{"type":"wheel"}]}"#).is_err());
}

#[wasm_bindgen_test]
fn unknown_group_state_is_a_js_error() {
    let engine = PeepshowEngine::new("{}").unwrap();
    assert!(engine.group_state(9).is_err());
}

#[wasm_bindgen_test]
fn hover_rotation_skips_the_thumbnail() {
    let (mut engine, group) = engine_with_group(r#"{"rotate_speed":1000}"#);
    engine
        .process_events(&format!(
            r#"{{"now":0,"events":[{{"type":"pointer_enter","group":{group},"x":10,"y":10}}]}}"#
        ))
        .unwrap();

    let out = commands(&engine.advance(100).unwrap());
    assert!(out.contains(&Command::Notify {
        event: GalleryEvent::Expanded {
            group: GroupId::new(group)
        }
    }));

    let mut steps = Vec::new();
    for now in [850, 1850, 2850] {
        for command in commands(&engine.advance(now).unwrap()) {
            if let Command::Notify {
                event: GalleryEvent::Rotated { index, human_step, .. },
            } = command
            {
                steps.push((index, human_step));
            }
        }
    }
    assert_eq!(steps, vec![(1, 1), (2, 2), (1, 1)]);
}

#[wasm_bindgen_test]
fn touch_session_round_trip() {
    let mut engine = PeepshowEngine::new(
        r#"{"device":{"platform":"ios","major_version":7,"touch_capable":true},"viewport":{"width":320,"height":480}}"#,
    )
    .unwrap();
    assert!(engine.touch_enabled());
    let group = engine
        .add_group(r#"{"images":[{"src":"a.jpg","width":640,"height":480},{"src":"b.jpg","width":300,"height":300}]}"#)
        .unwrap();

    let out = commands(
        &engine
            .process_events(&format!(
                r#"{{"now":200,"events":[{{"type":"tap","target":{{"kind":"wrap","group":{group}}}}}]}}"#
            ))
            .unwrap(),
    );
    assert!(out.contains(&Command::BindViewport));
    assert!(out.contains(&Command::ScrollTo { x: 0, y: 1 }));

    let out = commands(
        &engine
            .process_events(&format!(
                r#"{{"now":300,"events":[{{"type":"tap","target":{{"kind":"back_button","group":{group}}}}}]}}"#
            ))
            .unwrap(),
    );
    assert!(out.contains(&Command::UnbindViewport));
    assert!(out.contains(&Command::SetBodyScroll { locked: false }));
}
