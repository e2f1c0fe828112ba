//! End-to-end binding scenarios.
//!
//! Mounts real templates and drives them the way a user would:
//! 1. Text interpolation renders and re-renders after one notify pass
//! 2. `@click` calls the method with the view model as receiver
//! 3. `v-model` syncs both ways without writing back reflected values
//! 4. Missing template root leaves data reactive
//! 5. Subscriber errors abort the notify pass and reach the writer

#![forbid(unsafe_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::json;
use tether_core::DomError;
use tether_harness::{Fixture, UpdateCounter, capture_messages, count_messages, json_data};
use tether_runtime::{Error, Options, Value, ViewModel};

// ── Text interpolation ──────────────────────────────────────────────────

#[test]
fn text_renders_then_follows_writes() {
    let fx = Fixture::with_data(
        r#"<div id="app"><p>{{msg}}</p></div>"#,
        json_data(json!({"msg": "hi"})),
    )
    .unwrap();
    let p = fx.select("p").unwrap();
    assert_eq!(p.text_content(), "hi");

    let passes = UpdateCounter::attach(fx.vm.data(), "msg").unwrap();
    let ((), messages) = capture_messages(|| fx.vm.set("msg", "bye").unwrap());

    assert_eq!(p.text_content(), "bye");
    assert_eq!(count_messages(&messages, "dep.notify"), 1);
    assert_eq!(count_messages(&messages, "watcher.run"), 1);
    assert_eq!(passes.hits(), 1);
}

#[test]
fn initial_render_of_each_value_kind() {
    let fx = Fixture::with_data(
        r#"<div id="app"><a>{{s}}</a><b>{{n}}</b><i>{{t}}</i><u>{{z}}</u><em>{{nope}}</em></div>"#,
        json_data(json!({"s": "x", "n": 2.5, "t": false, "z": null})),
    )
    .unwrap();
    assert_eq!(
        fx.html(),
        r#"<div id="app"><a>x</a><b>2.5</b><i>false</i><u>null</u><em></em></div>"#
    );
}

#[test]
fn equal_write_does_not_rerender() {
    let fx = Fixture::with_data(
        r#"<div id="app">{{n}}</div>"#,
        json_data(json!({"n": 1})),
    )
    .unwrap();
    let ((), messages) = capture_messages(|| fx.vm.set("n", 1).unwrap());
    // The pass still runs; the watcher short-circuits.
    assert_eq!(count_messages(&messages, "dep.notify"), 1);
    assert_eq!(count_messages(&messages, "watcher.run"), 0);
}

// ── Event directives ────────────────────────────────────────────────────

#[test]
fn click_calls_method_with_receiver() {
    let received: Rc<RefCell<Option<ViewModel>>> = Rc::new(RefCell::new(None));
    let slot = Rc::clone(&received);
    let fx = Fixture::mount(
        r#"<div id="app"><button @click="submit">Go</button></div>"#,
        Options::new().method("submit", move |vm, event| {
            assert_eq!(event.kind(), "click");
            *slot.borrow_mut() = Some(vm.clone());
            Ok(())
        }),
    )
    .unwrap();

    fx.select("button").unwrap().click().unwrap();
    let vm = received.borrow_mut().take().unwrap();
    assert!(vm.ptr_eq(&fx.vm));
}

#[test]
fn long_form_event_directive() {
    let count = Rc::new(Cell::new(0));
    let hits = Rc::clone(&count);
    let fx = Fixture::mount(
        r#"<div id="app"><form v-on:submit="save"></form></div>"#,
        Options::new().method("save", move |_, _| {
            hits.set(hits.get() + 1);
            Ok(())
        }),
    )
    .unwrap();
    let form = fx.select("form").unwrap();
    form.dispatch_event(&tether_core::Event::new("submit", &form))
        .unwrap();
    assert_eq!(count.get(), 1);
    assert_eq!(fx.html(), r#"<div id="app"><form></form></div>"#);
}

// ── Model directives ────────────────────────────────────────────────────

#[test]
fn model_two_way_sync() {
    let fx = Fixture::with_data(
        r#"<div id="app"><input v-model="text"><p>{{text}}</p></div>"#,
        json_data(json!({"text": ""})),
    )
    .unwrap();
    let input = fx.select("input").unwrap();
    let p = fx.select("p").unwrap();

    input.user_input("abc").unwrap();
    assert_eq!(fx.vm.get("text"), Value::from("abc"));
    assert_eq!(p.text_content(), "abc");

    let passes = UpdateCounter::attach(fx.vm.data(), "text").unwrap();
    fx.vm.set("text", "xyz").unwrap();
    assert_eq!(input.value(), "xyz");
    assert_eq!(p.text_content(), "xyz");
    // Only the programmatic write notified; no listener wrote back.
    assert_eq!(passes.hits(), 1);

    input.user_input("xyz").unwrap();
    assert_eq!(passes.hits(), 1);
}

#[test]
fn model_renders_initial_value_into_html() {
    let fx = Fixture::with_data(
        r#"<div id="app"><input v-model="name" value="ignored"></div>"#,
        json_data(json!({"name": "Ada"})),
    )
    .unwrap();
    assert_eq!(fx.html(), r#"<div id="app"><input value="Ada"></div>"#);
}

// ── Edge cases ──────────────────────────────────────────────────────────

#[test]
fn missing_root_leaves_data_reactive() {
    let ((), messages) = capture_messages(|| {
        let fx = Fixture::with_data("<main>{{k}}</main>", json_data(json!({"k": 1}))).unwrap();
        assert!(!fx.vm.is_compiled());
        assert_eq!(fx.html(), "<main>{{k}}</main>");
        let seen = Rc::new(Cell::new(false));
        let flag = Rc::clone(&seen);
        let _w = fx.vm.watch("k", move |_, _, _| {
            flag.set(true);
            Ok(())
        });
        fx.vm.set("k", 2).unwrap();
        assert!(seen.get());
    });
    assert_eq!(count_messages(&messages, "view_model.root_missing"), 1);
}

#[test]
fn failing_watcher_aborts_pass() {
    let fx = Fixture::with_data(r#"<div id="app">{{k}}</div>"#, json_data(json!({"k": 0})))
        .unwrap();
    let _bad = fx.vm.watch("k", |_, _, _| Err(Error::callback("k", "rejected")));
    let after = Rc::new(Cell::new(false));
    let flag = Rc::clone(&after);
    let _late = fx.vm.watch("k", move |_, _, _| {
        flag.set(true);
        Ok(())
    });

    let err = fx.vm.set("k", 1).unwrap_err();
    assert!(matches!(err, Error::Callback { .. }));
    // The text watcher registered first and already ran.
    assert_eq!(fx.select("#app").unwrap().text_content(), "1");
    assert!(!after.get());
}

#[test]
fn failing_method_surfaces_as_listener_error() {
    let fx = Fixture::mount(
        r#"<div id="app"><button @click="boom">x</button></div>"#,
        Options::new().method("boom", |_, _| Err(Error::method("boom", "no"))),
    )
    .unwrap();
    let err = fx.select("button").unwrap().click().unwrap_err();
    match err {
        DomError::Listener { event, source } => {
            assert_eq!(event, "click");
            assert!(source.to_string().contains("boom"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn same_key_bound_twice_fires_twice() {
    let fx = Fixture::with_data(
        r#"<div id="app"><p>{{k}}</p><p>{{k}}</p></div>"#,
        json_data(json!({"k": "a"})),
    )
    .unwrap();
    assert_eq!(fx.vm.data().subscriber_count("k"), 2);
    let ((), messages) = capture_messages(|| fx.vm.set("k", "b").unwrap());
    assert_eq!(count_messages(&messages, "watcher.run"), 2);
}

#[test]
fn nested_objects_are_instrumented() {
    let fx = Fixture::with_data(
        r#"<div id="app"></div>"#,
        json_data(json!({"user": {"name": "Ada"}})),
    )
    .unwrap();
    let user = fx.vm.get("user");
    let user = user.as_object().unwrap();
    assert!(user.is_reactive("name"));
}
