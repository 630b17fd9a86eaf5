//! End-to-end behavior of dispatch, reducers and computed values.

use std::cell::Cell;
use std::rc::Rc;

use rxstate::{Action, Key, Rx, StoreConfig};

const INCREMENT: Action<i64> = Action::define("increment");
const ACTION_A: Action = Action::define("actionA");
const ACTION_B: Action = Action::define("actionB");
const SET_MODE: Action<String> = Action::define("setMode");
const SET_SELECTED: Action<Option<String>> = Action::define("setSelected");

fn rx() -> Rx {
    Rx::with_config(StoreConfig::quiet())
}

#[test]
fn test_counter_accumulates_payloads() {
    let rx = rx();
    let counter = rx
        .reducer("counter", 0i64, |on| {
            on.on(INCREMENT, |s, a| s + a);
        })
        .unwrap();

    rx.dispatch(INCREMENT.create(3)).unwrap();
    rx.dispatch(INCREMENT.create(4)).unwrap();

    assert_eq!(counter.get(), 7);
    assert_eq!(rx.get::<i64>("counter").unwrap(), 7);
}

#[test]
fn test_status_derived_without_dispatch() {
    let rx = rx();
    rx.reducer("mode", String::new(), |on| {
        on.on(SET_MODE, |_, mode| mode.clone());
    })
    .unwrap();
    rx.reducer("selectedId", None::<String>, |on| {
        on.on(SET_SELECTED, |_, id| id.clone());
    })
    .unwrap();
    rx.dispatch(SET_MODE.create("edit".to_string())).unwrap();
    rx.dispatch(SET_SELECTED.create(Some("n1".to_string()))).unwrap();

    let mode: Key<String> = Key::new("mode");
    let selected: Key<Option<String>> = Key::new("selectedId");
    let status = rx
        .reducer("status", String::new(), |on| {
            on.combine((mode, selected), |(mode, id)| match id {
                Some(id) if mode == "edit" => format!("Editing: {id}"),
                _ => "idle".to_string(),
            });
        })
        .unwrap();

    assert_eq!(status.get(), "Editing: n1");
}

#[test]
fn test_merged_actions_count_steps() {
    let rx = rx();
    let step = rx
        .reducer("step", 0u32, |on| {
            on.merge([ACTION_A, ACTION_B], |s, _| s + 1);
        })
        .unwrap();

    rx.dispatch(ACTION_A.create(())).unwrap();
    rx.dispatch(ACTION_B.create(())).unwrap();
    rx.dispatch(ACTION_A.create(())).unwrap();

    assert_eq!(step.get(), 3);
}

#[test]
fn test_reload_preserves_value_and_reruns_setup() {
    let rx = rx();
    let setups = Rc::new(Cell::new(0u32));

    let bind = |rx: &Rx| {
        let setups = Rc::clone(&setups);
        rx.reducer("counter", 0i64, move |on| {
            setups.set(setups.get() + 1);
            on.on(INCREMENT, |s, a| s + a);
        })
        .unwrap()
    };

    let first = bind(&rx);
    bind(&rx);
    assert_eq!(setups.get(), 1);
    rx.dispatch(INCREMENT.create(10)).unwrap();

    rx.reload();
    assert_eq!(rx.get::<i64>("counter").unwrap(), 10);

    let second = bind(&rx);
    assert_eq!(setups.get(), 2);
    assert!(!first.ptr_eq(&second));
    assert_eq!(second.get(), 10);

    // Only the new rule stream is live.
    rx.dispatch(INCREMENT.create(1)).unwrap();
    assert_eq!(second.get(), 11);
    assert_eq!(first.get(), 10);
}

#[test]
fn test_fold_over_mixed_rules() {
    let rx = rx();
    rx.reducer("base", 1i64, |on| {
        on.on(INCREMENT, |s, a| s + a);
    })
    .unwrap();
    let total = rx
        .reducer("total", 0i64, |on| {
            on.on_path("base", |base: i64| base * 100);
            on.on(INCREMENT, |s, a| s + a);
        })
        .unwrap();
    assert_eq!(total.get(), 100);

    // "base" fires first: total = 300 from the dependency, then + 2.
    rx.dispatch(INCREMENT.create(2)).unwrap();
    assert_eq!(total.get(), 302);
}
