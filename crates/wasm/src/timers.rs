//! `setTimeout`-backed timer driver.

use gqlbind_reactive::{TimerId, TimerTask, Timers};
use hashbrown::HashMap;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

struct Armed {
    handle: JsValue,
    task: TimerTask,
}

/// Timers scheduled on the global `setTimeout`, so they work in windows
/// and workers alike.
#[derive(Default)]
pub struct JsTimers {
    armed: Rc<RefCell<HashMap<TimerId, Armed>>>,
    next_id: Cell<TimerId>,
}

impl JsTimers {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    fn global_fn(name: &str) -> Option<js_sys::Function> {
        js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str(name))
            .ok()?
            .dyn_into::<js_sys::Function>()
            .ok()
    }
}

impl Timers for JsTimers {
    fn arm(&self, delay_ms: u32, task: TimerTask) -> TimerId {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);

        let Some(set_timeout) = Self::global_fn("setTimeout") else {
            // No timer primitive: the task never runs, like a cancelled one.
            return id;
        };

        let armed = Rc::downgrade(&self.armed);
        let callback = Closure::once_into_js(move || {
            let Some(armed) = armed.upgrade() else {
                return;
            };
            let entry = armed.borrow_mut().remove(&id);
            if let Some(entry) = entry {
                (entry.task)();
            }
        });

        match set_timeout.call2(&JsValue::NULL, &callback, &JsValue::from(delay_ms)) {
            Ok(handle) => {
                self.armed.borrow_mut().insert(id, Armed { handle, task });
            }
            Err(err) => {
                web_sys::console::error_2(&JsValue::from_str("setTimeout failed:"), &err);
            }
        }
        id
    }

    fn disarm(&self, id: TimerId) {
        let entry = self.armed.borrow_mut().remove(&id);
        if let (Some(entry), Some(clear_timeout)) = (entry, Self::global_fn("clearTimeout")) {
            clear_timeout.call1(&JsValue::NULL, &entry.handle).ok();
        }
    }
}
