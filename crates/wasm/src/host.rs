//! Host backed by a JavaScript element.

use crate::convert::{get, js_to_value, value_to_js};
use gqlbind_core::Value;
use gqlbind_reactive::{Host, ObserverId, ObserverList, PropertyHandler};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// A custom element (or any object) acting as the bound component.
///
/// Writes go through the element's own `set(name, value)` when it has one,
/// so frameworks with path notification see them. Changes made by the page
/// itself must be reported through [`JsHost::notify`].
pub struct JsHost {
    element: JsValue,
    observers: ObserverList,
}

impl JsHost {
    pub fn new(element: JsValue) -> Rc<Self> {
        Rc::new(Self {
            element,
            observers: ObserverList::new(),
        })
    }

    pub fn element(&self) -> &JsValue {
        &self.element
    }

    /// Runs the observers affected by a change of the property `name`.
    pub fn notify(&self, name: &str) {
        self.observers.notify(name, |path| self.get(path));
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn read(&self, path: &str) -> JsValue {
        path.split('.').fold(self.element.clone(), |target, segment| {
            if target.is_null() || target.is_undefined() {
                target
            } else {
                get(&target, segment)
            }
        })
    }
}

impl Host for JsHost {
    fn get(&self, path: &str) -> Value {
        js_to_value(&self.read(path))
    }

    fn set(&self, name: &str, value: Value) {
        if self.get(name) == value {
            return;
        }
        let js = value_to_js(&value);
        match get(&self.element, "set").dyn_into::<js_sys::Function>() {
            Ok(setter) => {
                setter.call2(&self.element, &JsValue::from_str(name), &js).ok();
            }
            Err(_) => {
                js_sys::Reflect::set(&self.element, &JsValue::from_str(name), &js).ok();
            }
        }
        self.notify(name);
    }

    fn observe(&self, path: &str, handler: PropertyHandler) -> ObserverId {
        self.observers.add(path, handler)
    }

    fn unobserve(&self, id: ObserverId) {
        self.observers.remove(id);
    }
}
