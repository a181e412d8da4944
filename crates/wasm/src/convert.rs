//! Type conversion utilities between JavaScript and gqlbind types.

use gqlbind_client::{ApolloError, GraphQlError, NetworkStatus, QueryResult};
use gqlbind_core::{Object, Value};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Converts a JavaScript value to a gqlbind Value.
///
/// Functions, symbols and bigints have no JSON shape and become `Null`.
pub fn js_to_value(js: &JsValue) -> Value {
    if js.is_null() || js.is_undefined() || js.is_function() {
        return Value::Null;
    }
    if let Some(b) = js.as_bool() {
        return Value::Bool(b);
    }
    if let Some(n) = js.as_f64() {
        return Value::Number(n);
    }
    if let Some(s) = js.as_string() {
        return Value::String(s);
    }
    if js_sys::Array::is_array(js) {
        let arr = js_sys::Array::from(js);
        return Value::Array(arr.iter().map(|item| js_to_value(&item)).collect());
    }
    if js.is_object() {
        return Value::Object(js_to_object(js));
    }
    Value::Null
}

/// Reads the own enumerable properties of a JavaScript object.
pub fn js_to_object(js: &JsValue) -> Object {
    let Some(obj) = js.dyn_ref::<js_sys::Object>() else {
        return Object::new();
    };
    let keys = js_sys::Object::keys(obj);
    let mut out = Object::with_capacity(keys.length() as usize);
    for key in keys.iter() {
        if let Some(name) = key.as_string() {
            let value = js_sys::Reflect::get(obj, &key).unwrap_or(JsValue::UNDEFINED);
            out.insert(name, js_to_value(&value));
        }
    }
    out
}

/// Converts a gqlbind Value to a JavaScript value.
pub fn value_to_js(value: &Value) -> JsValue {
    match value {
        Value::Null => JsValue::NULL,
        Value::Bool(b) => JsValue::from_bool(*b),
        Value::Number(n) => JsValue::from_f64(*n),
        Value::String(s) => JsValue::from_str(s),
        Value::Array(items) => {
            let arr = js_sys::Array::new_with_length(items.len() as u32);
            for (i, item) in items.iter().enumerate() {
                arr.set(i as u32, value_to_js(item));
            }
            arr.into()
        }
        Value::Object(obj) => object_to_js(obj).into(),
    }
}

/// Converts a gqlbind Object to a plain JavaScript object.
pub fn object_to_js(obj: &Object) -> js_sys::Object {
    let out = js_sys::Object::new();
    for (key, value) in obj.iter() {
        js_sys::Reflect::set(&out, &JsValue::from_str(key), &value_to_js(value)).ok();
    }
    out
}

/// Reads a property, treating failures as `undefined`.
pub fn get(target: &JsValue, name: &str) -> JsValue {
    js_sys::Reflect::get(target, &JsValue::from_str(name)).unwrap_or(JsValue::UNDEFINED)
}

/// Converts an emission of an Apollo observable or a settled operation.
pub fn js_to_query_result(js: &JsValue) -> QueryResult {
    let status = get(js, "networkStatus")
        .as_f64()
        .and_then(|code| NetworkStatus::from_code(code as u8));
    QueryResult {
        data: js_to_value(&get(js, "data")),
        loading: get(js, "loading").as_bool(),
        network_status: status,
    }
}

/// Converts a query result back into the shape Apollo callers expect.
pub fn query_result_to_js(result: &QueryResult) -> JsValue {
    let out = js_sys::Object::new();
    js_sys::Reflect::set(&out, &"data".into(), &value_to_js(&result.data)).ok();
    if let Some(loading) = result.loading {
        js_sys::Reflect::set(&out, &"loading".into(), &JsValue::from_bool(loading)).ok();
    }
    if let Some(status) = result.network_status {
        js_sys::Reflect::set(
            &out,
            &"networkStatus".into(),
            &JsValue::from_f64(f64::from(status.code())),
        )
        .ok();
    }
    out.into()
}

fn message_of(js: &JsValue) -> Option<String> {
    js.as_string().or_else(|| get(js, "message").as_string())
}

/// Converts an Apollo error object.
///
/// Reads `graphQLErrors` and `networkError`; anything else, including a
/// thrown string, becomes an unclassified error.
pub fn js_to_apollo_error(js: &JsValue) -> ApolloError {
    let message = message_of(js).unwrap_or_else(|| String::from("Unknown error"));

    let graphql = get(js, "graphQLErrors");
    let graphql_errors: Vec<GraphQlError> = if js_sys::Array::is_array(&graphql) {
        js_sys::Array::from(&graphql)
            .iter()
            .map(|err| {
                let path = match js_to_value(&get(&err, "path")) {
                    Value::Array(path) => path,
                    _ => Vec::new(),
                };
                GraphQlError::new(message_of(&err).unwrap_or_default()).with_path(path)
            })
            .collect()
    } else {
        Vec::new()
    };

    let network = get(js, "networkError");
    let network_error = if network.is_null() || network.is_undefined() {
        None
    } else {
        Some(message_of(&network).unwrap_or_else(|| String::from("Network error")))
    };

    ApolloError {
        message,
        graphql_errors,
        network_error,
    }
}

/// Converts an error back into an `Error` carrying `graphQLErrors` and
/// `networkError` like the client's own errors.
pub fn apollo_error_to_js(err: &ApolloError) -> JsValue {
    let out = js_sys::Error::new(&err.to_string());
    let graphql = js_sys::Array::new();
    for error in &err.graphql_errors {
        let item = js_sys::Object::new();
        js_sys::Reflect::set(&item, &"message".into(), &JsValue::from_str(&error.message)).ok();
        let path = value_to_js(&Value::Array(error.path.clone()));
        js_sys::Reflect::set(&item, &"path".into(), &path).ok();
        graphql.push(&item);
    }
    js_sys::Reflect::set(&out, &"graphQLErrors".into(), &graphql).ok();
    let network = match &err.network_error {
        Some(message) => js_sys::Error::new(message).into(),
        None => JsValue::NULL,
    };
    js_sys::Reflect::set(&out, &"networkError".into(), &network).ok();
    out.into()
}

/// Converts a binding-layer error to a JavaScript error value.
pub fn error_to_js(err: &gqlbind_core::Error) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}
