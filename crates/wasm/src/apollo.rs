//! The `Apollo` class exported to JavaScript.

use crate::client::JsClient;
use crate::convert::{
    apollo_error_to_js, error_to_js, get, js_to_object, object_to_js, query_result_to_js,
    value_to_js,
};
use crate::host::JsHost;
use crate::timers::JsTimers;
use gqlbind_client::{ApolloError, Observer, QueryResult, Request, Subscription, WatchQueryOptions};
use gqlbind_core::Object;
use gqlbind_reactive::{
    Apollo, ApolloBuilder, BindingConfig, Host, QueryOptions, SkipState, TrackedWatchQuery,
};
use serde::Serialize;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Option names consumed by the binding layer rather than forwarded.
const DECLARATION_KEYS: [&str; 8] = [
    "query",
    "variables",
    "loadingKey",
    "watchLoading",
    "skip",
    "dataKey",
    "error",
    "forceFetch",
];

#[cfg(feature = "console")]
fn with_diagnostics(builder: ApolloBuilder) -> ApolloBuilder {
    builder.diagnostics(Rc::new(crate::diagnostics::ConsoleDiagnostics))
}

/// Without a console the facade keeps its own bounded log.
#[cfg(not(feature = "console"))]
fn with_diagnostics(builder: ApolloBuilder) -> ApolloBuilder {
    builder
}

fn read_config(config: Option<js_sys::Object>) -> BindingConfig {
    let Some(config) = config else {
        return BindingConfig::default();
    };
    let ms = |name: &str| get(&config, name).as_f64().map(|ms| ms.max(0.0) as u32);
    let mut out = BindingConfig::new();
    if let Some(ms) = ms("skipDebounce") {
        out = out.with_skip_debounce(ms);
    }
    if let Some(ms) = ms("variableDebounce") {
        out = out.with_variable_debounce(ms);
    }
    out
}

fn extra_options(options: &JsValue, consumed: &[&str]) -> Object {
    let mut extra = js_to_object(options);
    for key in consumed {
        extra.remove(key);
    }
    extra
}

/// Settles a promise through a completion callback.
fn operation<F>(run: F) -> js_sys::Promise
where
    F: FnOnce(Box<dyn FnOnce(Result<QueryResult, ApolloError>)>),
{
    let mut run = Some(run);
    js_sys::Promise::new(&mut |resolve, reject| {
        let Some(run) = run.take() else {
            return;
        };
        run(Box::new(move |outcome: Result<QueryResult, ApolloError>| {
            let settled = match outcome {
                Ok(result) => resolve.call1(&JsValue::NULL, &query_result_to_js(&result)),
                Err(error) => reject.call1(&JsValue::NULL, &apollo_error_to_js(&error)),
            };
            settled.ok();
        }));
    })
}

/// Observer calling JS `next` and `error` callbacks. Errors without a
/// callback go to the console.
fn js_observer(next: js_sys::Function, error: Option<js_sys::Function>) -> Observer {
    Observer::new(
        move |result: QueryResult| {
            next.call1(&JsValue::NULL, &query_result_to_js(&result)).ok();
        },
        move |err: ApolloError| match &error {
            Some(callback) => {
                callback.call1(&JsValue::NULL, &apollo_error_to_js(&err)).ok();
            }
            None => web_sys::console::error_1(&apollo_error_to_js(&err)),
        },
    )
}

/// Wraps `unsubscribe` into a JS function that outlives the call.
fn unsubscribe_function(unsubscribe: impl FnMut() + 'static) -> js_sys::Function {
    let closure = Closure::wrap(Box::new(unsubscribe) as Box<dyn FnMut()>);
    let js_fn: js_sys::Function = closure.as_ref().unchecked_ref::<js_sys::Function>().clone();
    closure.forget();
    js_fn
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotView<'a> {
    key: &'a str,
    skipped: bool,
    subscribed: bool,
    first_loading_done: bool,
}

/// Query bindings of one element.
///
/// ```javascript
/// const apollo = new Apollo(element, client, { variableDebounce: 10 });
/// apollo.process('user', {
///   query: USER_QUERY,
///   variables: { id: 'userId' },
///   loadingKey: 'loading',
/// });
/// apollo.processObservers();
/// // after element.userId changes:
/// apollo.notify('userId');
/// ```
#[wasm_bindgen(js_name = Apollo)]
pub struct JsApollo {
    apollo: Apollo,
    host: Rc<JsHost>,
    client: Rc<JsClient>,
}

impl JsApollo {
    fn declaration(&self, options: &JsValue) -> QueryOptions {
        let query = get(options, "query");
        let document = if query.is_null() || query.is_undefined() {
            String::new()
        } else {
            self.client.intern_document(&query)
        };
        let mut declaration = QueryOptions::new(document);

        for (name, path) in js_to_object(&get(options, "variables")).iter() {
            if let Some(path) = path.as_str() {
                declaration = declaration.variable(name, path);
            }
        }
        if let Some(key) = get(options, "loadingKey").as_string() {
            declaration = declaration.loading_key(key);
        }
        if let Some(path) = get(options, "skip").as_string() {
            declaration = declaration.skip(path);
        }
        if let Some(key) = get(options, "dataKey").as_string() {
            declaration = declaration.data_key(key);
        }
        if let Some(force) = get(options, "forceFetch").as_bool() {
            declaration = declaration.force_fetch(force);
        }
        if let Ok(callback) = get(options, "watchLoading").dyn_into::<js_sys::Function>() {
            let element = self.host.element().clone();
            declaration = declaration.watch_loading(move |_, loading| {
                callback.call1(&element, &JsValue::from_bool(loading)).ok();
            });
        }
        if let Ok(callback) = get(options, "error").dyn_into::<js_sys::Function>() {
            let element = self.host.element().clone();
            declaration = declaration.on_error(move |_, error| {
                callback.call1(&element, &apollo_error_to_js(error)).ok();
            });
        }

        declaration.extra = extra_options(options, &DECLARATION_KEYS);
        declaration
    }

    fn request(&self, options: &JsValue, field: &str) -> Request {
        let document = self.client.intern_document(&get(options, field));
        let mut request =
            Request::new(document).with_variables(js_to_object(&get(options, "variables")));
        request.extra = extra_options(options, &[field, "variables"]);
        request
    }
}

#[wasm_bindgen(js_class = Apollo)]
impl JsApollo {
    /// Binds `element` to `client`.
    ///
    /// `config` may set `skipDebounce` and `variableDebounce` in ms.
    #[wasm_bindgen(constructor)]
    pub fn new(element: JsValue, client: JsValue, config: Option<js_sys::Object>) -> JsApollo {
        let host = JsHost::new(element);
        let client = JsClient::new(client);
        let builder = Apollo::builder(host.clone(), client.clone(), JsTimers::new());
        let apollo = with_diagnostics(builder).config(read_config(config)).build();
        JsApollo {
            apollo,
            host,
            client,
        }
    }

    /// Declares the query `key`.
    pub fn process(&self, key: &str, options: &JsValue) -> Result<(), JsValue> {
        let declaration = self.declaration(options);
        self.apollo
            .process(key, declaration)
            .map_err(|err| error_to_js(&err))
    }

    /// Subscribes every declared query that is not skipped.
    #[wasm_bindgen(js_name = processObservers)]
    pub fn process_observers(&self) {
        self.apollo.process_observers();
    }

    pub fn refetch(&self, key: &str) -> Result<(), JsValue> {
        self.apollo.refetch(key).map_err(|err| error_to_js(&err))
    }

    pub fn reload(&self, key: &str) -> Result<(), JsValue> {
        self.apollo.reload(key).map_err(|err| error_to_js(&err))
    }

    /// Reports that the element property `name` changed.
    pub fn notify(&self, name: &str) {
        self.host.notify(name);
    }

    /// Tears down every subscription and pending update.
    pub fn detach(&self) {
        self.apollo.detach();
    }

    #[wasm_bindgen(getter, js_name = isDetached)]
    pub fn is_detached(&self) -> bool {
        self.apollo.is_detached()
    }

    /// Current state of `key`, or `undefined`.
    pub fn snapshot(&self, key: &str) -> Result<JsValue, JsValue> {
        let Some(snapshot) = self.apollo.snapshot(key) else {
            return Ok(JsValue::UNDEFINED);
        };
        let view = SnapshotView {
            key: &snapshot.key,
            skipped: snapshot.state == SkipState::Skipped,
            subscribed: snapshot.subscribed,
            first_loading_done: snapshot.first_loading_done,
        };
        let out = serde_wasm_bindgen::to_value(&view)?;
        js_sys::Reflect::set(&out, &"variables".into(), &object_to_js(&snapshot.variables))?;
        js_sys::Reflect::set(
            &out,
            &"pendingVariables".into(),
            &object_to_js(&snapshot.pending_variables),
        )?;
        Ok(out)
    }

    /// One-shot query, resolved with `{ data, loading, networkStatus }`.
    pub fn query(&self, options: &JsValue) -> js_sys::Promise {
        let request = self.request(options, "query");
        operation(|done| self.apollo.query(request, done))
    }

    pub fn mutate(&self, options: &JsValue) -> js_sys::Promise {
        let request = self.request(options, "mutation");
        operation(|done| self.apollo.mutate(request, done))
    }

    /// GraphQL subscription. Returns an unsubscribe function.
    pub fn subscribe(
        &self,
        options: &JsValue,
        next: js_sys::Function,
        error: Option<js_sys::Function>,
    ) -> js_sys::Function {
        let request = self.request(options, "query");
        let subscription = self.apollo.subscribe(request, js_observer(next, error));
        unsubscribe_function(move || subscription.unsubscribe())
    }

    /// Live query whose subscriptions are closed on `detach`.
    ///
    /// `variables` holds values, not property paths; `forceFetch` is
    /// honoured and other options go to the client untouched.
    #[wasm_bindgen(js_name = watchQuery)]
    pub fn watch_query(&self, options: &JsValue) -> JsTrackedWatchQuery {
        let mut watch = WatchQueryOptions::new(self.client.intern_document(&get(options, "query")))
            .with_variables(js_to_object(&get(options, "variables")));
        watch.force_fetch = get(options, "forceFetch").as_bool().unwrap_or(false);
        watch.extra = extra_options(options, &["query", "variables", "forceFetch"]);
        JsTrackedWatchQuery {
            inner: self.apollo.watch_query(watch),
        }
    }

    /// Number of open subscriptions that `detach` will close.
    #[wasm_bindgen(getter, js_name = trackedSubscriptions)]
    pub fn tracked_subscriptions(&self) -> usize {
        self.apollo.tracked_subscriptions()
    }

    /// Reads a property of the bound element as seen by the bindings.
    #[wasm_bindgen(js_name = getProperty)]
    pub fn get_property(&self, path: &str) -> JsValue {
        value_to_js(&self.host.get(path))
    }
}

/// Watch query returned by `Apollo.watchQuery`.
#[wasm_bindgen(js_name = WatchQuery)]
pub struct JsTrackedWatchQuery {
    inner: TrackedWatchQuery,
}

#[wasm_bindgen(js_class = WatchQuery)]
impl JsTrackedWatchQuery {
    /// Subscribes and returns an unsubscribe function.
    pub fn subscribe(&self, next: js_sys::Function, error: Option<js_sys::Function>) -> js_sys::Function {
        let subscription = self.inner.subscribe(js_observer(next, error));
        unsubscribe_function(move || subscription.unsubscribe())
    }

    #[wasm_bindgen(js_name = setVariables)]
    pub fn set_variables(&self, variables: &JsValue) {
        self.inner.set_variables(js_to_object(variables));
    }

    pub fn refetch(&self) -> js_sys::Promise {
        operation(|done| self.inner.refetch(done))
    }

    #[wasm_bindgen(getter)]
    pub fn variables(&self) -> js_sys::Object {
        object_to_js(&self.inner.variables())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_declaration_splits_binding_options() {
        let apollo = JsApollo::new(js_sys::Object::new().into(), js_sys::Object::new().into(), None);
        let options = js_sys::JSON::parse(
            r#"{"query":"{ user }","variables":{"id":"userId"},"loadingKey":"busy","skip":"hidden","fetchPolicy":"network-only"}"#,
        )
        .unwrap();

        let declaration = apollo.declaration(&options);

        assert_eq!(declaration.query, "{ user }");
        assert_eq!(declaration.variables, vec![("id".to_string(), "userId".to_string())]);
        assert_eq!(declaration.loading_key.as_deref(), Some("busy"));
        assert_eq!(declaration.skip.as_deref(), Some("hidden"));
        assert_eq!(declaration.extra.keys().collect::<Vec<_>>(), vec!["fetchPolicy"]);
    }

    #[wasm_bindgen_test]
    fn test_unknown_key_rejects() {
        let apollo = JsApollo::new(js_sys::Object::new().into(), js_sys::Object::new().into(), None);
        assert!(apollo.refetch("missing").is_err());
        assert!(apollo.snapshot("missing").unwrap().is_undefined());
    }

    fn counting_client() -> JsValue {
        let client = js_sys::Object::new();
        let watch_query = js_sys::Function::new_with_args(
            "options",
            "var client = this; \
             var observable = { closed: 0, variables: options.variables, \
               subscribe: function () { \
                 return { unsubscribe: function () { observable.closed += 1; } }; } }; \
             client.last = observable; \
             return observable;",
        );
        js_sys::Reflect::set(&client, &"watchQuery".into(), &watch_query).unwrap();
        client.into()
    }

    #[wasm_bindgen_test]
    fn test_watch_query_subscriptions_close_on_detach() {
        let client = counting_client();
        let apollo = JsApollo::new(js_sys::Object::new().into(), client.clone(), None);
        let options = js_sys::JSON::parse(r#"{"query":"{ a }","variables":{"id":1}}"#).unwrap();
        let noop = js_sys::Function::new_no_args("");

        let watch = apollo.watch_query(&options);
        assert_eq!(get(&watch.variables(), "id").as_f64(), Some(1.0));

        let unsubscribe = watch.subscribe(noop.clone(), None);
        watch.subscribe(noop, None);
        assert_eq!(apollo.tracked_subscriptions(), 2);

        unsubscribe.call0(&JsValue::NULL).unwrap();
        unsubscribe.call0(&JsValue::NULL).unwrap();
        assert_eq!(apollo.tracked_subscriptions(), 1);

        apollo.detach();
        assert_eq!(apollo.tracked_subscriptions(), 0);
        let observable = get(&client, "last");
        assert_eq!(get(&observable, "closed").as_f64(), Some(2.0));
    }
}
