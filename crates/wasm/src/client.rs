//! Adapter over an Apollo client object.
//!
//! Observables are driven through their `subscribe({ next, error })`,
//! `setVariables` and `refetch` methods; one-shot operations settle their
//! promise on the microtask queue.

use crate::convert::{get, js_to_apollo_error, js_to_object, js_to_query_result, object_to_js};
use gqlbind_client::{
    Client, CompletionCallback, Observer, Request, Subscription, WatchQuery, WatchQueryOptions,
};
use gqlbind_core::Object;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

const DOCUMENT_TOKEN: &str = "\u{0}gqlbind-document:";

type Handler = Closure<dyn FnMut(JsValue)>;

fn call_method(target: &JsValue, name: &str, args: &[&JsValue]) -> Result<JsValue, JsValue> {
    let method = get(target, name)
        .dyn_into::<js_sys::Function>()
        .map_err(|_| js_sys::Error::new(&format!("{} is not a function", name)))?;
    match args {
        [] => method.call0(target),
        [a] => method.call1(target, a),
        [a, b, ..] => method.call2(target, a, b),
    }
}

/// Completes `done` once `outcome` (a promise, a plain value or a
/// synchronous failure) settles.
fn settle(outcome: Result<JsValue, JsValue>, done: CompletionCallback) {
    let value = match outcome {
        Ok(value) => value,
        Err(err) => {
            done(Err(js_to_apollo_error(&err)));
            return;
        }
    };
    let promise = js_sys::Promise::resolve(&value);
    wasm_bindgen_futures::spawn_local(async move {
        match JsFuture::from(promise).await {
            Ok(result) => done(Ok(js_to_query_result(&result))),
            Err(err) => done(Err(js_to_apollo_error(&err))),
        }
    });
}

/// Subscription on a JS observable.
///
/// Keeps the handler closures alive for as long as the observable may call
/// them.
pub struct JsSubscription {
    handle: Option<JsValue>,
    closed: Cell<bool>,
    _handlers: Option<(Handler, Handler)>,
}

impl JsSubscription {
    fn closed() -> Self {
        Self {
            handle: None,
            closed: Cell::new(true),
            _handlers: None,
        }
    }
}

impl Subscription for JsSubscription {
    fn unsubscribe(&self) {
        if self.closed.replace(true) {
            return;
        }
        if let Some(handle) = &self.handle {
            call_method(handle, "unsubscribe", &[]).ok();
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.get()
    }
}

fn subscribe_observable(observable: &JsValue, observer: Observer) -> Box<dyn Subscription> {
    let Observer { next, error } = observer;
    let error = Rc::new(error);

    let on_next: Handler = Closure::new(move |js: JsValue| next(js_to_query_result(&js)));
    let error_handler = error.clone();
    let on_error: Handler =
        Closure::new(move |js: JsValue| error_handler(js_to_apollo_error(&js)));

    let handlers = js_sys::Object::new();
    js_sys::Reflect::set(&handlers, &"next".into(), on_next.as_ref()).ok();
    js_sys::Reflect::set(&handlers, &"error".into(), on_error.as_ref()).ok();
    let handlers: JsValue = handlers.into();

    match call_method(observable, "subscribe", &[&handlers]) {
        Ok(handle) => Box::new(JsSubscription {
            handle: Some(handle),
            closed: Cell::new(false),
            _handlers: Some((on_next, on_error)),
        }),
        Err(err) => {
            error(js_to_apollo_error(&err));
            Box::new(JsSubscription::closed())
        }
    }
}

/// Watch query returned by `client.watchQuery`.
pub struct JsWatchQuery {
    observable: Result<JsValue, JsValue>,
}

impl WatchQuery for JsWatchQuery {
    fn subscribe(&self, observer: Observer) -> Box<dyn Subscription> {
        match &self.observable {
            Ok(observable) => subscribe_observable(observable, observer),
            Err(err) => {
                (observer.error)(js_to_apollo_error(err));
                Box::new(JsSubscription::closed())
            }
        }
    }

    fn set_variables(&self, variables: Object) {
        if let Ok(observable) = &self.observable {
            let variables: JsValue = object_to_js(&variables).into();
            if let Err(err) = call_method(observable, "setVariables", &[&variables]) {
                web_sys::console::error_2(&"setVariables failed:".into(), &err);
            }
        }
    }

    fn refetch(&self, done: CompletionCallback) {
        match &self.observable {
            Ok(observable) => settle(call_method(observable, "refetch", &[]), done),
            Err(err) => done(Err(js_to_apollo_error(err))),
        }
    }

    fn variables(&self) -> Object {
        match &self.observable {
            Ok(observable) => js_to_object(&get(observable, "variables")),
            Err(_) => Object::new(),
        }
    }
}

/// An Apollo client instance seen through the `Client` seam.
pub struct JsClient {
    client: JsValue,
    documents: RefCell<Vec<JsValue>>,
}

impl JsClient {
    pub fn new(client: JsValue) -> Rc<Self> {
        Rc::new(Self {
            client,
            documents: RefCell::new(Vec::new()),
        })
    }

    pub fn inner(&self) -> &JsValue {
        &self.client
    }

    /// Returns the document text, or a token standing for a parsed
    /// document node that is swapped back in when calling the client.
    ///
    /// A node seen before keeps its token, so the table grows with the
    /// number of distinct documents only.
    pub fn intern_document(&self, document: &JsValue) -> String {
        if let Some(source) = document.as_string() {
            return source;
        }
        let mut documents = self.documents.borrow_mut();
        let index = match documents
            .iter()
            .position(|known| js_sys::Object::is(known, document))
        {
            Some(index) => index,
            None => {
                documents.push(document.clone());
                documents.len() - 1
            }
        };
        format!("{}{}", DOCUMENT_TOKEN, index)
    }

    /// Number of distinct document nodes interned so far.
    pub fn document_count(&self) -> usize {
        self.documents.borrow().len()
    }

    fn document(&self, source: &str) -> JsValue {
        source
            .strip_prefix(DOCUMENT_TOKEN)
            .and_then(|index| index.parse::<usize>().ok())
            .and_then(|index| self.documents.borrow().get(index).cloned())
            .unwrap_or_else(|| JsValue::from_str(source))
    }

    fn request_options(&self, field: &str, document: &str, variables: &Object, extra: &Object) -> JsValue {
        let options = object_to_js(extra);
        js_sys::Reflect::set(&options, &field.into(), &self.document(document)).ok();
        js_sys::Reflect::set(&options, &"variables".into(), &object_to_js(variables)).ok();
        options.into()
    }
}

impl Client for JsClient {
    fn watch_query(&self, options: WatchQueryOptions) -> Rc<dyn WatchQuery> {
        let js = self.request_options("query", &options.query, &options.variables, &options.extra);
        if options.force_fetch {
            js_sys::Reflect::set(&js, &"forceFetch".into(), &JsValue::TRUE).ok();
        }
        Rc::new(JsWatchQuery {
            observable: call_method(&self.client, "watchQuery", &[&js]),
        })
    }

    fn query(&self, request: Request, done: CompletionCallback) {
        let js = self.request_options("query", &request.document, &request.variables, &request.extra);
        settle(call_method(&self.client, "query", &[&js]), done);
    }

    fn mutate(&self, request: Request, done: CompletionCallback) {
        let js = self.request_options("mutation", &request.document, &request.variables, &request.extra);
        settle(call_method(&self.client, "mutate", &[&js]), done);
    }

    fn subscribe(&self, request: Request, observer: Observer) -> Box<dyn Subscription> {
        let js = self.request_options("query", &request.document, &request.variables, &request.extra);
        match call_method(&self.client, "subscribe", &[&js]) {
            Ok(observable) => subscribe_observable(&observable, observer),
            Err(err) => {
                (observer.error)(js_to_apollo_error(&err));
                Box::new(JsSubscription::closed())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_documents_are_interned() {
        let client = JsClient::new(js_sys::Object::new().into());
        assert_eq!(client.intern_document(&JsValue::from_str("{ a }")), "{ a }");

        let node = js_sys::JSON::parse(r#"{"kind":"Document"}"#).unwrap();
        let token = client.intern_document(&node);
        assert!(token.starts_with(DOCUMENT_TOKEN));
        assert_eq!(client.document(&token), node);
        assert_eq!(client.document("{ b }").as_string().as_deref(), Some("{ b }"));
    }

    #[wasm_bindgen_test]
    fn test_same_document_reuses_its_token() {
        let client = JsClient::new(js_sys::Object::new().into());
        let node = js_sys::JSON::parse(r#"{"kind":"Document"}"#).unwrap();
        let other = js_sys::JSON::parse(r#"{"kind":"Document"}"#).unwrap();

        let first = client.intern_document(&node);
        for _ in 0..5 {
            assert_eq!(client.intern_document(&node), first);
        }
        assert_eq!(client.document_count(), 1);

        assert_ne!(client.intern_document(&other), first);
        assert_eq!(client.document_count(), 2);
        client.intern_document(&JsValue::from_str("{ a }"));
        assert_eq!(client.document_count(), 2);
    }

    #[wasm_bindgen_test]
    fn test_missing_watch_query_fails_subscribers() {
        let client = JsClient::new(js_sys::Object::new().into());
        let observable = client.watch_query(WatchQueryOptions::new("{ a }"));
        let failures = Rc::new(Cell::new(0));
        let failures_clone = failures.clone();
        let sub = observable.subscribe(Observer::new(
            |_| {},
            move |_| failures_clone.set(failures_clone.get() + 1),
        ));

        assert_eq!(failures.get(), 1);
        assert!(sub.is_closed());
    }
}
