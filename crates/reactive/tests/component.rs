//! The component mixin across attach/detach cycles.

use gqlbind_client::mock::MockClient;
use gqlbind_client::QueryResult;
use gqlbind_core::{Error, Object, Value};
use gqlbind_reactive::{
    BindingConfig, DiagnosticLog, Host, ManualTimers, MemoryHost, QueryComponent, QueryOptions,
    Report,
};
use std::rc::Rc;

fn component() -> (Rc<MemoryHost>, Rc<MockClient>, Rc<DiagnosticLog>, QueryComponent) {
    let host = MemoryHost::new();
    let client = MockClient::new();
    let timers = ManualTimers::new();
    let log = Rc::new(DiagnosticLog::new());
    let component = QueryComponent::new(host.clone(), client.clone(), timers)
        .with_config(BindingConfig::default())
        .with_diagnostics(log.clone())
        .declare("user", QueryOptions::new("{ user }").loading_key("loading"))
        .declare("feed", QueryOptions::new("{ feed }").skip("hidden"));
    (host, client, log, component)
}

#[test]
fn test_register_declares_and_attach_activates() {
    let (host, client, _log, mut component) = component();

    component.register().unwrap();
    assert_eq!(client.watch_count(), 2);
    assert_eq!(client.watch(0).unwrap().subscribe_count(), 0);

    component.attached().unwrap();
    let user = client.watch(0).unwrap();
    assert_eq!(user.subscribe_count(), 1);
    // Skipped until its source says otherwise.
    assert_eq!(client.watch(1).unwrap().subscribe_count(), 0);

    let mut data = Object::new();
    data.insert("user", "ada");
    user.emit(QueryResult::ready(data));
    assert_eq!(host.get("user"), Value::from("ada"));
    assert_eq!(
        component.declared_keys(),
        vec!["user".to_string(), "feed".to_string()]
    );
}

#[test]
fn test_reattach_uses_fresh_records() {
    let (_host, client, _log, mut component) = component();
    component.attached().unwrap();
    let first = client.watch(0).unwrap();

    component.detached();
    assert!(component.apollo().is_none());
    assert_eq!(first.unsubscribe_count(), 1);

    component.attached().unwrap();
    assert_eq!(client.watch_count(), 4);
    assert_eq!(client.watch(2).unwrap().subscribe_count(), 1);
    assert_eq!(first.subscribe_count(), 1);
}

#[test]
fn test_repeated_attach_keeps_one_subscription() {
    let (_host, client, _log, mut component) = component();
    component.attached().unwrap();
    component.attached().unwrap();

    assert_eq!(client.watch_count(), 2);
    assert_eq!(client.watch(0).unwrap().subscribe_count(), 1);
    assert_eq!(component.apollo().unwrap().tracked_subscriptions(), 1);
}

#[test]
fn test_failed_declarations_are_reported_and_skipped() {
    let host = MemoryHost::new();
    let client = MockClient::new();
    let log = Rc::new(DiagnosticLog::new());
    let mut component = QueryComponent::new(host, client.clone(), ManualTimers::new())
        .with_diagnostics(log.clone())
        .declare("a", QueryOptions::new("{ a }"))
        .declare("a", QueryOptions::new("{ again }"))
        .declare("b", QueryOptions::new("{ b }"));

    assert_eq!(component.attached(), Err(Error::duplicate_query("a")));
    assert_eq!(client.watch_count(), 2);
    assert_eq!(client.watch(1).unwrap().subscribe_count(), 1);
    assert_eq!(log.reports(), vec![Report::DuplicateQuery { key: "a".into() }]);
}
