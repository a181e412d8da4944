//! Skip gate and variable debouncing.

use gqlbind_client::mock::MockClient;
use gqlbind_core::{Object, Value};
use gqlbind_reactive::{
    Apollo, BindingConfig, Host, ManualTimers, MemoryHost, QueryOptions, SkipState,
};
use std::rc::Rc;

const FEED_QUERY: &str = "query Feed($id: ID, $lang: String) { feed(id: $id, lang: $lang) }";

fn setup(config: BindingConfig) -> (Rc<MemoryHost>, Rc<MockClient>, Rc<ManualTimers>, Apollo) {
    let host = MemoryHost::new();
    let client = MockClient::new();
    let timers = ManualTimers::new();
    let apollo = Apollo::builder(host.clone(), client.clone(), timers.clone())
        .config(config)
        .build();
    (host, client, timers, apollo)
}

fn vars(pairs: &[(&str, Value)]) -> Object {
    pairs
        .iter()
        .map(|(name, value)| (*name, value.clone()))
        .collect()
}

#[test]
fn test_skip_source_starts_skipped() {
    let (host, client, timers, apollo) = setup(BindingConfig::default());
    apollo
        .process("feed", QueryOptions::new(FEED_QUERY).skip("hidden"))
        .unwrap();
    apollo.process_observers();

    let watch = client.watch(0).unwrap();
    assert_eq!(watch.subscribe_count(), 0);
    assert_eq!(apollo.snapshot("feed").unwrap().state, SkipState::Skipped);

    host.set("hidden", Value::Bool(false));
    assert_eq!(watch.subscribe_count(), 0);
    timers.run_until_idle();

    assert_eq!(watch.subscribe_count(), 1);
    let snapshot = apollo.snapshot("feed").unwrap();
    assert_eq!(snapshot.state, SkipState::Active);
    assert!(snapshot.subscribed);
}

#[test]
fn test_truthy_skip_closes_the_subscription() {
    let (host, client, timers, apollo) = setup(BindingConfig::default());
    apollo
        .process("feed", QueryOptions::new(FEED_QUERY).skip("hidden"))
        .unwrap();
    host.set("hidden", Value::Bool(false));
    timers.run_until_idle();
    let watch = client.watch(0).unwrap();

    host.set("hidden", Value::from("yes"));
    timers.run_until_idle();

    assert_eq!(watch.unsubscribe_count(), 1);
    assert_eq!(watch.active_subscriptions(), 0);
    assert_eq!(apollo.tracked_subscriptions(), 0);
    assert_eq!(apollo.snapshot("feed").unwrap().state, SkipState::Skipped);
}

#[test]
fn test_rapid_toggles_coalesce() {
    let (host, client, timers, apollo) = setup(BindingConfig::new().with_skip_debounce(20));
    apollo
        .process("feed", QueryOptions::new(FEED_QUERY).skip("hidden"))
        .unwrap();
    host.set("hidden", Value::Bool(false));
    timers.advance(20);
    let watch = client.watch(0).unwrap();
    assert_eq!(watch.subscribe_count(), 1);

    // true -> false -> true within one window.
    host.set("hidden", Value::Bool(true));
    timers.advance(5);
    host.set("hidden", Value::Bool(false));
    timers.advance(5);
    host.set("hidden", Value::Bool(true));
    timers.advance(19);
    assert_eq!(watch.unsubscribe_count(), 0);
    timers.advance(1);

    assert_eq!(watch.subscribe_count(), 1);
    assert_eq!(watch.unsubscribe_count(), 1);
    assert_eq!(apollo.snapshot("feed").unwrap().state, SkipState::Skipped);
}

#[test]
fn test_toggles_ending_in_current_state_change_nothing() {
    let (host, client, timers, apollo) = setup(BindingConfig::default());
    apollo
        .process("feed", QueryOptions::new(FEED_QUERY).skip("hidden"))
        .unwrap();
    host.set("hidden", Value::Bool(false));
    timers.run_until_idle();
    let watch = client.watch(0).unwrap();

    host.set("hidden", Value::Bool(true));
    host.set("hidden", Value::Bool(false));
    timers.run_until_idle();

    assert_eq!(watch.subscribe_count(), 1);
    assert_eq!(watch.unsubscribe_count(), 0);
}

#[test]
fn test_same_variable_changes_keep_the_last_value() {
    let (host, client, timers, apollo) = setup(BindingConfig::default());
    apollo
        .process("feed", QueryOptions::new(FEED_QUERY).variable("id", "feedId"))
        .unwrap();
    apollo.process_observers();
    let watch = client.watch(0).unwrap();

    for id in 1..=3 {
        host.set("feedId", Value::from(id));
    }
    assert!(watch.set_variables_calls().is_empty());
    timers.run_until_idle();

    assert_eq!(
        watch.set_variables_calls(),
        vec![vars(&[("id", Value::from(3))])]
    );
    assert!(apollo.snapshot("feed").unwrap().pending_variables.is_empty());
}

#[test]
fn test_different_variables_are_merged_into_one_flush() {
    let (host, client, timers, apollo) = setup(BindingConfig::default());
    apollo
        .process(
            "feed",
            QueryOptions::new(FEED_QUERY)
                .variable("id", "feedId")
                .variable("lang", "locale"),
        )
        .unwrap();
    apollo.process_observers();
    let watch = client.watch(0).unwrap();

    host.set("feedId", Value::from(2));
    host.set("locale", Value::from("fr"));
    timers.run_until_idle();

    assert_eq!(
        watch.set_variables_calls(),
        vec![vars(&[("id", Value::from(2)), ("lang", Value::from("fr"))])]
    );
}

#[test]
fn test_flush_waits_for_a_quiet_window() {
    let (host, client, timers, apollo) =
        setup(BindingConfig::new().with_variable_debounce(50));
    apollo
        .process("feed", QueryOptions::new(FEED_QUERY).variable("id", "feedId"))
        .unwrap();
    apollo.process_observers();
    let watch = client.watch(0).unwrap();

    host.set("feedId", Value::from(1));
    timers.advance(30);
    host.set("feedId", Value::from(2));
    timers.advance(30);
    assert!(watch.set_variables_calls().is_empty());
    timers.advance(20);

    assert_eq!(watch.set_variables_calls().len(), 1);
    assert_eq!(apollo.snapshot("feed").unwrap().variables.get("id"), Some(&Value::from(2)));
}

#[test]
fn test_later_changes_start_a_new_flush() {
    let (host, client, timers, apollo) = setup(BindingConfig::default());
    apollo
        .process("feed", QueryOptions::new(FEED_QUERY).variable("id", "feedId"))
        .unwrap();
    apollo.process_observers();
    let watch = client.watch(0).unwrap();

    host.set("feedId", Value::from(1));
    timers.run_until_idle();
    host.set("feedId", Value::from(2));
    timers.run_until_idle();

    assert_eq!(
        watch.set_variables_calls(),
        vec![vars(&[("id", Value::from(1))]), vars(&[("id", Value::from(2))])]
    );
}

#[test]
fn test_skipped_query_never_reaches_the_network() {
    let (host, client, timers, apollo) = setup(BindingConfig::default());
    apollo
        .process(
            "feed",
            QueryOptions::new(FEED_QUERY)
                .variable("id", "feedId")
                .skip("hidden"),
        )
        .unwrap();
    apollo.process_observers();
    let watch = client.watch(0).unwrap();

    host.set("feedId", Value::from(4));
    host.set("feedId", Value::from(5));
    timers.run_until_idle();

    assert!(watch.set_variables_calls().is_empty());
    assert_eq!(watch.subscribe_count(), 0);
    assert_eq!(
        apollo.snapshot("feed").unwrap().pending_variables,
        vars(&[("id", Value::from(5))])
    );

    // Activation brings the observable up to date in one call.
    host.set("hidden", Value::Bool(false));
    timers.run_until_idle();

    assert_eq!(watch.subscribe_count(), 1);
    assert_eq!(
        watch.set_variables_calls(),
        vec![vars(&[("id", Value::from(5))])]
    );
    assert!(apollo.snapshot("feed").unwrap().pending_variables.is_empty());
}

#[test]
fn test_activation_cancels_pending_flushes() {
    let (host, client, timers, apollo) = setup(BindingConfig::default());
    apollo
        .process("feed", QueryOptions::new(FEED_QUERY).variable("id", "feedId"))
        .unwrap();
    host.set("feedId", Value::from(9));
    assert_eq!(apollo.pending_flushes(), 1);

    apollo.process_observers();
    assert_eq!(apollo.pending_flushes(), 0);
    timers.run_until_idle();

    let watch = client.watch(0).unwrap();
    assert_eq!(
        watch.set_variables_calls(),
        vec![vars(&[("id", Value::from(9))])]
    );
}

#[test]
fn test_nested_source_paths_are_observed() {
    let (host, client, timers, apollo) = setup(BindingConfig::default());
    apollo
        .process("feed", QueryOptions::new(FEED_QUERY).variable("id", "route.id"))
        .unwrap();
    apollo.process_observers();

    let mut route = Object::new();
    route.insert("id", 12);
    route.insert("name", "feed");
    host.set("route", Value::Object(route));
    timers.run_until_idle();

    assert_eq!(
        client.watch(0).unwrap().set_variables_calls(),
        vec![vars(&[("id", Value::from(12))])]
    );
}
