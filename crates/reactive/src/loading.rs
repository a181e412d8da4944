//! Loading projection.

use crate::host::Host;
use crate::instance::Instance;
use crate::options::{QueryOptions, WatchLoading};
use gqlbind_core::Value;

/// Mirrors a loading flag onto the host.
///
/// Writes `value` to the `loading_key` property and invokes `callback` with
/// the host as context, each when declared.
pub fn set_loading(
    host: &dyn Host,
    loading_key: Option<&str>,
    value: bool,
    callback: Option<&WatchLoading>,
) {
    if let Some(key) = loading_key {
        host.set(key, Value::Bool(value));
    }
    if let Some(callback) = callback {
        callback(host, value);
    }
}

impl Instance {
    pub(crate) fn set_loading(&self, options: &QueryOptions, value: bool) {
        set_loading(
            self.host.as_ref(),
            options.loading_key.as_deref(),
            value,
            options.watch_loading.as_ref(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_host::MemoryHost;
    use alloc::rc::Rc;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    #[test]
    fn test_writes_property_and_calls_back() {
        let host = MemoryHost::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        let callback: WatchLoading = Rc::new(move |host: &dyn Host, value: bool| {
            seen_clone.borrow_mut().push((value, host.get("busy")));
        });

        set_loading(host.as_ref(), Some("busy"), true, Some(&callback));
        set_loading(host.as_ref(), Some("busy"), false, Some(&callback));

        assert_eq!(host.writes_to("busy"), vec![Value::Bool(true), Value::Bool(false)]);
        // The property is written before the callback runs.
        assert_eq!(
            *seen.borrow(),
            vec![(true, Value::Bool(true)), (false, Value::Bool(false))]
        );
    }

    #[test]
    fn test_nothing_declared_is_noop() {
        let host = MemoryHost::new();
        set_loading(host.as_ref(), None, true, None);
        assert!(host.writes().is_empty());
    }
}
