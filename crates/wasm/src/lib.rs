//! gqlbind WASM - JavaScript bindings for gqlbind.
//!
//! Binds a custom element to an Apollo client instance: declared queries are
//! kept subscribed while the element is attached, results land on element
//! properties and element properties drive query variables and skip
//! conditions.
//!
//! # Core Components
//!
//! - `JsApollo` (exported as `Apollo`): per-element bindings
//! - `JsTrackedWatchQuery` (exported as `WatchQuery`): live query closed on detach
//! - `JsHost`: element property access and change notification
//! - `JsClient`: adapter over the Apollo client object
//! - `JsTimers`: `setTimeout`-backed debounce timers
//! - `ConsoleDiagnostics`: reports written to the browser console
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import { Apollo } from 'gqlbind';
//!
//! class UserCard extends HTMLElement {
//!   connectedCallback() {
//!     this.apollo = new Apollo(this, client);
//!     this.apollo.process('user', {
//!       query: USER_QUERY,
//!       variables: { id: 'userId' },
//!       skip: 'hidden',
//!       loadingKey: 'loading',
//!     });
//!     this.apollo.processObservers();
//!   }
//!
//!   disconnectedCallback() {
//!     this.apollo.detach();
//!   }
//! }
//! ```

pub mod apollo;
pub mod client;
pub mod convert;
#[cfg(feature = "console")]
pub mod diagnostics;
pub mod host;
pub mod timers;

pub use apollo::{JsApollo, JsTrackedWatchQuery};
pub use client::{JsClient, JsSubscription, JsWatchQuery};
pub use convert::{js_to_value, value_to_js};
#[cfg(feature = "console")]
pub use diagnostics::ConsoleDiagnostics;
pub use host::JsHost;
pub use timers::JsTimers;

use wasm_bindgen::prelude::*;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {}
