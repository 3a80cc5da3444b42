//! Per-instance widget state over a shared session store.
//!
//! Reusable widgets that are instantiated several times in the same application share a single
//! session-wide key-value store. Each instance gets a [`Scope`], whose [`Namespace`] is derived
//! from the instantiation site (the caller location, or an explicit key), and all the state of
//! the instance is stored under keys prefixed by that namespace.
//!
//! ```
//! use widget_state::{MemoryStore, Scope, Session};
//!
//! struct TableChooser;
//!
//! let session = Session::new(MemoryStore::new());
//! for _pass in 0..2 {
//!     session.begin_pass().unwrap();
//!     let sidebar = Scope::new::<TableChooser>(&session).unwrap();
//!     let main = Scope::new::<TableChooser>(&session).unwrap();
//!     if !sidebar.has("table").unwrap() {
//!         sidebar.set("table", "CUSTOMERS").unwrap();
//!     }
//!     assert_eq!(sidebar.get("table", "").unwrap(), "CUSTOMERS");
//!     assert_eq!(main.get("table", "").unwrap(), "");
//! }
//! ```
extern crate self as widget_state;

mod call_key;
mod error;
mod fields;
mod key;
mod namespace;
mod scope;
mod session;
mod store;
mod widget;

pub use call_key::CallKey;
pub use error::{Result, StateError};
pub use fields::ScopedFields;
pub use key::InstanceKey;
pub use namespace::Namespace;
pub use scope::Scope;
pub use session::{Config, ScopeInfo, ScopeKey, Session};
pub use store::{MemoryStore, SessionStore, StateValue};
pub use widget::Widget;
pub use widget_state_macros::ScopedFields;
