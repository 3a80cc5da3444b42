use crate::{
    call_key::{site_hash, CallKey},
    error::{Result, StateError},
    key::InstanceKey,
    namespace::Namespace,
    store::SessionStore,
};
use fnv::{FnvHashMap, FnvHashSet};
use slotmap::SlotMap;
use std::{cell::RefCell, fmt, panic::Location, rc::Rc};
use tracing::{debug, trace, warn};

slotmap::new_key_type! {
    pub struct ScopeKey;
}

/// Session options.
#[derive(Clone, Debug)]
pub struct Config {
    /// Character terminating each namespace segment.
    pub separator: char,
    /// Whether widgets should display the source location they were created at.
    pub show_origins: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            separator: '.',
            show_origins: false,
        }
    }
}

/// A widget scope registered during the current pass.
#[derive(Clone, Debug)]
pub struct ScopeInfo {
    pub namespace: Namespace,
    pub widget_type: &'static str,
    pub origin: Option<&'static Location<'static>>,
    pub parent: Option<ScopeKey>,
}

struct PassState {
    /// Number of passes started so far. Zero until the first `begin_pass`.
    revision: usize,
    scopes: SlotMap<ScopeKey, ScopeInfo>,
    /// Scopes of the current pass, in creation order.
    order: Vec<ScopeKey>,
    /// Namespaces handed out during the current pass.
    claimed: FnvHashMap<String, ScopeKey>,
    /// Number of instances created at each call site during the current pass.
    siblings: FnvHashMap<u64, usize>,
    /// Keys written by `Scope::apply_default`, kept alive across passes.
    persisted: FnvHashSet<String>,
}

impl PassState {
    fn derive_namespace(
        &mut self,
        parent: &Namespace,
        widget_type: &'static str,
        key: &InstanceKey,
    ) -> Result<(Namespace, bool)> {
        match key {
            InstanceKey::Caller(location) => {
                let site = site_hash(parent.as_str(), widget_type, location);
                let index = self.siblings.entry(site).or_insert(0);
                let call_key = CallKey::new(location, *index);
                *index += 1;
                Ok((
                    parent.child(widget_type, Some(&call_key.to_string())),
                    true,
                ))
            }
            InstanceKey::Named(name) => {
                parent.validate_id(name)?;
                Ok((parent.child(widget_type, Some(name)), true))
            }
            InstanceKey::Shared => Ok((parent.child(widget_type, None), false)),
        }
    }
}

struct SessionInner {
    config: Config,
    store: RefCell<Box<dyn SessionStore>>,
    state: RefCell<PassState>,
}

/// Handle to the session store and the bookkeeping of the current render pass.
///
/// Cloning the handle is cheap; all clones refer to the same session.
#[derive(Clone)]
pub struct Session(Rc<SessionInner>);

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let state = self.0.state.borrow();
        f.debug_struct("Session")
            .field("revision", &state.revision)
            .field("scopes", &state.order.len())
            .field("persisted", &state.persisted.len())
            .finish()
    }
}

impl Session {
    pub fn new(store: impl SessionStore + 'static) -> Session {
        Session::with_config(store, Config::default())
    }

    pub fn with_config(store: impl SessionStore + 'static, config: Config) -> Session {
        Session(Rc::new(SessionInner {
            config,
            store: RefCell::new(Box::new(store)),
            state: RefCell::new(PassState {
                revision: 0,
                scopes: SlotMap::with_key(),
                order: vec![],
                claimed: Default::default(),
                siblings: Default::default(),
                persisted: Default::default(),
            }),
        }))
    }

    pub fn config(&self) -> Config {
        self.0.config.clone()
    }

    /// Returns the number of passes started so far.
    pub fn revision(&self) -> usize {
        self.0.state.borrow().revision
    }

    /// Starts a new render pass.
    ///
    /// Must be called by the application each time it re-runs its UI code, before creating
    /// widgets. Resets sibling indices so that each call site gets the same namespaces as in the
    /// previous pass, then re-writes persisted defaults.
    ///
    /// Fails with `StoreBusy` if called from inside `with_store`.
    pub fn begin_pass(&self) -> Result<usize> {
        let mut store = self
            .0
            .store
            .try_borrow_mut()
            .map_err(|_| StateError::StoreBusy)?;
        let mut state = self.0.state.borrow_mut();
        let state = &mut *state;
        state.revision += 1;
        state.scopes.clear();
        state.order.clear();
        state.claimed.clear();
        state.siblings.clear();

        let mut missing = vec![];
        for key in state.persisted.iter() {
            if !store.retain(key)? {
                missing.push(key.clone());
            }
        }
        for key in missing {
            warn!(key = %key, "persisted entry disappeared from the session store");
            state.persisted.remove(&key);
        }

        debug!(revision = state.revision, "begin pass");
        Ok(state.revision)
    }

    /// Runs a closure with mutable access to the underlying store.
    ///
    /// The store stays borrowed while the closure runs: reading or writing scoped state from
    /// inside it (or nesting `with_store`) fails with `StateError::StoreBusy`. Creating scopes
    /// is allowed.
    pub fn with_store<R>(&self, f: impl FnOnce(&mut dyn SessionStore) -> R) -> Result<R> {
        let mut store = self
            .0
            .store
            .try_borrow_mut()
            .map_err(|_| StateError::StoreBusy)?;
        Ok(f(&mut **store))
    }

    /// Returns the scopes registered during the current pass, in creation order.
    pub fn scopes(&self) -> Vec<ScopeInfo> {
        let state = self.0.state.borrow();
        state
            .order
            .iter()
            .map(|key| state.scopes[*key].clone())
            .collect()
    }

    pub fn scope_info(&self, key: ScopeKey) -> Option<ScopeInfo> {
        self.0.state.borrow().scopes.get(key).cloned()
    }

    /// Logs the scopes of the current pass.
    pub fn dump(&self) {
        let state = self.0.state.borrow();
        trace!(revision = state.revision, "scopes:");
        for &key in state.order.iter() {
            let info = &state.scopes[key];
            trace!(
                "{:?} `{}` type={} parent={:?} origin={}",
                key,
                info.namespace,
                info.widget_type,
                info.parent,
                info.origin
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| "-".to_owned()),
            );
        }
    }

    /// Derives and claims the namespace of a new widget instance.
    pub(crate) fn register(
        &self,
        parent: &Namespace,
        parent_key: Option<ScopeKey>,
        widget_type: &'static str,
        key: &InstanceKey,
    ) -> Result<(Namespace, ScopeKey)> {
        let mut state = self.0.state.borrow_mut();
        if state.revision == 0 {
            return Err(StateError::NoActivePass);
        }

        let (namespace, exclusive) = state.derive_namespace(parent, widget_type, key)?;
        if exclusive && state.claimed.contains_key(namespace.as_str()) {
            return Err(StateError::DuplicateNamespace(namespace.to_string()));
        }

        let scope_key = state.scopes.insert(ScopeInfo {
            namespace: namespace.clone(),
            widget_type,
            origin: key.location(),
            parent: parent_key,
        });
        state.order.push(scope_key);
        if exclusive {
            state
                .claimed
                .insert(namespace.as_str().to_owned(), scope_key);
        }

        debug!(namespace = %namespace, widget_type, "derived widget namespace");
        Ok((namespace, scope_key))
    }

    pub(crate) fn persist(&self, key: String) {
        self.0.state.borrow_mut().persisted.insert(key);
    }

    pub(crate) fn is_persisted(&self, key: &str) -> bool {
        self.0.state.borrow().persisted.contains(key)
    }
}
