//! Scoped access to the session store.
use crate::{
    error::{Result, StateError},
    key::InstanceKey,
    namespace::{short_type_name, Namespace},
    session::{ScopeInfo, ScopeKey, Session},
    store::StateValue,
};
use std::{
    any::{type_name, Any},
    fmt,
    panic::Location,
};
use tracing::trace;

/// The state partition of one widget instance.
///
/// Every field read or written through a scope is stored in the session store under
/// `namespace + field`. A scope never touches keys outside its namespace.
///
/// # Example
///
/// ```
/// use widget_state::{MemoryStore, Scope, Session};
///
/// struct Counter;
///
/// let session = Session::new(MemoryStore::new());
/// session.begin_pass().unwrap();
/// let a = Scope::keyed::<Counter>(&session, "a").unwrap();
/// let b = Scope::keyed::<Counter>(&session, "b").unwrap();
/// a.set("count", 1u32).unwrap();
/// assert_eq!(a.get("count", 0u32).unwrap(), 1);
/// assert_eq!(b.get("count", 0u32).unwrap(), 0);
/// ```
#[derive(Clone)]
pub struct Scope {
    session: Session,
    namespace: Namespace,
    key: ScopeKey,
    origin: Option<&'static Location<'static>>,
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Scope")
            .field("namespace", &self.namespace.as_str())
            .field("origin", &self.origin)
            .finish()
    }
}

impl Scope {
    /// Creates the scope of a widget of type `W`, identified by the location of the caller.
    ///
    /// Repeated calls from the same location during one pass (e.g. in a loop) are told apart by
    /// their order.
    #[track_caller]
    pub fn new<W: ?Sized>(session: &Session) -> Result<Scope> {
        Scope::with_key::<W>(session, InstanceKey::from_caller())
    }

    /// Creates the scope of a widget of type `W`, identified by an explicit key.
    pub fn keyed<W: ?Sized>(session: &Session, key: impl Into<InstanceKey>) -> Result<Scope> {
        Scope::with_key::<W>(session, key.into())
    }

    /// Creates a scope shared by all instances of `W`.
    ///
    /// The namespace is built from the unqualified type name only: types with the same name in
    /// different modules (`a::Blend` and `b::Blend`), or instantiations of one generic type with
    /// different arguments (`Chooser<A>` and `Chooser<B>`), share the same state. Give such
    /// widgets distinct names, or use [`Scope::keyed`] with a fixed key.
    pub fn shared<W: ?Sized>(session: &Session) -> Result<Scope> {
        Scope::with_key::<W>(session, InstanceKey::Shared)
    }

    pub fn with_key<W: ?Sized>(session: &Session, key: InstanceKey) -> Result<Scope> {
        let root = Namespace::root(session.config().separator);
        Scope::derive(session, &root, None, short_type_name::<W>(), key)
    }

    /// Creates the scope of a widget nested in this one, identified by the location of the caller.
    #[track_caller]
    pub fn child<W: ?Sized>(&self) -> Result<Scope> {
        self.child_with_key::<W>(InstanceKey::from_caller())
    }

    /// Creates the scope of a widget nested in this one, identified by an explicit key.
    pub fn child_keyed<W: ?Sized>(&self, key: impl Into<InstanceKey>) -> Result<Scope> {
        self.child_with_key::<W>(key.into())
    }

    pub fn child_with_key<W: ?Sized>(&self, key: InstanceKey) -> Result<Scope> {
        Scope::derive(
            &self.session,
            &self.namespace,
            Some(self.key),
            short_type_name::<W>(),
            key,
        )
    }

    fn derive(
        session: &Session,
        parent: &Namespace,
        parent_key: Option<ScopeKey>,
        widget_type: &'static str,
        key: InstanceKey,
    ) -> Result<Scope> {
        let (namespace, scope_key) = session.register(parent, parent_key, widget_type, &key)?;
        Ok(Scope {
            session: session.clone(),
            namespace,
            key: scope_key,
            origin: key.location(),
        })
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Source location of the widget constructor, for scopes identified by their caller.
    pub fn origin(&self) -> Option<&'static Location<'static>> {
        self.origin
    }

    /// Returns the origin as a string if the session is configured to display it.
    pub fn origin_label(&self) -> Option<String> {
        if self.session.config().show_origins {
            self.origin.map(|l| l.to_string())
        } else {
            None
        }
    }

    /// Registry entry of this scope, or `None` if it was created during a previous pass.
    pub fn info(&self) -> Option<ScopeInfo> {
        self.session.scope_info(self.key)
    }

    /// Returns the key under which `field` is stored in the session store.
    pub fn full_key(&self, field: &str) -> String {
        self.namespace.full_key(field)
    }

    /// Returns the value of `field`, or `None` if it was never set.
    pub fn get_opt<T: Any + Clone>(&self, field: &str) -> Result<Option<T>> {
        let key = self.full_key(field);
        trace!(key = %key, "get");
        self.session.with_store(|store| -> Result<Option<T>> {
            match store.get(&key)? {
                Some(value) => match value.downcast_ref::<T>() {
                    Some(value) => Ok(Some(value.clone())),
                    None => Err(StateError::TypeMismatch {
                        key: key.clone(),
                        expected: type_name::<T>(),
                    }),
                },
                None => Ok(None),
            }
        })?
    }

    /// Returns the value of `field`, or `default` if it was never set. Does not modify the store.
    pub fn get<T: Any + Clone>(&self, field: &str, default: T) -> Result<T> {
        Ok(self.get_opt(field)?.unwrap_or(default))
    }

    /// Sets the value of `field`, replacing any previous value.
    pub fn set<T: Any>(&self, field: &str, value: T) -> Result<()> {
        self.set_boxed(field, Box::new(value))
    }

    pub fn set_boxed(&self, field: &str, value: StateValue) -> Result<()> {
        let key = self.full_key(field);
        trace!(key = %key, "set");
        self.session.with_store(|store| store.set(&key, value))??;
        Ok(())
    }

    /// Returns whether `field` has a value.
    pub fn has(&self, field: &str) -> Result<bool> {
        let key = self.full_key(field);
        Ok(self.session.with_store(|store| store.contains(&key))??)
    }

    /// Sets `field` to `value` unless it already has a value.
    ///
    /// Fields initialized this way are persisted: they are re-written at the start of every pass,
    /// even if the widget owning them is not created during that pass.
    ///
    /// Returns whether the value was written.
    pub fn apply_default<T: Any>(&self, field: &str, value: T) -> Result<bool> {
        self.apply_default_boxed(field, Box::new(value))
    }

    pub fn apply_default_boxed(&self, field: &str, value: StateValue) -> Result<bool> {
        let key = self.full_key(field);
        let written = self.session.with_store(|store| -> anyhow::Result<bool> {
            if store.contains(&key)? {
                Ok(false)
            } else {
                store.set(&key, value)?;
                Ok(true)
            }
        })??;
        if written {
            trace!(key = %key, "default applied");
        }
        if !self.session.is_persisted(&key) {
            self.session.persist(key);
        }
        Ok(written)
    }

    /// Applies a set of defaults; see [`Scope::apply_default`].
    pub fn apply_defaults<'a>(
        &self,
        defaults: impl IntoIterator<Item = (&'a str, StateValue)>,
    ) -> Result<()> {
        for (field, value) in defaults {
            self.apply_default_boxed(field, value)?;
        }
        Ok(())
    }

    /// Returns the names of the fields stored in this namespace, sorted.
    ///
    /// Fields of nested widgets are included, with their own namespace segments.
    pub fn fields(&self) -> Result<Vec<String>> {
        let keys = self.session.with_store(|store| store.keys())??;
        let mut fields: Vec<String> = keys
            .iter()
            .filter_map(|key| self.namespace.strip(key))
            .map(str::to_owned)
            .collect();
        fields.sort();
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{store::MemoryStore, Config, SessionStore};

    struct Chooser;
    struct Panel;
    struct Blend;

    fn session() -> Session {
        let _ = tracing_subscriber::fmt().try_init();
        let session = Session::new(MemoryStore::new());
        session.begin_pass().unwrap();
        session
    }

    fn store_len(session: &Session) -> usize {
        session
            .with_store(|store| store.keys().unwrap().len())
            .unwrap()
    }

    #[test]
    fn get_before_set_returns_default_without_writing() {
        let session = session();
        let scope = Scope::keyed::<Chooser>(&session, "a").unwrap();
        assert_eq!(scope.get("table", "none".to_string()).unwrap(), "none");
        assert_eq!(scope.get_opt::<String>("table").unwrap(), None);
        assert!(!scope.has("table").unwrap());
        assert_eq!(store_len(&session), 0);
    }

    #[test]
    fn set_then_get_ignores_default() {
        let session = session();
        let scope = Scope::keyed::<Chooser>(&session, "a").unwrap();
        scope.set("table", "CUSTOMERS".to_string()).unwrap();
        assert_eq!(scope.get("table", "x".to_string()).unwrap(), "CUSTOMERS");
        assert!(scope.has("table").unwrap());
        scope.set("table", "ORDERS".to_string()).unwrap();
        assert_eq!(scope.get("table", String::new()).unwrap(), "ORDERS");
        assert_eq!(store_len(&session), 1);
    }

    #[test]
    fn instances_do_not_see_each_other() {
        let session = session();
        let a = Scope::keyed::<Chooser>(&session, "a").unwrap();
        let b = Scope::keyed::<Chooser>(&session, "b").unwrap();
        a.set("table", 1i32).unwrap();
        assert_eq!(b.get("table", -1i32).unwrap(), -1);
        assert!(!b.has("table").unwrap());
        assert_eq!(a.fields().unwrap(), vec!["table".to_string()]);
        assert!(b.fields().unwrap().is_empty());
    }

    #[test]
    fn distinct_call_sites_get_distinct_namespaces() {
        let session = session();
        let a = Scope::new::<Chooser>(&session).unwrap();
        let b = Scope::new::<Chooser>(&session).unwrap();
        assert_ne!(a.namespace(), b.namespace());
        assert!(a.namespace().as_str().starts_with("Chooser["));
        assert_eq!(a.origin().unwrap().file(), file!());
        assert_ne!(a.origin().unwrap().line(), b.origin().unwrap().line());
    }

    #[test]
    fn call_site_namespace_is_stable_across_passes() {
        let session = session();
        let mut seen = vec![];
        for _ in 0..3 {
            session.begin_pass().unwrap();
            let mut pass = vec![];
            // two instances from the same call site in one pass
            for _ in 0..2 {
                pass.push(Scope::new::<Chooser>(&session).unwrap().namespace().clone());
            }
            assert_ne!(pass[0], pass[1]);
            seen.push(pass);
        }
        assert_eq!(seen[0], seen[1]);
        assert_eq!(seen[1], seen[2]);
    }

    #[test]
    fn keyed_namespaces_ignore_construction_order() {
        use rand::seq::SliceRandom;

        let session = session();
        let mut rng = rand::thread_rng();
        let mut keys = vec!["sidebar", "main", "footer", "0", "1"];
        let mut runs = vec![];

        for _ in 0..5 {
            session.begin_pass().unwrap();
            keys.shuffle(&mut rng);
            let mut namespaces: Vec<(String, String)> = keys
                .iter()
                .map(|&k| {
                    let scope = Scope::keyed::<Chooser>(&session, k).unwrap();
                    (k.to_owned(), scope.namespace().to_string())
                })
                .collect();
            namespaces.sort();
            runs.push(namespaces);
        }
        assert!(runs.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn duplicate_keys_fail_loudly() {
        let session = session();
        Scope::keyed::<Chooser>(&session, "main").unwrap();
        match Scope::keyed::<Chooser>(&session, "main") {
            Err(StateError::DuplicateNamespace(ns)) => assert_eq!(ns, "Chooser[main]."),
            other => panic!("unexpected: {:?}", other),
        }
        // same key, different widget type
        assert!(Scope::keyed::<Panel>(&session, "main").is_ok());
    }

    #[test]
    fn invalid_keys_and_missing_pass_fail() {
        let session = Session::new(MemoryStore::new());
        assert!(matches!(
            Scope::new::<Chooser>(&session),
            Err(StateError::NoActivePass)
        ));
        session.begin_pass().unwrap();
        assert!(matches!(
            Scope::keyed::<Chooser>(&session, ""),
            Err(StateError::InvalidInstanceKey { .. })
        ));
        assert!(matches!(
            Scope::keyed::<Chooser>(&session, "a.b"),
            Err(StateError::InvalidInstanceKey { .. })
        ));
    }

    #[test]
    fn nested_scopes_extend_parent_namespace() {
        let session = session();
        let panel = Scope::keyed::<Panel>(&session, "main").unwrap();
        let chooser = panel.child_keyed::<Chooser>(0usize).unwrap();
        assert_eq!(chooser.namespace().as_str(), "Panel[main].Chooser[0].");
        chooser.set("table", 3u8).unwrap();
        assert_eq!(panel.fields().unwrap(), vec!["Chooser[0].table".to_string()]);
        let info = chooser.info().unwrap();
        assert_eq!(info.widget_type, "Chooser");
        let parent = session.scope_info(info.parent.unwrap()).unwrap();
        assert_eq!(parent.namespace, *panel.namespace());

        let nested_by_site = panel.child::<Chooser>().unwrap();
        assert!(nested_by_site
            .namespace()
            .as_str()
            .starts_with("Panel[main].Chooser["));
    }

    #[test]
    fn shared_scopes_see_the_same_state() {
        let session = session();
        let a = Scope::shared::<Blend>(&session).unwrap();
        let b = Scope::shared::<Blend>(&session).unwrap();
        a.set("mode", 2u8).unwrap();
        assert_eq!(b.get("mode", 0u8).unwrap(), 2);
    }

    mod other {
        pub struct Blend;
    }

    #[test]
    fn shared_scopes_only_use_the_unqualified_type_name() {
        let session = session();
        let a = Scope::shared::<Blend>(&session).unwrap();
        let b = Scope::shared::<other::Blend>(&session).unwrap();
        assert_eq!(a.namespace(), b.namespace());
        a.set("mode", 1u8).unwrap();
        assert_eq!(b.get("mode", 0u8).unwrap(), 1);
    }

    #[test]
    fn scopes_are_listed_in_creation_order() {
        let session = session();
        for _ in 0..3 {
            for key in &["a", "b", "c"] {
                Scope::keyed::<Chooser>(&session, *key).unwrap();
            }
            let namespaces: Vec<_> = session
                .scopes()
                .iter()
                .map(|info| info.namespace.to_string())
                .collect();
            assert_eq!(namespaces, vec!["Chooser[a].", "Chooser[b].", "Chooser[c]."]);
            session.dump();
            session.begin_pass().unwrap();
        }
    }

    #[test]
    fn scoped_access_inside_with_store_is_an_error() {
        let session = session();
        let scope = Scope::keyed::<Chooser>(&session, "a").unwrap();
        scope.set("x", 3u8).unwrap();

        let inner = session.with_store(|_| scope.get("x", 0u8)).unwrap();
        assert!(matches!(inner, Err(StateError::StoreBusy)));
        let inner = session.with_store(|_| scope.set("x", 4u8)).unwrap();
        assert!(matches!(inner, Err(StateError::StoreBusy)));
        let nested = session.with_store(|_| session.with_store(|_| ())).unwrap();
        assert!(matches!(nested, Err(StateError::StoreBusy)));
        let pass = session.with_store(|_| session.begin_pass()).unwrap();
        assert!(matches!(pass, Err(StateError::StoreBusy)));

        // creating scopes only touches the pass bookkeeping
        let child = session
            .with_store(|_| scope.child_keyed::<Panel>("p"))
            .unwrap()
            .unwrap();
        assert_eq!(child.namespace().as_str(), "Chooser[a].Panel[p].");

        // the store is released once the closure returns
        assert_eq!(scope.get("x", 0u8).unwrap(), 3);
    }

    #[test]
    fn type_mismatch_is_reported() {
        let session = session();
        let scope = Scope::keyed::<Chooser>(&session, "a").unwrap();
        scope.set("count", 1u32).unwrap();
        match scope.get::<String>("count", String::new()) {
            Err(StateError::TypeMismatch { key, .. }) => assert_eq!(key, "Chooser[a].count"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn defaults_do_not_overwrite() {
        let session = session();
        let scope = Scope::keyed::<Chooser>(&session, "a").unwrap();
        assert!(scope.apply_default("database", Some("SCRATCH".to_string())).unwrap());
        assert!(!scope.apply_default("database", None::<String>).unwrap());
        assert_eq!(
            scope.get::<Option<String>>("database", None).unwrap().as_deref(),
            Some("SCRATCH")
        );
        scope
            .apply_defaults(vec![
                ("schema", Box::new(Some("PUBLIC".to_string())) as StateValue),
                ("show_selection", Box::new(false) as StateValue),
            ])
            .unwrap();
        assert_eq!(
            scope.fields().unwrap(),
            vec!["database", "schema", "show_selection"]
        );
    }

    #[test]
    fn store_errors_pass_through() {
        struct Broken;
        impl SessionStore for Broken {
            fn get(&self, _key: &str) -> anyhow::Result<Option<&dyn Any>> {
                Err(anyhow::anyhow!("store offline"))
            }
            fn set(&mut self, _key: &str, _value: StateValue) -> anyhow::Result<()> {
                Err(anyhow::anyhow!("store offline"))
            }
            fn take(&mut self, _key: &str) -> anyhow::Result<Option<StateValue>> {
                Ok(None)
            }
            fn keys(&self) -> anyhow::Result<Vec<String>> {
                Ok(vec![])
            }
        }

        let session = Session::new(Broken);
        session.begin_pass().unwrap();
        let scope = Scope::keyed::<Chooser>(&session, "a").unwrap();
        let err = scope.set("x", 1).unwrap_err();
        assert!(matches!(err, StateError::Store(_)));
        assert_eq!(err.to_string(), "store offline");
        assert!(scope.get("x", 0).is_err());
    }

    #[test]
    fn origin_label_follows_config() {
        let session = Session::with_config(
            MemoryStore::new(),
            Config {
                show_origins: true,
                ..Config::default()
            },
        );
        session.begin_pass().unwrap();
        let scope = Scope::new::<Chooser>(&session).unwrap();
        assert!(scope.origin_label().unwrap().contains("scope.rs"));
        let keyed = Scope::keyed::<Chooser>(&session, "k").unwrap();
        assert_eq!(keyed.origin_label(), None);
    }
}
