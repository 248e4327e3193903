//! The relay environment used by conditional bindings.
//!
//! Emitted code reaches the relay as the shared `metap.relay` dict. Here it
//! is an explicit value: the caller owns it, threads it to every read and
//! write, and clears it when it wants a fresh state. Entries are never
//! removed by a write or a read.

use std::collections::HashMap;

use super::names::relay_key;

/// A string-keyed relay map.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayEnv<V> {
    slots: HashMap<String, V>,
}

impl<V> Default for RelayEnv<V> {
    fn default() -> Self {
        RelayEnv {
            slots: HashMap::new(),
        }
    }
}

impl<V> RelayEnv<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind-if-true: store `value` under `key` when `cond` holds. Returns `cond`.
    pub fn cvar(&mut self, cond: bool, key: &str, value: V) -> bool {
        if cond {
            self.slots.insert(key.to_string(), value);
        }
        cond
    }

    /// Always-bind: store the condition itself under `key`. Returns `cond`.
    pub fn cvar_always(&mut self, cond: bool, key: &str) -> bool
    where
        V: From<bool>,
    {
        self.slots.insert(key.to_string(), V::from(cond));
        cond
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.slots.get(key)
    }

    /// Guarded copy of the relay slot for `var` into `target`.
    ///
    /// `target` is left untouched when the slot is absent, so an unbound
    /// variable stays unbound. Returns whether a copy happened.
    pub fn copy_into(&self, var: &str, target: &mut Option<V>) -> bool
    where
        V: Clone,
    {
        match self.slots.get(&relay_key(var)) {
            Some(value) => {
                *target = Some(value.clone());
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Value {
        Bool(bool),
        Int(i64),
    }

    impl From<bool> for Value {
        fn from(b: bool) -> Self {
            Value::Bool(b)
        }
    }

    /// `if _cvar(line.startswith(p1), hlvl, 1) or _cvar(line.startswith(p2), hlvl, 2): x = hlvl`
    fn heading_level(line: &str, relay: &mut RelayEnv<Value>) -> Option<Value> {
        let key = relay_key("hlvl");
        let matched = relay.cvar(line.starts_with("# "), &key, Value::Int(1))
            || relay.cvar(line.starts_with("## "), &key, Value::Int(2));
        let mut hlvl = None;
        if matched {
            relay.copy_into("hlvl", &mut hlvl);
        }
        hlvl
    }

    #[test]
    fn bind_if_true_stores_on_success() {
        let mut relay = RelayEnv::new();
        assert!(relay.cvar(true, "relay_v", Value::Int(1)));
        assert_eq!(relay.get("relay_v"), Some(&Value::Int(1)));
    }

    #[test]
    fn bind_if_true_leaves_target_unbound_on_failure() {
        let mut relay: RelayEnv<Value> = RelayEnv::new();
        assert!(!relay.cvar(false, "relay_v", Value::Int(1)));
        assert!(!relay.contains("relay_v"));
        let mut v = None;
        assert!(!relay.copy_into("v", &mut v));
        assert_eq!(v, None);
    }

    #[test]
    fn short_circuit_picks_the_matching_binding() {
        let mut relay = RelayEnv::new();
        assert_eq!(heading_level("# a", &mut relay), Some(Value::Int(1)));
        relay.clear();
        assert_eq!(heading_level("## a", &mut relay), Some(Value::Int(2)));
        relay.clear();
        assert_eq!(heading_level("### a", &mut relay), None);
        assert!(relay.is_empty());
    }

    #[test]
    fn elif_chain_binds_second_branch() {
        // if _cvar(c1, v, 1): ... elif _cvar(c2, v, 2): x = v
        let mut relay = RelayEnv::new();
        let key = relay_key("v");
        let mut x = None;
        if relay.cvar(false, &key, Value::Int(1)) {
            unreachable!();
        } else if relay.cvar(true, &key, Value::Int(2)) {
            relay.copy_into("v", &mut x);
        }
        assert_eq!(x, Some(Value::Int(2)));
    }

    #[test]
    fn always_bind_stores_the_condition() {
        let mut relay: RelayEnv<Value> = RelayEnv::new();
        assert!(!relay.cvar_always(false, "relay_c"));
        assert_eq!(relay.get("relay_c"), Some(&Value::Bool(false)));
    }

    #[test]
    fn stale_entries_survive_until_cleared() {
        let mut relay = RelayEnv::new();
        relay.cvar(true, "relay_v", Value::Int(1));
        relay.cvar(false, "relay_v", Value::Int(2));
        assert_eq!(relay.get("relay_v"), Some(&Value::Int(1)));
        relay.clear();
        assert_eq!(relay.len(), 0);
    }
}
