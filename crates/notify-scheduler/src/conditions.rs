//! Named predicates that gate re-display of a notification.

use std::collections::HashMap;
use std::fmt;

type Predicate = Box<dyn Fn() -> bool>;

/// Registry of condition predicates, looked up by the name a template config
/// refers to.
#[derive(Default)]
pub struct ConditionRegistry {
    predicates: HashMap<String, Predicate>,
}

impl ConditionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a predicate.
    pub fn register<F>(&mut self, name: impl Into<String>, predicate: F)
    where
        F: Fn() -> bool + 'static,
    {
        self.predicates.insert(name.into(), Box::new(predicate));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }

    /// Evaluate a predicate. `None` if no predicate has that name.
    pub fn evaluate(&self, name: &str) -> Option<bool> {
        self.predicates.get(name).map(|predicate| predicate())
    }
}

impl fmt::Debug for ConditionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.predicates.keys().collect();
        names.sort();
        f.debug_struct("ConditionRegistry")
            .field("predicates", &names)
            .finish()
    }
}
