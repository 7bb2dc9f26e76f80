//! Name-keyed collection used to merge devfile and cluster bindings

use std::collections::HashMap;

use crate::api::ServiceBinding;

/// At most one binding per name. Insertion order is not kept; read the
/// content back with [`BindingList::into_sorted_vec`].
#[derive(Debug, Clone, Default)]
pub struct BindingList {
    items: HashMap<String, ServiceBinding>,
}

impl BindingList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a binding, replacing (and returning) any binding with the same name
    pub fn upsert(&mut self, binding: ServiceBinding) -> Option<ServiceBinding> {
        self.items.insert(binding.name.clone(), binding)
    }

    pub fn get(&self, name: &str) -> Option<&ServiceBinding> {
        self.items.get(name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Materialize the bindings sorted by name
    pub fn into_sorted_vec(self) -> Vec<ServiceBinding> {
        let mut bindings: Vec<ServiceBinding> = self.items.into_values().collect();
        bindings.sort_by(|a, b| a.name.cmp(&b.name));
        bindings
    }
}

impl Extend<ServiceBinding> for BindingList {
    fn extend<T: IntoIterator<Item = ServiceBinding>>(&mut self, iter: T) {
        for binding in iter {
            self.upsert(binding);
        }
    }
}

impl FromIterator<ServiceBinding> for BindingList {
    fn from_iter<T: IntoIterator<Item = ServiceBinding>>(iter: T) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}
