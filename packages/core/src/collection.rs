//! Ordered collections of resources.

use crate::{Path, Resource};

/// The result of every multi-resource query.
///
/// Order is the backend's enumeration order. An empty collection is a valid
/// answer, not an error.
#[derive(Debug, Clone)]
pub struct ResourceCollection<E> {
    resources: Vec<Resource<E>>,
}

impl<E> Default for ResourceCollection<E> {
    fn default() -> Self {
        Self {
            resources: Vec::new(),
        }
    }
}

impl<E> ResourceCollection<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, resource: Resource<E>) {
        self.resources.push(resource);
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Resource<E>> {
        self.resources.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Resource<E>> {
        self.resources.iter()
    }

    /// Virtual paths of the members, in order.
    pub fn paths(&self) -> Vec<&Path> {
        self.resources.iter().map(Resource::path).collect()
    }

    pub fn into_vec(self) -> Vec<Resource<E>> {
        self.resources
    }
}

impl<E> FromIterator<Resource<E>> for ResourceCollection<E> {
    fn from_iter<I: IntoIterator<Item = Resource<E>>>(iter: I) -> Self {
        Self {
            resources: iter.into_iter().collect(),
        }
    }
}

impl<E> IntoIterator for ResourceCollection<E> {
    type Item = Resource<E>;
    type IntoIter = std::vec::IntoIter<Resource<E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.into_iter()
    }
}

impl<'a, E> IntoIterator for &'a ResourceCollection<E> {
    type Item = &'a Resource<E>;
    type IntoIter = std::slice::Iter<'a, Resource<E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.iter()
    }
}
