//! Repository contract and the orchestration shared by every backend.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crate::backend::{Backend, Finder};
use crate::finder::TraversalFinder;
use crate::resource::RepositoryRef;
use crate::{
    Error, Path, PathResolver, Query, QueryLanguage, RepositoryConfig, Resource,
    ResourceCollection,
};

/// Path-addressed access to a tree of resources.
///
/// Paths and selectors are virtual: they are interpreted relative to the
/// repository's base path. Selectors are glob patterns unless they contain
/// no metacharacters, in which case they name exactly one path.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Arc<dyn ResourceRepository<Entity = E>>`.
pub trait ResourceRepository: Send + Sync {
    type Entity;

    /// Fetch the resource at `path`.
    ///
    /// Fails with [`Error::ResourceNotFound`] when nothing exists there.
    fn get(&self, path: &str) -> Result<Resource<Self::Entity>, Error>;

    /// Immediate children of the resource at `path`, in backend order.
    fn list_children(&self, path: &str) -> Result<ResourceCollection<Self::Entity>, Error>;

    /// Every resource matched by `selector`.
    fn find(
        &self,
        selector: &str,
        language: QueryLanguage,
    ) -> Result<ResourceCollection<Self::Entity>, Error>;

    /// Whether `selector` matches at least one resource.
    fn contains(&self, selector: &str, language: QueryLanguage) -> Result<bool, Error>;

    /// Tag lookup. Tagging is not available, so this always fails with
    /// [`Error::UnsupportedOperation`].
    fn find_by_tag(&self, tag: &str) -> Result<ResourceCollection<Self::Entity>, Error>;

    /// Known tags. Always empty.
    fn get_tags(&self) -> BTreeSet<String>;

    /// Remove every resource matched by `query` and commit once.
    ///
    /// Returns the number of resources removed. A query matching nothing is a
    /// successful no-op.
    fn remove(&self, query: &str, language: QueryLanguage) -> Result<usize, Error>;

    /// Move the resources matched by `query` and commit once.
    ///
    /// An exact path is moved to `target` itself, which may rename it. Each
    /// match of a glob pattern is moved to `target/<own name>`: patterns
    /// relocate, they never rename. This holds even when a pattern happens to
    /// match a single resource. A pattern matching a resource together with
    /// one of its ancestors fails with [`Error::OverlappingMatches`] and
    /// moves nothing.
    ///
    /// Returns the number of resources moved. If an error is returned part of
    /// the matches may already have been moved in the backend's working set;
    /// re-fetch before retrying.
    fn move_to(&self, query: &str, target: &str, language: QueryLanguage) -> Result<usize, Error>;
}

/// The [`ResourceRepository`] implementation for any [`Backend`].
///
/// Query classification, the move fan-out rule and commit timing live here;
/// the backend supplies fetch, children, naming and the per-entity mutations.
/// The backend handle is injected once and locked for the duration of each
/// call.
pub struct Repository<B: Backend, F: Finder<B> = TraversalFinder> {
    backend: Mutex<B>,
    finder: F,
    resolver: PathResolver,
    this: Weak<Self>,
}

impl<B: Backend> Repository<B, TraversalFinder> {
    /// Build a repository using the [`TraversalFinder`].
    pub fn with_base(backend: B, base: Path) -> Arc<Self> {
        Self::new(backend, TraversalFinder, base)
    }
}

impl<B: Backend, F: Finder<B>> Repository<B, F> {
    pub fn new(backend: B, finder: F, base: Path) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            backend: Mutex::new(backend),
            finder,
            resolver: PathResolver::new(base),
            this: this.clone(),
        })
    }

    pub fn from_config(
        backend: B,
        finder: F,
        config: &RepositoryConfig,
    ) -> Result<Arc<Self>, Error> {
        Ok(Self::new(backend, finder, config.base()?))
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Exclusive access to the backend.
    pub fn backend(&self) -> Result<MutexGuard<'_, B>, Error> {
        self.backend.lock().map_err(|_| Error::Poisoned)
    }

    fn handle(&self) -> RepositoryRef<B::Entity> {
        self.this.clone()
    }

    /// Resolve a query into backend entities.
    ///
    /// Exact paths are fetched directly, patterns go through the finder.
    fn select(&self, backend: &mut B, query: &Query) -> Result<Vec<B::Entity>, Error> {
        let native = self.resolver.resolve(query.path());
        let entities = match query {
            Query::Exact(_) => backend.fetch(&native)?.into_iter().collect(),
            Query::Pattern(_) => self.finder.find(backend, &native)?,
        };
        tracing::debug!(
            query = %query.path(),
            native = %native,
            matches = entities.len(),
            "resolved query"
        );
        Ok(entities)
    }

    fn build_collection(
        &self,
        backend: &B,
        entities: Vec<B::Entity>,
    ) -> Result<ResourceCollection<B::Entity>, Error> {
        let mut collection = ResourceCollection::new();
        for entity in entities {
            let native = backend.native_path(&entity)?;
            let path = self.resolver.unresolve(&native)?;
            collection.push(Resource::new(path, entity, self.handle()));
        }
        Ok(collection)
    }

    /// Pair every matched entity with its native destination.
    ///
    /// Pattern matches must be disjoint subtrees; a match nested inside
    /// another is refused before anything is moved.
    fn plan_moves(
        &self,
        backend: &B,
        query: &Query,
        entities: Vec<B::Entity>,
        target: &Path,
    ) -> Result<Vec<(B::Entity, Path)>, Error> {
        match query {
            Query::Exact(_) => Ok(entities
                .into_iter()
                .map(|entity| (entity, target.clone()))
                .collect()),
            Query::Pattern(_) => {
                let mut natives = entities
                    .iter()
                    .map(|entity| backend.native_path(entity))
                    .collect::<Result<Vec<_>, _>>()?;
                ensure_disjoint(&mut natives)?;
                entities
                    .into_iter()
                    .map(|entity| {
                        let name = backend.native_name(&entity)?;
                        let destination = target.child(&name)?;
                        Ok((entity, destination))
                    })
                    .collect()
            }
        }
    }
}

/// Fail if one path lies inside another.
///
/// Once sorted, any descendant of a path directly follows it or another of
/// its descendants, so comparing neighbours is enough.
fn ensure_disjoint(paths: &mut [Path]) -> Result<(), Error> {
    paths.sort();
    for pair in paths.windows(2) {
        if pair[1].has_prefix(&pair[0]) {
            return Err(Error::OverlappingMatches {
                path: pair[1].clone(),
                ancestor: pair[0].clone(),
            });
        }
    }
    Ok(())
}

impl<B: Backend, F: Finder<B>> ResourceRepository for Repository<B, F> {
    type Entity = B::Entity;

    fn get(&self, path: &str) -> Result<Resource<B::Entity>, Error> {
        let path = Path::parse(path)?;
        let native = self.resolver.resolve(&path);
        let entity = self
            .backend()?
            .fetch(&native)?
            .ok_or(Error::ResourceNotFound { path: native })?;
        Ok(Resource::new(path, entity, self.handle()))
    }

    fn list_children(&self, path: &str) -> Result<ResourceCollection<B::Entity>, Error> {
        let resource = self.get(path)?;
        let mut backend = self.backend()?;
        let children = backend.children(resource.payload())?;
        self.build_collection(&backend, children)
    }

    fn find(
        &self,
        selector: &str,
        language: QueryLanguage,
    ) -> Result<ResourceCollection<B::Entity>, Error> {
        language.ensure_supported()?;
        let query = Query::parse(selector)?;
        let mut backend = self.backend()?;
        let entities = self.select(&mut backend, &query)?;
        self.build_collection(&backend, entities)
    }

    fn contains(&self, selector: &str, language: QueryLanguage) -> Result<bool, Error> {
        language.ensure_supported()?;
        let query = Query::parse(selector)?;
        let native = self.resolver.resolve(query.path());
        let mut backend = self.backend()?;
        match query {
            Query::Exact(_) => Ok(backend.fetch(&native)?.is_some()),
            Query::Pattern(_) => self.finder.any(&mut backend, &native),
        }
    }

    fn find_by_tag(&self, _tag: &str) -> Result<ResourceCollection<B::Entity>, Error> {
        Err(Error::UnsupportedOperation {
            operation: "find by tag".to_string(),
        })
    }

    fn get_tags(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }

    fn remove(&self, query: &str, language: QueryLanguage) -> Result<usize, Error> {
        language.ensure_supported()?;
        let query = Query::parse(query)?;
        let mut backend = self.backend()?;
        let entities = self.select(&mut backend, &query)?;
        if entities.is_empty() {
            return Ok(0);
        }

        for entity in &entities {
            backend.remove(entity)?;
        }
        backend.commit()?;

        tracing::info!(query = %query.path(), removed = entities.len(), "removed resources");
        Ok(entities.len())
    }

    fn move_to(
        &self,
        query: &str,
        target: &str,
        language: QueryLanguage,
    ) -> Result<usize, Error> {
        language.ensure_supported()?;
        let query = Query::parse(query)?;
        let target = self.resolver.resolve(&Path::parse(target)?);
        let mut backend = self.backend()?;
        let entities = self.select(&mut backend, &query)?;
        if entities.is_empty() {
            return Ok(0);
        }

        let moves = self.plan_moves(&backend, &query, entities, &target)?;
        for (entity, destination) in &moves {
            tracing::debug!(destination = %destination, "moving entity");
            backend.move_to(entity, destination)?;
        }
        backend.commit()?;

        tracing::info!(
            query = %query.path(),
            target = %target,
            moved = moves.len(),
            "moved resources"
        );
        Ok(moves.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;

    /// Flat list of paths; mutations are applied immediately and commits
    /// are counted.
    #[derive(Default)]
    struct ListBackend {
        nodes: Vec<Path>,
        commits: usize,
        moves: Vec<(Path, Path)>,
    }

    impl ListBackend {
        fn with(paths: &[&str]) -> Self {
            let mut nodes = vec![Path::root()];
            nodes.extend(paths.iter().map(|p| Path::parse(p).unwrap()));
            Self {
                nodes,
                ..Default::default()
            }
        }
    }

    impl Backend for ListBackend {
        type Entity = Path;

        fn fetch(&mut self, path: &Path) -> Result<Option<Path>, Error> {
            Ok(self.nodes.iter().find(|n| *n == path).cloned())
        }

        fn children(&mut self, entity: &Path) -> Result<Vec<Path>, Error> {
            Ok(self
                .nodes
                .iter()
                .filter(|n| n.parent().as_ref() == Some(entity))
                .cloned()
                .collect())
        }

        fn native_path(&self, entity: &Path) -> Result<Path, Error> {
            Ok(entity.clone())
        }

        fn native_name(&self, entity: &Path) -> Result<String, Error> {
            Ok(entity.name().unwrap_or_default().to_string())
        }

        fn remove(&mut self, entity: &Path) -> Result<(), Error> {
            self.nodes.retain(|n| !n.has_prefix(entity));
            Ok(())
        }

        fn move_to(&mut self, entity: &Path, target: &Path) -> Result<(), Error> {
            self.moves.push((entity.clone(), target.clone()));
            for node in self.nodes.iter_mut() {
                if let Some(rest) = node.strip_prefix(entity) {
                    *node = target.join(&rest);
                }
            }
            Ok(())
        }

        fn commit(&mut self) -> Result<(), Error> {
            self.commits += 1;
            Ok(())
        }
    }

    fn repository(paths: &[&str], base: &str) -> Arc<Repository<ListBackend>> {
        Repository::with_base(ListBackend::with(paths), path!(base))
    }

    #[test]
    fn get_keeps_the_requested_path() {
        let repo = repository(&["/cms", "/cms/a"], "/cms");
        let resource = repo.get("/a").unwrap();
        assert_eq!(resource.path(), &path!("/a"));
        assert_eq!(resource.payload(), &path!("/cms/a"));
    }

    #[test]
    fn get_missing_reports_native_path() {
        let repo = repository(&["/cms"], "/cms");
        match repo.get("/nope") {
            Err(Error::ResourceNotFound { path }) => assert_eq!(path, path!("/cms/nope")),
            other => panic!("unexpected result: {:?}", other.map(|r| r.path().clone())),
        }
    }

    #[test]
    fn children_are_unresolved() {
        let repo = repository(&["/cms", "/cms/a", "/cms/a/x", "/cms/a/y"], "/cms");
        let children = repo.list_children("/a").unwrap();
        assert_eq!(children.paths(), vec![&path!("/a/x"), &path!("/a/y")]);
    }

    #[test]
    fn out_of_scope_entity_is_surfaced() {
        struct Escaping;
        impl Finder<ListBackend> for Escaping {
            fn find(&self, _: &mut ListBackend, _: &Path) -> Result<Vec<Path>, Error> {
                Ok(vec![path!("/elsewhere")])
            }
        }

        let repo = Repository::new(ListBackend::with(&["/cms"]), Escaping, path!("/cms"));
        let err = repo.find("/*", QueryLanguage::Glob).unwrap_err();
        assert!(matches!(err, Error::PathOutOfScope { .. }));
    }

    #[test]
    fn resource_children_go_through_the_repository() {
        let repo = repository(&["/a", "/a/b"], "/");
        let resource = repo.get("/a").unwrap();
        assert!(resource.has_children().unwrap());
        assert_eq!(resource.children().unwrap().paths(), vec![&path!("/a/b")]);
    }

    #[test]
    fn detached_resource_cannot_list_children() {
        let repo = repository(&["/a"], "/");
        let resource = repo.get("/a").unwrap();
        drop(repo);
        assert_eq!(resource.path(), &path!("/a"));
        assert!(resource.repository().is_none());
        assert!(matches!(resource.children(), Err(Error::RepositoryDetached)));
    }

    #[test]
    fn empty_match_does_not_commit() {
        let repo = repository(&["/a"], "/");
        assert_eq!(repo.remove("/nothing/*", QueryLanguage::Glob).unwrap(), 0);
        assert_eq!(repo.move_to("/nothing", "/z", QueryLanguage::Glob).unwrap(), 0);
        assert_eq!(repo.backend().unwrap().commits, 0);
    }

    #[test]
    fn remove_commits_once() {
        let repo = repository(&["/a", "/a/x", "/a/y", "/a/z"], "/");
        assert_eq!(repo.remove("/a/*", QueryLanguage::Glob).unwrap(), 3);
        let backend = repo.backend().unwrap();
        assert_eq!(backend.commits, 1);
        assert_eq!(backend.nodes, vec![Path::root(), path!("/a")]);
    }

    #[test]
    fn exact_move_renames() {
        let repo = repository(&["/a", "/a/b", "/c"], "/");
        assert_eq!(repo.move_to("/a/b", "/c/d", QueryLanguage::Glob).unwrap(), 1);
        let backend = repo.backend().unwrap();
        assert_eq!(backend.moves, vec![(path!("/a/b"), path!("/c/d"))]);
        assert_eq!(backend.commits, 1);
    }

    #[test]
    fn pattern_move_keeps_names() {
        let repo = repository(&["/a", "/a/x", "/a/y", "/z"], "/");
        assert_eq!(repo.move_to("/a/*", "/z", QueryLanguage::Glob).unwrap(), 2);
        let backend = repo.backend().unwrap();
        assert_eq!(
            backend.moves,
            vec![
                (path!("/a/x"), path!("/z/x")),
                (path!("/a/y"), path!("/z/y")),
            ]
        );
        assert_eq!(backend.commits, 1);
    }

    #[test]
    fn nested_pattern_matches_are_refused_before_moving() {
        let repo = repository(&["/a", "/a/b", "/z"], "/");
        let err = repo.move_to("/a/**", "/z", QueryLanguage::Glob).unwrap_err();
        match err {
            Error::OverlappingMatches { path, ancestor } => {
                assert_eq!(path, path!("/a/b"));
                assert_eq!(ancestor, path!("/a"));
            }
            other => panic!("unexpected error: {other}"),
        }
        let backend = repo.backend().unwrap();
        assert!(backend.moves.is_empty());
        assert_eq!(backend.commits, 0);
    }

    #[test]
    fn sibling_prefixes_are_not_overlapping() {
        let repo = repository(&["/a", "/ab", "/a/x", "/z"], "/");
        assert_eq!(repo.move_to("/a*", "/z", QueryLanguage::Glob).unwrap(), 2);
        assert_eq!(repo.backend().unwrap().commits, 1);
    }

    #[test]
    fn single_pattern_match_still_relocates() {
        let repo = repository(&["/a", "/a/only", "/z"], "/");
        assert_eq!(repo.move_to("/a/on*", "/z", QueryLanguage::Glob).unwrap(), 1);
        let backend = repo.backend().unwrap();
        assert_eq!(backend.moves, vec![(path!("/a/only"), path!("/z/only"))]);
    }

    #[test]
    fn moves_resolve_target_against_base() {
        let repo = repository(&["/cms", "/cms/a", "/cms/z"], "/cms");
        repo.move_to("/a", "/z/b", QueryLanguage::Glob).unwrap();
        let backend = repo.backend().unwrap();
        assert_eq!(backend.moves, vec![(path!("/cms/a"), path!("/cms/z/b"))]);
    }

    #[test]
    fn unsupported_language_rejected_everywhere() {
        let repo = repository(&["/a"], "/");
        let xpath = || QueryLanguage::from("xpath");
        assert!(matches!(
            repo.find("/a", xpath()),
            Err(Error::UnsupportedQueryLanguage { .. })
        ));
        assert!(repo.contains("/a", xpath()).is_err());
        assert!(repo.remove("/a", xpath()).is_err());
        assert!(repo.move_to("/a", "/b", xpath()).is_err());
        assert_eq!(repo.backend().unwrap().nodes.len(), 2);
    }

    #[test]
    fn tags_are_unsupported() {
        let repo = repository(&["/a"], "/");
        assert!(repo.get_tags().is_empty());
        assert!(matches!(
            repo.find_by_tag("news"),
            Err(Error::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn usable_as_trait_object() {
        let repo: Arc<dyn ResourceRepository<Entity = Path>> = repository(&["/a", "/a/b"], "/");
        assert!(repo.contains("/a/*", QueryLanguage::Glob).unwrap());
        assert!(!repo.contains("/b", QueryLanguage::Glob).unwrap());
    }

    #[test]
    fn from_config_uses_base_path() {
        let config = RepositoryConfig::with_base_path("/cms");
        let repo =
            Repository::from_config(ListBackend::with(&["/cms"]), TraversalFinder, &config).unwrap();
        assert_eq!(repo.resolver().base(), &path!("/cms"));
    }
}
