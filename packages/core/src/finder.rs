//! Glob finder that walks the backend tree segment by segment.

use std::collections::HashSet;
use std::ops::ControlFlow;

use glob::Pattern;

use crate::backend::{Backend, Finder};
use crate::path::is_glob_segment;
use crate::{Error, Path};

/// One compiled selector segment.
#[derive(Debug, Clone)]
enum Segment {
    /// A plain node name, fetched directly.
    Literal(String),
    /// A name pattern such as `*`, `page-?` or `[ab]*`.
    Name(Pattern),
    /// `**`: zero or more levels.
    AnyDepth,
}

fn compile(pattern: &Path) -> Result<Vec<Segment>, Error> {
    pattern
        .iter()
        .map(|component| {
            if component == "**" {
                Ok(Segment::AnyDepth)
            } else if is_glob_segment(component) {
                Pattern::new(component)
                    .map(Segment::Name)
                    .map_err(|e| Error::InvalidSelector {
                        selector: pattern.to_string(),
                        message: e.to_string(),
                    })
            } else {
                Ok(Segment::Literal(component.clone()))
            }
        })
        .collect()
}

/// The default [`Finder`] for every backend.
///
/// Only the parts of the tree the selector can reach are visited: the leading
/// literal segments are fetched in one step, and each pattern segment lists
/// the children of the current matches. Results come back in the order the
/// backend enumerates children, without duplicates.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraversalFinder;

impl TraversalFinder {
    pub fn new() -> Self {
        Self
    }

    fn walk<B, V>(&self, backend: &mut B, pattern: &Path, visit: &mut V) -> Result<(), Error>
    where
        B: Backend,
        V: FnMut(B::Entity, Path) -> ControlFlow<()>,
    {
        let segments = compile(pattern)?;
        let literal_len = segments
            .iter()
            .take_while(|s| matches!(s, Segment::Literal(_)))
            .count();

        let start = Path {
            components: pattern.components[..literal_len].to_vec(),
        };
        let Some(entity) = backend.fetch(&start)? else {
            return Ok(());
        };

        let _ = descend(backend, entity, start, &segments[literal_len..], visit)?;
        Ok(())
    }
}

fn descend<B, V>(
    backend: &mut B,
    entity: B::Entity,
    path: Path,
    segments: &[Segment],
    visit: &mut V,
) -> Result<ControlFlow<()>, Error>
where
    B: Backend,
    V: FnMut(B::Entity, Path) -> ControlFlow<()>,
{
    let Some((segment, rest)) = segments.split_first() else {
        return Ok(visit(entity, path));
    };

    match segment {
        Segment::Literal(name) => {
            let child_path = path.child(name)?;
            if let Some(child) = backend.fetch(&child_path)? {
                return descend(backend, child, child_path, rest, visit);
            }
        }
        Segment::Name(matcher) => {
            for child in backend.children(&entity)? {
                let child_path = backend.native_path(&child)?;
                if child_path.name().is_some_and(|name| matcher.matches(name))
                    && descend(backend, child, child_path, rest, visit)?.is_break()
                {
                    return Ok(ControlFlow::Break(()));
                }
            }
        }
        Segment::AnyDepth => {
            if descend(backend, entity.clone(), path, rest, visit)?.is_break() {
                return Ok(ControlFlow::Break(()));
            }
            for child in backend.children(&entity)? {
                let child_path = backend.native_path(&child)?;
                if descend(backend, child, child_path, segments, visit)?.is_break() {
                    return Ok(ControlFlow::Break(()));
                }
            }
        }
    }

    Ok(ControlFlow::Continue(()))
}

impl<B: Backend> Finder<B> for TraversalFinder {
    fn find(&self, backend: &mut B, pattern: &Path) -> Result<Vec<B::Entity>, Error> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();
        self.walk(backend, pattern, &mut |entity, path| {
            if seen.insert(path) {
                found.push(entity);
            }
            ControlFlow::Continue(())
        })?;
        Ok(found)
    }

    fn any(&self, backend: &mut B, pattern: &Path) -> Result<bool, Error> {
        let mut matched = false;
        self.walk(backend, pattern, &mut |_, _| {
            matched = true;
            ControlFlow::Break(())
        })?;
        Ok(matched)
    }
}
