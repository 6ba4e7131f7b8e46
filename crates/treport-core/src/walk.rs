//! # Suite/Test Tree Traversal
//!
//! Pre-order walks over the suite forest rooted at `Report.suites`. Every
//! variant shares one visiting order:
//!
//! - a suite's own `tests` are visited before its child `suites`;
//! - siblings are visited in array order;
//! - suites are never visited themselves, only the tests they contain.
//!
//! Each test is handed out together with its [`Ancestors`]: the chain of
//! suites enclosing it, root-most first. The chain is an immutable
//! persistent list. Cloning it is a reference-count bump, and a visitor may
//! keep it after the call returns.
//!
//! Root-level `Report.tests` are not part of the forest and are not walked.
//!
//! ## Depth
//!
//! [`TestWalk`] drives the traversal with an explicit stack. Nesting depth
//! is bounded by heap, not by the native call stack.

use std::fmt;
use std::future::Future;
use std::slice;
use std::sync::Arc;

use crate::model::v1::{Suite, Test};

// ---------------------------------------------------------------------------
// Ancestors
// ---------------------------------------------------------------------------

struct Link<'a> {
    suite: &'a Suite,
    parent: Option<Arc<Link<'a>>>,
}

/// The suites enclosing a test, root-most first.
///
/// Children share their parent's prefix, so pushing a suite allocates one
/// node and never copies the chain.
#[derive(Clone, Default)]
pub struct Ancestors<'a> {
    head: Option<Arc<Link<'a>>>,
    len: usize,
}

impl<'a> Ancestors<'a> {
    /// An empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// A new chain with `suite` appended as the innermost ancestor.
    pub fn push(&self, suite: &'a Suite) -> Self {
        Self {
            head: Some(Arc::new(Link {
                suite,
                parent: self.head.clone(),
            })),
            len: self.len + 1,
        }
    }

    /// Number of enclosing suites.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The innermost enclosing suite.
    pub fn parent(&self) -> Option<&'a Suite> {
        self.head.as_ref().map(|link| link.suite)
    }

    /// Iterate innermost first.
    pub fn iter(&self) -> AncestorsIter<'_, 'a> {
        AncestorsIter {
            next: self.head.as_deref(),
        }
    }

    /// Copy the chain into a vector, root-most first.
    pub fn to_vec(&self) -> Vec<&'a Suite> {
        let mut out: Vec<&'a Suite> = self.iter().collect();
        out.reverse();
        out
    }

    /// Suite titles, root-most first.
    pub fn titles(&self) -> Vec<&'a str> {
        self.to_vec().into_iter().map(|s| s.title.as_str()).collect()
    }
}

impl fmt::Debug for Ancestors<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.titles()).finish()
    }
}

// Long chains would otherwise drop recursively, one frame per link.
impl Drop for Ancestors<'_> {
    fn drop(&mut self) {
        let mut next = self.head.take();
        while let Some(link) = next {
            match Arc::try_unwrap(link) {
                Ok(mut owned) => next = owned.parent.take(),
                Err(_) => break,
            }
        }
    }
}

/// Iterator over an [`Ancestors`] chain, innermost first.
pub struct AncestorsIter<'c, 'a> {
    next: Option<&'c Link<'a>>,
}

impl<'c, 'a> Iterator for AncestorsIter<'c, 'a> {
    type Item = &'a Suite;

    fn next(&mut self) -> Option<Self::Item> {
        let link = self.next?;
        self.next = link.parent.as_deref();
        Some(link.suite)
    }
}

// ---------------------------------------------------------------------------
// Walk
// ---------------------------------------------------------------------------

/// Pre-order iterator over every test in a suite forest.
///
/// Yields `(test, ancestors)` pairs. See the [module docs](self) for the
/// visiting order.
pub struct TestWalk<'a> {
    pending: Vec<(&'a Suite, Ancestors<'a>)>,
    current: Option<(slice::Iter<'a, Test>, Ancestors<'a>)>,
}

impl<'a> TestWalk<'a> {
    /// Start a walk over `roots`.
    pub fn new(roots: &'a [Suite]) -> Self {
        let root = Ancestors::new();
        Self {
            pending: roots.iter().rev().map(|s| (s, root.clone())).collect(),
            current: None,
        }
    }
}

impl<'a> Iterator for TestWalk<'a> {
    type Item = (&'a Test, Ancestors<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((tests, ancestors)) = self.current.as_mut() {
                if let Some(test) = tests.next() {
                    return Some((test, ancestors.clone()));
                }
                self.current = None;
            }

            let (suite, outer) = self.pending.pop()?;
            let ancestors = outer.push(suite);
            if let Some(children) = suite.suites.as_deref() {
                self.pending
                    .extend(children.iter().rev().map(|c| (c, ancestors.clone())));
            }
            let tests = suite.tests.as_deref().unwrap_or_default();
            self.current = Some((tests.iter(), ancestors));
        }
    }
}

/// First test whose `predicate` returns `true`, or `None` once the forest is
/// exhausted. Stops at the first match.
pub fn find_test<'a, F>(roots: &'a [Suite], mut predicate: F) -> Option<&'a Test>
where
    F: FnMut(&'a Test, &Ancestors<'a>) -> bool,
{
    TestWalk::new(roots)
        .find(|(test, ancestors)| predicate(*test, ancestors))
        .map(|(test, _)| test)
}

/// Call `visitor` on every test.
pub fn visit_tests<'a, F>(roots: &'a [Suite], mut visitor: F)
where
    F: FnMut(&'a Test, &Ancestors<'a>),
{
    for (test, ancestors) in TestWalk::new(roots) {
        visitor(test, &ancestors);
    }
}

/// Call `visitor` on every test, awaiting each call before the next.
///
/// Visitors run strictly one after another. There is no cancellation; stop
/// early by having the visitor record a flag and return immediately, or use
/// [`find_test`].
pub async fn visit_tests_async<'a, F, Fut>(roots: &'a [Suite], mut visitor: F)
where
    F: FnMut(&'a Test, Ancestors<'a>) -> Fut,
    Fut: Future<Output = ()>,
{
    for (test, ancestors) in TestWalk::new(roots) {
        visitor(test, ancestors).await;
    }
}
