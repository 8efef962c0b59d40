use crate::ast::Expr;
use crate::error::Error;
use crate::parser::Parser;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Concurrent memo of parsed expressions keyed by their exact source text.
///
/// Entries are never evicted or replaced once a parse succeeds; parse failures
/// are not stored, so a malformed expression fails the same way on every call.
/// Two threads resolving the same new text may both parse it; either result
/// is equivalent and whichever insert lands last is kept.
pub struct ExpressionCache {
    entries: DashMap<String, Arc<Expr>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        if self.hits + self.misses == 0 {
            0.0
        } else {
            self.hits as f64 / (self.hits + self.misses) as f64
        }
    }
}

impl ExpressionCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Parsed tree for `text`, parsing and storing it on first use.
    pub fn resolve(&self, text: &str) -> Result<Arc<Expr>, Error> {
        if text.is_empty() {
            return Err(Error::EmptyExpression);
        }

        if let Some(entry) = self.entries.get(text) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(expression = text, "expression cache hit");
            return Ok(Arc::clone(entry.value()));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(expression = text, "expression cache miss, parsing");
        let expr = Arc::new(Parser::new(text)?.parse()?);
        self.entries.insert(text.to_string(), Arc::clone(&expr));
        Ok(expr)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.entries.contains_key(text)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for ExpressionCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_caches_successful_parses() {
        let cache = ExpressionCache::new();

        let first = cache.resolve("a + 1").unwrap();
        let second = cache.resolve("a + 1").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        // Keys are the exact text, so spacing matters
        cache.resolve("a+1").unwrap();
        assert_eq!(cache.len(), 2);

        let stats = cache.stats();
        assert_eq!(stats, CacheStats { entries: 2, hits: 1, misses: 2 });
        assert!((stats.hit_rate() - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_failures_are_not_cached() {
        let cache = ExpressionCache::new();
        assert_eq!(cache.resolve(""), Err(Error::EmptyExpression));

        let e1 = cache.resolve("1 +").unwrap_err();
        let e2 = cache.resolve("1 +").unwrap_err();
        assert_eq!(e1, e2);
        assert!(matches!(e1, Error::Syntax { .. }));
        assert!(cache.is_empty());
        assert!(!cache.contains("1 +"));
        // Empty text never reaches the parser
        assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn test_concurrent_resolution() {
        let cache = Arc::new(ExpressionCache::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for j in 0..50 {
                        let text = format!("x + {}", (i + j) % 10);
                        cache.resolve(&text).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 10);
    }
}
