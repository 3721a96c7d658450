//! Context Matching
//!
//! Scores how compatible a pattern's original execution context is with
//! the context of a new request. Hostname equality is a hard gate:
//! selectors have no meaning on a different site, so cross-hostname
//! contexts are never compatible no matter how similar the paths look.

use crate::context::page::PageContext;

/// Base score awarded for a hostname match
const HOSTNAME_BASE: f64 = 0.5;
/// Bonus for an exact pathname match
const EXACT_PATH_BONUS: f64 = 0.3;
/// Maximum bonus for partial path similarity, decayed linearly
const PATH_SIMILARITY_BONUS: f64 = 0.2;

/// Scores pattern context against request context
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextMatcher;

impl ContextMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Whether a pattern learned under `pattern_ctx` may be considered at
    /// all for a request in `current_ctx`. Patterns are domain-scoped:
    /// only an exact hostname match qualifies.
    pub fn is_compatible(&self, pattern_ctx: &PageContext, current_ctx: &PageContext) -> bool {
        !pattern_ctx.hostname.is_empty() && pattern_ctx.hostname == current_ctx.hostname
    }

    /// Compatibility score in [0, 1].
    ///
    /// A hostname mismatch forces 0.0, a structural veto rather than a
    /// soft penalty. With matching hostnames: 0.5 base, +0.3 for an exact
    /// pathname, +0.2 scaled by the shared path-segment prefix ratio.
    pub fn score(&self, pattern_ctx: &PageContext, current_ctx: &PageContext) -> f64 {
        if !self.is_compatible(pattern_ctx, current_ctx) {
            return 0.0;
        }

        let mut score = HOSTNAME_BASE;
        if pattern_ctx.pathname == current_ctx.pathname {
            score += EXACT_PATH_BONUS + PATH_SIMILARITY_BONUS;
        } else {
            score += PATH_SIMILARITY_BONUS * path_prefix_ratio(pattern_ctx, current_ctx);
        }
        score.min(1.0)
    }
}

/// Fraction of leading path segments shared by both contexts, relative to
/// the longer path. `/app/settings` vs `/app/profile` shares 1 of 2.
fn path_prefix_ratio(a: &PageContext, b: &PageContext) -> f64 {
    let segments_a = a.path_segments();
    let segments_b = b.path_segments();
    let longest = segments_a.len().max(segments_b.len());
    if longest == 0 {
        return 1.0;
    }

    let shared = segments_a
        .iter()
        .zip(segments_b.iter())
        .take_while(|(x, y)| x == y)
        .count();
    shared as f64 / longest as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(hostname: &str, pathname: &str) -> PageContext {
        PageContext::new(
            format!("https://{}{}", hostname, pathname),
            hostname,
            pathname,
            "Test",
            "sig",
        )
    }

    #[test]
    fn test_same_hostname_is_compatible() {
        let matcher = ContextMatcher::new();
        let a = context("example.com", "/a");
        let b = context("example.com", "/b");
        assert!(matcher.is_compatible(&a, &b));
    }

    #[test]
    fn test_different_hostname_is_never_compatible() {
        let matcher = ContextMatcher::new();
        let a = context("chatgpt.com", "/c/abc");
        let b = context("localhost", "/c/abc");
        assert!(!matcher.is_compatible(&a, &b));
    }

    #[test]
    fn test_empty_hostname_is_not_compatible() {
        let matcher = ContextMatcher::new();
        let a = context("", "/a");
        let b = context("", "/a");
        assert!(!matcher.is_compatible(&a, &b));
    }

    #[test]
    fn test_same_host_same_path_scores_high() {
        let matcher = ContextMatcher::new();
        let a = context("example.com", "/app/settings");
        let b = context("example.com", "/app/settings");
        let score = matcher.score(&a, &b);
        assert!(score > 0.7, "expected > 0.7, got {}", score);
    }

    #[test]
    fn test_different_host_scores_below_threshold() {
        let matcher = ContextMatcher::new();
        let a = context("chatgpt.com", "/c/abc");
        let b = context("localhost", "/c/abc");
        let score = matcher.score(&a, &b);
        assert!(score < 0.3, "expected < 0.3, got {}", score);
    }

    #[test]
    fn test_same_host_different_path_scores_between() {
        let matcher = ContextMatcher::new();
        let a = context("example.com", "/app/settings");
        let b = context("example.com", "/account/billing");
        let score = matcher.score(&a, &b);
        assert!(
            score > 0.3 && score < 0.7,
            "expected strictly between 0.3 and 0.7, got {}",
            score
        );
    }

    #[test]
    fn test_partial_path_overlap_scores_between_exact_and_disjoint() {
        let matcher = ContextMatcher::new();
        let learned = context("example.com", "/app/settings/profile");

        let exact = matcher.score(&learned, &context("example.com", "/app/settings/profile"));
        let sibling = matcher.score(&learned, &context("example.com", "/app/settings/security"));
        let disjoint = matcher.score(&learned, &context("example.com", "/admin/users/list"));

        assert!(exact > sibling);
        assert!(sibling > disjoint);
    }

    #[test]
    fn test_score_is_symmetric_for_paths() {
        let matcher = ContextMatcher::new();
        let a = context("example.com", "/a/b");
        let b = context("example.com", "/a/c");
        assert_eq!(matcher.score(&a, &b), matcher.score(&b, &a));
    }

    #[test]
    fn test_score_never_exceeds_one() {
        let matcher = ContextMatcher::new();
        let a = context("example.com", "/");
        let b = context("example.com", "/");
        assert!(matcher.score(&a, &b) <= 1.0);
    }

    #[test]
    fn test_path_prefix_ratio() {
        let ratio = path_prefix_ratio(
            &context("h", "/app/settings"),
            &context("h", "/app/profile"),
        );
        assert!((ratio - 0.5).abs() < 1e-9);

        let no_overlap = path_prefix_ratio(&context("h", "/x/y"), &context("h", "/a/b"));
        assert_eq!(no_overlap, 0.0);

        let both_root = path_prefix_ratio(&context("h", "/"), &context("h", "/"));
        assert_eq!(both_root, 1.0);
    }

    #[test]
    fn test_ratio_uses_longer_path_as_denominator() {
        // A short learned path should not score full marks against a much
        // deeper current path.
        let ratio = path_prefix_ratio(&context("h", "/app"), &context("h", "/app/a/b/c"));
        assert!((ratio - 0.25).abs() < 1e-9);
    }
}
