//! Prefix-containment index over a set of binding keys.
//!
//! Model binding asks "does any stored key live under this prefix?" once per
//! bindable prefix. Rebuilding the answer by scanning the whole key set per
//! query would be quadratic in form/query size, so providers build this
//! container once and cache it for their lifetime.

/// A sorted index of binding keys supporting containment queries.
///
/// A key is *under* a prefix `p` when it equals `p` or continues it with a
/// property (`p.name`) or element (`p[0]`) segment. Bare continuation
/// (`pfx` vs `pfxextra`) is not containment.
#[derive(Debug)]
pub struct PrefixContainer {
    sorted_keys: Vec<String>,
}

impl PrefixContainer {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut sorted_keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        sorted_keys.sort_unstable();
        Self { sorted_keys }
    }

    /// True iff some stored key equals `prefix` or starts with `prefix + "."`
    /// or `prefix + "["`. The empty prefix is contained whenever any key
    /// exists at all.
    pub fn contains_prefix(&self, prefix: &str) -> bool {
        if prefix.is_empty() {
            return !self.sorted_keys.is_empty();
        }

        // Keys sharing the prefix are contiguous in sorted order; jump to the
        // first candidate and scan the run.
        let start = self.sorted_keys.partition_point(|k| k.as_str() < prefix);
        self.sorted_keys[start..]
            .iter()
            .take_while(|k| k.starts_with(prefix))
            .any(|k| {
                k.len() == prefix.len()
                    || matches!(k.as_bytes()[prefix.len()], b'.' | b'[')
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container() -> PrefixContainer {
        PrefixContainer::new(["order.items[0].name", "order.total", "user", "userName"])
    }

    #[test]
    fn exact_key_is_contained() {
        assert!(container().contains_prefix("user"));
    }

    #[test]
    fn dotted_and_bracketed_continuations_are_contained() {
        let c = container();
        assert!(c.contains_prefix("order"));
        assert!(c.contains_prefix("order.items"));
        assert!(c.contains_prefix("order.items[0]"));
    }

    #[test]
    fn bare_continuation_is_not_contained() {
        // "userName" continues "user" without a delimiter.
        assert!(!container().contains_prefix("userN"));
        assert!(!container().contains_prefix("or"));
    }

    #[test]
    fn empty_prefix_means_any_key() {
        assert!(container().contains_prefix(""));
        assert!(!PrefixContainer::new(Vec::<String>::new()).contains_prefix(""));
    }

    #[test]
    fn missing_prefix_is_not_contained() {
        assert!(!container().contains_prefix("account"));
    }
}
