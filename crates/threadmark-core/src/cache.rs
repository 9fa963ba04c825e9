use std::num::NonZeroUsize;

use lru::LruCache;
use tracing::trace;

use crate::ast::Block;
use crate::block::format_message;
use crate::directory::UserDirectory;

/// Memoizing wrapper around [`format_message`] for views that re-render the
/// same messages repeatedly.
///
/// The formatter owns its directory; changing it drops every cached result.
pub struct MessageFormatter {
    users: UserDirectory,
    cache: LruCache<String, Vec<Block>>,
}

impl MessageFormatter {
    pub fn new(capacity: usize) -> Self {
        Self::with_users(capacity, UserDirectory::new())
    }

    pub fn with_users(capacity: usize, users: UserDirectory) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            users,
            cache: LruCache::new(capacity),
        }
    }

    pub fn users(&self) -> &UserDirectory {
        &self.users
    }

    pub fn set_users(&mut self, users: UserDirectory) {
        self.users = users;
        self.cache.clear();
    }

    pub fn insert_user(&mut self, user_id: impl Into<String>, display_name: impl Into<String>) {
        self.users.insert(user_id.into(), display_name.into());
        self.cache.clear();
    }

    pub fn format(&mut self, text: &str) -> Vec<Block> {
        if let Some(cached) = self.cache.get(text) {
            trace!("format cache hit");
            return cached.clone();
        }
        trace!("format cache miss");
        let blocks = format_message(text, Some(&self.users));
        self.cache.put(text.to_string(), blocks.clone());
        blocks
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }
}

#[cfg(test)]
mod tests {
    use super::MessageFormatter;
    use crate::ast::InlineKind;
    use crate::block::format_message;

    #[test]
    fn cached_result_matches_direct_formatting() {
        let mut formatter = MessageFormatter::new(4);
        formatter.insert_user("U1", "Alice");
        let first = formatter.format("hi <@U1>");
        let second = formatter.format("hi <@U1>");
        assert_eq!(first, second);
        assert_eq!(first, format_message("hi <@U1>", Some(formatter.users())));
        assert_eq!(formatter.len(), 1);
    }

    #[test]
    fn changing_users_invalidates_cache() {
        let mut formatter = MessageFormatter::new(4);
        let before = formatter.format("<@U1>");
        assert_eq!(before[0].inlines()[0].visible_text(), "U1");

        formatter.insert_user("U1", "Alice");
        assert!(formatter.is_empty());
        let after = formatter.format("<@U1>");
        assert!(matches!(
            &after[0].inlines()[0].kind,
            InlineKind::Mention { display_name, .. } if display_name == "Alice"
        ));
    }

    #[test]
    fn least_recently_used_entry_is_evicted() {
        let mut formatter = MessageFormatter::new(2);
        formatter.format("a");
        formatter.format("b");
        formatter.format("a");
        formatter.format("c");
        assert_eq!(formatter.len(), 2);
        assert_eq!(formatter.capacity(), 2);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        assert_eq!(MessageFormatter::new(0).capacity(), 1);
    }
}
