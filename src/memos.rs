use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Memo, MemoDraft};

/// Ordered memo collection, newest first unless manually reordered.
#[derive(Debug, Clone, Default)]
pub struct MemoStore {
    memos: Vec<Memo>,
}

impl MemoStore {
    pub fn new(memos: Vec<Memo>) -> Self {
        Self { memos }
    }

    pub fn as_slice(&self) -> &[Memo] {
        &self.memos
    }

    pub fn iter(&self) -> impl Iterator<Item = &Memo> {
        self.memos.iter()
    }

    pub fn len(&self) -> usize {
        self.memos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memos.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Memo> {
        self.memos.iter().find(|memo| memo.id == id)
    }

    pub fn add(&mut self, draft: MemoDraft) -> &Memo {
        self.add_at(draft, Utc::now())
    }

    pub fn add_at(&mut self, draft: MemoDraft, created_at: DateTime<Utc>) -> &Memo {
        let memo = Memo {
            id: Uuid::new_v4().to_string(),
            title: draft.title,
            content: draft.content,
            category: draft.category,
            image_urls: draft.image_urls,
            is_voice_memo: draft.is_voice_memo,
            icon: draft.icon,
            cover_image_url: draft.cover_image_url,
            created_at,
        };
        self.memos.insert(0, normalized(memo));
        &self.memos[0]
    }

    /// Returns whether a memo was removed.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.memos.len();
        self.memos.retain(|memo| memo.id != id);
        self.memos.len() != before
    }

    /// Replaces the memo with the same id; unknown ids are ignored.
    pub fn update(&mut self, memo: Memo) -> bool {
        match self.memos.iter_mut().find(|existing| existing.id == memo.id) {
            Some(existing) => {
                *existing = normalized(memo);
                true
            }
            None => false,
        }
    }

    /// Moves `source_id` into the slot `target_id` occupies, shifting the rest.
    pub fn reorder(&mut self, source_id: &str, target_id: &str) -> bool {
        if source_id == target_id {
            return false;
        }
        let Some(from) = self.position(source_id) else {
            return false;
        };
        let Some(to) = self.position(target_id) else {
            return false;
        };
        let memo = self.memos.remove(from);
        self.memos.insert(to, memo);
        true
    }

    pub fn clear_category(&mut self, label: &str) -> usize {
        let mut cleared = 0;
        for memo in &mut self.memos {
            if memo.category.as_deref() == Some(label) {
                memo.category = None;
                cleared += 1;
            }
        }
        cleared
    }

    pub fn set_cover_image(&mut self, id: &str, url: Option<String>) -> bool {
        match self.memos.iter_mut().find(|memo| memo.id == id) {
            Some(memo) => {
                memo.cover_image_url = non_empty(url);
                true
            }
            None => false,
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.memos.iter().position(|memo| memo.id == id)
    }
}

/// Empty category and cover mean "none"; blank image entries are dropped.
fn normalized(mut memo: Memo) -> Memo {
    memo.category = non_empty(memo.category);
    memo.cover_image_url = non_empty(memo.cover_image_url);
    memo.image_urls.retain(|url| !url.trim().is_empty());
    memo
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(store: &MemoStore) -> Vec<String> {
        store.iter().map(|memo| memo.title.clone()).collect()
    }

    fn store_abc() -> MemoStore {
        let mut store = MemoStore::default();
        // add() prepends, so insert in reverse to get [A, B, C].
        store.add(MemoDraft::new("C", "c"));
        store.add(MemoDraft::new("B", "b"));
        store.add(MemoDraft::new("A", "a"));
        store
    }

    fn id_of(store: &MemoStore, title: &str) -> String {
        store
            .iter()
            .find(|memo| memo.title == title)
            .map(|memo| memo.id.clone())
            .unwrap()
    }

    #[test]
    fn add_prepends_and_assigns_unique_ids() {
        let store = store_abc();
        assert_eq!(titles(&store), ["A", "B", "C"]);
        let mut seen: Vec<_> = store.iter().map(|memo| memo.id.clone()).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn add_drops_empty_optional_fields() {
        let mut store = MemoStore::default();
        let draft = MemoDraft {
            category: Some(String::new()),
            cover_image_url: Some("  ".to_string()),
            image_urls: vec![String::new(), "data:image/gif;base64,R0lG".to_string()],
            ..MemoDraft::new("Title", "Body")
        };
        let memo = store.add(draft);
        assert_eq!(memo.category, None);
        assert_eq!(memo.cover_image_url, None);
        assert_eq!(memo.image_urls, ["data:image/gif;base64,R0lG"]);
    }

    #[test]
    fn update_drops_empty_optional_fields() {
        let mut store = MemoStore::default();
        let mut memo = store
            .add(MemoDraft::new("Title", "Body").with_category("Work"))
            .clone();
        memo.category = Some(String::new());
        memo.cover_image_url = Some(String::new());
        memo.image_urls = vec![" ".to_string()];
        assert!(store.update(memo.clone()));

        let stored = store.get(&memo.id).unwrap();
        assert_eq!(stored.category, None);
        assert_eq!(stored.cover_image_url, None);
        assert!(stored.image_urls.is_empty());
    }

    #[test]
    fn delete_removes_only_the_target() {
        let mut store = store_abc();
        let before_b = store.get(&id_of(&store, "B")).cloned();
        let id = id_of(&store, "A");
        assert!(store.delete(&id));
        assert!(store.get(&id).is_none());
        assert_eq!(titles(&store), ["B", "C"]);
        assert_eq!(store.get(&id_of(&store, "B")).cloned(), before_b);
        assert!(!store.delete("missing"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn update_with_unknown_id_is_a_no_op() {
        let mut store = store_abc();
        let mut ghost = store.as_slice()[0].clone();
        ghost.id = "ghost".to_string();
        ghost.title = "Ghost".to_string();
        assert!(!store.update(ghost));
        assert_eq!(titles(&store), ["A", "B", "C"]);
    }

    #[test]
    fn update_replaces_wholesale() {
        let mut store = store_abc();
        let mut memo = store.as_slice()[1].clone();
        memo.content = "changed".to_string();
        memo.is_voice_memo = true;
        assert!(store.update(memo.clone()));
        assert_eq!(store.get(&memo.id), Some(&memo));
    }

    #[test]
    fn reorder_moves_source_to_target_position() {
        let mut store = store_abc();
        let snapshot = store.as_slice().to_vec();
        let c = id_of(&store, "C");
        let a = id_of(&store, "A");
        assert!(store.reorder(&c, &a));
        assert_eq!(titles(&store), ["C", "A", "B"]);
        for memo in &snapshot {
            assert_eq!(store.get(&memo.id), Some(memo));
        }
    }

    #[test]
    fn reorder_forward_lands_after_target() {
        let mut store = store_abc();
        let a = id_of(&store, "A");
        let c = id_of(&store, "C");
        assert!(store.reorder(&a, &c));
        assert_eq!(titles(&store), ["B", "C", "A"]);
        assert!(!store.reorder(&a, "missing"));
        assert!(!store.reorder(&a, &a));
    }

    #[test]
    fn clear_category_only_touches_matching_memos() {
        let mut store = MemoStore::default();
        store.add(MemoDraft::new("one", "x").with_category("Work"));
        store.add(MemoDraft::new("two", "y").with_category("Home"));
        store.add(MemoDraft::new("three", "z").with_category("Work"));
        assert_eq!(store.clear_category("Work"), 2);
        let categories: Vec<_> = store.iter().map(|memo| memo.category.clone()).collect();
        assert_eq!(categories, [None, Some("Home".to_string()), None]);
    }
}
