use tracing::{debug, info, warn};

use crate::error::{QuestError, Result};
use crate::quest::{COMPLETE_AT, Quest, StatusFilter, normalize_name};
use crate::storage::KeyValueStorage;

/// Storage key holding the serialized quest list.
pub const TASKS_KEY: &str = "tasks";

/// Storage key set once the welcome popup has been dismissed.
pub const VISITED_KEY: &str = "hasVisited";

/// How `update` and `delete` find their target.
///
/// Uniqueness checks always compare normalized names; `Exact` keeps the
/// historical behavior where progress updates and deletions compare the
/// raw stored name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NameMatch {
    #[default]
    Exact,
    Normalized,
}

impl NameMatch {
    pub fn matches(self, stored: &str, lookup: &str) -> bool {
        match self {
            Self::Exact => stored == lookup,
            Self::Normalized => normalize_name(stored) == normalize_name(lookup),
        }
    }
}

/// Quest repository over a key-value backend.
///
/// Holds no cache: each operation loads the full list, and each mutation
/// writes the full list back with a single `set`.
#[derive(Debug)]
pub struct QuestStore<S> {
    storage: S,
    name_match: NameMatch,
}

impl<S: KeyValueStorage> QuestStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            name_match: NameMatch::default(),
        }
    }

    pub fn with_name_match(mut self, name_match: NameMatch) -> Self {
        self.name_match = name_match;
        self
    }

    pub fn name_match(&self) -> NameMatch {
        self.name_match
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    #[tracing::instrument(skip(self))]
    pub fn load(&self) -> Result<Vec<Quest>> {
        let Some(raw) = self.storage.get(TASKS_KEY)? else {
            debug!("no stored quest list, starting empty");
            return Ok(Vec::new());
        };

        // A stored `null` decodes to an empty list, as an absent key does.
        let quests: Option<Vec<Quest>> =
            serde_json::from_str(&raw).map_err(|source| QuestError::Corrupt {
                key: TASKS_KEY.to_string(),
                source,
            })?;
        let mut quests = quests.unwrap_or_default();
        // Stored status may be missing or stale; progress is authoritative.
        for quest in &mut quests {
            quest.set_progress(quest.progress.min(COMPLETE_AT));
        }
        debug!(count = quests.len(), "loaded quests");
        Ok(quests)
    }

    #[tracing::instrument(skip(self, quests), fields(count = quests.len()))]
    pub fn save(&mut self, quests: &[Quest]) -> Result<()> {
        let serialized = serde_json::to_string(quests).map_err(QuestError::Encode)?;
        self.storage.set(TASKS_KEY, &serialized)?;
        debug!("saved quests");
        Ok(())
    }

    pub fn exists(&self, name: &str) -> Result<bool> {
        let target = normalize_name(name);
        Ok(self
            .load()?
            .iter()
            .any(|quest| normalize_name(&quest.name) == target))
    }

    #[tracing::instrument(skip(self))]
    pub fn create(&mut self, name: &str, progress: u8) -> Result<Quest> {
        if name.trim().is_empty() {
            return Err(QuestError::EmptyName);
        }
        check_progress(progress)?;

        let mut quests = self.load()?;
        let target = normalize_name(name);
        if quests
            .iter()
            .any(|quest| normalize_name(&quest.name) == target)
        {
            warn!("rejected duplicate quest name");
            return Err(QuestError::DuplicateName(name.to_string()));
        }

        let quest = Quest::new(name, progress);
        quests.push(quest.clone());
        self.save(&quests)?;
        info!(status = %quest.status, "created quest");
        Ok(quest)
    }

    /// Sets a quest's progress. Returns `false` without writing when no
    /// stored name matches.
    #[tracing::instrument(skip(self))]
    pub fn update(&mut self, name: &str, progress: u8) -> Result<bool> {
        check_progress(progress)?;

        let mut quests = self.load()?;
        let name_match = self.name_match;
        let Some(quest) = quests
            .iter_mut()
            .find(|quest| name_match.matches(&quest.name, name))
        else {
            warn!(?name_match, "no quest matched for update");
            return Ok(false);
        };

        quest.set_progress(progress);
        debug!(status = %quest.status, "updated quest progress");
        self.save(&quests)?;
        Ok(true)
    }

    /// Removes every quest matching `name`, keeping the rest in order.
    /// Returns `false` without writing when nothing matched.
    #[tracing::instrument(skip(self))]
    pub fn delete(&mut self, name: &str) -> Result<bool> {
        let mut quests = self.load()?;
        let before = quests.len();
        let name_match = self.name_match;
        quests.retain(|quest| !name_match.matches(&quest.name, name));

        if quests.len() == before {
            debug!("no quest matched for delete");
            return Ok(false);
        }

        self.save(&quests)?;
        info!(removed = before - quests.len(), "deleted quest");
        Ok(true)
    }

    pub fn list(&self, filter: StatusFilter) -> Result<Vec<Quest>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|quest| filter.matches(quest))
            .collect())
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.load()?.len())
    }

    pub fn has_visited(&self) -> Result<bool> {
        Ok(self
            .storage
            .get(VISITED_KEY)?
            .is_some_and(|value| !value.is_empty()))
    }

    pub fn mark_visited(&mut self) -> Result<()> {
        self.storage.set(VISITED_KEY, "true")?;
        Ok(())
    }
}

fn check_progress(progress: u8) -> Result<()> {
    if progress > COMPLETE_AT {
        return Err(QuestError::ProgressOutOfRange(progress));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quest::QuestStatus;
    use crate::storage::MemoryStorage;

    fn store() -> QuestStore<MemoryStorage> {
        QuestStore::new(MemoryStorage::new())
    }

    fn names(quests: &[Quest]) -> Vec<&str> {
        quests.iter().map(|quest| quest.name.as_str()).collect()
    }

    #[test]
    fn duplicate_names_are_rejected_after_normalization() {
        let mut store = store();
        store.create("Quest", 50).expect("first create");

        let err = store.create("  quest  ", 10).expect_err("duplicate");
        assert!(matches!(err, QuestError::DuplicateName(_)));

        let quests = store.list(StatusFilter::All).expect("list");
        assert_eq!(quests.len(), 1);
        assert_eq!(quests[0].progress, 50);
        assert_eq!(store.storage().writes(), 1);
    }

    #[test]
    fn retrying_the_same_name_keeps_one_entry() {
        let mut store = store();
        store.create("Kata", 0).expect("create");
        for retry in ["Kata", "KATA", " kata", "kAtA "] {
            assert!(store.create(retry, 0).is_err());
        }
        assert!(store.exists("  KATA  ").expect("exists"));
        assert_eq!(store.count().expect("count"), 1);
    }

    #[test]
    fn create_derives_status() {
        let mut store = store();
        assert_eq!(
            store.create("Spar", 100).expect("create").status,
            QuestStatus::Completed
        );
        assert_eq!(
            store.create("Spar2", 99).expect("create").status,
            QuestStatus::Pending
        );
    }

    #[test]
    fn empty_names_and_out_of_range_progress_are_rejected_without_writing() {
        let mut store = store();
        assert!(matches!(store.create("   ", 0), Err(QuestError::EmptyName)));
        assert!(matches!(
            store.create("Kata", 101),
            Err(QuestError::ProgressOutOfRange(101))
        ));
        assert_eq!(store.storage().writes(), 0);
    }

    #[test]
    fn update_recomputes_status() {
        let mut store = store();
        store.create("Kata", 10).expect("create");

        assert!(store.update("Kata", 100).expect("update"));
        let quests = store.load().expect("load");
        assert_eq!(quests[0].progress, 100);
        assert_eq!(quests[0].status, QuestStatus::Completed);

        assert!(store.update("Kata", 30).expect("update"));
        assert_eq!(
            store.load().expect("load")[0].status,
            QuestStatus::Pending
        );
    }

    #[test]
    fn exact_lookup_ignores_case_and_whitespace_variants() {
        let mut store = store();
        store.create("Kata", 10).expect("create");
        let writes = store.storage().writes();

        assert!(!store.update("kata", 80).expect("update"));
        assert!(!store.update(" Kata ", 80).expect("update"));
        assert!(!store.delete("KATA").expect("delete"));
        assert_eq!(store.storage().writes(), writes);
        assert_eq!(store.load().expect("load")[0].progress, 10);
    }

    #[test]
    fn normalized_lookup_finds_case_and_whitespace_variants() {
        let mut store = store().with_name_match(NameMatch::Normalized);
        store.create("Kata", 10).expect("create");

        assert!(store.update("  KATA ", 80).expect("update"));
        assert_eq!(store.load().expect("load")[0].progress, 80);

        assert!(store.delete("kata").expect("delete"));
        assert!(store.load().expect("load").is_empty());
    }

    #[test]
    fn delete_keeps_remaining_order_and_ignores_missing_names() {
        let mut store = store();
        for name in ["One", "Two", "Three", "Four"] {
            store.create(name, 0).expect("create");
        }

        assert!(store.delete("Two").expect("delete"));
        assert_eq!(
            names(&store.load().expect("load")),
            vec!["One", "Three", "Four"]
        );

        let writes = store.storage().writes();
        assert!(!store.delete("Nope").expect("delete"));
        assert_eq!(store.storage().writes(), writes);
        assert_eq!(store.count().expect("count"), 3);
    }

    #[test]
    fn status_filters_partition_the_list() {
        let mixes: [&[u8]; 5] = [
            &[],
            &[0, 100, 99, 25, 100],
            &[0, 1, 50, 99],
            &[100, 100, 100],
            &[24, 25, 49, 50, 74, 75, 100],
        ];

        for mix in mixes {
            let mut store = store();
            for (idx, &progress) in mix.iter().enumerate() {
                store.create(&format!("q{idx}"), progress).expect("create");
            }

            let all = store.list(StatusFilter::All).expect("all");
            let pending = store.list(StatusFilter::Pending).expect("pending");
            let completed = store.list(StatusFilter::Completed).expect("completed");

            assert_eq!(all.len(), mix.len(), "mix {mix:?}");
            assert_eq!(pending.len() + completed.len(), all.len(), "mix {mix:?}");
            assert!(pending.iter().all(|quest| quest.progress < 100));
            assert!(completed.iter().all(|quest| quest.progress == 100));
            assert!(pending.iter().all(|quest| !completed.contains(quest)));
            assert!(all
                .iter()
                .all(|quest| pending.contains(quest) || completed.contains(quest)));
        }
    }

    #[test]
    fn status_is_derived_from_progress_on_load() {
        let legacy = QuestStore::new(MemoryStorage::new().with_entry(
            TASKS_KEY,
            r#"[{"name":"Done","progress":100},{"name":"Stale","progress":40,"status":"completed"}]"#,
        ));

        let quests = legacy.load().expect("load");
        assert_eq!(quests[0].status, QuestStatus::Completed);
        assert_eq!(quests[1].status, QuestStatus::Pending);
        assert_eq!(
            names(&legacy.list(StatusFilter::Completed).expect("completed")),
            vec!["Done"]
        );
        assert_eq!(
            names(&legacy.list(StatusFilter::Pending).expect("pending")),
            vec!["Stale"]
        );
    }

    #[test]
    fn persisted_list_round_trips_in_order() {
        let mut store = store();
        for (name, progress) in [("Zeta", 75), ("Alpha", 100), ("Mid", 3)] {
            store.create(name, progress).expect("create");
        }
        let before = store.load().expect("load");

        let raw = store
            .storage()
            .raw(TASKS_KEY)
            .expect("tasks key written")
            .to_string();
        let reopened = QuestStore::new(MemoryStorage::new().with_entry(TASKS_KEY, &raw));
        assert_eq!(reopened.load().expect("reload"), before);
    }

    #[test]
    fn absent_or_null_blob_is_an_empty_list() {
        assert!(store().load().expect("load").is_empty());
        let nulled = QuestStore::new(MemoryStorage::new().with_entry(TASKS_KEY, "null"));
        assert!(nulled.load().expect("load").is_empty());
    }

    #[test]
    fn malformed_blob_is_reported() {
        let broken = QuestStore::new(MemoryStorage::new().with_entry(TASKS_KEY, "{oops"));
        assert!(matches!(broken.load(), Err(QuestError::Corrupt { .. })));
    }

    #[test]
    fn visited_flag_is_persisted() {
        let mut store = store();
        assert!(!store.has_visited().expect("flag"));
        store.mark_visited().expect("mark");
        assert!(store.has_visited().expect("flag"));
        assert_eq!(store.storage().raw(VISITED_KEY), Some("true"));
    }
}
