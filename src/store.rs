//! The task store: sole owner of the task collection.
//!
//! Every mutation rewrites the whole collection under a single storage key and
//! then notifies subscribers. Write failures are logged and otherwise ignored,
//! so the in-memory list stays authoritative even when the disk is not.
//!
//! All mutating operations take `&mut self`, which keeps at most one mutation
//! (and its write) in flight at a time.

use std::sync::mpsc::{channel, Receiver, Sender};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use uuid::Uuid;

use crate::error::StorageError;
use crate::fields::Priority;
use crate::storage::KeyValueStore;
use crate::task::{example_tasks, Task};

/// Storage key holding the serialized task list.
pub const TASKS_KEY: &str = "saved_tasks";

/// Change notice delivered to subscribers after each mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    Changed { revision: u64 },
}

type DefaultsProvider = Box<dyn Fn() -> Vec<Task>>;

/// In-memory task collection persisted through a [`KeyValueStore`].
pub struct TaskStore<S: KeyValueStore> {
    tasks: Vec<Task>,
    storage: S,
    defaults: DefaultsProvider,
    subscribers: Vec<Sender<StoreEvent>>,
    revision: u64,
    write_error: Option<StorageError>,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Create an empty store that seeds [`example_tasks`] when nothing is saved.
    pub fn new(storage: S) -> Self {
        Self::with_defaults(storage, example_tasks)
    }

    /// Create an empty store with a custom default-dataset provider.
    pub fn with_defaults(storage: S, defaults: impl Fn() -> Vec<Task> + 'static) -> Self {
        TaskStore {
            tasks: Vec::new(),
            storage,
            defaults: Box::new(defaults),
            subscribers: Vec::new(),
            revision: 0,
            write_error: None,
        }
    }

    /// Create a store and immediately [`load`](Self::load) it.
    pub fn open(storage: S) -> Self {
        let mut store = Self::new(storage);
        store.load();
        store
    }

    /// Replace the collection with the saved list, or with the defaults when
    /// nothing usable is saved.
    ///
    /// Defaults are written back straight away so their ids stay stable
    /// across sessions.
    pub fn load(&mut self) {
        let saved = match self.storage.get(TASKS_KEY) {
            Ok(Some(bytes)) => match serde_json::from_slice::<Vec<Task>>(&bytes) {
                Ok(tasks) => {
                    info!("event=store_load status=ok count={}", tasks.len());
                    Some(tasks)
                }
                Err(e) => {
                    warn!("event=store_load status=corrupt fallback=defaults error={e}");
                    None
                }
            },
            Ok(None) => {
                info!("event=store_load status=empty fallback=defaults");
                None
            }
            Err(e) => {
                warn!("event=store_load status=unreadable fallback=defaults error={e}");
                None
            }
        };
        match saved {
            Some(tasks) => self.tasks = tasks,
            None => {
                self.tasks = (self.defaults)();
                self.write_error = self.flush().err();
                if let Some(e) = &self.write_error {
                    warn!("event=store_seed status=failed count={} error={e}", self.tasks.len());
                }
            }
        }
        self.notify();
    }

    /// Append a new incomplete task stamped with the current time.
    ///
    /// Returns the id of the new task.
    pub fn create(
        &mut self,
        title: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
        deadline: Option<DateTime<Utc>>,
    ) -> Uuid {
        let task = Task::new(title, description, priority, deadline);
        let id = task.id;
        debug!("event=task_create id={id} priority={priority:?}");
        self.tasks.push(task);
        self.commit();
        id
    }

    /// Replace the task sharing `task.id`. Returns `false` on a lookup miss.
    pub fn update(&mut self, task: Task) -> bool {
        let Some(slot) = self.tasks.iter_mut().find(|t| t.id == task.id) else {
            debug!("event=task_update status=miss id={}", task.id);
            return false;
        };
        debug!("event=task_update id={}", task.id);
        *slot = task;
        self.commit();
        true
    }

    /// Remove the task with `id`. Returns `false` on a lookup miss.
    pub fn delete(&mut self, id: Uuid) -> bool {
        let Some(idx) = self.tasks.iter().position(|t| t.id == id) else {
            debug!("event=task_delete status=miss id={id}");
            return false;
        };
        debug!("event=task_delete id={id}");
        self.tasks.remove(idx);
        self.commit();
        true
    }

    /// Flip the completion flag of the task with `id`. Returns `false` on a lookup miss.
    pub fn toggle_completion(&mut self, id: Uuid) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            debug!("event=task_toggle status=miss id={id}");
            return false;
        };
        task.completed = !task.completed;
        debug!("event=task_toggle id={id} completed={}", task.completed);
        self.commit();
        true
    }

    /// The collection in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Get a task by ID.
    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Write the whole collection now, reporting any failure.
    pub fn flush(&mut self) -> Result<(), StorageError> {
        let data = serde_json::to_vec_pretty(&self.tasks)?;
        self.storage.set(TASKS_KEY, &data)
    }

    /// Register for change notices. Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    /// Number of notices sent so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Failure of the most recent automatic write, if it failed.
    pub fn write_error(&self) -> Option<&StorageError> {
        self.write_error.as_ref()
    }

    fn commit(&mut self) {
        self.write_error = self.flush().err();
        if let Some(e) = &self.write_error {
            warn!("event=store_save status=failed count={} error={e}", self.tasks.len());
        }
        self.notify();
    }

    fn notify(&mut self) {
        self.revision += 1;
        let event = StoreEvent::Changed {
            revision: self.revision,
        };
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FilterOption;
    use crate::storage::{FileStore, MemoryStore};
    use crate::view::{derive_view, ViewQuery};
    use std::collections::HashSet;

    /// Backend whose writes always fail.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
            Err(StorageError::Io {
                key: key.to_string(),
                source: std::io::Error::other("disk gone"),
            })
        }

        fn set(&mut self, key: &str, _value: &[u8]) -> Result<(), StorageError> {
            Err(StorageError::Io {
                key: key.to_string(),
                source: std::io::Error::other("disk full"),
            })
        }
    }

    fn empty_store() -> TaskStore<MemoryStore> {
        let mut store = TaskStore::with_defaults(MemoryStore::new(), Vec::new);
        store.load();
        store
    }

    fn saved(store: &TaskStore<MemoryStore>) -> Vec<Task> {
        let bytes = store.storage.get(TASKS_KEY).unwrap().unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_load_seeds_examples_when_nothing_saved() {
        let store = TaskStore::open(MemoryStore::new());
        let titles: Vec<&str> = store.tasks().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Yağ Al", "Job Center", "Bulaşık"]);
    }

    #[test]
    fn test_load_writes_seed_back() {
        let store = TaskStore::open(MemoryStore::new());
        assert_eq!(saved(&store), store.tasks());
    }

    #[test]
    fn test_seed_ids_survive_file_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let ids = |store: &TaskStore<FileStore>| -> Vec<Uuid> {
            store.tasks().iter().map(|t| t.id).collect()
        };
        let first = TaskStore::open(FileStore::new(dir.path()));
        let second = TaskStore::open(FileStore::new(dir.path()));
        assert_eq!(ids(&first).len(), 3);
        assert_eq!(ids(&first), ids(&second));
        assert_eq!(first.tasks(), second.tasks());
    }

    #[test]
    fn test_load_falls_back_on_corrupt_data() {
        let mut storage = MemoryStore::new();
        storage.set(TASKS_KEY, b"{not json").unwrap();
        let store = TaskStore::open(storage);
        assert_eq!(store.tasks().len(), 3);
        assert_eq!(saved(&store).len(), 3);
    }

    #[test]
    fn test_load_falls_back_on_unreadable_storage() {
        let mut store = TaskStore::with_defaults(BrokenStore, || {
            vec![Task::new("Seed", "", Priority::Low, None)]
        });
        store.load();
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.tasks()[0].title, "Seed");
    }

    #[test]
    fn test_load_restores_saved_collection_verbatim() {
        let mut first = empty_store();
        first.create("One", "first", Priority::Low, None);
        first.create("Two", "", Priority::High, Some(Utc::now()));
        first.toggle_completion(first.tasks()[0].id);
        let expected = first.tasks().to_vec();

        let mut second = TaskStore::with_defaults(first.storage.clone(), example_tasks);
        second.load();
        assert_eq!(second.tasks(), expected.as_slice());
    }

    #[test]
    fn test_create_appends_and_persists() {
        let mut store = empty_store();
        let id = store.create("Buy milk", "", Priority::Medium, None);
        let task = store.get(id).unwrap();
        assert!(!task.completed);
        assert_eq!(store.tasks().last().map(|t| t.id), Some(id));
        assert_eq!(saved(&store), store.tasks());
    }

    #[test]
    fn test_create_accepts_empty_title() {
        let mut store = empty_store();
        store.create("", "", Priority::Low, None);
        assert_eq!(store.tasks().len(), 1);
    }

    #[test]
    fn test_created_ids_are_unique() {
        let mut store = empty_store();
        for i in 0..50 {
            store.create(format!("task {i}"), "", Priority::Medium, None);
        }
        let ids: HashSet<Uuid> = store.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_toggle_twice_restores_task() {
        let mut store = empty_store();
        let id = store.create("Report", "weekly", Priority::High, None);
        let before = store.get(id).unwrap().clone();

        assert!(store.toggle_completion(id));
        assert!(store.get(id).unwrap().completed);
        assert!(store.toggle_completion(id));
        assert_eq!(store.get(id).unwrap(), &before);
    }

    #[test]
    fn test_update_replaces_whole_task() {
        let mut store = empty_store();
        let id = store.create("Draft", "", Priority::Low, None);
        let mut edited = store.get(id).unwrap().clone();
        edited.title = "Final".into();
        edited.priority = Priority::High;
        edited.deadline = Some(Utc::now());

        assert!(store.update(edited.clone()));
        assert_eq!(store.get(id), Some(&edited));
        assert_eq!(saved(&store), vec![edited]);
    }

    #[test]
    fn test_update_miss_is_noop() {
        let mut store = empty_store();
        store.create("Keep", "", Priority::Low, None);
        let before = store.tasks().to_vec();
        let revision = store.revision();

        let stranger = Task::new("Stranger", "", Priority::High, None);
        assert!(!store.update(stranger));
        assert_eq!(store.tasks(), before.as_slice());
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_delete_removes_exactly_one() {
        let mut store = empty_store();
        store.create("A", "", Priority::Low, None);
        let id = store.create("B", "", Priority::Low, None);
        store.create("C", "", Priority::Low, None);

        assert!(store.delete(id));
        assert_eq!(store.tasks().len(), 2);
        assert!(store.get(id).is_none());
        assert_eq!(saved(&store).len(), 2);
    }

    #[test]
    fn test_delete_absent_id_leaves_collection() {
        let mut store = empty_store();
        store.create("A", "", Priority::Low, None);
        let before = store.tasks().to_vec();
        assert!(!store.delete(Uuid::new_v4()));
        assert_eq!(store.tasks(), before.as_slice());
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        let mut store = TaskStore::with_defaults(BrokenStore, Vec::new);
        store.load();
        let id = store.create("Still here", "", Priority::Medium, None);
        assert!(store.toggle_completion(id));
        assert!(store.get(id).unwrap().completed);
        assert!(matches!(store.write_error(), Some(StorageError::Io { .. })));
        assert!(store.flush().is_err());
    }

    #[test]
    fn test_successful_write_clears_error() {
        let mut store = empty_store();
        assert!(store.write_error().is_none());
        store.create("Fine", "", Priority::Low, None);
        assert!(store.write_error().is_none());
        assert_eq!(saved(&store).len(), 1);
    }

    #[test]
    fn test_subscribers_hear_every_mutation() {
        let mut store = empty_store();
        let rx = store.subscribe();

        let id = store.create("A", "", Priority::Low, None);
        store.toggle_completion(id);
        store.toggle_completion(Uuid::new_v4());
        store.delete(id);

        let events: Vec<StoreEvent> = rx.try_iter().collect();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events.last(),
            Some(&StoreEvent::Changed {
                revision: store.revision()
            })
        );
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let mut store = empty_store();
        let rx = store.subscribe();
        drop(rx);
        store.create("A", "", Priority::Low, None);
        assert!(store.subscribers.is_empty());
    }

    #[test]
    fn test_file_backed_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let id = {
            let mut store = TaskStore::with_defaults(FileStore::new(dir.path()), Vec::new);
            store.load();
            store.create("Persisted", "on disk", Priority::High, None)
        };
        let store = TaskStore::open(FileStore::new(dir.path()));
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.get(id).map(|t| t.title.as_str()), Some("Persisted"));
    }

    #[test]
    fn test_buy_milk_scenario() {
        let mut store = empty_store();
        store.create("Buy milk", "", Priority::Medium, None);

        let all = derive_view(store.tasks(), &ViewQuery::new("", FilterOption::All));
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "Buy milk");
        assert!(!all[0].completed);

        let id = all[0].id;
        store.toggle_completion(id);

        let active = derive_view(store.tasks(), &ViewQuery::new("", FilterOption::Active));
        assert!(active.is_empty());
        let completed = derive_view(store.tasks(), &ViewQuery::new("", FilterOption::Completed));
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, id);
    }
}
