use std::cell::RefCell;

use blackbelt_shared::{
  KeyValueStorage,
  MemoryStorage,
  NameMatch,
  QuestStore,
  StorageError
};

thread_local! {
  static FALLBACK: RefCell<MemoryStorage> =
    RefCell::new(MemoryStorage::new());
}

/// `window.localStorage`.
pub struct LocalStorage {
  inner: web_sys::Storage
}

impl LocalStorage {
  pub fn open()
  -> Result<Self, StorageError> {
    let window = web_sys::window()
      .ok_or_else(|| {
        StorageError::Unavailable(
          "no window".to_string()
        )
      })?;
    let inner = window
      .local_storage()
      .map_err(|err| {
        StorageError::Unavailable(
          format!("{err:?}")
        )
      })?
      .ok_or_else(|| {
        StorageError::Unavailable(
          "localStorage is disabled"
            .to_string()
        )
      })?;
    Ok(Self {
      inner
    })
  }
}

impl KeyValueStorage for LocalStorage {
  fn get(
    &self,
    key: &str
  ) -> Result<Option<String>, StorageError>
  {
    self.inner.get_item(key).map_err(
      |err| StorageError::Read {
        key:    key.to_string(),
        reason: format!("{err:?}")
      }
    )
  }

  fn set(
    &mut self,
    key: &str,
    value: &str
  ) -> Result<(), StorageError> {
    self
      .inner
      .set_item(key, value)
      .map_err(|err| {
        StorageError::Write {
          key:    key.to_string(),
          reason: format!("{err:?}")
        }
      })
  }
}

/// Runs `f` against a store over
/// localStorage, or over a per-tab
/// in-memory map when localStorage is
/// unavailable.
pub fn with_store<R>(
  name_match: NameMatch,
  f: impl FnOnce(
    &mut QuestStore<
      &mut dyn KeyValueStorage
    >
  ) -> R
) -> R {
  match LocalStorage::open() {
    | Ok(mut local) => {
      let mut store = QuestStore::new(
        &mut local
          as &mut dyn KeyValueStorage
      )
      .with_name_match(name_match);
      f(&mut store)
    }
    | Err(error) => {
      tracing::warn!(
        %error,
        "localStorage unavailable; \
         quests will not persist"
      );
      FALLBACK.with(|cell| {
        let mut memory =
          cell.borrow_mut();
        let mut store =
          QuestStore::new(
            &mut *memory
              as &mut dyn KeyValueStorage
          )
          .with_name_match(name_match);
        f(&mut store)
      })
    }
  }
}
