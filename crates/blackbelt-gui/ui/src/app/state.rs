use blackbelt_shared::{
  AddButtonPlacement,
  DuplicateNotice,
  KeyValueStorage,
  NameMatch,
  Quest,
  QuestError,
  QuestStore,
  StatusFilter
};

pub const DEFAULT_VOLUME: f64 = 0.5;

/// Settings read from the mount
/// element's `data-*` attributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UiConfig {
  pub notice:     DuplicateNotice,
  pub name_match: NameMatch
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
  pub config:         UiConfig,
  /// Cards currently on the board.
  pub quests:         Vec<Quest>,
  /// Size of the stored list,
  /// regardless of filter.
  pub total:          usize,
  pub filter:         StatusFilter,
  pub add_popup_open: bool,
  pub draft_name:     String,
  pub error:          Option<String>,
  pub welcome_open:   bool,
  pub drawer_open:    bool,
  pub volume:         f64
}

/// Every UI interaction maps to exactly
/// one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
  Reload,
  SetFilter(StatusFilter),
  OpenAddPopup,
  EditDraft(String),
  SaveDraft,
  CancelDraft,
  SetProgress {
    name:     String,
    progress: u8
  },
  Delete(String),
  ShowWelcome,
  DismissWelcome,
  OpenDrawer,
  CloseDrawer,
  SetVolume(f64)
}

impl AppState {
  pub fn new(config: UiConfig) -> Self {
    Self {
      config,
      quests: Vec::new(),
      total: 0,
      filter: StatusFilter::All,
      add_popup_open: false,
      draft_name: String::new(),
      error: None,
      welcome_open: false,
      drawer_open: false,
      volume: DEFAULT_VOLUME
    }
  }

  pub fn add_button(
    &self
  ) -> AddButtonPlacement {
    AddButtonPlacement::for_quest_count(
      self.total
    )
  }

  pub fn apply<S: KeyValueStorage>(
    &mut self,
    store: &mut QuestStore<S>,
    action: Action
  ) {
    match action {
      | Action::Reload => {
        self.reload(store)
      }
      | Action::SetFilter(filter) => {
        self.filter = filter;
        self.reload(store);
      }
      | Action::OpenAddPopup => {
        self.add_popup_open = true;
      }
      | Action::EditDraft(text) => {
        self.draft_name = text;
      }
      | Action::SaveDraft => {
        self.save_draft(store)
      }
      | Action::CancelDraft => {
        self.close_add_popup()
      }
      | Action::SetProgress {
        name,
        progress
      } => {
        self.set_progress(
          store, &name, progress
        )
      }
      | Action::Delete(name) => {
        self.delete(store, &name)
      }
      | Action::ShowWelcome => {
        self.welcome_open = true;
      }
      | Action::DismissWelcome => {
        if self.welcome_open {
          self.welcome_open = false;
          if let Err(error) =
            store.mark_visited()
          {
            tracing::error!(
              %error,
              "failed to remember \
               welcome dismissal"
            );
          }
        }
      }
      | Action::OpenDrawer => {
        self.drawer_open = true;
      }
      | Action::CloseDrawer => {
        self.drawer_open = false;
      }
      | Action::SetVolume(volume) => {
        self.volume =
          volume.clamp(0.0, 1.0);
      }
    }
  }

  fn reload<S: KeyValueStorage>(
    &mut self,
    store: &QuestStore<S>
  ) {
    match store.load() {
      | Ok(all) => {
        let filter = self.filter;
        self.total = all.len();
        self.quests = all
          .into_iter()
          .filter(|quest| {
            filter.matches(quest)
          })
          .collect();
        tracing::debug!(
          total = self.total,
          shown = self.quests.len(),
          filter = %self.filter,
          "reloaded quests"
        );
      }
      | Err(error) => {
        tracing::error!(
          %error,
          "failed to load quests"
        );
        self.total = 0;
        self.quests.clear();
      }
    }
  }

  fn save_draft<S: KeyValueStorage>(
    &mut self,
    store: &mut QuestStore<S>
  ) {
    let name =
      self.draft_name.trim().to_string();
    if name.is_empty() {
      self.close_add_popup();
      return;
    }

    match store.create(&name, 0) {
      | Ok(quest) => {
        // New cards land on the board
        // whatever the active filter.
        self.quests.push(quest);
        self.total += 1;
        self.close_add_popup();
      }
      | Err(QuestError::DuplicateName(
        _
      )) => {
        self.error = Some(
          self
            .config
            .notice
            .message()
            .to_string()
        );
      }
      | Err(QuestError::EmptyName) => {
        self.close_add_popup()
      }
      | Err(error) => {
        tracing::error!(
          %error,
          "failed to save quest"
        );
        self.error =
          Some(error.to_string());
      }
    }
  }

  fn close_add_popup(&mut self) {
    self.draft_name.clear();
    self.error = None;
    self.add_popup_open = false;
  }

  fn set_progress<S: KeyValueStorage>(
    &mut self,
    store: &mut QuestStore<S>,
    name: &str,
    progress: u8
  ) {
    match store.update(name, progress) {
      | Ok(true) => {
        // Cards keep their place until
        // the next reload, even if they
        // no longer match the filter.
        for quest in self
          .quests
          .iter_mut()
          .filter(|quest| {
            quest.name == name
          })
        {
          quest.set_progress(progress);
        }
      }
      | Ok(false) => {
        tracing::warn!(
          name,
          "slider moved for a quest \
           that is no longer stored"
        );
      }
      | Err(error) => {
        tracing::error!(
          %error,
          "failed to save progress"
        );
      }
    }
  }

  fn delete<S: KeyValueStorage>(
    &mut self,
    store: &mut QuestStore<S>,
    name: &str
  ) {
    if let Err(error) = store.delete(name)
    {
      tracing::error!(
        %error,
        "failed to delete quest"
      );
      return;
    }
    self
      .quests
      .retain(|quest| quest.name != name);
    self.total =
      store.count().unwrap_or_default();
  }
}

#[cfg(test)]
mod state_tests {
  use blackbelt_shared::{
    MemoryStorage,
    QuestStatus,
    VISITED_KEY
  };

  use super::*;

  fn setup() -> (
    AppState,
    QuestStore<MemoryStorage>
  ) {
    let config = UiConfig {
      notice:     DuplicateNotice::Alert,
      name_match: NameMatch::Exact
    };
    (
      AppState::new(config),
      QuestStore::new(
        MemoryStorage::new()
      )
    )
  }

  fn add(
    state: &mut AppState,
    store: &mut QuestStore<MemoryStorage>,
    name: &str
  ) {
    state.apply(
      store,
      Action::OpenAddPopup
    );
    state.apply(
      store,
      Action::EditDraft(
        name.to_string()
      )
    );
    state.apply(store, Action::SaveDraft);
  }

  #[test]
  fn saving_a_draft_adds_a_card_and_moves_the_button()
   {
    let (mut state, mut store) = setup();
    state.apply(&mut store, Action::Reload);
    assert_eq!(
      state.add_button(),
      AddButtonPlacement::Center
    );

    add(&mut state, &mut store, "  Kata  ");

    assert!(!state.add_popup_open);
    assert!(state.draft_name.is_empty());
    assert_eq!(state.quests.len(), 1);
    assert_eq!(state.quests[0].name, "Kata");
    assert_eq!(state.quests[0].progress, 0);
    assert_eq!(
      state.add_button(),
      AddButtonPlacement::Corner
    );
  }

  #[test]
  fn duplicate_draft_keeps_popup_open_with_notice()
   {
    let (mut state, mut store) = setup();
    add(&mut state, &mut store, "Kata");
    add(&mut state, &mut store, "KATA ");

    assert!(state.add_popup_open);
    assert_eq!(
      state.error.as_deref(),
      Some(
        DuplicateNotice::Alert.message()
      )
    );
    assert_eq!(state.quests.len(), 1);

    state.apply(
      &mut store,
      Action::CancelDraft
    );
    assert!(!state.add_popup_open);
    assert!(state.error.is_none());
  }

  #[test]
  fn empty_draft_closes_silently() {
    let (mut state, mut store) = setup();
    add(&mut state, &mut store, "   ");

    assert!(!state.add_popup_open);
    assert!(state.error.is_none());
    assert_eq!(store.storage().writes(), 0);
  }

  #[test]
  fn slider_updates_persist_without_refiltering()
   {
    let (mut state, mut store) = setup();
    add(&mut state, &mut store, "Kata");
    state.apply(
      &mut store,
      Action::SetFilter(
        StatusFilter::Pending
      )
    );
    assert_eq!(state.quests.len(), 1);

    state.apply(
      &mut store,
      Action::SetProgress {
        name:     "Kata".to_string(),
        progress: 100
      }
    );
    assert_eq!(state.quests.len(), 1);
    assert_eq!(
      state.quests[0].status,
      QuestStatus::Completed
    );

    state.apply(&mut store, Action::Reload);
    assert!(state.quests.is_empty());
    assert_eq!(state.total, 1);
  }

  #[test]
  fn delete_removes_card_and_stored_quest()
   {
    let (mut state, mut store) = setup();
    add(&mut state, &mut store, "One");
    add(&mut state, &mut store, "Two");

    state.apply(
      &mut store,
      Action::Delete("One".to_string())
    );
    assert_eq!(state.quests.len(), 1);
    assert_eq!(state.total, 1);
    assert_eq!(
      store.load().expect("load")[0].name,
      "Two"
    );
  }

  #[test]
  fn welcome_dismissal_is_remembered_only_when_open()
   {
    let (mut state, mut store) = setup();
    state.apply(
      &mut store,
      Action::DismissWelcome
    );
    assert_eq!(
      store.storage().raw(VISITED_KEY),
      None
    );

    state.apply(
      &mut store,
      Action::ShowWelcome
    );
    state.apply(
      &mut store,
      Action::DismissWelcome
    );
    assert!(!state.welcome_open);
    assert!(
      store.has_visited().expect("flag")
    );
  }

  #[test]
  fn volume_is_clamped() {
    let (mut state, mut store) = setup();
    state.apply(
      &mut store,
      Action::SetVolume(1.7)
    );
    assert_eq!(state.volume, 1.0);
  }
}
