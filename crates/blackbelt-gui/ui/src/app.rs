mod audio;
mod state;
mod storage;

use std::rc::Rc;

use blackbelt_shared::{
  DuplicateNotice,
  StatusFilter
};
use gloo::events::EventListener;
use gloo::timers::callback::Timeout;
use wasm_bindgen::JsCast;
use web_sys::{
  KeyboardEvent,
  MouseEvent
};
use yew::{
  Callback,
  Html,
  Properties,
  Reducible,
  classes,
  function_component,
  html,
  use_effect_with,
  use_memo,
  use_mut_ref,
  use_reducer
};

pub use self::state::UiConfig;
use self::audio::BackgroundMusic;
use self::state::{
  Action,
  AppState
};
use self::storage::with_store;
use crate::components::{
  AddQuestPopup,
  Drawer,
  FilterButtons,
  QuestCard,
  VolumeSlider,
  WelcomePopup
};

/// Widest viewport, in CSS pixels, that
/// gets the hamburger drawer.
const MOBILE_MAX_WIDTH: f64 = 768.0;

/// Delay before the first-visit popup,
/// so layout can settle.
const WELCOME_DELAY_MS: u32 = 250;

impl Reducible for AppState {
  type Action = Action;

  fn reduce(
    self: Rc<Self>,
    action: Action
  ) -> Rc<Self> {
    tracing::debug!(
      ?action,
      "applying action"
    );
    let mut next = (*self).clone();
    with_store(
      self.config.name_match,
      |store| next.apply(store, action)
    );
    Rc::new(next)
  }
}

#[derive(Properties, PartialEq)]
pub struct AppProps {
  pub config: UiConfig
}

fn viewport_width() -> Option<f64> {
  web_sys::window()
    .and_then(|window| {
      window.inner_width().ok()
    })
    .and_then(|width| width.as_f64())
}

/// Shows the duplicate notice as a
/// blocking alert when the page has no
/// inline error area.
fn alert_if_no_error_area(
  notice: DuplicateNotice,
  message: &str
) {
  let Some(window) = web_sys::window()
  else {
    return;
  };
  let has_area = window
    .document()
    .and_then(|document| {
      document
        .get_element_by_id("taskError")
    })
    .is_some();
  if !has_area
    && notice.falls_back_to_alert()
  {
    if let Err(err) =
      window.alert_with_message(message)
    {
      tracing::warn!(
        error = ?err,
        "failed to show duplicate alert"
      );
    }
  }
}

#[function_component(App)]
pub fn app(props: &AppProps) -> Html {
  let state = use_reducer({
    let config = props.config;
    move || AppState::new(config)
  });
  let music =
    use_mut_ref(|| None::<BackgroundMusic>);
  let mobile = use_memo((), |_| {
    viewport_width().is_some_and(
      |width| width <= MOBILE_MAX_WIDTH
    )
  });

  {
    let dispatcher = state.dispatcher();
    let music = music.clone();
    let volume = state.volume;
    let name_match =
      state.config.name_match;
    use_effect_with((), move |_| {
      dispatcher.dispatch(Action::Reload);
      *music.borrow_mut() =
        BackgroundMusic::attach(volume);

      let visited = with_store(
        name_match,
        |store| store.has_visited()
      )
      .unwrap_or_else(|error| {
        tracing::error!(
          %error,
          "failed to read visited flag"
        );
        false
      });
      let welcome = (!visited).then(|| {
        let dispatcher =
          dispatcher.clone();
        Timeout::new(
          WELCOME_DELAY_MS,
          move || {
            dispatcher.dispatch(
              Action::ShowWelcome
            )
          }
        )
      });

      let window = web_sys::window();
      let escape =
        window.as_ref().map(|window| {
          let dispatcher =
            dispatcher.clone();
          EventListener::new(
            window,
            "keydown",
            move |event| {
              if let Some(key) = event
                .dyn_ref::<KeyboardEvent>()
                && key.key() == "Escape"
              {
                dispatcher.dispatch(
                  Action::DismissWelcome
                );
              }
            }
          )
        });
      let resize =
        window.as_ref().map(|window| {
          let dispatcher =
            dispatcher.clone();
          EventListener::new(
            window,
            "resize",
            move |_| {
              if viewport_width()
                .is_some_and(|width| {
                  width > MOBILE_MAX_WIDTH
                })
              {
                dispatcher.dispatch(
                  Action::CloseDrawer
                );
              }
            }
          )
        });

      tracing::info!(
        first_visit = !visited,
        "frontend mounted"
      );

      move || {
        drop(welcome);
        drop(escape);
        drop(resize);
      }
    });
  }

  {
    let music = music.clone();
    use_effect_with(
      state.volume.to_bits(),
      move |bits| {
        if let Some(player) =
          music.borrow().as_ref()
        {
          player.set_volume(
            f64::from_bits(*bits)
          );
        }
        || ()
      }
    );
  }

  {
    let notice = state.config.notice;
    use_effect_with(
      state.error.clone(),
      move |error| {
        if let Some(message) = error {
          alert_if_no_error_area(
            notice, message
          );
        }
        || ()
      }
    );
  }

  let dispatch = |action: Action| {
    let dispatcher = state.dispatcher();
    move || {
      dispatcher.dispatch(action.clone())
    }
  };

  let on_filter = {
    let dispatcher = state.dispatcher();
    Callback::from(
      move |filter: StatusFilter| {
        dispatcher.dispatch(
          Action::SetFilter(filter)
        )
      }
    )
  };
  let on_drawer_filter = {
    let dispatcher = state.dispatcher();
    Callback::from(
      move |filter: StatusFilter| {
        dispatcher.dispatch(
          Action::SetFilter(filter)
        );
        dispatcher
          .dispatch(Action::CloseDrawer);
      }
    )
  };
  let on_volume = {
    let dispatcher = state.dispatcher();
    Callback::from(move |volume: f64| {
      dispatcher.dispatch(
        Action::SetVolume(volume)
      )
    })
  };
  let on_progress = {
    let dispatcher = state.dispatcher();
    Callback::from(
      move |(name, progress): (
        String,
        u8
      )| {
        dispatcher.dispatch(
          Action::SetProgress {
            name,
            progress
          }
        )
      }
    )
  };
  let on_delete = {
    let dispatcher = state.dispatcher();
    Callback::from(move |name: String| {
      dispatcher
        .dispatch(Action::Delete(name))
    })
  };
  let on_draft_input = {
    let dispatcher = state.dispatcher();
    Callback::from(move |text: String| {
      dispatcher
        .dispatch(Action::EditDraft(text))
    })
  };

  let on_help = {
    let show = dispatch(Action::ShowWelcome);
    Callback::from(move |_: ()| show())
  };
  let on_drawer_help = {
    let dispatcher = state.dispatcher();
    Callback::from(move |_: ()| {
      dispatcher
        .dispatch(Action::ShowWelcome);
      dispatcher
        .dispatch(Action::CloseDrawer);
    })
  };
  let on_welcome_close = {
    let dismiss =
      dispatch(Action::DismissWelcome);
    Callback::from(move |_: ()| dismiss())
  };
  let on_save = {
    let save = dispatch(Action::SaveDraft);
    Callback::from(move |_: ()| save())
  };
  let on_cancel = {
    let cancel =
      dispatch(Action::CancelDraft);
    Callback::from(move |_: ()| cancel())
  };
  let on_drawer_close = {
    let close =
      dispatch(Action::CloseDrawer);
    Callback::from(move |_: ()| close())
  };
  let open_add = dispatch(Action::OpenAddPopup);
  let open_drawer =
    dispatch(Action::OpenDrawer);
  let help_click = on_help.clone();

  html! {
      <div class="app">
          <div class="top-panel">
              {
                  if *mobile {
                      html! {
                          <button
                              id="menuToggle"
                              class="hamburger"
                              aria-label="Open menu"
                              onclick={move |_| open_drawer()}
                          >
                              { "☰" }
                          </button>
                      }
                  } else {
                      html! {}
                  }
              }
              <div class="filters">
                  <FilterButtons active={state.filter} on_select={on_filter} />
              </div>
              <VolumeSlider value={state.volume} on_change={on_volume.clone()} />
              <button
                  id="helpBtn"
                  class="help-btn"
                  onclick={move |e: MouseEvent| {
                      e.stop_propagation();
                      help_click.emit(());
                  }}
              >
                  { "?" }
              </button>
              {
                  if *mobile {
                      html! { <div class="mobile-title">{ "BlackBelt" }</div> }
                  } else {
                      html! {}
                  }
              }
          </div>

          <div
              id="addTaskWrapper"
              class={classes!("add-task-wrapper", state.add_button().is_moved().then_some("moved"))}
          >
              <button id="addTaskBtn" class="btn" onclick={move |_| open_add()}>{ "+ New Quest" }</button>
          </div>

          <div id="taskContainer">
              {
                  for state.quests.iter().map(|quest| html! {
                      <QuestCard
                          key={quest.name.clone()}
                          quest={quest.clone()}
                          on_progress={on_progress.clone()}
                          on_delete={on_delete.clone()}
                      />
                  })
              }
          </div>

          <AddQuestPopup
              open={state.add_popup_open}
              draft={state.draft_name.clone()}
              error={state.error.clone()}
              on_input={on_draft_input}
              {on_save}
              {on_cancel}
          />
          <WelcomePopup open={state.welcome_open} on_close={on_welcome_close} />
          {
              if *mobile {
                  html! {
                      <Drawer
                          open={state.drawer_open}
                          active={state.filter}
                          volume={state.volume}
                          on_select={on_drawer_filter}
                          {on_volume}
                          on_help={on_drawer_help}
                          on_close={on_drawer_close}
                      />
                  }
              } else {
                  html! {}
              }
          }
      </div>
  }
}
