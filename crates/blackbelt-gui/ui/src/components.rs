use blackbelt_shared::{
  BELTS,
  BeltLabel,
  Quest,
  StatusFilter
};
use web_sys::{
  HtmlInputElement,
  InputEvent,
  MouseEvent
};
use yew::{
  Callback,
  Html,
  Properties,
  TargetCast,
  classes,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct QuestCardProps {
  pub quest:       Quest,
  pub on_progress: Callback<(String, u8)>,
  pub on_delete:   Callback<String>
}

#[function_component(QuestCard)]
pub fn quest_card(
  props: &QuestCardProps
) -> Html {
  let label = BeltLabel::for_progress(
    props.quest.progress
  );

  let oninput = {
    let name = props.quest.name.clone();
    let on_progress =
      props.on_progress.clone();
    Callback::from(
      move |e: InputEvent| {
        let input: HtmlInputElement =
          e.target_unchecked_into();
        match input.value().parse::<u8>()
        {
          | Ok(percent) => {
            on_progress.emit((
              name.clone(),
              percent.min(100)
            ))
          }
          | Err(error) => {
            tracing::warn!(
              %error,
              "ignoring unparsable \
               slider value"
            )
          }
        }
      }
    )
  };

  let ondelete = {
    let name = props.quest.name.clone();
    let on_delete =
      props.on_delete.clone();
    Callback::from(
      move |e: MouseEvent| {
        e.stop_propagation();
        on_delete.emit(name.clone());
      }
    )
  };

  let label_style =
    format!("color:{};", label.color());

  html! {
      <div class="task-card">
          <h3>{ &props.quest.name }</h3>
          <input
              type="range"
              class="belt-slider"
              min="0"
              max="100"
              value={props.quest.progress.to_string()}
              {oninput}
          />
          <div class="belt-label" style={label_style}>
              { label.to_string() }
          </div>
          <button class="delete-btn" title="Delete quest" onclick={ondelete}>{ "⚔️" }</button>
      </div>
  }
}

#[derive(Properties, PartialEq)]
pub struct FilterButtonsProps {
  pub active:    StatusFilter,
  pub on_select: Callback<StatusFilter>
}

#[function_component(FilterButtons)]
pub fn filter_buttons(
  props: &FilterButtonsProps
) -> Html {
  html! {
      <>
          {
              for StatusFilter::ALL.iter().map(|&filter| {
                  let on_select = props.on_select.clone();
                  html! {
                      <button
                          class={classes!("filter-btn", (props.active == filter).then_some("active"))}
                          data-filter={filter.as_str()}
                          onclick={move |_| on_select.emit(filter)}
                      >
                          { filter.label() }
                      </button>
                  }
              })
          }
      </>
  }
}

#[derive(Properties, PartialEq)]
pub struct VolumeSliderProps {
  pub value:     f64,
  pub on_change: Callback<f64>
}

#[function_component(VolumeSlider)]
pub fn volume_slider(
  props: &VolumeSliderProps
) -> Html {
  let on_change =
    props.on_change.clone();
  let oninput = Callback::from(
    move |e: InputEvent| {
      let input: HtmlInputElement =
        e.target_unchecked_into();
      if let Ok(volume) =
        input.value().parse::<f64>()
      {
        on_change.emit(volume);
      }
    }
  );

  html! {
      <label class="volume-control" title="Music volume">
          { "🔊" }
          <input
              type="range"
              min="0"
              max="1"
              step="0.01"
              value={props.value.to_string()}
              {oninput}
          />
      </label>
  }
}

#[derive(Properties, PartialEq)]
pub struct AddQuestPopupProps {
  pub open:      bool,
  pub draft:     String,
  pub error:     Option<String>,
  pub on_input:  Callback<String>,
  pub on_save:   Callback<()>,
  pub on_cancel: Callback<()>
}

#[function_component(AddQuestPopup)]
pub fn add_quest_popup(
  props: &AddQuestPopupProps
) -> Html {
  let on_input = props.on_input.clone();
  let oninput = Callback::from(
    move |e: InputEvent| {
      let input: HtmlInputElement =
        e.target_unchecked_into();
      on_input.emit(input.value());
    }
  );
  let on_save = props.on_save.clone();
  let on_cancel =
    props.on_cancel.clone();
  let error_style =
    if props.error.is_some() {
      "display:block;"
    } else {
      "display:none;"
    };

  html! {
      <div id="taskPopup" class={classes!("popup", props.open.then_some("active"))}>
          <div class="popup-content">
              <h2>{ "New Quest" }</h2>
              <input
                  id="taskNameInput"
                  type="text"
                  placeholder="Name your quest"
                  value={props.draft.clone()}
                  {oninput}
              />
              <p id="taskError" class="task-error" style={error_style}>
                  { props.error.clone().unwrap_or_default() }
              </p>
              <div class="popup-actions">
                  <button id="saveTaskBtn" class="btn" onclick={move |_| on_save.emit(())}>{ "Save" }</button>
                  <button id="cancelTaskBtn" class="btn" onclick={move |_| on_cancel.emit(())}>{ "Cancel" }</button>
              </div>
          </div>
      </div>
  }
}

#[derive(Properties, PartialEq)]
pub struct WelcomePopupProps {
  pub open:     bool,
  pub on_close: Callback<()>
}

#[function_component(WelcomePopup)]
pub fn welcome_popup(
  props: &WelcomePopupProps
) -> Html {
  let overlay_close = {
    let on_close = props.on_close.clone();
    Callback::from(
      move |e: MouseEvent| {
        if e.target() == e.current_target()
        {
          on_close.emit(());
        }
      }
    )
  };
  let close = props.on_close.clone();
  let dont_show =
    props.on_close.clone();

  html! {
      <div
          id="welcomePopup"
          class={classes!("popup", props.open.then_some("active"))}
          aria-hidden={(!props.open).to_string()}
          onclick={overlay_close}
      >
          <div class="popup-content">
              <h2>{ "Welcome, challenger" }</h2>
              <p>{ "Add a quest, then drag its slider as you make progress. Every quarter earns a new belt:" }</p>
              <ul class="belt-legend">
                  {
                      for BELTS.iter().map(|belt| html! {
                          <li>
                              <span class="belt-swatch" style={format!("background:{};", belt.color)}></span>
                              { belt.name }
                          </li>
                      })
                  }
              </ul>
              <p>{ "Reach 100% and the quest is completed. Use the filters to focus on what is still pending." }</p>
              <div class="popup-actions">
                  <button id="closePopup" class="btn" onclick={move |_| close.emit(())}>{ "Let's train" }</button>
                  <button id="dontShowPopup" class="btn subtle" onclick={move |_| dont_show.emit(())}>{ "Don't show again" }</button>
              </div>
          </div>
      </div>
  }
}

#[derive(Properties, PartialEq)]
pub struct DrawerProps {
  pub open:      bool,
  pub active:    StatusFilter,
  pub volume:    f64,
  pub on_select: Callback<StatusFilter>,
  pub on_volume: Callback<f64>,
  pub on_help:   Callback<()>,
  pub on_close:  Callback<()>
}

/// Side drawer holding the filter,
/// volume and help controls on narrow
/// screens.
#[function_component(Drawer)]
pub fn drawer(
  props: &DrawerProps
) -> Html {
  let on_close = props.on_close.clone();
  let on_help = props.on_help.clone();

  html! {
      <div id="sideDrawer" class={classes!("drawer", props.open.then_some("open"))}>
          <button
              id="closeDrawer"
              class="close-drawer"
              aria-label="Close menu"
              onclick={move |_| on_close.emit(())}
          >
              { "×" }
          </button>
          <div class="drawer-content">
              <FilterButtons active={props.active} on_select={props.on_select.clone()} />
          </div>
          <div class="drawer-footer">
              <div class="drawer-volume-wrap">
                  <VolumeSlider value={props.volume} on_change={props.on_volume.clone()} />
              </div>
              <div class="drawer-help-wrap">
                  <button class="help-btn" onclick={move |_| on_help.emit(())}>{ "?" }</button>
              </div>
          </div>
      </div>
  }
}
