use gloo::events::EventListener;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{
  JsFuture,
  spawn_local
};
use web_sys::HtmlAudioElement;

pub const AUDIO_ELEMENT_ID: &str =
  "bgMusic";

/// Background music player. Browsers
/// block autoplay, so playback starts on
/// the first click anywhere on the page.
pub struct BackgroundMusic {
  element: HtmlAudioElement,
  _unlock: EventListener
}

impl BackgroundMusic {
  /// Returns `None` when the page has no
  /// `#bgMusic` audio element.
  pub fn attach(
    volume: f64
  ) -> Option<Self> {
    let document = web_sys::window()
      .and_then(|window| {
        window.document()
      })?;

    let Some(element) = document
      .get_element_by_id(
        AUDIO_ELEMENT_ID
      )
    else {
      tracing::error!(
        "bgMusic element not found"
      );
      return None;
    };

    let element = match element
      .dyn_into::<HtmlAudioElement>()
    {
      | Ok(audio) => audio,
      | Err(_) => {
        tracing::error!(
          "bgMusic is not an audio \
           element"
        );
        return None;
      }
    };
    element.set_volume(volume);

    let player = element.clone();
    let unlock = EventListener::once(
      &document,
      "click",
      move |_| play(&player)
    );

    Some(Self {
      element,
      _unlock: unlock
    })
  }

  pub fn set_volume(
    &self,
    volume: f64
  ) {
    self
      .element
      .set_volume(volume.clamp(0.0, 1.0));
  }
}

fn play(player: &HtmlAudioElement) {
  match player.play() {
    | Ok(promise) => {
      spawn_local(async move {
        if let Err(err) =
          JsFuture::from(promise).await
        {
          tracing::info!(
            error = ?err,
            "autoplay blocked"
          );
        }
      });
    }
    | Err(err) => {
      tracing::info!(
        error = ?err,
        "autoplay blocked"
      );
    }
  }
}
