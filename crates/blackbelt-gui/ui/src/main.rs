mod app;
mod components;

use blackbelt_shared::{
  DuplicateNotice,
  NameMatch
};
use web_sys::Element;

/// Reads `data-duplicate-notice` and
/// `data-lookup` from the mount element.
fn read_config(
  mount: &Element
) -> app::UiConfig {
  let notice = mount
    .get_attribute("data-duplicate-notice")
    .map(|raw| {
      raw.parse().unwrap_or_else(
        |error: String| {
          tracing::warn!(
            %error,
            "falling back to alert notice"
          );
          DuplicateNotice::Alert
        }
      )
    })
    .unwrap_or_default();

  let name_match = match mount
    .get_attribute("data-lookup")
    .as_deref()
  {
    | Some("normalized") => {
      NameMatch::Normalized
    }
    | _ => NameMatch::Exact
  };

  app::UiConfig {
    notice,
    name_match
  }
}

fn main() {
  console_error_panic_hook::set_once();
  wasm_tracing::set_as_global_default();

  tracing::info!(
    "starting BlackBelt frontend"
  );

  let mount = web_sys::window()
    .and_then(|window| {
      window.document()
    })
    .and_then(|document| {
      document.get_element_by_id("app")
    })
    .expect(
      "missing #app mount element"
    );

  let props = app::AppProps {
    config: read_config(&mount)
  };
  tracing::debug!(
    config = ?props.config,
    "frontend configuration"
  );

  yew::Renderer::<app::App>::with_root_and_props(
    mount, props
  )
  .render();
}
