//! Heap.
//!
//! Server-side events go to the integrations track endpoint; user traits go
//! to `add_user_properties` first when the user is identified.

mod flat;
mod track_event;
mod utils;

use outpost_action::DestinationDefinition;
use outpost_config::{DestinationMode, FieldDef};
use outpost_request::SharedClient;

pub use flat::flat;

pub const NAME: &str = "Heap";
pub const SLUG: &str = "actions-heap";

pub const TRACK_URL: &str = "https://heapanalytics.com/api/integrations/track";
pub const ADD_USER_PROPERTIES_URL: &str = "https://heapanalytics.com/api/add_user_properties";

/// Value of `custom_properties.segment_library` on every event.
pub const LIBRARY_NAME: &str = "segment";

pub fn definition() -> DestinationDefinition<SharedClient> {
  DestinationDefinition::new(NAME, SLUG, DestinationMode::Cloud)
    .description("Send events and user properties to Heap.")
    .setting(
      FieldDef::string("appId")
        .label("App ID")
        .description("The environment ID of your Heap project.")
        .required(),
    )
    .action(track_event::action())
}
