//! Outpost Action
//!
//! Destinations, their actions, and the dispatcher that routes events to
//! them.
//!
//! # Architecture
//!
//! ```text
//! event ──► Subscription::matches ──► ActionDefinition::validate ──► Perform::perform
//!            (per subscription)         (payload per invocation)      (own task, concurrent)
//! ```
//!
//! An action is generic over the capability `C` it performs with. Cloud
//! destinations use [`SharedClient`](outpost_request::SharedClient); web
//! destinations use the vendor client produced by their
//! [`Initialize`] hook.
//!
//! # Usage
//!
//! ```ignore
//! let destination = Arc::new(heap::definition());
//! let settings = destination.validate_settings(&raw_settings)?;
//! let client = destination.request_client(Arc::new(HttpClient::new()), &settings);
//!
//! let dispatcher = Dispatcher::with_notifier(destination, TracingNotifier);
//! let result = dispatcher
//!   .dispatch(&event, &subscriptions, &settings, &client, CancellationToken::new())
//!   .await?;
//! ```

mod action;
mod browser;
mod destination;
mod dispatcher;
mod error;
mod events;
mod output;

pub use action::{ActionDefinition, ActionManifest, ExecuteContext, Perform};
pub use browser::{BrowserDestination, Initialize, RecordingRuntime, RuntimeCall, WebRuntime};
pub use destination::{
  AuthManifest, AuthScheme, Authentication, DestinationDefinition, DestinationManifest,
  ExtendRequest, TestAuthentication,
};
pub use dispatcher::{ActionResult, DispatchResult, Dispatcher, DispatcherConfig, Outcome};
pub use error::{ActionError, DispatchError, IntegrationError};
pub use events::{ChannelNotifier, DispatchEvent, DispatchNotifier, NoopNotifier, TracingNotifier};
pub use output::PerformOutput;
