//! Calendar integrations
//!
//! Provides OAuth2 sign-in and the event listing/deletion adapters for:
//! - Microsoft Graph (device-code flow)
//! - Google Calendar (installed-app loopback flow)

pub mod device_code;
pub mod installed_app;
pub mod oauth;
pub mod providers;

pub use device_code::{DeviceCode, MicrosoftDeviceCodeFlow};
pub use installed_app::GoogleInstalledAppFlow;
pub use oauth::{map_oauth_client_error, map_token_manager_error, OAuthCallbackServer};
pub use providers::{CalendarSelection, GoogleCalendarProvider, MicrosoftCalendarProvider};
