//! Application context - wiring of config, HTTP and credentials

use std::path::PathBuf;
use std::sync::Arc;

use calpurge_core::{CalendarProviderClient, TokenProvider};
use calpurge_domain::{ProviderKind, PurgeConfig, Result};
use calpurge_infra::config::{load_google_secrets, load_microsoft_credentials};
use calpurge_infra::{
    CalendarSelection, ConfigLoader, DeviceCode, FileTokenStore, GoogleCalendarProvider,
    GoogleInstalledAppFlow, HttpClient, MicrosoftCalendarProvider, MicrosoftDeviceCodeFlow,
    OAuthTokenProvider,
};
use tracing::{debug, info, warn};

use crate::cli::Cli;
use crate::utils::console;

/// Everything a purge run needs before it talks to a provider
pub struct AppContext {
    pub provider: ProviderKind,
    pub config: PurgeConfig,
    pub http: HttpClient,
    pub token_cache: PathBuf,
    credentials: Option<PathBuf>,
}

impl AppContext {
    /// Load configuration and build the shared HTTP client
    ///
    /// # Errors
    /// `CalPurgeError::Config` for an unreadable or invalid config file.
    pub fn new(cli: &Cli) -> Result<Self> {
        let loader = match &cli.config {
            Some(path) => ConfigLoader::new().with_file(path),
            None => ConfigLoader::new(),
        };

        Ok(Self {
            provider: cli.provider,
            config: loader.load()?,
            http: HttpClient::new()?,
            token_cache: cli.token_cache_path(),
            credentials: cli.credentials.clone(),
        })
    }

    /// `--timezone`, else the configured zone
    pub fn timezone<'a>(&'a self, cli: &'a Cli) -> &'a str {
        cli.timezone.as_deref().unwrap_or(&self.config.timezone)
    }

    pub fn token_store(&self) -> Arc<FileTokenStore> {
        Arc::new(FileTokenStore::new(&self.token_cache))
    }

    /// Credential provider for the selected backend, cache already loaded
    ///
    /// Microsoft credentials missing from the environment are asked for on
    /// the terminal.
    pub async fn token_provider(&self) -> Result<Arc<dyn TokenProvider>> {
        let http = self.http.reqwest_client().clone();
        let store = self.token_store();

        let tokens: Arc<dyn TokenProvider> = match self.provider {
            ProviderKind::Microsoft => {
                let credentials = load_microsoft_credentials(console::prompt)?;
                let flow = MicrosoftDeviceCodeFlow::new(&credentials, http, |code: &DeviceCode| {
                    console::say(code.instructions());
                });
                let provider = OAuthTokenProvider::new(flow, store);
                log_cache_state(provider.initialize().await, &self.token_cache);
                Arc::new(provider)
            }
            ProviderKind::Google => {
                let secrets = load_google_secrets(self.credentials.clone())?;
                let flow = GoogleInstalledAppFlow::new(secrets, http, open_in_browser);
                let provider = OAuthTokenProvider::new(flow, store);
                log_cache_state(provider.initialize().await, &self.token_cache);
                Arc::new(provider)
            }
        };
        Ok(tokens)
    }

    /// Provider adapter, with the Google calendar name resolved to an id
    ///
    /// # Errors
    /// Any failure reading the Google calendar list.
    pub async fn calendar_client(
        &self,
        tokens: Arc<dyn TokenProvider>,
        calendar: &str,
    ) -> Result<Arc<dyn CalendarProviderClient>> {
        match self.provider {
            ProviderKind::Microsoft => {
                Ok(Arc::new(MicrosoftCalendarProvider::new(self.http.clone(), tokens)))
            }
            ProviderKind::Google => {
                let provider = GoogleCalendarProvider::new(self.http.clone(), tokens);
                let selection = provider.resolve_calendar(calendar).await?;
                if let CalendarSelection::FellBack { requested } = &selection {
                    console::say(format_args!(
                        "Calendar '{requested}' not found. Using primary calendar."
                    ));
                }
                info!(calendar_id = selection.calendar_id(), "Using Google calendar");
                Ok(Arc::new(provider.with_calendar_id(selection.calendar_id())))
            }
        }
    }
}

fn log_cache_state(cached: bool, path: &std::path::Path) {
    if cached {
        debug!(path = %path.display(), "Loaded cached credential");
    } else {
        debug!(path = %path.display(), "No cached credential, interactive sign-in needed");
    }
}

fn open_in_browser(url: &str) {
    console::say(format_args!("Please visit this URL to authorize this application: {url}"));
    if let Err(e) = open::that_detached(url) {
        warn!(error = %e, "Could not open a browser");
    }
}
