use std::time::Duration;

/// Process-wide configuration consumed by client connections.
///
/// The broker supplies one implementation shared by every session; the
/// core only relies on this yes/no authentication contract, the minimum
/// heart-beat period, and the server identity string.
pub trait Config: Send + Sync {
    /// Decide whether a client presenting these credentials may connect.
    /// Absent `login`/`passcode` headers arrive as `None`.
    fn authenticate(&self, login: Option<&str>, passcode: Option<&str>) -> bool;

    /// Minimum heart-beat period the server will agree to. Clients asking
    /// for shorter periods are clamped up to this value.
    fn heart_beat(&self) -> Duration;

    /// Value of the `server` header sent in CONNECTED frames.
    fn server(&self) -> String;

    /// Pause imposed after a failed authentication, to slow down a rogue
    /// client scanning for credentials.
    fn auth_failure_delay(&self) -> Duration {
        Duration::from_secs(1)
    }
}

/// Straightforward [`Config`] implementation with builder-style setters.
///
/// With no credentials configured, every client is accepted.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    server: String,
    heart_beat: Duration,
    auth_failure_delay: Duration,
    credentials: Option<(String, String)>,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            server: format!("osmium-stomp/{}", env!("CARGO_PKG_VERSION")),
            heart_beat: Duration::from_secs(30),
            auth_failure_delay: Duration::from_secs(1),
            credentials: None,
        }
    }
}

impl BrokerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum heart-beat period.
    pub fn with_heart_beat(mut self, heart_beat: Duration) -> Self {
        self.heart_beat = heart_beat;
        self
    }

    /// Set the `server` header value.
    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = server.into();
        self
    }

    /// Set the pause imposed after failed authentication.
    pub fn with_auth_failure_delay(mut self, delay: Duration) -> Self {
        self.auth_failure_delay = delay;
        self
    }

    /// Require this login/passcode pair from every client.
    pub fn with_credentials(
        mut self,
        login: impl Into<String>,
        passcode: impl Into<String>,
    ) -> Self {
        self.credentials = Some((login.into(), passcode.into()));
        self
    }
}

impl Config for BrokerConfig {
    fn authenticate(&self, login: Option<&str>, passcode: Option<&str>) -> bool {
        match &self.credentials {
            None => true,
            Some((expected_login, expected_passcode)) => {
                login == Some(expected_login.as_str())
                    && passcode == Some(expected_passcode.as_str())
            }
        }
    }

    fn heart_beat(&self) -> Duration {
        self.heart_beat
    }

    fn server(&self) -> String {
        self.server.clone()
    }

    fn auth_failure_delay(&self) -> Duration {
        self.auth_failure_delay
    }
}
