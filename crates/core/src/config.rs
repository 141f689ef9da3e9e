use crate::error::SessionError;
use secrecy::SecretString;

/// The two values a session needs: the public key used to construct the
/// voice client, and the agent a call is addressed to.
///
/// Both are optional here so that their absence can be reported to the user
/// instead of failing at startup. Blank values count as absent.
#[derive(Clone, Debug, Default)]
pub struct SessionConfig {
    public_key: Option<SecretString>,
    agent_id: Option<String>,
}

impl SessionConfig {
    pub fn new(public_key: Option<String>, agent_id: Option<String>) -> Self {
        Self {
            public_key: non_blank(public_key).map(SecretString::from),
            agent_id: non_blank(agent_id),
        }
    }

    pub fn public_key(&self) -> Option<&SecretString> {
        self.public_key.as_ref()
    }

    pub fn agent_id(&self) -> Option<&str> {
        self.agent_id.as_deref()
    }

    /// Whether an agent identifier is configured, for the page's readout.
    pub fn agent_configured(&self) -> bool {
        self.agent_id.is_some()
    }

    /// Returns the agent identifier if the configuration is complete.
    pub fn require(&self) -> Result<&str, SessionError> {
        let mut missing = Vec::new();
        if self.public_key.is_none() {
            missing.push("API Key");
        }
        if self.agent_id.is_none() {
            missing.push("Assistant ID");
        }
        match self.agent_id.as_deref() {
            Some(agent_id) if missing.is_empty() => Ok(agent_id),
            _ => Err(SessionError::MissingConfiguration { missing }),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
