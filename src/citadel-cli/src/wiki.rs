//! MediaWiki action API client
//!
//! Implements [`WikiPages`] with a cookie-keeping `ureq` agent: login token,
//! `action=login`, csrf token, then `action=edit` per page.

use anyhow::{bail, Context, Result};
use citadel::{PublishError, WikiPages};
use serde_json::Value;

pub struct MediaWiki {
    agent: ureq::Agent,
    api: String,
    csrf_token: Option<String>,
}

impl MediaWiki {
    pub fn new(api: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(concat!("citadel/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            api: api.into(),
            csrf_token: None,
        }
    }

    /// Log in with a bot password and fetch the edit token
    pub fn login(&mut self, user: &str, password: &str) -> Result<()> {
        let login_token = self.token("login")?;

        let response: Value = self
            .agent
            .post(&self.api)
            .send_form(&[
                ("action", "login"),
                ("format", "json"),
                ("lgname", user),
                ("lgpassword", password),
                ("lgtoken", login_token.as_str()),
            ])
            .context("Login request failed")?
            .into_json()
            .context("Invalid login response")?;

        let result = response["login"]["result"].as_str().unwrap_or("Unknown");
        if result != "Success" {
            let reason = response["login"]["reason"].as_str().unwrap_or(result);
            bail!("Wiki login as {} failed: {}", user, reason);
        }

        self.csrf_token = Some(self.token("csrf")?);
        tracing::info!(user, api = %self.api, "logged in to wiki");
        Ok(())
    }

    fn token(&self, kind: &str) -> Result<String> {
        let response: Value = self
            .agent
            .get(&self.api)
            .query("action", "query")
            .query("meta", "tokens")
            .query("type", kind)
            .query("format", "json")
            .call()
            .with_context(|| format!("Failed to request {} token", kind))?
            .into_json()
            .with_context(|| format!("Invalid {} token response", kind))?;

        response["query"]["tokens"][format!("{kind}token")]
            .as_str()
            .map(str::to_string)
            .with_context(|| format!("No {} token in response", kind))
    }
}

fn backend(title: &str) -> impl FnOnce(String) -> PublishError + '_ {
    move |message| PublishError::Backend {
        title: title.to_string(),
        message,
    }
}

/// Page content from a `prop=revisions` query (formatversion 2)
fn page_content(response: &Value) -> Option<Option<String>> {
    let page = response["query"]["pages"].get(0)?;
    if page["missing"].as_bool().unwrap_or(false) {
        return Some(None);
    }
    let content = page["revisions"][0]["slots"]["main"]["content"].as_str()?;
    Some(Some(content.to_string()))
}

/// Outcome of an `action=edit` request
fn edit_outcome(title: &str, response: &Value) -> Result<(), PublishError> {
    if response["edit"]["result"].as_str() == Some("Success") {
        return Ok(());
    }
    let reason = response["error"]["info"]
        .as_str()
        .or_else(|| response["edit"]["result"].as_str())
        .unwrap_or("unknown response")
        .to_string();
    Err(PublishError::Rejected {
        title: title.to_string(),
        reason,
    })
}

impl WikiPages for MediaWiki {
    fn read_page(&mut self, title: &str) -> Result<Option<String>, PublishError> {
        let response: Value = self
            .agent
            .get(&self.api)
            .query("action", "query")
            .query("prop", "revisions")
            .query("rvprop", "content")
            .query("rvslots", "main")
            .query("formatversion", "2")
            .query("format", "json")
            .query("titles", title)
            .call()
            .map_err(|e| e.to_string())
            .and_then(|r| r.into_json().map_err(|e| e.to_string()))
            .map_err(backend(title))?;

        page_content(&response).ok_or_else(|| PublishError::Backend {
            title: title.to_string(),
            message: "unexpected query response".to_string(),
        })
    }

    fn write_page(&mut self, title: &str, content: &str, summary: &str) -> Result<(), PublishError> {
        let token = self.csrf_token.as_deref().ok_or(PublishError::NotAuthenticated)?;

        let response: Value = self
            .agent
            .post(&self.api)
            .send_form(&[
                ("action", "edit"),
                ("format", "json"),
                ("bot", "1"),
                ("title", title),
                ("text", content),
                ("summary", summary),
                ("token", token),
            ])
            .map_err(|e| e.to_string())
            .and_then(|r| r.into_json().map_err(|e| e.to_string()))
            .map_err(backend(title))?;

        edit_outcome(title, &response)
    }
}
