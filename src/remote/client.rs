use chrono::Utc;
use color_eyre::{eyre::eyre, Result};
use reqwest::StatusCode;
use url::Url;

use super::types::RemoteDocument;
use crate::model::Collection;

/// Document store client, one document per account under `users/{id}`.
#[derive(Clone)]
pub struct RemoteClient {
  http: reqwest::Client,
  base_url: Url,
  token: String,
}

impl RemoteClient {
  pub fn new(base_url: &str, token: String) -> Result<Self> {
    let base_url = Url::parse(base_url).map_err(|e| eyre!("Invalid sync URL {}: {}", base_url, e))?;

    let http = reqwest::Client::builder()
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base_url,
      token,
    })
  }

  fn document_url(&self, account_id: &str) -> Result<Url> {
    self
      .base_url
      .join(&format!("users/{}", account_id))
      .map_err(|e| eyre!("Invalid account id {}: {}", account_id, e))
  }

  /// Fetch the account's document.
  ///
  /// `Ok(None)` means no document exists yet for this account, which is not
  /// an error; network and auth failures are.
  pub async fn load_user_data(&self, account_id: &str) -> Result<Option<RemoteDocument>> {
    let response = self
      .http
      .get(self.document_url(account_id)?)
      .bearer_auth(&self.token)
      .send()
      .await
      .map_err(|e| eyre!("Failed to reach sync server: {}", e))?;

    if response.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    if !response.status().is_success() {
      return Err(eyre!("Sync server returned {}", response.status()));
    }

    let document = response
      .json::<RemoteDocument>()
      .await
      .map_err(|e| eyre!("Failed to parse remote document: {}", e))?;

    Ok(Some(document))
  }

  /// Upsert the account's document, fully replacing `groups` and stamping
  /// `lastUpdated` with the current time. Merge semantics preserve any
  /// fields this write does not carry.
  pub async fn save_user_data(
    &self,
    account_id: &str,
    email: Option<&str>,
    groups: &Collection,
  ) -> Result<()> {
    let document = RemoteDocument {
      groups: groups.clone(),
      last_updated: Utc::now().to_rfc3339(),
      user_id: account_id.to_string(),
      email: email.map(String::from),
    };

    let response = self
      .http
      .patch(self.document_url(account_id)?)
      .bearer_auth(&self.token)
      .json(&document)
      .send()
      .await
      .map_err(|e| eyre!("Failed to reach sync server: {}", e))?;

    if !response.status().is_success() {
      return Err(eyre!("Sync server returned {}", response.status()));
    }

    Ok(())
  }
}
