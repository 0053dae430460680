//! OAuth2 authorization-code flow for connecting accounts
//!
//! Covers building the consent URL, exchanging the callback code for
//! tokens, and refreshing expired access tokens. After an exchange the
//! provider's profile endpoint is queried so the resulting
//! [`TokenPayload`] carries the mailbox address, which the account
//! store needs for reconnect dedup.
//!
//! Uses synchronous HTTP (ureq) to stay executor-agnostic.

use anyhow::Context;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::Provider;

/// Credentials filename in the unimail config directory
const CREDENTIALS_FILE: &str = "oauth-credentials.json";

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
const GRAPH_ME_URL: &str = "https://graph.microsoft.com/v1.0/me";

/// Scopes requested when connecting a Gmail account
pub const GMAIL_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/gmail.readonly",
    "https://www.googleapis.com/auth/gmail.modify",
    "https://www.googleapis.com/auth/gmail.send",
    "https://www.googleapis.com/auth/gmail.labels",
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/userinfo.profile",
];

/// Scopes requested when connecting an Outlook account
pub const OUTLOOK_SCOPES: &[&str] = &[
    "https://graph.microsoft.com/Mail.ReadWrite",
    "https://graph.microsoft.com/Mail.Send",
    "https://graph.microsoft.com/User.Read",
    "offline_access",
];

/// OAuth client credentials for one provider
#[derive(Debug, Clone, Deserialize)]
pub struct OauthCredentials {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    /// Entra tenant; only consulted for Outlook
    #[serde(default = "default_tenant")]
    pub tenant_id: String,
}

fn default_redirect_uri() -> String {
    "http://localhost:8080/callback".to_string()
}

fn default_tenant() -> String {
    "common".to_string()
}

/// Credentials file layout: one optional section per provider
#[derive(Deserialize)]
struct CredentialsFile {
    gmail: Option<OauthCredentials>,
    outlook: Option<OauthCredentials>,
}

impl OauthCredentials {
    /// Load credentials for a provider, preferring the config file
    /// (~/.config/unimail/oauth-credentials.json) over environment
    /// variables.
    pub fn load(provider: Provider) -> Result<Self> {
        if config::config_exists(CREDENTIALS_FILE) {
            let file: CredentialsFile =
                config::load_json(CREDENTIALS_FILE).map_err(Error::Config)?;
            let section = match provider {
                Provider::Gmail => file.gmail,
                Provider::Outlook => file.outlook,
            };
            if let Some(creds) = section {
                return Ok(creds);
            }
        }
        Self::from_env(provider)
    }

    /// Load credentials from environment variables
    /// (GMAIL_CLIENT_ID/GMAIL_CLIENT_SECRET or OUTLOOK_*)
    pub fn from_env(provider: Provider) -> Result<Self> {
        let prefix = match provider {
            Provider::Gmail => "GMAIL",
            Provider::Outlook => "OUTLOOK",
        };
        let var = |suffix: &str| -> anyhow::Result<String> {
            let name = format!("{prefix}_{suffix}");
            std::env::var(&name).with_context(|| format!("{name} environment variable not set"))
        };

        Ok(Self {
            client_id: var("CLIENT_ID").map_err(Error::Config)?,
            client_secret: var("CLIENT_SECRET").map_err(Error::Config)?,
            redirect_uri: var("REDIRECT_URI").unwrap_or_else(|_| default_redirect_uri()),
            tenant_id: var("TENANT_ID").unwrap_or_else(|_| default_tenant()),
        })
    }

    fn token_url(&self, provider: Provider) -> String {
        match provider {
            Provider::Gmail => GOOGLE_TOKEN_URL.to_string(),
            Provider::Outlook => format!(
                "https://login.microsoftonline.com/{}/oauth2/v2.0/token",
                self.tenant_id
            ),
        }
    }

    fn auth_url(&self, provider: Provider) -> String {
        match provider {
            Provider::Gmail => GOOGLE_AUTH_URL.to_string(),
            Provider::Outlook => format!(
                "https://login.microsoftonline.com/{}/oauth2/v2.0/authorize",
                self.tenant_id
            ),
        }
    }
}

/// Tokens plus the profile of the mailbox they grant access to
#[derive(Debug, Clone)]
pub struct TokenPayload {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Access token lifetime in seconds
    pub expires_in: Option<i64>,
    pub email: String,
    pub name: Option<String>,
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
}

#[derive(Deserialize)]
struct GoogleUserinfo {
    email: Option<String>,
    name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphProfile {
    mail: Option<String>,
    user_principal_name: Option<String>,
    display_name: Option<String>,
}

/// Build the consent URL the user should be sent to
pub fn authorization_url(provider: Provider, creds: &OauthCredentials, state: &str) -> String {
    let scopes = match provider {
        Provider::Gmail => GMAIL_SCOPES.join(" "),
        Provider::Outlook => OUTLOOK_SCOPES.join(" "),
    };
    let mut url = format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
        creds.auth_url(provider),
        urlencoding::encode(&creds.client_id),
        urlencoding::encode(&creds.redirect_uri),
        urlencoding::encode(&scopes),
        urlencoding::encode(state),
    );
    // Google only hands out a refresh token when offline access is
    // requested and consent is re-prompted
    if provider == Provider::Gmail {
        url.push_str("&access_type=offline&prompt=consent");
    }
    url
}

/// Exchange an authorization code for tokens, then resolve the mailbox
/// profile so the caller can upsert the account.
pub fn exchange_code(
    provider: Provider,
    creds: &OauthCredentials,
    code: &str,
) -> Result<TokenPayload> {
    let mut response = ureq::post(&creds.token_url(provider)).send_form([
        ("client_id", creds.client_id.as_str()),
        ("client_secret", creds.client_secret.as_str()),
        ("code", code),
        ("grant_type", "authorization_code"),
        ("redirect_uri", creds.redirect_uri.as_str()),
    ])?;
    let token: TokenResponse = response.body_mut().read_json()?;

    let (email, name) = fetch_profile(provider, &token.access_token)?;

    Ok(TokenPayload {
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        expires_in: token.expires_in,
        email,
        name,
    })
}

/// Refresh an expired access token.
///
/// Providers may omit the refresh token in the response; the one passed
/// in is carried forward so callers can always persist the result.
pub fn refresh_access_token(
    provider: Provider,
    creds: &OauthCredentials,
    refresh_token: &str,
) -> Result<TokenResponse> {
    let mut response = ureq::post(&creds.token_url(provider)).send_form([
        ("client_id", creds.client_id.as_str()),
        ("client_secret", creds.client_secret.as_str()),
        ("refresh_token", refresh_token),
        ("grant_type", "refresh_token"),
    ])?;
    let mut token: TokenResponse = response.body_mut().read_json()?;

    if token.refresh_token.is_none() {
        token.refresh_token = Some(refresh_token.to_string());
    }
    Ok(token)
}

fn fetch_profile(provider: Provider, access_token: &str) -> Result<(String, Option<String>)> {
    let bearer = format!("Bearer {access_token}");
    match provider {
        Provider::Gmail => {
            let mut response = ureq::get(GOOGLE_USERINFO_URL)
                .header("Authorization", &bearer)
                .call()?;
            let info: GoogleUserinfo = response.body_mut().read_json()?;
            let email = info
                .email
                .ok_or_else(|| Error::Validation("userinfo response had no email".to_string()))?;
            Ok((email, info.name))
        }
        Provider::Outlook => {
            let mut response = ureq::get(GRAPH_ME_URL)
                .header("Authorization", &bearer)
                .call()?;
            let profile: GraphProfile = response.body_mut().read_json()?;
            // Personal accounts may leave `mail` empty
            let email = profile
                .mail
                .or(profile.user_principal_name)
                .ok_or_else(|| Error::Validation("profile had no mailbox address".to_string()))?;
            Ok((email, profile.display_name))
        }
    }
}
