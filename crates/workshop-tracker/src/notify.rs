//! Email trigger for the serverless send-email function
//!
//! We only ask the function to send; delivery is its concern.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::FunctionsConfig;
use crate::constants;
use crate::profiles::Profile;

/// Request body accepted by the send-email function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailRequest {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub link: String,
}

/// Sign-in link for invited users
pub fn invite_link(frontend_origin: &str) -> String {
    format!("{}/login", frontend_origin.trim().trim_end_matches('/'))
}

/// Build the invitation email for a profile
pub fn invite_email(profile: &Profile, frontend_origin: &str) -> EmailRequest {
    let name = if profile.full_name.trim().is_empty() {
        profile.username.trim()
    } else {
        profile.full_name.trim()
    };

    EmailRequest {
        to: profile.email.trim().to_string(),
        subject: "You're invited to Workshop Tracker".to_string(),
        text: format!(
            "Hi {name},\n\nAn account has been created for you as '{}' with the {} role. \
             Use the link below to sign in.",
            profile.username, profile.role
        ),
        link: invite_link(frontend_origin),
    }
}

/// POST the email to `{base_url}/send-email`; non-2xx responses are errors
pub async fn send_email(config: &FunctionsConfig, email: &EmailRequest) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(config.timeout)
        .build()
        .context("Failed to build HTTP client")?;
    let url = format!("{}{}", config.base_url, constants::SEND_EMAIL_PATH);

    let response = client
        .post(&url)
        .header("Authorization", format!("Bearer {}", config.api_key))
        .json(email)
        .send()
        .await
        .context("Failed to reach send-email function")?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        anyhow::bail!("send-email function error {}: {}", status, text);
    }

    info!(to = %email.to, "email sent");
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::profiles::Role;
    use axum::Json;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn profile() -> Profile {
        Profile {
            id: "p1".to_string(),
            full_name: "Ada Potter".to_string(),
            username: "ada".to_string(),
            role: Role::Admin,
            email: " ada@example.com ".to_string(),
            phone_number: None,
            avatar_url: None,
        }
    }

    pub(crate) type Captured = Arc<Mutex<Vec<(Option<String>, EmailRequest)>>>;

    /// Local stand-in for the functions endpoint
    pub(crate) async fn spawn_function(status: StatusCode) -> (String, Captured) {
        let captured: Captured = Arc::default();
        let sink = captured.clone();
        let app = axum::Router::new().route(
            constants::SEND_EMAIL_PATH,
            post(move |headers: HeaderMap, Json(body): Json<EmailRequest>| {
                let sink = sink.clone();
                async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    sink.lock().unwrap().push((auth, body));
                    status
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), captured)
    }

    pub(crate) fn functions(base_url: String) -> FunctionsConfig {
        FunctionsConfig {
            base_url,
            api_key: "secret".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_invite_link() {
        assert_eq!(invite_link("https://app.example.com/"), "https://app.example.com/login");
        assert_eq!(invite_link("http://localhost:5173"), "http://localhost:5173/login");
    }

    #[test]
    fn test_invite_email() {
        let email = invite_email(&profile(), "https://app.example.com");
        assert_eq!(email.to, "ada@example.com");
        assert!(email.text.starts_with("Hi Ada Potter,"));
        assert!(email.text.contains("admin role"));
        assert_eq!(email.link, "https://app.example.com/login");
    }

    #[tokio::test]
    async fn test_send_email_posts_with_bearer_key() {
        let (base_url, captured) = spawn_function(StatusCode::OK).await;
        let email = invite_email(&profile(), "https://app.example.com");

        send_email(&functions(base_url), &email).await.unwrap();

        let calls = captured.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0.as_deref(), Some("Bearer secret"));
        assert_eq!(calls[0].1, email);
    }

    #[tokio::test]
    async fn test_send_email_rejected() {
        let (base_url, _) = spawn_function(StatusCode::INTERNAL_SERVER_ERROR).await;
        let email = invite_email(&profile(), "https://app.example.com");

        let err = send_email(&functions(base_url), &email).await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }
}
