//! CLI commands

pub mod auth;
pub mod forms;
pub mod local;

use crate::Context;
use anyhow::{Context as _, anyhow, bail};
use fb_client::RestBackend;
use fb_core::{FormBackend, FormId};
use fb_editor::{Level, Notifications, Session};

impl Context {
    pub fn backend(&self) -> anyhow::Result<RestBackend> {
        RestBackend::new(&self.config).context("building HTTP client")
    }

    /// A session for the configured token, checked against the backend.
    pub async fn session(&self, backend: &RestBackend) -> anyhow::Result<Session> {
        let Some(token) = self.token.clone() else {
            bail!("not logged in; run `fb login` or set FB_TOKEN");
        };
        let user = backend
            .current_user(&token)
            .await
            .context("token was rejected; run `fb login` again")?;
        let mut session = Session::default();
        session.begin(token, user);
        Ok(session)
    }
}

pub fn parse_form_id(raw: &str) -> anyhow::Result<FormId> {
    raw.parse()
        .with_context(|| format!("`{raw}` is not a form id"))
}

/// Print pending notifications; fail with the last error if `ok` is false.
pub fn report(notifications: &mut Notifications, ok: bool) -> anyhow::Result<()> {
    let mut failure = None;
    for n in notifications.drain() {
        match n.level {
            Level::Success => println!("{}", n.message),
            Level::Warning | Level::Error => {
                eprintln!("{}: {}", n.title, n.message);
                failure = Some(n.message);
            }
        }
    }
    if ok {
        Ok(())
    } else {
        Err(anyhow!(failure.unwrap_or_else(|| "operation failed".into())))
    }
}
