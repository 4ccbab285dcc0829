//! Account commands

use crate::Context;
use anyhow::{Context as _, bail};
use fb_core::{Credentials, Registration, User};
use fb_editor::auth::{self, AuthError, MSG_LOGGED_IN, MSG_REGISTERED};
use fb_editor::Session;

fn explain(error: AuthError) -> anyhow::Error {
    match error {
        AuthError::Invalid(fields) => {
            for (field, message) in fields.iter() {
                eprintln!("{field}: {message}");
            }
            anyhow::anyhow!("please correct the fields above")
        }
        AuthError::Failed(message) => anyhow::anyhow!(message),
    }
}

pub async fn login(ctx: &Context, email: String, password: String) -> anyhow::Result<()> {
    let backend = ctx.backend()?;
    let mut session = Session::default();
    let user = auth::login(&backend, &mut session, &Credentials { email, password })
        .await
        .map_err(explain)?;

    let mut config = ctx.config.clone();
    config.token = session.token().map(str::to_string);
    let path = config
        .save(ctx.profile.as_deref())
        .context("saving token")?;
    log::debug!("token saved to {}", path.display());
    println!("{MSG_LOGGED_IN} Signed in as {} <{}>", user.name, user.email);
    Ok(())
}

pub async fn logout(ctx: &Context) -> anyhow::Result<()> {
    let backend = ctx.backend()?;
    let mut session = Session::default();
    if let Some(token) = &ctx.token {
        // The token may already be dead server-side; skip the user lookup.
        session.begin(token.clone(), User {
            id: None,
            name: String::new(),
            email: String::new(),
            extra: Default::default(),
        });
    }
    auth::logout(&backend, &mut session).await;

    let mut config = ctx.config.clone();
    if config.token.take().is_some() {
        config
            .save(ctx.profile.as_deref())
            .context("forgetting token")?;
    }
    println!("Logged out.");
    Ok(())
}

pub async fn register(
    ctx: &Context,
    name: String,
    email: String,
    password: String,
) -> anyhow::Result<()> {
    let backend = ctx.backend()?;
    auth::register(
        &backend,
        &Registration {
            name,
            email,
            password,
        },
    )
    .await
    .map_err(explain)?;
    println!("{MSG_REGISTERED}");
    Ok(())
}

pub async fn whoami(ctx: &Context) -> anyhow::Result<()> {
    let backend = ctx.backend()?;
    let session = ctx.session(&backend).await?;
    let Some(user) = session.user() else {
        bail!("not logged in");
    };
    ctx.format
        .print(std::slice::from_ref(user), |u| vec![u.name.clone(), u.email.clone()]);
    Ok(())
}
