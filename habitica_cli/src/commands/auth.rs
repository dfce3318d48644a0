use anyhow::Result;
use clap::Args;
use habitica_api::Habitica;
use serde::Serialize;

use crate::output::print_json;

#[derive(Args)]
pub struct RegisterArgs {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Args)]
pub struct LoginArgs {
    /// Username or email
    pub username: String,
    pub password: String,
}

/// Credentials printed after a successful register or login.
#[derive(Serialize)]
struct Credentials {
    user_id: String,
    api_key: String,
}

pub async fn register(api: &Habitica, args: &RegisterArgs) -> Result<()> {
    let resp = api
        .register(&args.username, &args.email, &args.password)
        .await?;
    print_json(&Credentials {
        user_id: resp.data.id,
        api_key: resp.data.api_token,
    });
    Ok(())
}

pub async fn login(api: &Habitica, args: &LoginArgs) -> Result<()> {
    let resp = api.local_login(&args.username, &args.password).await?;
    print_json(&Credentials {
        user_id: resp.data.id,
        api_key: resp.data.api_token,
    });
    Ok(())
}
