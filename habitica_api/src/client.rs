//! High-level Habitica client built on [`Connection`].

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::{
    connection::{ConfigUpdate, Connection, ConnectionConfig},
    options::RequestOptions,
    types::{Envelope, LoginCredentials, RegisteredUser},
    Error,
};

const REGISTER_ROUTE: &str = "/user/auth/local/register";
const LOGIN_ROUTE: &str = "/user/auth/local/login";
const LOGOUT_ROUTE: &str = "/logout";

/// Habitica API client.
///
/// Raw requests go through [`Habitica::get`] and friends. The account helpers
/// copy the credentials returned by the server back into the connection, so
/// later requests are authenticated.
#[derive(Debug)]
pub struct Habitica {
    connection: Connection,
}

impl Habitica {
    pub fn new(update: ConfigUpdate) -> Result<Self, Error> {
        let connection = Connection::new(update)?;
        if !connection.config().has_credentials() {
            tracing::warn!("Missing credentials; only content routes will be available");
        }
        Ok(Self { connection })
    }

    /// Wraps an existing connection.
    pub fn from_connection(connection: Connection) -> Self {
        Self { connection }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn configure(&self, update: ConfigUpdate) {
        self.connection.configure(update)
    }

    pub fn config(&self) -> ConnectionConfig {
        self.connection.config()
    }

    pub fn user_id(&self) -> Option<String> {
        self.connection.config().id
    }

    pub fn api_key(&self) -> Option<String> {
        self.connection.config().api_key
    }

    pub fn endpoint(&self) -> String {
        self.connection.config().endpoint
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        route: &str,
        options: Option<RequestOptions>,
    ) -> Result<T, Error> {
        self.connection.get(route, options).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        route: &str,
        options: Option<RequestOptions>,
    ) -> Result<T, Error> {
        self.connection.post(route, options).await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        route: &str,
        options: Option<RequestOptions>,
    ) -> Result<T, Error> {
        self.connection.put(route, options).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        route: &str,
        options: Option<RequestOptions>,
    ) -> Result<T, Error> {
        self.connection.delete(route, options).await
    }

    /// Registers a new local account and switches the client to it.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Envelope<RegisteredUser>, Error> {
        let body = json!({
            "username": username,
            "email": email,
            "password": password,
            "confirmPassword": password,
        });
        let resp: Envelope<RegisteredUser> = self
            .connection
            .post(REGISTER_ROUTE, Some(RequestOptions::new().with_body(body)))
            .await?;

        tracing::info!("Registered user {}", resp.data.id);
        self.connection.configure(
            ConfigUpdate::new().credentials(resp.data.id.clone(), resp.data.api_token.clone()),
        );
        Ok(resp)
    }

    /// Logs in with a username or email and switches the client to that account.
    pub async fn local_login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Envelope<LoginCredentials>, Error> {
        let body = json!({
            "username": username,
            "password": password,
        });
        let resp: Envelope<LoginCredentials> = self
            .connection
            .post(LOGIN_ROUTE, Some(RequestOptions::new().with_body(body)))
            .await?;

        tracing::info!("Logged in as user {}", resp.data.id);
        self.connection.configure(
            ConfigUpdate::new().credentials(resp.data.id.clone(), resp.data.api_token.clone()),
        );
        Ok(resp)
    }

    /// Ends the server session and forgets the stored credentials.
    pub async fn logout(&self) -> Result<Value, Error> {
        let resp = self.connection.get(LOGOUT_ROUTE, None).await?;
        self.connection
            .configure(ConfigUpdate::new().clear_id().clear_api_key());
        Ok(resp)
    }
}
