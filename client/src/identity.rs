//! Login gate in front of the board.
//!
//! The provider is built once by the shell and passed around explicitly.
//! When the page carries Keycloak settings on `<body>` the page's Keycloak
//! JS adapter performs a login-required init; otherwise the board opens as
//! a guest.

use js_sys::{Array, Function, Object, Promise, Reflect};
use thiserror::Error;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::Document;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Keycloak adapter is not loaded on this page")]
    MissingAdapter,
    #[error("identity provider call failed: {0}")]
    Js(String),
    #[error("login was not completed")]
    NotAuthenticated,
}

impl From<JsValue> for IdentityError {
    fn from(value: JsValue) -> Self {
        IdentityError::Js(format!("{value:?}"))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthConfig {
    pub url: String,
    pub realm: String,
    pub client_id: String,
}

impl AuthConfig {
    pub fn from_parts(
        url: Option<String>,
        realm: Option<String>,
        client_id: Option<String>,
    ) -> Option<Self> {
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        Some(Self {
            url: non_empty(url)?,
            realm: non_empty(realm)?,
            client_id: non_empty(client_id)?,
        })
    }

    pub fn from_document(document: &Document) -> Option<Self> {
        let body = document.body()?;
        Self::from_parts(
            body.get_attribute("data-auth-url"),
            body.get_attribute("data-auth-realm"),
            body.get_attribute("data-auth-client"),
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Identity {
    /// Display name; empty lets the relay assign a guest name.
    pub name: String,
}

pub struct KeycloakClient {
    adapter: JsValue,
}

fn set(target: &Object, key: &str, value: &JsValue) -> Result<(), IdentityError> {
    Reflect::set(target, &JsValue::from_str(key), value)?;
    Ok(())
}

fn call_method(target: &JsValue, name: &str, args: &Array) -> Result<JsValue, IdentityError> {
    let method: Function = Reflect::get(target, &JsValue::from_str(name))?
        .dyn_into()
        .map_err(|_| IdentityError::Js(format!("{name} is not a function")))?;
    Ok(method.apply(target, args)?)
}

impl KeycloakClient {
    pub fn new(config: &AuthConfig) -> Result<Self, IdentityError> {
        let constructor: Function = Reflect::get(&js_sys::global(), &JsValue::from_str("Keycloak"))?
            .dyn_into()
            .map_err(|_| IdentityError::MissingAdapter)?;
        let options = Object::new();
        set(&options, "url", &JsValue::from_str(&config.url))?;
        set(&options, "realm", &JsValue::from_str(&config.realm))?;
        set(&options, "clientId", &JsValue::from_str(&config.client_id))?;
        let adapter = Reflect::construct(&constructor, &Array::of1(&options))?;
        Ok(Self { adapter })
    }

    pub async fn init(&self) -> Result<Identity, IdentityError> {
        let options = Object::new();
        set(&options, "onLoad", &JsValue::from_str("login-required"))?;
        set(&options, "checkLoginIframe", &JsValue::FALSE)?;
        let promise: Promise = call_method(&self.adapter, "init", &Array::of1(&options))?
            .dyn_into()
            .map_err(|_| IdentityError::Js("init did not return a promise".into()))?;
        let authenticated = JsFuture::from(promise).await?.as_bool().unwrap_or(false);
        if !authenticated {
            return Err(IdentityError::NotAuthenticated);
        }
        Ok(Identity {
            name: self.username().unwrap_or_default(),
        })
    }

    fn username(&self) -> Option<String> {
        let token = Reflect::get(&self.adapter, &JsValue::from_str("tokenParsed")).ok()?;
        ["preferred_username", "name", "email"]
            .iter()
            .find_map(|key| Reflect::get(&token, &JsValue::from_str(key)).ok()?.as_string())
    }

    pub fn logout(&self) {
        if let Err(err) = call_method(&self.adapter, "logout", &Array::new()) {
            log::error!("Logout failed: {err}");
        }
    }
}

pub enum IdentityProvider {
    Keycloak(KeycloakClient),
    Guest,
}

impl IdentityProvider {
    pub fn from_document(document: &Document) -> Result<Self, IdentityError> {
        match AuthConfig::from_document(document) {
            Some(config) => {
                log::info!("Using Keycloak realm {} at {}", config.realm, config.url);
                Ok(IdentityProvider::Keycloak(KeycloakClient::new(&config)?))
            }
            None => Ok(IdentityProvider::Guest),
        }
    }

    pub fn requires_login(&self) -> bool {
        matches!(self, IdentityProvider::Keycloak(_))
    }

    pub async fn init(&self) -> Result<Identity, IdentityError> {
        match self {
            IdentityProvider::Keycloak(client) => client.init().await,
            IdentityProvider::Guest => Ok(Identity::default()),
        }
    }

    pub fn logout(&self) {
        match self {
            IdentityProvider::Keycloak(client) => client.logout(),
            IdentityProvider::Guest => log::info!("Guest session has nothing to log out of"),
        }
    }
}
