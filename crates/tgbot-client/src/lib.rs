//! Telegram Bot API client.
//!
//! Every operation goes through one primitive, [`TelegramBot::call_raw`]:
//! serialize the parameters, POST them to `<api>/bot<token>/<method>`, decode
//! the response envelope. Typed operations are [`Method`]s on top of it.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{value::RawValue, Value};
use tracing::{debug, warn};

pub mod methods;
pub mod transport;

pub use methods::{AnswerCallbackQuery, GetMe, GetUpdates, Method, SendMessage};
pub use transport::{HttpTransport, RawResponse, Transport};

use tgbot_core::{
    config::Config,
    envelope::Envelope,
    errors::Error,
    types::{Message, Update, User},
    Result,
};

/// Bot API connection. Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct TelegramBot {
    cfg: Arc<Config>,
    transport: Arc<dyn Transport>,
}

impl TelegramBot {
    /// Bot over a fresh reqwest transport honoring `cfg.request_timeout`.
    pub fn new(cfg: Config) -> Result<Self> {
        let transport = HttpTransport::new(cfg.request_timeout)?;
        Ok(Self::with_transport(cfg, Arc::new(transport)))
    }

    pub fn with_transport(cfg: Config, transport: Arc<dyn Transport>) -> Self {
        Self {
            cfg: Arc::new(cfg),
            transport,
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Call an API method by name and return the raw `result` payload.
    ///
    /// Exactly one request is sent. Errors, in the order they can happen:
    /// [`Error::Request`], [`Error::Transport`], [`Error::MalformedResponse`],
    /// [`Error::Api`].
    pub async fn call_raw<P>(&self, method: &str, params: &P) -> Result<Box<RawValue>>
    where
        P: Serialize + ?Sized,
    {
        let url = self.cfg.method_url(method)?;
        let body = serde_json::to_vec(params)
            .map_err(|e| Error::Request(format!("failed to encode {method} params: {e}")))?;
        debug!(method, bytes = body.len(), "bot api call");

        let resp = self.transport.post_json(url, body).await?;

        let result = Envelope::decode(&resp.body, resp.status)?.into_result();
        if let Err(Error::Api {
            code, description, ..
        }) = &result
        {
            warn!(method, code, %description, "bot api returned an error");
        }
        result
    }

    /// Call a typed method and decode its result.
    pub async fn call<M>(&self, method: &M) -> Result<M::Response>
    where
        M: Method + ?Sized,
    {
        let raw = self.call_raw(M::NAME, method).await?;
        Ok(serde_json::from_str(raw.get())?)
    }

    /// Identity of the bot owning the token.
    pub async fn get_me(&self) -> Result<User> {
        self.call(&GetMe).await
    }

    /// Send `message` and fill it in place with the message the API echoes back.
    ///
    /// Fields present in the echo (`message_id`, `date`, `chat`, ...) overwrite
    /// the caller's values; fields the echo leaves out are kept. On error the
    /// message is left untouched.
    pub async fn send_message(&self, message: &mut Message) -> Result<()> {
        let echo = self.call(&SendMessage(message)).await?;
        overlay(message, echo)
    }

    pub async fn answer_callback_query(
        &self,
        callback_query_id: &str,
        text: Option<&str>,
    ) -> Result<()> {
        self.call(&AnswerCallbackQuery {
            callback_query_id,
            text,
        })
        .await?;
        Ok(())
    }

    /// Fetch pending updates with a single `getUpdates` request.
    pub async fn get_updates(&self, params: &GetUpdates) -> Result<Vec<Update>> {
        let updates = self.call(params).await?;
        debug!(n = updates.len(), "received updates");
        Ok(updates)
    }
}

fn overlay(message: &mut Message, echo: Value) -> Result<()> {
    let echo = match echo {
        Value::Object(fields) => fields,
        other => {
            return Err(Error::MalformedResponse(format!(
                "sendMessage result is not an object: {other}"
            )))
        }
    };
    let mut merged = serde_json::to_value(&*message)?;
    if let Value::Object(fields) = &mut merged {
        fields.extend(echo);
    }
    *message = serde_json::from_value(merged)?;
    Ok(())
}
