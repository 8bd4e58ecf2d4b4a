use serde::{de::DeserializeOwned, Serialize, Serializer};

use tgbot_core::types::{AllowedUpdate, Message, Update, User};

/// A Bot API method: its name, its parameters (`Self`) and its result type.
pub trait Method: Serialize {
    const NAME: &'static str;

    type Response: DeserializeOwned;
}

/// A simple method for testing your bot's authentication token.
///
/// Takes no parameters; the body is JSON `null`.
///
/// See also: <https://core.telegram.org/bots/api#getme>.
#[derive(Clone, Copy, Debug, Default)]
#[must_use]
pub struct GetMe;

impl Serialize for GetMe {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_none()
    }
}

impl Method for GetMe {
    const NAME: &'static str = "getMe";

    type Response = User;
}

/// [Send a text message][1].
///
/// [1]: https://core.telegram.org/bots/api#sendmessage
#[derive(Debug, Serialize)]
#[serde(transparent)]
#[must_use]
pub struct SendMessage<'a>(pub &'a Message);

impl Method for SendMessage<'_> {
    const NAME: &'static str = "sendMessage";

    // Decoded as a JSON value so it can be overlaid onto the sent message.
    type Response = serde_json::Value;
}

/// [Answer a callback query][1] sent from an inline keyboard.
///
/// [1]: https://core.telegram.org/bots/api#answercallbackquery
#[derive(Debug, Serialize)]
#[must_use]
pub struct AnswerCallbackQuery<'a> {
    pub callback_query_id: &'a str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<&'a str>,
}

impl Method for AnswerCallbackQuery<'_> {
    const NAME: &'static str = "answerCallbackQuery";

    // `true` on success; nothing worth decoding.
    type Response = serde::de::IgnoredAny;
}

/// Receive incoming updates. One request; the caller owns any polling loop.
///
/// See <https://core.telegram.org/bots/api#getupdates>.
#[derive(Clone, Debug, Default, Serialize)]
#[must_use]
pub struct GetUpdates {
    /// Identifier of the first update to be returned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,

    /// Values between 1-100 are accepted. Defaults to 100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    /// Long polling timeout in seconds. Defaults to 0, i.e. short polling.
    #[serde(rename = "timeout", skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_updates: Option<Vec<AllowedUpdate>>,
}

impl Method for GetUpdates {
    const NAME: &'static str = "getUpdates";

    type Response = Vec<Update>;
}
