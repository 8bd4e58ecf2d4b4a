use serde::Deserialize;
use serde_json::value::RawValue;

use crate::{errors::Error, Result};

/// Response envelope returned by every Bot API method.
///
/// See <https://core.telegram.org/bots/api#making-requests>.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub ok: bool,
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Option<ResponseParameters>,
    #[serde(default)]
    pub result: Option<Box<RawValue>>,
}

/// Extra details the API attaches to some errors.
///
/// See <https://core.telegram.org/bots/api#responseparameters>.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ResponseParameters {
    #[serde(default)]
    pub migrate_to_chat_id: Option<i64>,
    #[serde(default)]
    pub retry_after: Option<u32>,
}

impl Envelope {
    /// Decode a response body. `status` is only used for the error message.
    pub fn decode(body: &[u8], status: u16) -> Result<Self> {
        serde_json::from_slice(body).map_err(|e| {
            let preview = String::from_utf8_lossy(body)
                .chars()
                .take(200)
                .collect::<String>();
            Error::MalformedResponse(format!("http {status}: {e}: {preview}"))
        })
    }

    /// The raw result on `ok: true`, the API error otherwise.
    ///
    /// A successful envelope without a `result` yields JSON `null`.
    pub fn into_result(self) -> Result<Box<RawValue>> {
        if !self.ok {
            return Err(Error::Api {
                code: self.error_code.unwrap_or_default(),
                description: self.description.unwrap_or_default(),
                retry_after: self.parameters.and_then(|p| p.retry_after),
            });
        }
        match self.result {
            Some(raw) => Ok(raw),
            None => Ok(RawValue::from_string("null".to_string())?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_envelope_yields_raw_result() {
        let env = Envelope::decode(br#"{"ok": true, "result": {"id": 1}}"#, 200).unwrap();
        let raw = env.into_result().unwrap();
        assert_eq!(raw.get(), r#"{"id": 1}"#);
    }

    #[test]
    fn ok_without_result_is_null() {
        let raw = Envelope::decode(br#"{"ok": true}"#, 200)
            .unwrap()
            .into_result()
            .unwrap();
        assert_eq!(raw.get(), "null");
    }

    #[test]
    fn error_envelope_maps_to_api_error() {
        let body = br#"{"ok": false, "error_code": 429, "description": "Too Many Requests: retry after 5", "parameters": {"retry_after": 5}}"#;
        let err = Envelope::decode(body, 429).unwrap().into_result().unwrap_err();
        match err {
            Error::Api {
                code,
                ref description,
                retry_after,
            } => {
                assert_eq!(code, 429);
                assert!(description.starts_with("Too Many Requests"));
                assert_eq!(retry_after, Some(5));
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn garbage_body_is_malformed() {
        let err = Envelope::decode(b"<html>Bad Gateway</html>", 502).unwrap_err();
        match err {
            Error::MalformedResponse(msg) => {
                assert!(msg.contains("502"));
                assert!(msg.contains("Bad Gateway"));
            }
            other => panic!("expected malformed response, got {other:?}"),
        }
    }

    #[test]
    fn missing_ok_flag_is_malformed() {
        assert!(matches!(
            Envelope::decode(br#"{"result": 1}"#, 200),
            Err(Error::MalformedResponse(_))
        ));
    }
}
