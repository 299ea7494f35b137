use std::fmt;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::ZOHO_MAIL_API_BASE_URL;
use crate::error::{AppError, AppResult};
use crate::http;
use crate::mail::content::{normalize_line_endings, reply_subject};

use super::folders;
use super::messages;
use super::models::{MailFormat, MessageDetails, OutgoingMessage, ReplyDraftStrategy, ReplyOptions};

pub const DEFAULT_LIST_LIMIT: u32 = 10;

const AUTH_SCHEME: &str = "Zoho-oauthtoken";
const JSON_MEDIA_TYPE: &str = "application/json";
const FALLBACK_TIME_ZONE: &str = "UTC";
// Zoho's preset "send after two hours" schedule.
const REPLY_SCHEDULE_TYPE: u8 = 2;

/// An authenticated Zoho Mail client scoped to one account.
///
/// Cheap to clone. Nothing inside changes after construction; the `with_*`
/// methods consume the client and return a reconfigured one.
#[derive(Clone)]
pub struct MailClient {
    http: Client,
    base_url: String,
    access_token: String,
    account_id: String,
    allow_send_mail: bool,
    reply_drafts: ReplyDraftStrategy,
    time_zone: String,
}

impl MailClient {
    pub fn new(access_token: impl Into<String>, account_id: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            http: http::build_client()?,
            base_url: ZOHO_MAIL_API_BASE_URL.to_string(),
            access_token: access_token.into(),
            account_id: account_id.into(),
            allow_send_mail: true,
            reply_drafts: ReplyDraftStrategy::default(),
            time_zone: local_time_zone(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// When disabled, anything that would deliver mail is refused locally.
    /// Saving drafts stays allowed.
    pub fn with_send_permission(mut self, allow_send_mail: bool) -> Self {
        self.allow_send_mail = allow_send_mail;
        self
    }

    pub fn with_reply_draft_strategy(mut self, strategy: ReplyDraftStrategy) -> Self {
        self.reply_drafts = strategy;
        self
    }

    pub fn with_time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = time_zone.into();
        self
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn allow_send_mail(&self) -> bool {
        self.allow_send_mail
    }

    pub fn reply_draft_strategy(&self) -> ReplyDraftStrategy {
        self.reply_drafts
    }

    pub fn time_zone(&self) -> &str {
        &self.time_zone
    }

    /// Lists message summaries, newest first, from `folder_id` or the
    /// account's default folder.
    #[instrument(skip(self), level = "info")]
    pub async fn list_messages(&self, folder_id: Option<&str>, limit: u32) -> AppResult<Value> {
        let endpoint = messages::list_endpoint(&self.account_id);
        let query = messages::list_query(folder_id, limit);
        self.get_json(&endpoint, Some(&query)).await
    }

    #[instrument(skip(self), level = "info")]
    pub async fn list_folders(&self) -> AppResult<Value> {
        let endpoint = folders::list_folders_endpoint(&self.account_id);
        self.get_json(&endpoint, None).await
    }

    #[instrument(skip(self), level = "info")]
    pub async fn get_message_content(&self, folder_id: &str, message_id: &str) -> AppResult<Value> {
        let endpoint = messages::content_endpoint(&self.account_id, folder_id, message_id);
        self.get_json(&endpoint, None).await
    }

    #[instrument(skip(self), level = "info")]
    pub async fn get_message_meta_data(
        &self,
        folder_id: &str,
        message_id: &str,
    ) -> AppResult<Value> {
        let endpoint = messages::details_endpoint(&self.account_id, folder_id, message_id);
        self.get_json(&endpoint, None).await
    }

    /// Sends, drafts, or replies. See [`ReplyDraftStrategy`] for what a reply
    /// draft turns into.
    #[instrument(
        skip_all,
        level = "info",
        fields(
            reply_to = message.reply_to_message_id.as_deref(),
            draft = message.is_draft,
            format = %message.mail_format,
        )
    )]
    pub async fn send_email(&self, message: &OutgoingMessage) -> AppResult<Value> {
        let plan = self.plan_send(message);
        if plan.delivers && !self.allow_send_mail {
            warn!("refusing to deliver mail: sending is disabled for this client");
            return Err(AppError::SendDisabled);
        }

        debug!(endpoint = ?plan.endpoint, delivers = plan.delivers, "submitting message");
        self.post_json(&plan.endpoint, &plan.payload).await
    }

    /// Replies to the sender of `message_id`, deriving recipient and subject
    /// from the original message.
    #[instrument(skip(self, content, options), level = "info")]
    pub async fn send_reply(
        &self,
        folder_id: &str,
        message_id: &str,
        content: &str,
        options: &ReplyOptions,
    ) -> AppResult<Value> {
        let metadata = self.get_message_meta_data(folder_id, message_id).await?;
        let details = message_details(&metadata)?;

        let message = OutgoingMessage {
            to: details.from_address,
            content: content.to_string(),
            subject: Some(reply_subject(details.subject.as_deref().unwrap_or_default())),
            from: options.from.clone(),
            mail_format: options.mail_format,
            is_draft: options.is_draft,
            reply_to_message_id: Some(message_id.to_string()),
        };

        self.send_email(&message).await
    }

    fn plan_send(&self, message: &OutgoingMessage) -> SendPlan {
        let content = match message.mail_format {
            MailFormat::PlainText => normalize_line_endings(&message.content),
            MailFormat::Html => message.content.clone(),
        };

        let mut payload = SendMailPayload {
            to_address: message.to.clone(),
            content,
            mail_format: message.mail_format,
            from_address: non_empty(message.from.as_deref()),
            subject: non_empty(message.subject.as_deref()),
            ..SendMailPayload::default()
        };

        let reply_to = message
            .reply_to_message_id
            .as_deref()
            .filter(|id| !id.trim().is_empty());

        let endpoint = match reply_to {
            None => {
                if message.is_draft {
                    payload.mode = Some("draft");
                }
                messages::collection_endpoint(&self.account_id)
            }
            Some(id) if !message.is_draft => {
                payload.action = Some("reply");
                messages::message_endpoint(&self.account_id, id)
            }
            Some(id) => match self.reply_drafts {
                ReplyDraftStrategy::GenericDraft => {
                    payload.mode = Some("draft");
                    messages::collection_endpoint(&self.account_id)
                }
                ReplyDraftStrategy::ScheduleSend => {
                    payload.action = Some("reply");
                    payload.is_schedule = Some(true);
                    payload.schedule_type = Some(REPLY_SCHEDULE_TYPE);
                    payload.time_zone = Some(self.time_zone.clone());
                    messages::message_endpoint(&self.account_id, id)
                }
            },
        };

        SendPlan {
            endpoint,
            delivers: payload.mode.is_none(),
            payload,
        }
    }

    async fn get_json(&self, endpoint: &[String], query: Option<&[(String, String)]>) -> AppResult<Value> {
        let url = self.endpoint_url(endpoint, query)?;
        debug!(%url, "GET");

        let response = self
            .http
            .get(url.clone())
            .header(AUTHORIZATION, self.auth_header())
            .header(ACCEPT, JSON_MEDIA_TYPE)
            .send()
            .await?;

        parse_json_response(&url, response).await
    }

    async fn post_json<B: Serialize>(&self, endpoint: &[String], body: &B) -> AppResult<Value> {
        let url = self.endpoint_url(endpoint, None)?;
        debug!(%url, "POST");

        let response = self
            .http
            .post(url.clone())
            .header(AUTHORIZATION, self.auth_header())
            .header(ACCEPT, JSON_MEDIA_TYPE)
            .json(body)
            .send()
            .await?;

        parse_json_response(&url, response).await
    }

    fn endpoint_url(
        &self,
        endpoint: &[String],
        query: Option<&[(String, String)]>,
    ) -> AppResult<Url> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|()| {
                AppError::Config(format!("api base url `{}` cannot take a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(endpoint);

        if let Some(query) = query {
            url.query_pairs_mut().extend_pairs(query);
        }

        Ok(url)
    }

    fn auth_header(&self) -> String {
        format!("{AUTH_SCHEME} {}", self.access_token)
    }
}

impl fmt::Debug for MailClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailClient")
            .field("base_url", &self.base_url)
            .field("access_token", &"<redacted>")
            .field("account_id", &self.account_id)
            .field("allow_send_mail", &self.allow_send_mail)
            .field("reply_drafts", &self.reply_drafts)
            .field("time_zone", &self.time_zone)
            .finish()
    }
}

#[derive(Debug)]
struct SendPlan {
    endpoint: Vec<String>,
    payload: SendMailPayload,
    delivers: bool,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMailPayload {
    to_address: String,
    content: String,
    mail_format: MailFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    from_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_schedule: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schedule_type: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_zone: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .filter(|value| !value.trim().is_empty())
        .map(ToOwned::to_owned)
}

fn message_details(metadata: &Value) -> AppResult<MessageDetails> {
    let data = metadata.get("data").cloned().unwrap_or(Value::Null);
    serde_json::from_value(data).map_err(|err| AppError::parse(&metadata.to_string(), err))
}

/// IANA name of the process's local time zone, used for scheduled replies.
pub fn local_time_zone() -> String {
    match iana_time_zone::get_timezone() {
        Ok(zone) if !zone.trim().is_empty() => zone,
        Ok(_) => FALLBACK_TIME_ZONE.to_string(),
        Err(err) => {
            warn!(error = %err, "unable to resolve local time zone, using {FALLBACK_TIME_ZONE}");
            FALLBACK_TIME_ZONE.to_string()
        }
    }
}

async fn parse_json_response(url: &Url, response: reqwest::Response) -> AppResult<Value> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        return serde_json::from_str(&body).map_err(|err| AppError::parse(&body, err));
    }

    Err(map_api_error(status, &body, url.as_str()))
}

fn map_api_error(status: StatusCode, body: &str, url: &str) -> AppError {
    let message = match serde_json::from_str::<Value>(body) {
        Ok(json) => {
            let code = json
                .pointer("/status/code")
                .and_then(render_code)
                .unwrap_or_else(|| status.as_u16().to_string());
            let description = json
                .pointer("/status/description")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error");
            format!("{code}: {description} (URL: {url})")
        }
        Err(_) => format!("{}: {body}", status.as_u16()),
    };

    AppError::Api {
        status: status.as_u16(),
        message,
    }
}

fn render_code(code: &Value) -> Option<String> {
    match code {
        Value::Null => None,
        Value::String(code) => Some(code.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn client() -> MailClient {
        MailClient::new("token-abc", "42")
            .expect("client")
            .with_time_zone("Asia/Kolkata")
    }

    fn payload_json(plan: &SendPlan) -> Value {
        serde_json::to_value(&plan.payload).expect("payload serializes")
    }

    #[test]
    fn plain_send_targets_collection_without_mode() {
        let plan = client().plan_send(&OutgoingMessage::new("a@x.com", "hi").subject("Hello"));
        let payload = payload_json(&plan);

        assert_eq!(plan.endpoint.join("/"), "accounts/42/messages");
        assert!(plan.delivers);
        assert_eq!(
            payload,
            json!({
                "toAddress": "a@x.com",
                "content": "hi",
                "mailFormat": "plaintext",
                "subject": "Hello",
            })
        );
    }

    #[test]
    fn draft_without_reply_sets_mode() {
        let plan = client().plan_send(&OutgoingMessage::new("a@x.com", "hi").draft(true));

        assert_eq!(plan.endpoint.join("/"), "accounts/42/messages");
        assert_eq!(payload_json(&plan)["mode"], "draft");
        assert!(!plan.delivers);
    }

    #[test]
    fn reply_targets_message_resource() {
        let plan = client().plan_send(&OutgoingMessage::new("a@x.com", "hi").in_reply_to("777"));
        let payload = payload_json(&plan);

        assert_eq!(plan.endpoint.join("/"), "accounts/42/messages/777");
        assert_eq!(payload["action"], "reply");
        assert!(payload.get("mode").is_none());
        assert!(payload.get("isSchedule").is_none());
    }

    #[test]
    fn reply_draft_is_scheduled_by_default() {
        let message = OutgoingMessage::new("a@x.com", "hi")
            .in_reply_to("777")
            .draft(true);
        let plan = client().plan_send(&message);
        let payload = payload_json(&plan);

        assert_eq!(plan.endpoint.join("/"), "accounts/42/messages/777");
        assert_eq!(payload["action"], "reply");
        assert_eq!(payload["isSchedule"], true);
        assert_eq!(payload["scheduleType"], 2);
        assert_eq!(payload["timeZone"], "Asia/Kolkata");
        assert!(payload.get("mode").is_none());
        assert!(plan.delivers);
    }

    #[test]
    fn reply_draft_can_be_saved_as_unlinked_draft() {
        let message = OutgoingMessage::new("a@x.com", "hi")
            .in_reply_to("777")
            .draft(true);
        let plan = client()
            .with_reply_draft_strategy(ReplyDraftStrategy::GenericDraft)
            .plan_send(&message);
        let payload = payload_json(&plan);

        assert_eq!(plan.endpoint.join("/"), "accounts/42/messages");
        assert_eq!(payload["mode"], "draft");
        assert!(payload.get("action").is_none());
        assert!(!plan.delivers);
    }

    #[test]
    fn plaintext_content_uses_crlf() {
        let plan = client().plan_send(&OutgoingMessage::new("a@x.com", "one\ntwo\r\nthree\n"));
        let payload = payload_json(&plan);
        let content = payload["content"].as_str().expect("content");

        assert_eq!(content, "one\r\ntwo\r\nthree\r\n");
        assert!(!content.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn html_content_passes_through() {
        let message = OutgoingMessage::new("a@x.com", "<p>a</p>\n<p>b</p>").format(MailFormat::Html);
        let payload = payload_json(&client().plan_send(&message));

        assert_eq!(payload["content"], "<p>a</p>\n<p>b</p>");
        assert_eq!(payload["mailFormat"], "html");
    }

    #[test]
    fn empty_optional_fields_are_omitted() {
        let message = OutgoingMessage::new("a@x.com", "hi").subject("").from_address(" ");
        let payload = payload_json(&client().plan_send(&message));

        assert!(payload.get("subject").is_none());
        assert!(payload.get("fromAddress").is_none());
    }

    #[test]
    fn maps_status_envelope_into_api_error() {
        let error = map_api_error(
            StatusCode::NOT_FOUND,
            r#"{"status":{"code":"NOT_FOUND","description":"no such folder"}}"#,
            "https://mail.zoho.com/api/accounts/42/folders",
        );

        match error {
            AppError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(
                    message,
                    "NOT_FOUND: no such folder (URL: https://mail.zoho.com/api/accounts/42/folders)"
                );
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn numeric_code_and_missing_description() {
        let error = map_api_error(StatusCode::BAD_REQUEST, r#"{"status":{"code":400}}"#, "u");
        assert_eq!(error.to_string(), "zoho api error 400: Unknown error (URL: u)");
    }

    #[test]
    fn non_json_error_body_is_kept_verbatim() {
        let error = map_api_error(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>", "u");
        assert_eq!(error.to_string(), "zoho api error 500: <html>oops</html>");
    }

    #[test]
    fn details_require_from_address() {
        let result = message_details(&json!({"data": {"subject": "hi"}}));
        assert!(matches!(result, Err(AppError::Parse { .. })));
    }

    #[test]
    fn details_ignore_fields_a_reply_does_not_need() {
        let details = message_details(&json!({
            "data": {
                "subject": "Budget",
                "fromAddress": "a@x.com",
                "messageId": 1710000000000_u64,
                "folderId": 9000000002014_u64,
                "toAddress": ["b@x.com"]
            }
        }))
        .expect("details should parse");

        assert_eq!(details.subject.as_deref(), Some("Budget"));
        assert_eq!(details.from_address, "a@x.com");
    }

    #[test]
    fn ids_are_encoded_as_single_path_segments() {
        let client = client().with_base_url("https://mail.zoho.com/api");
        let endpoint = messages::content_endpoint("42", "9?x=1#", "777");
        let url = client.endpoint_url(&endpoint, None).expect("url");

        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
        assert_eq!(
            url.path(),
            "/api/accounts/42/folders/9%3Fx=1%23/messages/777/content"
        );
    }

    #[test]
    fn base_url_trailing_slash_is_tolerated() {
        let client = client().with_base_url("https://mail.zoho.com/api/");
        let endpoint = folders::list_folders_endpoint("42");
        let url = client.endpoint_url(&endpoint, None).expect("url");

        assert_eq!(url.as_str(), "https://mail.zoho.com/api/accounts/42/folders");
    }

    #[test]
    fn debug_output_hides_token() {
        let rendered = format!("{:?}", client());
        assert!(!rendered.contains("token-abc"));
    }
}
