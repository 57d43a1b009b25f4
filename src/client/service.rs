//! One fetch → validate → format → notify pass

use compact_str::CompactString;
use tracing::{debug, info, instrument};

use super::{
    api::PracticumApi,
    error::Result,
    notifier::TelegramNotifier,
    response::{self, StatusesResponse},
};
use crate::{
    cursor::PollCursor,
    domain::{HomeworkRecord, format_message},
};

/// Outcome of one cycle; an error means the cursor must not move
pub type CycleResult = Result<CycleReport>;

/// Orchestrates the review API, the validator, the formatter and the notifier
#[derive(Debug, Clone)]
pub struct HomeworkService {
    api: PracticumApi,
    notifier: TelegramNotifier,
}

/// What a successful cycle did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Server time reported by the response, the next cursor
    pub current_date: PollCursor,
    /// Number of homeworks in the response
    pub homework_count: usize,
    /// Message built for the first homework, if any
    pub message: Option<CompactString>,
    /// Whether Telegram accepted the message
    pub delivered: bool,
}

impl HomeworkService {
    pub fn new(api: PracticumApi, notifier: TelegramNotifier) -> Self {
        Self { api, notifier }
    }

    /// Fetch and validate statuses changed since `cursor`
    pub async fn fetch_statuses(&self, cursor: PollCursor) -> Result<StatusesResponse> {
        let payload = self.api.fetch(Some(cursor)).await?;
        response::extract(&payload)
    }

    /// Run a single cycle
    ///
    /// Only the first homework of the response is decoded and reported.
    /// Delivery failures are logged by the notifier and do not fail the cycle.
    #[instrument(skip(self), fields(cursor = %cursor))]
    pub async fn run_cycle(&self, cursor: PollCursor) -> CycleResult {
        let statuses = self.fetch_statuses(cursor).await?;

        let current_date = statuses.current_date;
        let homework_count = statuses.homeworks.len();

        let Some(first) = statuses.homeworks.first() else {
            debug!("No homework status changes");
            return Ok(CycleReport {
                current_date,
                homework_count,
                message: None,
                delivered: false,
            });
        };

        let message = format_message(&HomeworkRecord::from_entry(first)?)?;

        info!(homework_count, "Homework status changed");
        let delivered = self.notifier.notify(&message).await;

        Ok(CycleReport {
            current_date,
            homework_count,
            message: Some(message),
            delivered,
        })
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Client;
    use serde_json::{Value, json};
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, method, path},
    };

    use super::*;
    use crate::{
        client::{ClientConfig, ClientError},
        config::Credentials,
    };

    const APPROVED_TEXT: &str =
        "Изменился статус проверки работы \"hw1\". Работа проверена: ревьюеру всё понравилось. Ура!";

    fn ok_json(payload: Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(payload)
    }

    async fn service_with(payload: ResponseTemplate) -> (HomeworkService, MockServer) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/statuses/"))
            .respond_with(payload)
            .mount(&server)
            .await;

        let config = ClientConfig::new(Credentials::new("y0_token", "123:bot", "100500"))
            .with_endpoint(format!("{}/statuses/", server.uri()))
            .with_telegram_api(server.uri());
        let client = Client::new();
        let service = HomeworkService::new(
            PracticumApi::new(client.clone(), &config),
            TelegramNotifier::new(client, &config),
        );
        (service, server)
    }

    async fn expect_messages(server: &MockServer, count: u64) {
        Mock::given(method("POST"))
            .and(path("/bot123:bot/sendMessage"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(count)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn approved_homework_is_notified() {
        let payload = json!({
            "homeworks": [{"homework_name": "hw1", "status": "approved"}],
            "current_date": 1700000000
        });
        let (service, server) = service_with(ok_json(payload)).await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"chat_id": "100500", "text": APPROVED_TEXT})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let report = service.run_cycle(PollCursor::new(1)).await.unwrap();
        assert_eq!(report.current_date, PollCursor::new(1_700_000_000));
        assert_eq!(report.message.as_deref(), Some(APPROVED_TEXT));
        assert_eq!(report.homework_count, 1);
        assert!(report.delivered);
    }

    #[tokio::test]
    async fn only_first_homework_is_notified() {
        let payload = json!({
            "homeworks": [
                {"homework_name": "hw1", "status": "approved"},
                {"homework_name": "hw2", "status": "rejected"}
            ],
            "current_date": 1700000000
        });
        let (service, server) = service_with(ok_json(payload)).await;
        expect_messages(&server, 1).await;

        let report = service.run_cycle(PollCursor::new(1)).await.unwrap();
        assert_eq!(report.homework_count, 2);
        assert_eq!(report.message.as_deref(), Some(APPROVED_TEXT));
    }

    #[tokio::test]
    async fn empty_list_sends_nothing() {
        let payload = json!({"homeworks": [], "current_date": 1700000600});
        let (service, server) = service_with(ok_json(payload)).await;
        expect_messages(&server, 0).await;

        let report = service.run_cycle(PollCursor::new(1)).await.unwrap();
        assert_eq!(report.current_date, PollCursor::new(1_700_000_600));
        assert_eq!(report.message, None);
        assert!(!report.delivered);
    }

    #[tokio::test]
    async fn unknown_status_sends_nothing() {
        let payload = json!({
            "homeworks": [{"homework_name": "hw1", "status": "lost"}],
            "current_date": 1700000000
        });
        let (service, server) = service_with(ok_json(payload)).await;
        expect_messages(&server, 0).await;

        let error = service.run_cycle(PollCursor::new(1)).await.unwrap_err();
        assert!(matches!(error, ClientError::UnknownStatus(s) if s == "lost"));
    }

    #[tokio::test]
    async fn bad_later_entry_does_not_block_first() {
        let payload = json!({
            "homeworks": [
                {"homework_name": "hw1", "status": "approved"},
                {"homework_name": 42, "status": "approved"}
            ],
            "current_date": 1700000600
        });
        let (service, server) = service_with(ok_json(payload)).await;
        expect_messages(&server, 1).await;

        let report = service.run_cycle(PollCursor::new(1)).await.unwrap();
        assert_eq!(report.message.as_deref(), Some(APPROVED_TEXT));
        assert_eq!(report.current_date, PollCursor::new(1_700_000_600));
        assert_eq!(report.homework_count, 2);
    }

    #[tokio::test]
    async fn bad_first_entry_fails_cycle() {
        let payload = json!({
            "homeworks": [{"homework_name": 42, "status": "approved"}],
            "current_date": 1700000600
        });
        let (service, server) = service_with(ok_json(payload)).await;
        expect_messages(&server, 0).await;

        let error = service.run_cycle(PollCursor::new(1)).await.unwrap_err();
        assert!(matches!(error, ClientError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn server_error_aborts_cycle() {
        let (service, server) = service_with(ResponseTemplate::new(500)).await;
        expect_messages(&server, 0).await;

        let error = service.run_cycle(PollCursor::new(1)).await.unwrap_err();
        assert!(matches!(error, ClientError::ServerError { status: 500, .. }));
    }

    #[tokio::test]
    async fn missing_homeworks_aborts_cycle() {
        let payload = json!({"current_date": 1700000000});
        let (service, server) = service_with(ok_json(payload)).await;
        expect_messages(&server, 0).await;

        let error = service.run_cycle(PollCursor::new(1)).await.unwrap_err();
        assert!(matches!(error, ClientError::MissingField("homeworks")));
    }

    #[tokio::test]
    async fn delivery_failure_does_not_fail_cycle() {
        let payload = json!({
            "homeworks": [{"homework_name": "hw1", "status": "reviewing"}],
            "current_date": 1700000000
        });
        let (service, server) = service_with(ok_json(payload)).await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let report = service.run_cycle(PollCursor::new(1)).await.unwrap();
        assert!(!report.delivered);
        assert!(report.message.is_some());
    }
}
