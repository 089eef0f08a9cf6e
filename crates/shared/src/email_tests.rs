use axum::{Json, Router, http::StatusCode, routing::post};
use rstest::rstest;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use super::*;

fn config_for(provider: EmailProviderKind) -> EmailConfig {
    EmailConfig {
        provider,
        from_email: Some("noreply@voiceanchors.test".to_string()),
        ..EmailConfig::default()
    }
}

async fn spawn_resend(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

#[rstest]
#[case("a@b.com", true)]
#[case("first.last@sub.example.org", true)]
#[case("", false)]
#[case("no-at-sign.com", false)]
#[case("@example.com", false)]
#[case("user@nodot", false)]
#[case("user@.com", false)]
#[case("user name@example.com", false)]
#[case("a@b@c.com", false)]
#[case("a@b..com", false)]
#[case("<a>@b.com", false)]
#[case("a@-b.com", false)]
#[case("a,b@c.com", false)]
fn test_is_valid_email(#[case] input: &str, #[case] expected: bool) {
    assert_eq!(is_valid_email(input), expected);
}

#[test]
fn test_body_fallbacks() {
    let only_text = OutgoingEmail {
        to: vec!["a@b.com".to_string()],
        subject: "s".to_string(),
        html: None,
        text: Some("plain".to_string()),
    };
    assert_eq!(only_text.html_body(), "plain");
    assert_eq!(only_text.text_body(), "plain");

    let neither = OutgoingEmail {
        html: None,
        text: None,
        ..only_text
    };
    assert_eq!(neither.html_body(), "");
}

#[test]
fn test_email_error_display() {
    assert_eq!(
        format!("{}", EmailError::BuildError("msg".into())),
        "Failed to build email: msg"
    );
    assert_eq!(
        format!("{}", EmailError::SendError("msg".into())),
        "Failed to send email: msg"
    );
    assert_eq!(
        format!("{}", EmailError::InvalidAddress("msg".into())),
        "Invalid email address: msg"
    );
}

#[test]
fn test_notification_escapes_html() {
    let email = notification("a@b.com", "Subject", "Hi <there>", &["x & y"]);
    assert!(email.html_body().contains("Hi &lt;there&gt;"));
    assert!(email.html_body().contains("x &amp; y"));
    assert!(email.text_body().contains("x & y"));
}

#[tokio::test]
async fn test_log_transport_accepts_message() {
    let service = EmailService::new(EmailConfig::default());
    let receipt = service.send_application_received("member@example.com").await;
    assert_eq!(receipt.unwrap(), EmailReceipt::default());
}

#[tokio::test]
async fn test_invalid_recipient_rejected() {
    let service = EmailService::new(EmailConfig::default());
    let err = service.send_test("not-an-address").await.unwrap_err();
    assert!(matches!(err, EmailError::InvalidAddress(addr) if addr == "not-an-address"));
}

#[tokio::test]
async fn test_resend_requires_api_key() {
    let service = EmailService::new(config_for(EmailProviderKind::Resend));
    let err = service.send_test("a@b.com").await.unwrap_err();
    assert!(matches!(err, EmailError::NotConfigured(_)));
}

#[tokio::test]
async fn test_smtp_requires_from_email() {
    let config = EmailConfig {
        provider: EmailProviderKind::Smtp,
        ..EmailConfig::default()
    };
    let service = EmailService::new(config);
    assert!(matches!(
        service.ensure_configured(),
        Err(EmailError::NotConfigured(_))
    ));
}

#[test]
fn test_create_smtp_transport() {
    let config = EmailConfig {
        smtp_tls: false,
        smtp_username: Some("user".to_string()),
        smtp_password: Some("password".to_string()),
        ..config_for(EmailProviderKind::Smtp)
    };
    let service = EmailService::new(config);
    assert!(service.create_transport().is_ok());
}

#[test]
fn test_build_message_with_multiple_recipients() {
    let service = EmailService::new(config_for(EmailProviderKind::Smtp));
    let email = OutgoingEmail {
        to: vec!["a@b.com".to_string(), "c@d.org".to_string()],
        subject: "Hello".to_string(),
        html: Some("<p>Hi</p>".to_string()),
        text: None,
    };
    let message = service.build_message(&email).unwrap();
    let envelope = message.envelope();
    assert_eq!(envelope.to().len(), 2);
}

#[tokio::test]
async fn test_resend_returns_provider_id() {
    let router = Router::new().route(
        "/emails",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["to"], json!(["member@example.com"]));
            assert_eq!(body["from"], "Voice Anchors <noreply@voiceanchors.test>");
            Json(json!({ "id": "email_123" }))
        }),
    );
    let base = spawn_resend(router).await;
    let config = EmailConfig {
        resend_api_key: Some("re_test".to_string()),
        resend_base_url: base,
        ..config_for(EmailProviderKind::Resend)
    };

    let receipt = EmailService::new(config)
        .send_application_approved("member@example.com")
        .await
        .unwrap();
    assert_eq!(receipt.id.as_deref(), Some("email_123"));
}

#[tokio::test]
async fn test_resend_error_message_surfaces() {
    let router = Router::new().route(
        "/emails",
        post(|| async {
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "name": "validation_error", "message": "Invalid `from` field" })),
            )
        }),
    );
    let base = spawn_resend(router).await;
    let config = EmailConfig {
        resend_api_key: Some("re_test".to_string()),
        resend_base_url: base,
        ..config_for(EmailProviderKind::Resend)
    };

    let err = EmailService::new(config)
        .send_test("member@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, EmailError::Provider(m) if m == "Invalid `from` field"));
}

#[rstest]
#[case(EmailError::NotConfigured("from_email is not set".to_string()), 500, "NOT_CONFIGURED")]
#[case(EmailError::InvalidAddress("nope".to_string()), 400, "VALIDATION_ERROR")]
#[case(EmailError::Provider("rate limited".to_string()), 500, "EXTERNAL_SERVICE_ERROR")]
fn test_email_error_to_app_error(
    #[case] err: EmailError,
    #[case] status: u16,
    #[case] code: &str,
) {
    let app: AppError = err.into();
    assert_eq!(app.status_code(), status);
    assert_eq!(app.error_code(), code);
}
