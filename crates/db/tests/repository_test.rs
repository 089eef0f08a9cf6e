//! Repository tests against a fake provider.

mod support;

use anchors_core::application::{ApplicationStatus, NewApplication, ReviewDecision};
use anchors_core::member::{NewMember, ProfileUpdate};
use anchors_core::password_reset::NewPasswordReset;
use anchors_core::{MembershipError, RecordId};
use anchors_db::{MediaFile, RepositoryError};
use anchors_shared::BackendProvider;
use axum::http::Method;
use bytes::Bytes;
use chrono::Utc;
use serde_json::json;
use support::FakeProvider;

#[tokio::test]
async fn test_member_create_and_duplicates() {
    let fake = FakeProvider::spawn(BackendProvider::Supabase).await;
    let members = fake.backend().members();

    let created = members
        .create(&NewMember::new("anchor1", "pw1", "one@example.com").unwrap())
        .await
        .unwrap();
    assert_eq!(created.username, "anchor1");
    assert_eq!(created.display_name.as_deref(), Some("anchor1"));

    let err = members
        .create(&NewMember::new("anchor1", "pw2", "two@example.com").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Duplicate(ref msg) if msg == "Username already exists"));

    let err = members
        .create(&NewMember::new("anchor2", "pw2", "one@example.com").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Duplicate(ref msg) if msg == "Email already exists"));
    assert_eq!(fake.rows("members").len(), 1);
}

#[tokio::test]
async fn test_member_authenticate() {
    let fake = FakeProvider::spawn(BackendProvider::Forge).await;
    fake.seed(
        "members",
        vec![json!({"username": "anchor1", "password": "secret", "email": "a@b.com"})],
    );
    let members = fake.backend().members();

    let member = members.authenticate("anchor1", "secret").await.unwrap();
    assert_eq!(member.username, "anchor1");

    let err = members.authenticate("anchor1", "wrong").await.unwrap_err();
    assert!(matches!(err, RepositoryError::Rule(MembershipError::InvalidCredentials)));

    let err = members.authenticate("nobody", "secret").await.unwrap_err();
    assert!(matches!(err, RepositoryError::Rule(MembershipError::InvalidCredentials)));
}

#[tokio::test]
async fn test_member_directory_newest_first() {
    let fake = FakeProvider::spawn(BackendProvider::Supabase).await;
    fake.seed(
        "members",
        vec![
            json!({"username": "first", "display_name": "", "created_at": "2024-01-01T00:00:00Z"}),
            json!({"username": "second", "display_name": "Second!", "created_at": "2024-02-01T00:00:00Z"}),
        ],
    );

    let directory = fake.backend().members().directory().await.unwrap();
    assert_eq!(directory.len(), 2);
    assert_eq!(directory[0].display_name, "Second!");
    assert_eq!(directory[1].display_name, "first");
}

#[tokio::test]
async fn test_member_update_profile() {
    let fake = FakeProvider::spawn(BackendProvider::Supabase).await;
    fake.seed("members", vec![json!({"id": 5, "username": "anchor", "bio": ""})]);
    let members = fake.backend().members();

    let updated = members
        .update_profile(
            &RecordId::Int(5),
            ProfileUpdate {
                display_name: " Anchor Five ".to_string(),
                bio: "Hosts on Fridays".to_string(),
                tiktok_link: String::new(),
                profile_picture_url: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.display_name.as_deref(), Some("Anchor Five"));
    assert_eq!(updated.bio.as_deref(), Some("Hosts on Fridays"));

    let err = members
        .update_profile(
            &RecordId::Int(99),
            ProfileUpdate {
                display_name: "Ghost".to_string(),
                bio: String::new(),
                tiktok_link: String::new(),
                profile_picture_url: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound(_)));
}

#[tokio::test]
async fn test_member_update_profile_refetches_without_representation() {
    let fake = FakeProvider::spawn(BackendProvider::Forge).await;
    fake.seed("members", vec![json!({"id": 5, "username": "anchor", "display_name": "Kept"})]);
    fake.script(Method::PATCH, "/api/database/members", 204, "");

    let member = fake
        .backend()
        .members()
        .update_profile(
            &RecordId::Int(5),
            ProfileUpdate {
                display_name: "Changed".to_string(),
                bio: String::new(),
                tiktok_link: String::new(),
                profile_picture_url: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(member.display_name.as_deref(), Some("Kept"));
    assert_eq!(fake.last_request().method, Method::GET);
}

#[tokio::test]
async fn test_member_password_and_delete() {
    let fake = FakeProvider::spawn(BackendProvider::Supabase).await;
    fake.seed("members", vec![json!({"id": 2, "username": "a", "password": "old"})]);
    let members = fake.backend().members();

    members.set_password(&RecordId::Int(2), "newpass").await.unwrap();
    assert_eq!(fake.rows("members")[0]["password"], "newpass");

    members.delete(&RecordId::Int(2)).await.unwrap();
    members.delete(&RecordId::Int(2)).await.unwrap();
    assert!(fake.rows("members").is_empty());
}

#[tokio::test]
async fn test_member_profile_picture_upload() {
    let fake = FakeProvider::spawn(BackendProvider::Supabase).await;
    let uploaded = fake
        .backend()
        .members()
        .upload_profile_picture(
            &RecordId::Int(4),
            "me.png",
            anchors_db::Blob::new(vec![1u8, 2]).with_content_type("image/png"),
            Utc::now(),
        )
        .await
        .unwrap();

    assert!(uploaded.key.starts_with("profile-4-"));
    assert!(uploaded.key.ends_with(".png"));
    assert!(uploaded.url.contains("/storage/v1/object/public/profile-pictures/"));
}

#[tokio::test]
async fn test_application_submit_and_list() {
    let fake = FakeProvider::spawn(BackendProvider::Supabase).await;
    let applications = fake.backend().applications();

    let created = applications
        .submit(&NewApplication::new("fan@example.com", "@fan").unwrap())
        .await
        .unwrap();
    assert_eq!(created.status, ApplicationStatus::Pending);
    assert_eq!(created.tiktok_username.as_deref(), Some("fan"));

    let pending = applications
        .list_by_status(ApplicationStatus::Pending)
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert!(fake.last_request().query.contains("status=eq.pending"));

    let approved = applications
        .list_by_status(ApplicationStatus::Approved)
        .await
        .unwrap();
    assert!(approved.is_empty());
}

#[tokio::test]
async fn test_application_review() {
    let fake = FakeProvider::spawn(BackendProvider::Forge).await;
    fake.seed(
        "applications",
        vec![json!({"id": 1, "email": "a@b.com", "status": "pending"})],
    );
    let applications = fake.backend().applications();

    let reviewed = applications
        .review(&RecordId::Int(1), ReviewDecision::Approve, "admin", Utc::now())
        .await
        .unwrap();
    assert_eq!(reviewed.status, ApplicationStatus::Approved);
    assert_eq!(reviewed.reviewed_by.as_deref(), Some("admin"));
    assert_eq!(fake.last_request().query, "id=eq.1&status=eq.pending");

    let err = applications
        .review(&RecordId::Int(1), ReviewDecision::Reject, "admin", Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::Rule(MembershipError::AlreadyReviewed {
            status: ApplicationStatus::Approved
        })
    ));

    let err = applications
        .review(&RecordId::Int(7), ReviewDecision::Approve, "admin", Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound(_)));
}

#[tokio::test]
async fn test_application_review_lost_race_is_stale() {
    let fake = FakeProvider::spawn(BackendProvider::Supabase).await;
    fake.seed(
        "applications",
        vec![json!({"id": 1, "email": "a@b.com", "status": "pending"})],
    );
    fake.script(Method::PATCH, "/rest/v1/applications", 200, "[]");

    let err = fake
        .backend()
        .applications()
        .review(&RecordId::Int(1), ReviewDecision::Reject, "admin", Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Stale(_)));
}

#[tokio::test]
async fn test_application_review_without_representation_merges() {
    let fake = FakeProvider::spawn(BackendProvider::Forge).await;
    fake.seed(
        "applications",
        vec![json!({"id": 1, "email": "a@b.com", "status": "pending"})],
    );
    fake.script(Method::PATCH, "/api/database/applications", 204, "");

    let reviewed = fake
        .backend()
        .applications()
        .review(&RecordId::Int(1), ReviewDecision::Reject, "admin", Utc::now())
        .await
        .unwrap();
    assert_eq!(reviewed.status, ApplicationStatus::Rejected);
    assert_eq!(reviewed.email, "a@b.com");
}

#[tokio::test]
async fn test_media_publish_and_list() {
    let fake = FakeProvider::spawn(BackendProvider::Supabase).await;
    let media = fake.backend().media();

    let published = media
        .publish(
            "Meetup",
            Some("First meetup"),
            MediaFile {
                file_name: "meetup.mp4".to_string(),
                content_type: "video/mp4".to_string(),
                bytes: Bytes::from_static(b"mp4"),
            },
            Utc::now(),
        )
        .await
        .unwrap();
    assert_eq!(published.title, "Meetup");
    assert!(published.media_url.contains("/storage/v1/object/public/media-uploads/"));

    let feed = media.list().await.unwrap();
    assert_eq!(feed.len(), 1);
    assert!(fake.last_request().query.contains("order=upload_date.desc"));

    media.delete(&published.id).await.unwrap();
    assert!(fake.rows("media_uploads").is_empty());
}

#[tokio::test]
async fn test_media_publish_rejects_before_upload() {
    let fake = FakeProvider::spawn(BackendProvider::Forge).await;
    let media = fake.backend().media();
    let file = |content_type: &str| MediaFile {
        file_name: "doc".to_string(),
        content_type: content_type.to_string(),
        bytes: Bytes::from_static(b"x"),
    };

    let err = media
        .publish("Doc", None, file("application/pdf"), Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::Rule(MembershipError::UnsupportedMedia { .. })
    ));

    let err = media
        .publish("  ", None, file("image/png"), Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Rule(MembershipError::Validation(_))));
    assert!(fake.requests().is_empty());
}

#[tokio::test]
async fn test_password_reset_lifecycle() {
    let fake = FakeProvider::spawn(BackendProvider::Supabase).await;
    let resets = fake.backend().password_resets();
    let now = Utc::now();

    let issued = NewPasswordReset::issue(RecordId::Int(3), "a@b.com", now);
    let stored = resets.create(&issued).await.unwrap();
    assert_eq!(stored.token, issued.token);

    let found = resets.find_by_token(&issued.token).await.unwrap().unwrap();
    assert!(found.ensure_redeemable(now).is_ok());

    resets.mark_used(&found.id).await.unwrap();
    let found = resets.find_by_token(&issued.token).await.unwrap().unwrap();
    assert_eq!(found.ensure_redeemable(now), Err(MembershipError::ResetTokenUsed));

    assert!(resets.find_by_token("missing").await.unwrap().is_none());
}
