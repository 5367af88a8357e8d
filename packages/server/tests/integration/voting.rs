use sea_orm::{EntityTrait, PaginatorTrait};
use uuid::Uuid;

use server::entity::{vote, vote_otp};
use server::utils::hashing::hash_otp_code;

use crate::common::{ADMIN_TOKEN, TestApp, multipart_form, routes, vote_redirect};

/// Pull the six-digit verification code out of an OTP email body.
fn six_digit_code(html: &str) -> String {
    let bytes = html.as_bytes();
    let mut start = 0;
    while start < bytes.len() {
        if bytes[start].is_ascii_digit() {
            let mut end = start;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            if end - start == 6 {
                return html[start..end].to_string();
            }
            start = end;
        } else {
            start += 1;
        }
    }
    panic!("no six-digit code found in email body: {html}");
}

mod vote_casting {
    use super::*;

    #[tokio::test]
    async fn vote_is_rejected_while_voting_is_disabled() {
        let app = TestApp::spawn().await;
        let competitor = app.create_competitor("MC Flow").await;

        let res = app.cast_vote(competitor, "fan@example.com").await;

        assert_eq!(
            res.location.as_deref(),
            Some(vote_redirect("closed").as_str())
        );
        let count = vote::Entity::find().count(&app.db).await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn vote_is_rejected_after_the_window_ends() {
        let app = TestApp::spawn().await;
        let competitor = app.create_competitor("MC Flow").await;
        let res = app
            .patch_with_token(
                routes::ADMIN_SETTINGS,
                &serde_json::json!({
                    "votingEnabled": true,
                    "votingStartsAt": "2020-01-01T00:00:00Z",
                    "votingEndsAt": "2020-02-01T00:00:00Z",
                }),
                ADMIN_TOKEN,
            )
            .await;
        assert_eq!(res.status, 200);

        let res = app.cast_vote(competitor, "fan@example.com").await;

        assert_eq!(
            res.location.as_deref(),
            Some(vote_redirect("closed").as_str())
        );
    }

    #[tokio::test]
    async fn vote_ok_then_duplicate_for_the_same_email() {
        let app = TestApp::spawn().await;
        app.open_voting().await;
        let competitor = app.create_competitor("MC Flow").await;

        let first = app.cast_vote(competitor, "Fan@Example.com").await;
        assert_eq!(
            first.location.as_deref(),
            Some(vote_redirect("ok").as_str())
        );

        // Same address in a different case lands on the unique constraint.
        let second = app.cast_vote(competitor, "fan@example.com").await;
        assert_eq!(
            second.location.as_deref(),
            Some(vote_redirect("duplicate").as_str())
        );

        let third = app.cast_vote(competitor, "other-fan@example.com").await;
        assert_eq!(
            third.location.as_deref(),
            Some(vote_redirect("ok").as_str())
        );

        let count = vote::Entity::find().count(&app.db).await.unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn the_same_email_may_vote_for_different_competitors() {
        let app = TestApp::spawn().await;
        app.open_voting().await;
        let first = app.create_competitor("MC Flow").await;
        let second = app.create_competitor("DJ Reina").await;

        let res = app.cast_vote(first, "fan@example.com").await;
        assert_eq!(res.location.as_deref(), Some(vote_redirect("ok").as_str()));
        let res = app.cast_vote(second, "fan@example.com").await;
        assert_eq!(res.location.as_deref(), Some(vote_redirect("ok").as_str()));

        let count = vote::Entity::find().count(&app.db).await.unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn honeypot_vote_reports_ok_without_storing() {
        let app = TestApp::spawn().await;
        app.open_voting().await;
        let competitor = app.create_competitor("MC Flow").await;
        let id = competitor.to_string();

        let res = app
            .post_form(
                routes::VOTES,
                &[
                    ("competitorId", id.as_str()),
                    ("email", "fan@example.com"),
                    ("website", "https://spam.example.com"),
                ],
            )
            .await;

        assert_eq!(res.location.as_deref(), Some(vote_redirect("ok").as_str()));
        let count = vote::Entity::find().count(&app.db).await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn vote_with_missing_fields_is_invalid() {
        let app = TestApp::spawn().await;
        app.open_voting().await;

        let res = app
            .post_form(routes::VOTES, &[("email", "fan@example.com")])
            .await;

        assert_eq!(
            res.location.as_deref(),
            Some(vote_redirect("invalid").as_str())
        );
    }

    #[tokio::test]
    async fn malformed_competitor_id_reports_error() {
        let app = TestApp::spawn().await;
        app.open_voting().await;

        let res = app
            .post_form(
                routes::VOTES,
                &[("competitorId", "not-a-uuid"), ("email", "fan@example.com")],
            )
            .await;

        assert_eq!(
            res.location.as_deref(),
            Some(vote_redirect("error").as_str())
        );
    }

    #[tokio::test]
    async fn unknown_competitor_reports_error() {
        let app = TestApp::spawn().await;
        app.open_voting().await;

        let res = app.cast_vote(Uuid::new_v4(), "fan@example.com").await;

        assert_eq!(
            res.location.as_deref(),
            Some(vote_redirect("error").as_str())
        );
        let count = vote::Entity::find().count(&app.db).await.unwrap();
        assert_eq!(count, 0);
    }
}

mod otp_requests {
    use super::*;

    #[tokio::test]
    async fn otp_request_sends_a_code_and_stores_its_hash() {
        let app = TestApp::spawn().await;
        app.open_voting().await;
        let competitor = app.create_competitor("MC Flow").await;
        let id = competitor.to_string();

        let res = app
            .post_form(
                routes::VOTE_OTP,
                &[
                    ("competitorId", id.as_str()),
                    ("email", "Voter@Example.COM"),
                ],
            )
            .await;

        assert_eq!(
            res.location.as_deref(),
            Some(vote_redirect("sent").as_str())
        );

        let row = vote_otp::Entity::find()
            .one(&app.db)
            .await
            .unwrap()
            .expect("OTP row should exist");
        assert_eq!(row.competitor_id, competitor);
        assert_eq!(row.voter_email, "voter@example.com");
        assert_eq!(row.otp_hash.len(), 64);
        assert_eq!(
            row.expires_at.signed_duration_since(row.created_at).num_minutes(),
            10
        );

        let sent = app.outbox.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "voter@example.com");
        assert_eq!(sent[0].subject, "OTP de voto | KILLEEN NEXT UP");
        assert!(sent[0].html.contains("MC Flow"));

        // The mailed code hashes to the stored value.
        let code = six_digit_code(&sent[0].html);
        assert_eq!(hash_otp_code(&code), row.otp_hash);
    }

    #[tokio::test]
    async fn otp_for_a_hidden_competitor_is_invalid() {
        let app = TestApp::spawn().await;
        app.open_voting().await;
        let form = multipart_form(
            &[
                ("stageName", "Oculto"),
                ("city", "Killeen"),
                ("demoUrl", "https://cdn.example.com/demo.mp3"),
                ("status", "hidden"),
            ],
            None,
        );
        let created = app
            .post_multipart_with_token(routes::ADMIN_COMPETITORS, form, ADMIN_TOKEN)
            .await;
        assert_eq!(created.status, 201, "create failed: {}", created.text);
        let id = created.id().to_string();

        let res = app
            .post_form(
                routes::VOTE_OTP,
                &[("competitorId", id.as_str()), ("email", "voter@example.com")],
            )
            .await;

        assert_eq!(
            res.location.as_deref(),
            Some(vote_redirect("invalid").as_str())
        );
        let count = vote_otp::Entity::find().count(&app.db).await.unwrap();
        assert_eq!(count, 0);
        assert!(app.outbox.sent().is_empty());
    }

    #[tokio::test]
    async fn otp_requests_are_closed_while_voting_is_disabled() {
        let app = TestApp::spawn().await;
        let competitor = app.create_competitor("MC Flow").await;
        let id = competitor.to_string();

        let res = app
            .post_form(
                routes::VOTE_OTP,
                &[("competitorId", id.as_str()), ("email", "voter@example.com")],
            )
            .await;

        assert_eq!(
            res.location.as_deref(),
            Some(vote_redirect("closed").as_str())
        );
    }

    #[tokio::test]
    async fn otp_honeypot_reports_sent_without_a_code() {
        let app = TestApp::spawn().await;
        app.open_voting().await;
        let competitor = app.create_competitor("MC Flow").await;
        let id = competitor.to_string();

        let res = app
            .post_form(
                routes::VOTE_OTP,
                &[
                    ("competitorId", id.as_str()),
                    ("email", "voter@example.com"),
                    ("website", "https://spam.example.com"),
                ],
            )
            .await;

        assert_eq!(
            res.location.as_deref(),
            Some(vote_redirect("sent").as_str())
        );
        let count = vote_otp::Entity::find().count(&app.db).await.unwrap();
        assert_eq!(count, 0);
        assert!(app.outbox.sent().is_empty());
    }

    #[tokio::test]
    async fn otp_with_missing_fields_is_invalid() {
        let app = TestApp::spawn().await;
        app.open_voting().await;

        let res = app
            .post_form(routes::VOTE_OTP, &[("email", "voter@example.com")])
            .await;

        assert_eq!(
            res.location.as_deref(),
            Some(vote_redirect("invalid").as_str())
        );
    }
}
