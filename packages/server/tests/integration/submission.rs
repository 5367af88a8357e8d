use ::common::SubmissionStatus;
use sea_orm::{EntityTrait, PaginatorTrait};

use server::entity::submission;

use crate::common::{TestApp, demo_redirect, multipart_form, routes};

/// Fields for a complete, valid demo submission linked by URL.
fn valid_demo_fields<'a>(stage_name: &'a str, email: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("stageName", stage_name),
        ("legalName", "Jane Doe"),
        ("email", email),
        ("phone", "254-555-0101"),
        ("city", "Killeen"),
        ("demoUrl", "https://cdn.example.com/demo.mp3"),
        ("acceptTerms", "on"),
    ]
}

mod demo_intake {
    use super::*;

    #[tokio::test]
    async fn valid_submission_redirects_ok_and_stores_a_pending_row() {
        let app = TestApp::spawn().await;

        let res = app.submit_demo("MC Flow", "Artist@Example.COM").await;

        assert_eq!(res.status, 303, "unexpected response: {}", res.text);
        assert_eq!(res.location.as_deref(), Some(demo_redirect("ok").as_str()));

        let row = submission::Entity::find()
            .one(&app.db)
            .await
            .expect("DB query failed")
            .expect("submission row should exist");
        assert_eq!(row.stage_name, "MC Flow");
        assert_eq!(row.email, "artist@example.com");
        assert_eq!(row.status, SubmissionStatus::Pending);
        assert_eq!(row.ip_hash.len(), 64);
    }

    #[tokio::test]
    async fn confirmation_email_goes_to_the_normalized_address() {
        let app = TestApp::spawn().await;

        app.submit_demo("MC Flow", "Artist@Example.COM").await;

        let sent = app.outbox.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "artist@example.com");
        assert_eq!(
            sent[0].subject,
            "EM Records | Demo recibida para KILLEEN NEXT UP"
        );
        assert!(sent[0].html.contains("MC Flow"));
    }

    #[tokio::test]
    async fn honeypot_submission_reports_ok_without_storing() {
        let app = TestApp::spawn().await;
        let mut fields = valid_demo_fields("MC Flow", "artist@example.com");
        fields.push(("website", "https://spam.example.com"));

        let res = app
            .post_multipart(routes::SUBMISSIONS, multipart_form(&fields, None))
            .await;

        assert_eq!(res.location.as_deref(), Some(demo_redirect("ok").as_str()));
        let count = submission::Entity::find().count(&app.db).await.unwrap();
        assert_eq!(count, 0);
        assert!(app.outbox.sent().is_empty());
    }

    #[tokio::test]
    async fn missing_contact_fields_redirect_invalid() {
        let app = TestApp::spawn().await;
        let fields: Vec<(&str, &str)> = valid_demo_fields("MC Flow", "artist@example.com")
            .into_iter()
            .filter(|(name, _)| *name != "email")
            .collect();

        let res = app
            .post_multipart(routes::SUBMISSIONS, multipart_form(&fields, None))
            .await;

        assert_eq!(
            res.location.as_deref(),
            Some(demo_redirect("invalid").as_str())
        );
        let count = submission::Entity::find().count(&app.db).await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn unaccepted_terms_redirect_invalid() {
        let app = TestApp::spawn().await;
        let fields: Vec<(&str, &str)> = valid_demo_fields("MC Flow", "artist@example.com")
            .into_iter()
            .filter(|(name, _)| *name != "acceptTerms")
            .collect();

        let res = app
            .post_multipart(routes::SUBMISSIONS, multipart_form(&fields, None))
            .await;

        assert_eq!(
            res.location.as_deref(),
            Some(demo_redirect("invalid").as_str())
        );
    }

    #[tokio::test]
    async fn submission_without_any_demo_redirects_invalid() {
        let app = TestApp::spawn().await;
        let fields: Vec<(&str, &str)> = valid_demo_fields("MC Flow", "artist@example.com")
            .into_iter()
            .filter(|(name, _)| *name != "demoUrl")
            .collect();

        let res = app
            .post_multipart(routes::SUBMISSIONS, multipart_form(&fields, None))
            .await;

        assert_eq!(
            res.location.as_deref(),
            Some(demo_redirect("invalid").as_str())
        );
        let count = submission::Entity::find().count(&app.db).await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn duplicate_stage_names_differing_only_in_case_are_rejected() {
        let app = TestApp::spawn().await;

        let first = app.submit_demo("MC Flow", "first@example.com").await;
        assert_eq!(
            first.location.as_deref(),
            Some(demo_redirect("ok").as_str())
        );

        let second = app.submit_demo("mc flow", "second@example.com").await;
        assert_eq!(
            second.location.as_deref(),
            Some(demo_redirect("duplicate_stage").as_str())
        );

        let count = submission::Entity::find().count(&app.db).await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn blank_optional_fields_are_stored_as_null() {
        let app = TestApp::spawn().await;
        let mut fields = valid_demo_fields("MC Flow", "artist@example.com");
        fields.push(("socialLinks", "   "));
        fields.push(("artistBio", "Rapper from Killeen."));

        let res = app
            .post_multipart(routes::SUBMISSIONS, multipart_form(&fields, None))
            .await;
        assert_eq!(res.location.as_deref(), Some(demo_redirect("ok").as_str()));

        let row = submission::Entity::find()
            .one(&app.db)
            .await
            .unwrap()
            .expect("submission row should exist");
        assert_eq!(row.social_links, None);
        assert_eq!(row.artist_bio.as_deref(), Some("Rapper from Killeen."));
    }
}

mod demo_uploads {
    use super::*;

    #[tokio::test]
    async fn uploaded_demo_file_is_stored_and_served() {
        let app = TestApp::spawn().await;
        let audio = b"ID3\x03\x00fake audio payload".to_vec();
        let fields: Vec<(&str, &str)> = valid_demo_fields("MC Flow", "artist@example.com")
            .into_iter()
            .filter(|(name, _)| *name != "demoUrl")
            .collect();
        let form = multipart_form(
            &fields,
            Some(("demoFile", "my demo.mp3", "audio/mpeg", audio.clone())),
        );

        let res = app.post_multipart(routes::SUBMISSIONS, form).await;
        assert_eq!(res.location.as_deref(), Some(demo_redirect("ok").as_str()));

        let row = submission::Entity::find()
            .one(&app.db)
            .await
            .unwrap()
            .expect("submission row should exist");
        assert!(
            row.demo_url.starts_with("/media/demos/"),
            "unexpected demo url: {}",
            row.demo_url
        );
        assert!(row.demo_url.ends_with("-my-demo.mp3"));

        let served = app
            .client
            .get(format!("http://{}{}", app.addr, row.demo_url))
            .send()
            .await
            .expect("Failed to fetch stored demo");
        assert_eq!(served.status().as_u16(), 200);
        assert_eq!(
            served
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok()),
            Some("audio/mpeg")
        );
        assert_eq!(served.bytes().await.unwrap().to_vec(), audio);
    }

    #[tokio::test]
    async fn an_uploaded_file_wins_over_the_url_field() {
        let app = TestApp::spawn().await;
        let form = multipart_form(
            &valid_demo_fields("MC Flow", "artist@example.com"),
            Some(("demoFile", "track.mp3", "audio/mpeg", b"audio".to_vec())),
        );

        let res = app.post_multipart(routes::SUBMISSIONS, form).await;
        assert_eq!(res.location.as_deref(), Some(demo_redirect("ok").as_str()));

        let row = submission::Entity::find()
            .one(&app.db)
            .await
            .unwrap()
            .expect("submission row should exist");
        assert!(row.demo_url.starts_with("/media/demos/"));
    }
}
