use serde_json::json;
use uuid::Uuid;

use crate::common::{ADMIN_TOKEN, TestApp, multipart_form, routes, vote_redirect};

/// Cast `count` votes for a competitor, each from a distinct address.
async fn cast_votes(app: &TestApp, competitor: Uuid, count: usize) {
    for i in 0..count {
        let email = format!("fan{i}@example.com");
        let res = app.cast_vote(competitor, &email).await;
        assert_eq!(
            res.location.as_deref(),
            Some(vote_redirect("ok").as_str()),
            "vote {i} for {competitor} failed"
        );
    }
}

mod rankings {
    use super::*;

    #[tokio::test]
    async fn leaderboard_orders_by_votes_with_ties_ahead_of_lower_counts() {
        let app = TestApp::spawn().await;
        app.open_voting().await;
        let a = app.create_competitor("MC Flow").await;
        let b = app.create_competitor("DJ Reina").await;
        let c = app.create_competitor("Lil Tex").await;
        let d = app.create_competitor("La Voz").await;
        cast_votes(&app, a, 5).await;
        cast_votes(&app, b, 20).await;
        cast_votes(&app, c, 20).await;
        cast_votes(&app, d, 1).await;

        let res = app.get_without_token(routes::LEADERBOARD).await;

        assert_eq!(res.status, 200);
        let entries = res.body.as_array().expect("leaderboard should be an array");
        assert_eq!(entries.len(), 4);

        let counts: Vec<i64> = entries
            .iter()
            .map(|e| e["votesCount"].as_i64().unwrap())
            .collect();
        assert_eq!(counts, vec![20, 20, 5, 1]);

        let ranks: Vec<u64> = entries.iter().map(|e| e["rank"].as_u64().unwrap()).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);

        // The two 20-vote competitors occupy the top spots in either order.
        let top_ids: Vec<&str> = entries[..2]
            .iter()
            .map(|e| e["competitorId"].as_str().unwrap())
            .collect();
        assert!(top_ids.contains(&b.to_string().as_str()));
        assert!(top_ids.contains(&c.to_string().as_str()));
        assert_eq!(entries[2]["competitorId"], a.to_string());
        assert_eq!(entries[3]["competitorId"], d.to_string());
    }

    #[tokio::test]
    async fn hidden_competitors_are_excluded() {
        let app = TestApp::spawn().await;
        app.create_competitor("MC Flow").await;
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
        assert_eq!(created.status, 201);

        let res = app.get_without_token(routes::LEADERBOARD).await;

        let entries = res.body.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["stageName"], "MC Flow");
    }

    #[tokio::test]
    async fn an_empty_roster_yields_an_empty_leaderboard() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::LEADERBOARD).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn competitors_without_votes_rank_behind_voted_ones() {
        let app = TestApp::spawn().await;
        app.open_voting().await;
        let voted = app.create_competitor("MC Flow").await;
        app.create_competitor("DJ Reina").await;
        cast_votes(&app, voted, 2).await;

        let res = app.get_without_token(routes::LEADERBOARD).await;

        let entries = res.body.as_array().unwrap();
        assert_eq!(entries[0]["competitorId"], voted.to_string());
        assert_eq!(entries[0]["votesCount"], 2);
        assert_eq!(entries[1]["votesCount"], 0);
        assert_eq!(entries[1]["rank"], 2);
    }
}

mod voting_status {
    use super::*;

    #[tokio::test]
    async fn defaults_report_the_campaign_window() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::VOTING_STATUS).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["votingEnabled"], false);
        assert_eq!(res.body["startsAt"], "2026-03-13T05:00:00Z");
        assert_eq!(res.body["endsAt"], "2026-04-04T04:59:59Z");
        assert!(res.body["liveFinalAt"].is_null());
    }

    #[tokio::test]
    async fn the_stored_window_drives_the_phase() {
        let app = TestApp::spawn().await;

        app.patch_with_token(
            routes::ADMIN_SETTINGS,
            &json!({
                "votingEnabled": true,
                "votingStartsAt": "2020-01-01T00:00:00Z",
                "votingEndsAt": "2020-02-01T00:00:00Z",
            }),
            ADMIN_TOKEN,
        )
        .await;
        let res = app.get_without_token(routes::VOTING_STATUS).await;
        assert_eq!(res.body["phase"], "ended");

        app.patch_with_token(
            routes::ADMIN_SETTINGS,
            &json!({
                "votingStartsAt": "2098-01-01T00:00:00Z",
                "votingEndsAt": "2099-01-01T00:00:00Z",
            }),
            ADMIN_TOKEN,
        )
        .await;
        let res = app.get_without_token(routes::VOTING_STATUS).await;
        assert_eq!(res.body["phase"], "before");

        app.patch_with_token(
            routes::ADMIN_SETTINGS,
            &json!({
                "votingStartsAt": "2020-01-01T00:00:00Z",
                "votingEndsAt": "2099-01-01T00:00:00Z",
            }),
            ADMIN_TOKEN,
        )
        .await;
        let res = app.get_without_token(routes::VOTING_STATUS).await;
        assert_eq!(res.body["phase"], "active");
    }

    #[tokio::test]
    async fn an_inverted_window_falls_back_to_the_defaults() {
        let app = TestApp::spawn().await;

        app.patch_with_token(
            routes::ADMIN_SETTINGS,
            &json!({
                "votingStartsAt": "2099-01-01T00:00:00Z",
                "votingEndsAt": "2020-01-01T00:00:00Z",
            }),
            ADMIN_TOKEN,
        )
        .await;

        let res = app.get_without_token(routes::VOTING_STATUS).await;
        assert_eq!(res.body["startsAt"], "2026-03-13T05:00:00Z");
        assert_eq!(res.body["endsAt"], "2026-04-04T04:59:59Z");
    }

    #[tokio::test]
    async fn the_live_final_timestamp_is_passed_through() {
        let app = TestApp::spawn().await;

        app.patch_with_token(
            routes::ADMIN_SETTINGS,
            &json!({"liveFinalAt": "2026-04-10T20:00:00Z"}),
            ADMIN_TOKEN,
        )
        .await;

        let res = app.get_without_token(routes::VOTING_STATUS).await;
        assert_eq!(res.body["liveFinalAt"], "2026-04-10T20:00:00Z");
    }
}
