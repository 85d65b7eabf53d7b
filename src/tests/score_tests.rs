#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::Arc;

    use crate::{
        db::{memory::MemoryScoreStore, ScoreStore},
        error::ServiceError,
        models::user::Identity,
        services::score_service::{parse_score, resolve_quiz_id, ScoreService, ScoreSubmission},
    };

    use super::super::common::{create_test_user, get, post_json, send, setup, submit};

    #[tokio::test]
    async fn test_stored_score_is_running_maximum() {
        let ctx = setup();
        let user = create_test_user(&ctx, "Max", "max@example.com").await;

        let mut best = 0;
        for score in [40, 70, 55, 70, 90, 10] {
            best = best.max(score);
            let (status, body) = submit(&ctx, &user, json!({ "score": score, "quiz": "java" })).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, json!({ "ok": true, "best": best }));
        }

        let stored = ctx.stores.scores.find(&user.id, "java").await.unwrap().unwrap();
        assert_eq!(stored.score, 90);
        assert_eq!(stored.username, user.name);
        assert_eq!(ctx.stores.scores.list_by_quiz("java").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_lower_score_leaves_record_unchanged() {
        let ctx = setup();
        let user = create_test_user(&ctx, "Lo", "lo@example.com").await;

        submit(&ctx, &user, json!({ "score": 8, "quiz": "css", "totalQuestions": 10, "completionTime": 95 })).await;
        let (status, body) =
            submit(&ctx, &user, json!({ "score": 5, "quiz": "css", "totalQuestions": 10, "completionTime": 20 })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["best"], 8);
        let stored = ctx.stores.scores.find(&user.id, "css").await.unwrap().unwrap();
        assert_eq!(stored.score, 8);
        assert_eq!(stored.completion_time_seconds, Some(95));
    }

    #[tokio::test]
    async fn test_higher_score_replaces_details() {
        let ctx = setup();
        let user = create_test_user(&ctx, "Hi", "hi@example.com").await;

        submit(&ctx, &user, json!({ "score": 6, "quiz": "html", "totalQuestions": 10, "completionTime": 95 })).await;
        submit(&ctx, &user, json!({ "score": 9, "quiz": "html", "totalQuestions": 10, "completionTime": 120 })).await;

        let stored = ctx.stores.scores.find(&user.id, "html").await.unwrap().unwrap();
        assert_eq!(stored.score, 9);
        assert_eq!(stored.total_questions, Some(10));
        assert_eq!(stored.completion_time_seconds, Some(120));
    }

    #[tokio::test]
    async fn test_negative_score_rejected_without_side_effect() {
        let ctx = setup();
        let user = create_test_user(&ctx, "Neg", "neg@example.com").await;
        submit(&ctx, &user, json!({ "score": 60, "quiz": "python" })).await;

        let (status, body) = submit(&ctx, &user, json!({ "score": -5, "quiz": "python" })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "ok": false, "error": "score must be a non-negative integer" }));
        let stored = ctx.stores.scores.find(&user.id, "python").await.unwrap().unwrap();
        assert_eq!(stored.score, 60);
    }

    #[tokio::test]
    async fn test_non_numeric_scores_rejected() {
        let ctx = setup();
        let user = create_test_user(&ctx, "Nan", "nan@example.com").await;

        for body in [json!({ "score": "80" }), json!({ "score": 7.5 }), json!({ "score": null }), json!({})] {
            let (status, response) = submit(&ctx, &user, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(response["ok"], false);
        }
        assert!(ctx.stores.scores.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_rejected() {
        let ctx = setup();
        let user = create_test_user(&ctx, "Mal", "mal@example.com").await;

        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/submit-score")
            .header(axum::http::header::CONTENT_TYPE, "application/json")
            .header(axum::http::header::AUTHORIZATION, format!("Bearer {}", user.token))
            .body(axum::body::Body::from("{not json"))
            .unwrap();
        let (status, body) = send(&ctx.app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Malformed request body");
    }

    #[tokio::test]
    async fn test_submit_requires_valid_token() {
        let ctx = setup();

        let (status, body) = send(&ctx.app, post_json("/submit-score", None, &json!({ "score": 10 }))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "ok": false, "error": "Please log in" }));

        let (status, _) =
            send(&ctx.app, post_json("/submit-score", Some("forged.token.value"), &json!({ "score": 10 }))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        assert!(ctx.stores.scores.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_quiz_defaults_when_omitted() {
        let ctx = setup();
        let user = create_test_user(&ctx, "Def", "def@example.com").await;

        submit(&ctx, &user, json!({ "score": 3 })).await;
        submit(&ctx, &user, json!({ "score": 4, "quiz": "   " })).await;

        let stored = ctx.stores.scores.find(&user.id, &ctx.config.default_quiz).await.unwrap().unwrap();
        assert_eq!(ctx.config.default_quiz, "bimo");
        assert_eq!(stored.score, 4);
    }

    #[tokio::test]
    async fn test_overall_is_reserved() {
        let ctx = setup();
        let user = create_test_user(&ctx, "Res", "res@example.com").await;

        let (status, body) = submit(&ctx, &user, json!({ "score": 3, "quiz": "overall" })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], false);
        assert!(ctx.stores.scores.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_total_questions_must_cover_score() {
        let ctx = setup();
        let user = create_test_user(&ctx, "Tot", "tot@example.com").await;

        let (status, _) = submit(&ctx, &user, json!({ "score": 12, "quiz": "java", "totalQuestions": 10 })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = submit(&ctx, &user, json!({ "score": 0, "quiz": "java", "totalQuestions": 0 })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_my_scores() {
        let ctx = setup();
        let user = create_test_user(&ctx, "Me", "me@example.com").await;
        submit(&ctx, &user, json!({ "score": 7, "quiz": "java", "totalQuestions": 10 })).await;
        submit(&ctx, &user, json!({ "score": 2, "quiz": "css" })).await;

        let (status, body) = send(&ctx.app, get("/scores/me", Some(&user.token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["scores"],
            json!([
                { "quiz": "java", "score": 7, "totalQuestions": 10, "percentage": 70 },
                { "quiz": "css", "score": 2 }
            ])
        );

        let (status, body) = send(&ctx.app, get("/scores/me/java", Some(&user.token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["score"]["score"], 7);

        let (status, body) = send(&ctx.app, get("/scores/me/python", Some(&user.token))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["ok"], false);
    }

    #[tokio::test]
    async fn test_concurrent_submissions_keep_maximum() {
        let store: Arc<dyn ScoreStore> = Arc::new(MemoryScoreStore::default());
        let service = Arc::new(ScoreService::new(store.clone(), "bimo".to_string()));
        let identity = Identity {
            id: "racer".to_string(),
            email: "racer@example.com".to_string(),
            name: "Racer".to_string(),
        };

        let mut handles = Vec::new();
        for score in [13, 2, 40, 7, 39, 0, 25, 40, 11, 31, 5, 38] {
            let service = service.clone();
            let identity = identity.clone();
            handles.push(tokio::spawn(async move {
                service.submit(&identity, &ScoreSubmission::new(score).for_quiz("race")).await
            }));
        }
        for handle in handles {
            let stored = handle.await.unwrap().unwrap();
            assert!(stored.score >= 0);
        }

        let stored = store.find("racer", "race").await.unwrap().unwrap();
        assert_eq!(stored.score, 40);
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_best_reports_not_found() {
        let store: Arc<dyn ScoreStore> = Arc::new(MemoryScoreStore::default());
        let service = ScoreService::new(store, "bimo".to_string());

        let err = service.best("ghost", "java").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound));
    }

    #[test]
    fn test_parse_score() {
        assert_eq!(parse_score(&json!(0)).unwrap(), 0);
        assert_eq!(parse_score(&json!(95)).unwrap(), 95);
        assert!(matches!(parse_score(&json!(-1)), Err(ServiceError::InvalidInput(_))));
        assert!(matches!(parse_score(&json!(1.5)), Err(ServiceError::InvalidInput(_))));
        assert!(matches!(parse_score(&json!("3")), Err(ServiceError::InvalidInput(_))));
    }

    #[test]
    fn test_resolve_quiz_id() {
        assert_eq!(resolve_quiz_id(None, "bimo").unwrap(), "bimo");
        assert_eq!(resolve_quiz_id(Some(" java "), "bimo").unwrap(), "java");
        assert_eq!(resolve_quiz_id(Some("web-dev_2"), "bimo").unwrap(), "web-dev_2");
        assert!(resolve_quiz_id(Some("Overall"), "bimo").is_err());
        assert!(resolve_quiz_id(Some("no spaces"), "bimo").is_err());
        assert!(resolve_quiz_id(Some(&"q".repeat(65)), "bimo").is_err());
    }
}
