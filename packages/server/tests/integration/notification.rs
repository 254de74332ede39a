use std::time::Duration;

use ::common::ActivityType;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;
use server::entity::activity;

use crate::common::{TestApp, routes};

async fn receipts_for(app: &TestApp, user_id: i32) -> u64 {
    activity::Entity::find()
        .filter(activity::Column::ActivityType.eq(ActivityType::EmailUpdateSent))
        .filter(activity::Column::UserId.eq(user_id))
        .count(&app.db)
        .await
        .unwrap()
}

/// Receipts are written after the send, so poll until `n` show up.
async fn wait_for_receipts(app: &TestApp, user_id: i32, n: u64) -> u64 {
    for _ in 0..50 {
        let count = receipts_for(app, user_id).await;
        if count >= n {
            return count;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    receipts_for(app, user_id).await
}

fn activity_types(body: &serde_json::Value) -> Vec<String> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["activity_type"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn answer_notifies_and_emails_the_asker() {
    let app = TestApp::spawn().await;
    let (asker_id, asker) = app.create_authenticated_user("asker").await;
    let (_, answerer) = app.create_authenticated_user("answerer").await;
    let qid = app.ask(&asker, "What does Send mean?", "rust").await;

    app.answer(&answerer, qid, "It can move across threads.").await;

    let res = app.get_with_token(routes::NOTIFICATIONS, &asker).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["response_count"], 1);
    assert_eq!(res.body["data"][0]["activity_type"], "answer");
    assert_eq!(res.body["data"][0]["question_id"], qid);

    let emails = app.wait_for_emails(1).await;
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].recipient_id, asker_id);
    assert_eq!(emails[0].to, "asker@example.com");
    assert!(emails[0].subject.contains("What does Send mean?"), "{}", emails[0].subject);
}

#[tokio::test]
async fn actor_is_not_notified_of_own_activity() {
    let app = TestApp::spawn().await;
    let (_, asker) = app.create_authenticated_user("asker").await;
    let qid = app.ask(&asker, "What does Send mean?", "rust").await;

    app.post_with_token(&routes::question_comments(qid), &json!({"body": "Clarifying."}), &asker)
        .await;

    let res = app.get_with_token(routes::NOTIFICATIONS, &asker).await;
    assert_eq!(res.body["response_count"], 0);
    assert!(res.body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn viewing_the_question_consumes_responses() {
    let app = TestApp::spawn().await;
    let (_, asker) = app.create_authenticated_user("asker").await;
    let (_, answerer) = app.create_authenticated_user("answerer").await;
    let qid = app.ask(&asker, "What does Send mean?", "rust").await;
    let aid = app.answer(&answerer, qid, "It can move across threads.").await;
    app.post_with_token(&routes::answer_comments(aid), &json!({"body": "And Sync?"}), &answerer)
        .await;

    let before = app.get_with_token(routes::NOTIFICATIONS, &asker).await;
    assert_eq!(before.body["response_count"], 2);

    let view = app.get_with_token(&routes::question(qid), &asker).await;
    assert_eq!(view.status, 200);

    let after = app.get_with_token(routes::NOTIFICATIONS, &asker).await;
    assert_eq!(after.body["response_count"], 0);
    assert!(after.body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn anonymous_view_changes_nothing() {
    let app = TestApp::spawn().await;
    let (_, asker) = app.create_authenticated_user("asker").await;
    let (_, answerer) = app.create_authenticated_user("answerer").await;
    let qid = app.ask(&asker, "What does Send mean?", "rust").await;
    app.answer(&answerer, qid, "It can move across threads.").await;

    let view = app.get_without_token(&routes::question(qid)).await;
    assert_eq!(view.status, 200);

    let res = app.get_with_token(routes::NOTIFICATIONS, &asker).await;
    assert_eq!(res.body["response_count"], 1);
}

#[tokio::test]
async fn notifications_require_login() {
    let app = TestApp::spawn().await;

    let res = app.get_without_token(routes::NOTIFICATIONS).await;

    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "TOKEN_MISSING");
}

#[tokio::test]
async fn failed_send_does_not_stop_the_fan_out() {
    let app = TestApp::spawn().await;
    let (asker_id, asker) = app.create_authenticated_user("asker").await;
    let (first_id, first) = app.create_authenticated_user("first").await;
    let (_, second) = app.create_authenticated_user("second").await;
    let qid = app.ask(&asker, "What does Send mean?", "rust").await;
    app.answer(&first, qid, "It can move across threads.").await;
    assert_eq!(wait_for_receipts(&app, asker_id, 1).await, 1);

    app.mailer.reject("asker@example.com");
    app.answer(&second, qid, "Also see the Sync docs.").await;

    assert_eq!(wait_for_receipts(&app, first_id, 1).await, 1);
    let emails = app.sent_emails();
    assert_eq!(emails.len(), 2);
    assert_eq!(emails[1].recipient_id, first_id);
    assert_eq!(receipts_for(&app, asker_id).await, 1);
}

mod mentions {
    use super::*;

    #[tokio::test]
    async fn bystander_mentioned_in_an_answer_is_notified() {
        let app = TestApp::spawn().await;
        let (_, asker) = app.create_authenticated_user("asker").await;
        let (_, answerer) = app.create_authenticated_user("answerer").await;
        let (_, bystander) = app.create_authenticated_user("bystander").await;
        let qid = app.ask(&asker, "What does Send mean?", "rust").await;

        app.answer(&answerer, qid, "@bystander knows this, ask @nobody too.")
            .await;

        let res = app.get_with_token(routes::NOTIFICATIONS, &bystander).await;
        assert_eq!(res.body["response_count"], 1, "{}", res.text);
        assert_eq!(activity_types(&res.body), vec!["mention"]);
    }

    #[tokio::test]
    async fn mentioning_a_receiver_counts_once() {
        let app = TestApp::spawn().await;
        let (_, asker) = app.create_authenticated_user("asker").await;
        let (_, commenter) = app.create_authenticated_user("commenter").await;
        let qid = app.ask(&asker, "What does Send mean?", "rust").await;

        let res = app
            .post_with_token(
                &routes::question_comments(qid),
                &json!({"body": "thanks @asker"}),
                &commenter,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);

        let res = app.get_with_token(routes::NOTIFICATIONS, &asker).await;
        assert_eq!(res.body["response_count"], 1);
        let mut types = activity_types(&res.body);
        types.sort();
        assert_eq!(types, vec!["comment_question", "mention"]);
    }

    #[tokio::test]
    async fn edit_keeping_a_mention_does_not_repeat_it() {
        let app = TestApp::spawn().await;
        let (_, asker) = app.create_authenticated_user("asker").await;
        let (_, commenter) = app.create_authenticated_user("commenter").await;
        let qid = app.ask(&asker, "What does Send mean?", "rust").await;
        app.post_with_token(
            &routes::question_comments(qid),
            &json!({"body": "Which crate is this about?"}),
            &commenter,
        )
        .await;

        for body in ["Thanks @commenter, it is tokio.", "Thanks @commenter, it is tokio 1.x."] {
            let res = app
                .patch_with_token(&routes::question(qid), &json!({"body": body}), &asker)
                .await;
            assert_eq!(res.status, 200, "{}", res.text);
        }

        let res = app.get_with_token(routes::NOTIFICATIONS, &commenter).await;
        assert_eq!(res.body["response_count"], 2, "{}", res.text);
        let types = activity_types(&res.body);
        assert_eq!(types.iter().filter(|t| *t == "mention").count(), 1);
        assert_eq!(types.iter().filter(|t| *t == "update_question").count(), 2);
    }
}
