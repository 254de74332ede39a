use ::common::ForumRules;
use sea_orm::EntityTrait;
use server::entity::{answer, question};

use crate::common::{TestApp, cmd};

/// Register `n` flaggers with enough reputation and return their tokens.
async fn flaggers(app: &TestApp, n: usize) -> Vec<String> {
    let mut tokens = Vec::with_capacity(n);
    for i in 0..n {
        let (_, token) = app
            .create_user_with_reputation(&format!("flagger{i}"), 100)
            .await;
        tokens.push(token);
    }
    tokens
}

#[tokio::test]
async fn flag_counts_and_costs_the_author_reputation() {
    let app = TestApp::spawn().await;
    let (asker_id, asker) = app.create_authenticated_user("asker").await;
    app.set_reputation(asker_id, 500).await;
    let qid = app.ask(&asker, "Buy cheap watches here", "spam").await;
    let tokens = flaggers(&app, 1).await;

    let res = app
        .ajax(qid, cmd::FLAG_QUESTION, None, Some(&tokens[0]))
        .await;

    assert_eq!(res.body["success"], 1, "{}", res.text);
    assert_eq!(res.body["count"], 1);
    assert_eq!(app.user(asker_id).await.reputation, 498);
}

#[tokio::test]
async fn flagging_twice_reports_already_flagged() {
    let app = TestApp::spawn().await;
    let (_, asker) = app.create_authenticated_user("asker").await;
    let qid = app.ask(&asker, "Buy cheap watches here", "spam").await;
    let tokens = flaggers(&app, 1).await;

    app.ajax(qid, cmd::FLAG_QUESTION, None, Some(&tokens[0]))
        .await;
    let res = app
        .ajax(qid, cmd::FLAG_QUESTION, None, Some(&tokens[0]))
        .await;

    assert_eq!(res.body["success"], 1);
    assert_eq!(res.body["status"], 1);
    let q = question::Entity::find_by_id(qid)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(q.offensive_flag_count, 1);
}

#[tokio::test]
async fn low_reputation_user_cannot_flag() {
    let app = TestApp::spawn().await;
    let (_, asker) = app.create_authenticated_user("asker").await;
    let (_, newbie) = app.create_authenticated_user("newbie").await;
    let qid = app.ask(&asker, "Buy cheap watches here", "spam").await;

    let res = app
        .ajax(qid, cmd::FLAG_QUESTION, None, Some(&newbie))
        .await;

    assert_eq!(res.body["success"], 0);
    assert_eq!(res.body["allowed"], -2);
}

#[tokio::test]
async fn daily_flag_quota_is_checked_first() {
    let app = TestApp::spawn_with_rules(ForumRules {
        max_flags_per_user_per_day: 1,
        ..Default::default()
    })
    .await;
    let (_, asker) = app.create_authenticated_user("asker").await;
    let q1 = app.ask(&asker, "Buy cheap watches here", "spam").await;
    let q2 = app.ask(&asker, "Buy cheap shoes here", "spam").await;
    let tokens = flaggers(&app, 1).await;

    app.ajax(q1, cmd::FLAG_QUESTION, None, Some(&tokens[0]))
        .await;
    let res = app
        .ajax(q2, cmd::FLAG_QUESTION, None, Some(&tokens[0]))
        .await;

    assert_eq!(res.body["success"], 0);
    assert_eq!(res.body["allowed"], -3);
    assert_eq!(res.body["message"], "Sorry you ran out of flags for today");
}

#[tokio::test]
async fn hide_threshold_costs_thirty_extra_points() {
    let app = TestApp::spawn().await;
    let (asker_id, asker) = app.create_authenticated_user("asker").await;
    app.set_reputation(asker_id, 500).await;
    let qid = app.ask(&asker, "Buy cheap watches here", "spam").await;

    for token in flaggers(&app, 3).await {
        app.ajax(qid, cmd::FLAG_QUESTION, None, Some(&token)).await;
    }

    assert_eq!(app.user(asker_id).await.reputation, 500 - 3 * 2 - 30);
}

#[tokio::test]
async fn delete_threshold_removes_the_answer() {
    let app = TestApp::spawn().await;
    let (_, asker) = app.create_authenticated_user("asker").await;
    let (answerer_id, answerer) = app.create_authenticated_user("answerer").await;
    app.set_reputation(answerer_id, 500).await;
    let qid = app.ask(&asker, "Where can I buy watches?", "shopping").await;
    let aid = app.answer(&answerer, qid, "Buy cheap watches here").await;

    let mut last = None;
    for token in flaggers(&app, 5).await {
        last = Some(
            app.ajax(qid, cmd::FLAG_ANSWER, Some(aid), Some(&token))
                .await,
        );
    }

    assert_eq!(last.unwrap().body["count"], 5);
    let a = answer::Entity::find_by_id(aid)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert!(a.deleted);
    assert_eq!(app.user(answerer_id).await.reputation, 500 - 5 * 2 - 30 - 100);
    let q = question::Entity::find_by_id(qid)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(q.answer_count, 0);
}

#[tokio::test]
async fn flagged_author_is_notified() {
    let app = TestApp::spawn().await;
    let (_, asker) = app.create_authenticated_user("asker").await;
    let qid = app.ask(&asker, "Buy cheap watches here", "spam").await;
    let tokens = flaggers(&app, 1).await;

    app.ajax(qid, cmd::FLAG_QUESTION, None, Some(&tokens[0]))
        .await;
    let res = app
        .get_with_token(crate::common::routes::NOTIFICATIONS, &asker)
        .await;

    let types: Vec<&str> = res.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["activity_type"].as_str().unwrap())
        .collect();
    assert_eq!(types, vec!["mark_offensive"]);
}
