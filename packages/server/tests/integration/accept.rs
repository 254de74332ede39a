use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use server::entity::answer;

use crate::common::{TestApp, cmd};

async fn accepted_answers(app: &TestApp, question_id: i32) -> Vec<i32> {
    answer::Entity::find()
        .filter(answer::Column::QuestionId.eq(question_id))
        .filter(answer::Column::Accepted.eq(true))
        .all(&app.db)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.id)
        .collect()
}

#[tokio::test]
async fn question_author_accepts_an_answer() {
    let app = TestApp::spawn().await;
    let (asker_id, asker) = app.create_authenticated_user("asker").await;
    let (answerer_id, answerer) = app.create_authenticated_user("answerer").await;
    let qid = app.ask(&asker, "Why does borrowck complain?", "rust").await;
    let aid = app.answer(&answerer, qid, "Because of aliasing.").await;

    let res = app
        .ajax(qid, cmd::ACCEPT_ANSWER, Some(aid), Some(&asker))
        .await;

    assert_eq!(res.body["success"], 1, "{}", res.text);
    assert_eq!(res.body["status"], 0);
    assert_eq!(accepted_answers(&app, qid).await, vec![aid]);
    assert_eq!(app.user(answerer_id).await.reputation, 16);
    assert_eq!(app.user(asker_id).await.reputation, 3);
}

#[tokio::test]
async fn accepting_again_unaccepts() {
    let app = TestApp::spawn().await;
    let (asker_id, asker) = app.create_authenticated_user("asker").await;
    let (answerer_id, answerer) = app.create_authenticated_user("answerer").await;
    let qid = app.ask(&asker, "Why does borrowck complain?", "rust").await;
    let aid = app.answer(&answerer, qid, "Because of aliasing.").await;

    app.ajax(qid, cmd::ACCEPT_ANSWER, Some(aid), Some(&asker))
        .await;
    let res = app
        .ajax(qid, cmd::ACCEPT_ANSWER, Some(aid), Some(&asker))
        .await;

    assert_eq!(res.body["success"], 1);
    assert_eq!(res.body["status"], 1);
    assert!(accepted_answers(&app, qid).await.is_empty());
    assert_eq!(app.user(answerer_id).await.reputation, 1);
    assert_eq!(app.user(asker_id).await.reputation, 1);
}

#[tokio::test]
async fn accepting_another_answer_replaces_the_previous_one() {
    let app = TestApp::spawn().await;
    let (_, asker) = app.create_authenticated_user("asker").await;
    let (first_id, first) = app.create_authenticated_user("first").await;
    let (second_id, second) = app.create_authenticated_user("second").await;
    let qid = app.ask(&asker, "Why does borrowck complain?", "rust").await;
    let a1 = app.answer(&first, qid, "Because of aliasing.").await;
    let a2 = app.answer(&second, qid, "Because of lifetimes.").await;

    app.ajax(qid, cmd::ACCEPT_ANSWER, Some(a1), Some(&asker))
        .await;
    let res = app
        .ajax(qid, cmd::ACCEPT_ANSWER, Some(a2), Some(&asker))
        .await;

    assert_eq!(res.body["success"], 1);
    assert_eq!(accepted_answers(&app, qid).await, vec![a2]);
    assert_eq!(app.user(first_id).await.reputation, 1);
    assert_eq!(app.user(second_id).await.reputation, 16);
}

#[tokio::test]
async fn only_the_question_author_may_accept() {
    let app = TestApp::spawn().await;
    let (_, asker) = app.create_authenticated_user("asker").await;
    let (_, answerer) = app.create_authenticated_user("answerer").await;
    let (_, bystander) = app.create_user_with_reputation("bystander", 5000).await;
    let qid = app.ask(&asker, "Why does borrowck complain?", "rust").await;
    let aid = app.answer(&answerer, qid, "Because of aliasing.").await;

    let res = app
        .ajax(qid, cmd::ACCEPT_ANSWER, Some(aid), Some(&bystander))
        .await;

    assert_eq!(res.body["success"], 0);
    assert_eq!(res.body["allowed"], 0);
    assert_eq!(
        res.body["message"],
        "Sorry, only question owners can accept or unaccept answers"
    );
    assert!(accepted_answers(&app, qid).await.is_empty());
}

#[tokio::test]
async fn cannot_accept_own_answer() {
    let app = TestApp::spawn().await;
    let (_, asker) = app.create_authenticated_user("asker").await;
    let qid = app.ask(&asker, "Why does borrowck complain?", "rust").await;
    let aid = app.answer(&asker, qid, "Answering myself.").await;

    let res = app
        .ajax(qid, cmd::ACCEPT_ANSWER, Some(aid), Some(&asker))
        .await;

    assert_eq!(res.body["success"], 0);
    assert_eq!(res.body["allowed"], -1);
    assert!(accepted_answers(&app, qid).await.is_empty());
}

#[tokio::test]
async fn accepting_notifies_the_answer_author() {
    let app = TestApp::spawn().await;
    let (_, asker) = app.create_authenticated_user("asker").await;
    let (_, answerer) = app.create_authenticated_user("answerer").await;
    let qid = app.ask(&asker, "Why does borrowck complain?", "rust").await;
    let aid = app.answer(&answerer, qid, "Because of aliasing.").await;

    app.ajax(qid, cmd::ACCEPT_ANSWER, Some(aid), Some(&asker))
        .await;
    let res = app
        .get_with_token(crate::common::routes::NOTIFICATIONS, &answerer)
        .await;

    assert_eq!(res.status, 200);
    let types: Vec<&str> = res.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["activity_type"].as_str().unwrap())
        .collect();
    assert!(types.contains(&"mark_answer"), "{types:?}");
}
