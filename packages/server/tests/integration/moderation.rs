use ::common::UserStatus;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::json;
use server::entity::{answer, question, tag};

use crate::common::{TestApp, cmd, routes};

async fn used_count(app: &TestApp, name: &str) -> i32 {
    tag::Entity::find()
        .filter(tag::Column::Name.eq(name))
        .one(&app.db)
        .await
        .unwrap()
        .unwrap()
        .used_count
}

mod removal {
    use super::*;

    #[tokio::test]
    async fn author_removes_and_restores_own_question() {
        let app = TestApp::spawn().await;
        let (_, asker) = app.create_authenticated_user("asker").await;
        let qid = app.ask(&asker, "Obsolete question", "misc").await;

        let removed = app
            .ajax(qid, cmd::REMOVE_QUESTION, None, Some(&asker))
            .await;
        assert_eq!(removed.body["success"], 1, "{}", removed.text);
        assert_eq!(removed.body["status"], 0);
        let q = question::Entity::find_by_id(qid).one(&app.db).await.unwrap().unwrap();
        assert!(q.deleted);
        assert_eq!(used_count(&app, "misc").await, 0);

        let restored = app
            .ajax(qid, cmd::REMOVE_QUESTION, None, Some(&asker))
            .await;
        assert_eq!(restored.body["success"], 1);
        assert_eq!(restored.body["status"], 1);
        let q = question::Entity::find_by_id(qid).one(&app.db).await.unwrap().unwrap();
        assert!(!q.deleted);
        assert_eq!(used_count(&app, "misc").await, 1);
    }

    #[tokio::test]
    async fn removing_others_answer_needs_reputation() {
        let app = TestApp::spawn().await;
        let (_, asker) = app.create_authenticated_user("asker").await;
        let (_, answerer) = app.create_authenticated_user("answerer").await;
        let (veteran_id, veteran) = app.create_user_with_reputation("veteran", 1999).await;
        let qid = app.ask(&asker, "Obsolete question", "misc").await;
        let aid = app.answer(&answerer, qid, "Obsolete answer").await;

        let denied = app
            .ajax(qid, cmd::REMOVE_ANSWER, Some(aid), Some(&asker))
            .await;
        assert_eq!(denied.body["success"], 0);
        assert_eq!(denied.body["allowed"], -2);

        app.set_reputation(veteran_id, 2000).await;
        let removed = app
            .ajax(qid, cmd::REMOVE_ANSWER, Some(aid), Some(&veteran))
            .await;
        assert_eq!(removed.body["success"], 1, "{}", removed.text);
        let a = answer::Entity::find_by_id(aid).one(&app.db).await.unwrap().unwrap();
        assert!(a.deleted);
        assert_eq!(a.deleted_by, Some(veteran_id));
    }

    #[tokio::test]
    async fn removal_notifies_the_author() {
        let app = TestApp::spawn().await;
        let (_, asker) = app.create_authenticated_user("asker").await;
        let (mod_id, moderator) = app.create_authenticated_user("moderator").await;
        app.set_status(mod_id, UserStatus::Moderator).await;
        let qid = app.ask(&asker, "Obsolete question", "misc").await;

        app.ajax(qid, cmd::REMOVE_QUESTION, None, Some(&moderator))
            .await;

        let res = app.get_with_token(routes::NOTIFICATIONS, &asker).await;
        assert_eq!(res.body["data"][0]["activity_type"], "delete_question");
    }
}

mod status {
    use super::*;

    #[tokio::test]
    async fn moderator_suspends_a_regular_user() {
        let app = TestApp::spawn().await;
        let (mod_id, moderator) = app.create_authenticated_user("moderator").await;
        app.set_status(mod_id, UserStatus::Moderator).await;
        let (user_id, _) = app.create_authenticated_user("troll").await;

        let res = app
            .patch_with_token(&routes::user_status(user_id), &json!({"status": "s"}), &moderator)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["status"], "s");
        assert_eq!(res.body["status_display"], "Suspended User");
        assert_eq!(app.user(user_id).await.status, UserStatus::Suspended);
    }

    #[tokio::test]
    async fn moderator_cannot_touch_other_staff() {
        let app = TestApp::spawn().await;
        let (mod_id, moderator) = app.create_authenticated_user("moderator").await;
        app.set_status(mod_id, UserStatus::Moderator).await;
        let (other_id, _) = app.create_authenticated_user("othermod").await;
        app.set_status(other_id, UserStatus::Moderator).await;

        let res = app
            .patch_with_token(&routes::user_status(other_id), &json!({"status": "b"}), &moderator)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["message"], "Sorry, you cannot moderate this user");
    }

    #[tokio::test]
    async fn regular_user_cannot_change_status() {
        let app = TestApp::spawn().await;
        let (_, regular) = app.create_user_with_reputation("regular", 10_000).await;
        let (user_id, _) = app.create_authenticated_user("troll").await;

        let res = app
            .patch_with_token(&routes::user_status(user_id), &json!({"status": "b"}), &regular)
            .await;

        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn new_status_revokes_administrator_rights() {
        let app = TestApp::spawn().await;
        let (admin_id, admin) = app.create_authenticated_user("admin").await;
        app.make_administrator(admin_id).await;
        let (other_id, _) = app.create_authenticated_user("exadmin").await;
        app.make_administrator(other_id).await;

        let res = app
            .patch_with_token(&routes::user_status(other_id), &json!({"status": "m"}), &admin)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["is_administrator"], false);
        assert_eq!(res.body["status"], "m");
    }
}

mod reputation {
    use super::*;

    #[tokio::test]
    async fn moderator_adjusts_reputation_with_comment() {
        let app = TestApp::spawn().await;
        let (mod_id, moderator) = app.create_authenticated_user("moderator").await;
        app.set_status(mod_id, UserStatus::Moderator).await;
        let (user_id, _) = app.create_user_with_reputation("helper", 100).await;

        let res = app
            .post_with_token(
                &routes::user_reputation(user_id),
                &json!({"delta": 25, "comment": "Great cleanup work"}),
                &moderator,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["reputation"], 125);
        assert_eq!(res.body["applied"], 25);

        let history = app.get_without_token(&routes::user_reputation(user_id)).await;
        assert_eq!(history.status, 200);
        let latest = &history.body[0];
        assert_eq!(latest["reason"], "moderation");
        assert_eq!(latest["comment"], "Great cleanup work");
        assert_eq!(latest["reputation"], 125);
    }

    #[tokio::test]
    async fn penalty_stops_at_the_floor() {
        let app = TestApp::spawn().await;
        let (mod_id, moderator) = app.create_authenticated_user("moderator").await;
        app.set_status(mod_id, UserStatus::Moderator).await;
        let (user_id, _) = app.create_user_with_reputation("spammer", 50).await;

        let res = app
            .post_with_token(
                &routes::user_reputation(user_id),
                &json!({"delta": -100, "comment": "Spam"}),
                &moderator,
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["reputation"], 1);
        assert_eq!(res.body["applied"], -49);
    }

    #[tokio::test]
    async fn comment_is_required() {
        let app = TestApp::spawn().await;
        let (mod_id, moderator) = app.create_authenticated_user("moderator").await;
        app.set_status(mod_id, UserStatus::Moderator).await;
        let (user_id, _) = app.create_authenticated_user("helper").await;

        let res = app
            .post_with_token(
                &routes::user_reputation(user_id),
                &json!({"delta": 5, "comment": "  "}),
                &moderator,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn history_of_unknown_user_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(&routes::user_reputation(9999)).await;

        assert_eq!(res.status, 404);
    }
}
