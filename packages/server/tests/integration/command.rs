use ::common::{ForumRules, TagMarkReason};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::json;
use server::entity::{marked_tag, question_follower};

use crate::common::{TestApp, cmd, routes};

mod favorite {
    use super::*;

    #[tokio::test]
    async fn favorite_toggles_and_counts() {
        let app = TestApp::spawn().await;
        let (_, asker) = app.create_authenticated_user("asker").await;
        let (_, fan) = app.create_authenticated_user("fan").await;
        let qid = app.ask(&asker, "Lifetimes in closures", "rust").await;

        let added = app.ajax(qid, cmd::FAVORITE, None, Some(&fan)).await;
        assert_eq!(added.body["success"], 1, "{}", added.text);
        assert_eq!(added.body["count"], 1);
        assert_eq!(added.body["status"], 0);

        let removed = app.ajax(qid, cmd::FAVORITE, None, Some(&fan)).await;
        assert_eq!(removed.body["success"], 1);
        assert_eq!(removed.body["count"], 0);
        assert_eq!(removed.body["status"], 1);
    }

    #[tokio::test]
    async fn favorite_notifies_the_asker() {
        let app = TestApp::spawn().await;
        let (_, asker) = app.create_authenticated_user("asker").await;
        let (_, fan) = app.create_authenticated_user("fan").await;
        let qid = app.ask(&asker, "Lifetimes in closures", "rust").await;

        app.ajax(qid, cmd::FAVORITE, None, Some(&fan)).await;

        let res = app.get_with_token(routes::NOTIFICATIONS, &asker).await;
        assert_eq!(res.body["data"][0]["activity_type"], "favorite");
    }
}

mod subscription {
    use super::*;

    #[tokio::test]
    async fn subscribing_switches_feed_to_daily() {
        let app = TestApp::spawn().await;
        let (_, asker) = app.create_authenticated_user("asker").await;
        let (reader_id, reader) = app.create_authenticated_user("reader").await;
        let qid = app.ask(&asker, "Lifetimes in closures", "rust").await;

        let res = app.ajax(qid, cmd::SUBSCRIBE, None, Some(&reader)).await;

        assert_eq!(res.body["success"], 1, "{}", res.text);
        assert_eq!(res.body["message"], "email update frequency has been set to daily");
        let follows = question_follower::Entity::find_by_id((qid, reader_id))
            .one(&app.db)
            .await
            .unwrap();
        assert!(follows.is_some());

        let again = app.ajax(qid, cmd::SUBSCRIBE, None, Some(&reader)).await;
        assert_eq!(again.body["success"], 1);
        assert_eq!(again.body["message"], "");
    }

    #[tokio::test]
    async fn validation_reminder_only_on_a_new_follow() {
        let app = TestApp::spawn_with_rules(ForumRules {
            email_validation: true,
            ..Default::default()
        })
        .await;
        let (_, asker) = app.create_authenticated_user("asker").await;
        let (_, reader) = app.create_authenticated_user("reader").await;
        let qid = app.ask(&asker, "Lifetimes in closures", "rust").await;

        let first = app.ajax(qid, cmd::SUBSCRIBE, None, Some(&reader)).await;
        assert_eq!(first.body["success"], 1, "{}", first.text);
        assert_eq!(
            first.body["message"],
            "Your subscription is saved, but email address needs to be validated<br/>email update frequency has been set to daily"
        );

        let again = app.ajax(qid, cmd::SUBSCRIBE, None, Some(&reader)).await;
        assert_eq!(again.body["success"], 1);
        assert_eq!(again.body["message"], "");
    }

    #[tokio::test]
    async fn unsubscribing_stops_following() {
        let app = TestApp::spawn().await;
        let (_, asker) = app.create_authenticated_user("asker").await;
        let (reader_id, reader) = app.create_authenticated_user("reader").await;
        let qid = app.ask(&asker, "Lifetimes in closures", "rust").await;
        app.ajax(qid, cmd::SUBSCRIBE, None, Some(&reader)).await;

        let res = app.ajax(qid, cmd::UNSUBSCRIBE, None, Some(&reader)).await;

        assert_eq!(res.body["success"], 1, "{}", res.text);
        let follows = question_follower::Entity::find_by_id((qid, reader_id))
            .one(&app.db)
            .await
            .unwrap();
        assert!(follows.is_none());
    }
}

mod tag_marks {
    use super::*;

    async fn mark_of(app: &TestApp, user_id: i32) -> Option<TagMarkReason> {
        marked_tag::Entity::find()
            .filter(marked_tag::Column::UserId.eq(user_id))
            .one(&app.db)
            .await
            .unwrap()
            .map(|m| m.reason)
    }

    #[tokio::test]
    async fn marking_sets_and_clears_a_tag() {
        let app = TestApp::spawn().await;
        let (user_id, token) = app.create_authenticated_user("reader").await;
        app.ask(&token, "Lifetimes in closures", "rust").await;

        let res = app
            .post_with_token(
                &routes::tag_mark("rust"),
                &json!({"action": "add", "reason": "good"}),
                &token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body, json!(""));
        assert_eq!(mark_of(&app, user_id).await, Some(TagMarkReason::Good));

        app.post_with_token(
            &routes::tag_mark("rust"),
            &json!({"action": "add", "reason": "bad"}),
            &token,
        )
        .await;
        assert_eq!(mark_of(&app, user_id).await, Some(TagMarkReason::Bad));

        app.post_with_token(&routes::tag_mark("rust"), &json!({"action": "remove"}), &token)
            .await;
        assert_eq!(mark_of(&app, user_id).await, None);
    }

    #[tokio::test]
    async fn unknown_tag_is_ignored() {
        let app = TestApp::spawn().await;
        let (user_id, token) = app.create_authenticated_user("reader").await;

        let res = app
            .post_with_token(
                &routes::tag_mark("nonexistent"),
                &json!({"action": "add", "reason": "good"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(mark_of(&app, user_id).await, None);
    }
}

mod commands {
    use super::*;

    #[tokio::test]
    async fn toggle_ignored_questions_flips() {
        let app = TestApp::spawn().await;
        let (user_id, token) = app.create_authenticated_user("reader").await;
        let body = json!({"command": "toggle-ignored-questions"});

        let first = app.post_with_token(routes::COMMANDS, &body, &token).await;
        assert_eq!(first.status, 200, "{}", first.text);
        assert_eq!(first.body, json!(true));
        assert!(app.user(user_id).await.hide_ignored_questions);

        let second = app.post_with_token(routes::COMMANDS, &body, &token).await;
        assert_eq!(second.body, json!(false));
    }

    #[tokio::test]
    async fn unknown_command_is_forbidden() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_authenticated_user("reader").await;

        let res = app
            .post_with_token(routes::COMMANDS, &json!({"command": "self-destruct"}), &token)
            .await;
        assert_eq!(res.status, 403);

        let res = app.post_with_token(routes::COMMANDS, &json!({}), &token).await;
        assert_eq!(res.status, 403);
    }
}

mod messages {
    use super::*;

    #[tokio::test]
    async fn read_requires_formdata_marker() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form(routes::MESSAGES_READ, &[("formdata", "maybe")], None)
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn anonymous_read_is_a_noop() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form(routes::MESSAGES_READ, &[("formdata", "required")], None)
            .await;

        assert_eq!(res.status, 200);
    }

    #[tokio::test]
    async fn reading_clears_pending_messages() {
        let app = TestApp::spawn().await;
        let (admin_id, admin) = app.create_authenticated_user("admin").await;
        app.make_administrator(admin_id).await;
        let (user_id, token) = app.create_authenticated_user("reader").await;
        app.post_with_token(&routes::badge_awards(1), &json!({"user_id": user_id}), &admin)
            .await;

        let before = app.get_with_token(routes::MESSAGES, &token).await;
        assert_eq!(before.body.as_array().unwrap().len(), 1, "{}", before.text);

        let res = app
            .post_form(routes::MESSAGES_READ, &[("formdata", "required")], Some(&token))
            .await;
        assert_eq!(res.status, 200);

        let after = app.get_with_token(routes::MESSAGES, &token).await;
        assert!(after.body.as_array().unwrap().is_empty());
    }
}
