use chrono::{Duration, Utc};
use ::common::{ForumRules, PostKind, VoteDirection};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use server::entity::vote;

use crate::common::{TestApp, TestResponse, cmd, routes};

async fn votes_on(app: &TestApp, kind: PostKind, post_id: i32) -> u64 {
    vote::Entity::find()
        .filter(vote::Column::PostKind.eq(kind))
        .filter(vote::Column::PostId.eq(post_id))
        .count(&app.db)
        .await
        .unwrap()
}

mod gating {
    use super::*;

    #[tokio::test]
    async fn low_reputation_user_cannot_upvote() {
        let app = TestApp::spawn().await;
        let (_, asker) = app.create_authenticated_user("asker").await;
        let (_, voter) = app.create_authenticated_user("voter").await;
        let qid = app.ask(&asker, "How do lifetimes work?", "rust").await;

        let res = app.ajax(qid, cmd::QUESTION_UP, None, Some(&voter)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["allowed"], -2);
        assert_eq!(res.body["success"], 0);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
        assert_eq!(res.body["message"], ">15 points required to upvote");
        assert_eq!(votes_on(&app, PostKind::Question, qid).await, 0);
    }

    #[tokio::test]
    async fn downvoting_needs_more_reputation_than_upvoting() {
        let app = TestApp::spawn().await;
        let (_, asker) = app.create_authenticated_user("asker").await;
        let (_, voter) = app.create_user_with_reputation("voter", 50).await;
        let qid = app.ask(&asker, "How do lifetimes work?", "rust").await;

        let res = app.ajax(qid, cmd::QUESTION_DOWN, None, Some(&voter)).await;

        assert_eq!(res.body["allowed"], -2);
        assert_eq!(res.body["message"], ">100 points required to downvote");
    }

    #[tokio::test]
    async fn moderator_votes_regardless_of_reputation() {
        let app = TestApp::spawn().await;
        let (_, asker) = app.create_authenticated_user("asker").await;
        let (mod_id, moderator) = app.create_authenticated_user("moderator").await;
        app.set_status(mod_id, ::common::UserStatus::Moderator).await;
        let qid = app.ask(&asker, "How do lifetimes work?", "rust").await;

        let res = app.ajax(qid, cmd::QUESTION_DOWN, None, Some(&moderator)).await;

        assert_eq!(res.body["success"], 1, "{}", res.text);
        assert_eq!(res.body["count"], -1);
    }

    #[tokio::test]
    async fn cannot_vote_on_own_post() {
        let app = TestApp::spawn().await;
        let (asker_id, asker) = app.create_authenticated_user("asker").await;
        app.set_reputation(asker_id, 500).await;
        let qid = app.ask(&asker, "How do lifetimes work?", "rust").await;

        let res = app.ajax(qid, cmd::QUESTION_UP, None, Some(&asker)).await;

        assert_eq!(res.body["allowed"], -1);
        assert_eq!(res.body["success"], 0);
        assert_eq!(res.body["message"], "cannot vote for own posts");
    }

    #[tokio::test]
    async fn anonymous_caller_is_told_to_log_in() {
        let app = TestApp::spawn().await;
        let (_, asker) = app.create_authenticated_user("asker").await;
        let qid = app.ask(&asker, "How do lifetimes work?", "rust").await;

        let res = app.ajax(qid, cmd::QUESTION_UP, None, None).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["allowed"], 0);
        assert_eq!(res.body["success"], 0);
        assert_eq!(res.body["message"], "Sorry, anonymous users cannot vote");
    }

    #[tokio::test]
    async fn blocked_user_cannot_vote() {
        let app = TestApp::spawn().await;
        let (_, asker) = app.create_authenticated_user("asker").await;
        let (voter_id, voter) = app.create_user_with_reputation("voter", 500).await;
        app.set_status(voter_id, ::common::UserStatus::Blocked).await;
        let qid = app.ask(&asker, "How do lifetimes work?", "rust").await;

        let res = app.ajax(qid, cmd::QUESTION_UP, None, Some(&voter)).await;

        assert_eq!(res.body["allowed"], 0);
        assert_eq!(res.body["success"], 0);
        assert!(
            res.body["message"]
                .as_str()
                .unwrap()
                .contains("blocked and you cannot vote")
        );
    }
}

mod envelope {
    use super::*;

    #[tokio::test]
    async fn request_without_ajax_header_is_refused() {
        let app = TestApp::spawn().await;
        let (_, asker) = app.create_authenticated_user("asker").await;
        let (_, voter) = app.create_user_with_reputation("voter", 500).await;
        let qid = app.ask(&asker, "How do lifetimes work?", "rust").await;

        let res = app
            .post_form(&routes::question_vote(qid), &[("type", "1")], Some(&voter))
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["success"], 0);
        assert_eq!(res.body["message"], "Sorry, something is not right here...");
        assert_eq!(votes_on(&app, PostKind::Question, qid).await, 0);
    }

    #[tokio::test]
    async fn unknown_command_code_is_not_supported() {
        let app = TestApp::spawn().await;
        let (_, asker) = app.create_authenticated_user("asker").await;
        let qid = app.ask(&asker, "How do lifetimes work?", "rust").await;

        let res = app.ajax(qid, 3, None, Some(&asker)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["success"], 0);
        assert_eq!(
            res.body["message"],
            "Request mode is not supported. Please try again."
        );
    }

    #[tokio::test]
    async fn successful_vote_uses_default_envelope_fields() {
        let app = TestApp::spawn().await;
        let (_, asker) = app.create_authenticated_user("asker").await;
        let (_, voter) = app.create_user_with_reputation("voter", 500).await;
        let qid = app.ask(&asker, "How do lifetimes work?", "rust").await;

        let res = app.ajax(qid, cmd::QUESTION_UP, None, Some(&voter)).await;

        assert_eq!(
            res.body,
            serde_json::json!({"allowed": 1, "success": 1, "status": 0, "count": 1, "message": ""})
        );
    }

    #[tokio::test]
    async fn missing_question_reports_not_found_in_envelope() {
        let app = TestApp::spawn().await;
        let (_, voter) = app.create_user_with_reputation("voter", 500).await;

        let res: TestResponse = app.ajax(9999, cmd::QUESTION_UP, None, Some(&voter)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["success"], 0);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod transitions {
    use super::*;

    #[tokio::test]
    async fn upvote_raises_score_and_author_reputation() {
        let app = TestApp::spawn().await;
        let (asker_id, asker) = app.create_authenticated_user("asker").await;
        let (_, voter) = app.create_user_with_reputation("voter", 500).await;
        let qid = app.ask(&asker, "How do lifetimes work?", "rust").await;

        let res = app.ajax(qid, cmd::QUESTION_UP, None, Some(&voter)).await;

        assert_eq!(res.body["count"], 1);
        assert_eq!(app.user(asker_id).await.reputation, 11);
    }

    #[tokio::test]
    async fn repeating_a_vote_cancels_it() {
        let app = TestApp::spawn().await;
        let (asker_id, asker) = app.create_authenticated_user("asker").await;
        let (_, voter) = app.create_user_with_reputation("voter", 500).await;
        let qid = app.ask(&asker, "How do lifetimes work?", "rust").await;

        app.ajax(qid, cmd::QUESTION_UP, None, Some(&voter)).await;
        let res = app.ajax(qid, cmd::QUESTION_UP, None, Some(&voter)).await;

        assert_eq!(res.body["success"], 1);
        assert_eq!(res.body["status"], 1);
        assert_eq!(res.body["count"], 0);
        assert_eq!(votes_on(&app, PostKind::Question, qid).await, 0);
        assert_eq!(app.user(asker_id).await.reputation, 1);
    }

    #[tokio::test]
    async fn opposite_vote_flips_the_single_vote_row() {
        let app = TestApp::spawn().await;
        let (_, asker) = app.create_authenticated_user("asker").await;
        let (voter_id, voter) = app.create_user_with_reputation("voter", 500).await;
        let qid = app.ask(&asker, "How do lifetimes work?", "rust").await;

        app.ajax(qid, cmd::QUESTION_UP, None, Some(&voter)).await;
        let res = app.ajax(qid, cmd::QUESTION_DOWN, None, Some(&voter)).await;

        assert_eq!(res.body["success"], 1);
        assert_eq!(res.body["status"], 0);
        assert_eq!(res.body["count"], -1);
        let rows = vote::Entity::find()
            .filter(vote::Column::UserId.eq(voter_id))
            .all(&app.db)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].direction, VoteDirection::Down);
    }

    #[tokio::test]
    async fn downvote_costs_the_voter_one_point() {
        let app = TestApp::spawn().await;
        let (_, asker) = app.create_authenticated_user("asker").await;
        let (voter_id, voter) = app.create_user_with_reputation("voter", 500).await;
        let qid = app.ask(&asker, "How do lifetimes work?", "rust").await;

        app.ajax(qid, cmd::QUESTION_DOWN, None, Some(&voter)).await;

        assert_eq!(app.user(voter_id).await.reputation, 499);
    }

    #[tokio::test]
    async fn answer_votes_target_the_post_id() {
        let app = TestApp::spawn().await;
        let (_, asker) = app.create_authenticated_user("asker").await;
        let (answerer_id, answerer) = app.create_authenticated_user("answerer").await;
        let (_, voter) = app.create_user_with_reputation("voter", 500).await;
        let qid = app.ask(&asker, "How do lifetimes work?", "rust").await;
        let aid = app.answer(&answerer, qid, "They track borrows.").await;

        let res = app
            .ajax(qid, cmd::ANSWER_UP, Some(aid), Some(&voter))
            .await;

        assert_eq!(res.body["count"], 1);
        assert_eq!(votes_on(&app, PostKind::Answer, aid).await, 1);
        assert_eq!(votes_on(&app, PostKind::Question, qid).await, 0);
        assert_eq!(app.user(answerer_id).await.reputation, 11);
    }

    #[tokio::test]
    async fn answer_vote_without_post_id_is_a_validation_error() {
        let app = TestApp::spawn().await;
        let (_, asker) = app.create_authenticated_user("asker").await;
        let (_, voter) = app.create_user_with_reputation("voter", 500).await;
        let qid = app.ask(&asker, "How do lifetimes work?", "rust").await;

        let res = app.ajax(qid, cmd::ANSWER_UP, None, Some(&voter)).await;

        assert_eq!(res.body["success"], 0);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn old_vote_cannot_be_revoked() {
        let app = TestApp::spawn().await;
        let (_, asker) = app.create_authenticated_user("asker").await;
        let (voter_id, voter) = app.create_user_with_reputation("voter", 500).await;
        let qid = app.ask(&asker, "How do lifetimes work?", "rust").await;

        vote::ActiveModel {
            user_id: Set(voter_id),
            post_kind: Set(PostKind::Question),
            post_id: Set(qid),
            direction: Set(VoteDirection::Up),
            voted_at: Set(Utc::now() - Duration::days(2)),
            ..Default::default()
        }
        .insert(&app.db)
        .await
        .unwrap();

        let res = app.ajax(qid, cmd::QUESTION_UP, None, Some(&voter)).await;

        assert_eq!(res.body["success"], 0);
        assert_eq!(res.body["status"], 2);
        assert_eq!(res.body["message"], "cannot revoke old vote");
        assert_eq!(votes_on(&app, PostKind::Question, qid).await, 1);
    }
}

mod quota {
    use super::*;

    #[tokio::test]
    async fn daily_vote_quota_is_enforced_with_warning() {
        let app = TestApp::spawn_with_rules(ForumRules {
            max_votes_per_user_per_day: 2,
            votes_left_warning_threshold: 5,
            ..Default::default()
        })
        .await;
        let (_, asker) = app.create_authenticated_user("asker").await;
        let (_, voter) = app.create_user_with_reputation("voter", 500).await;
        let q1 = app.ask(&asker, "First question here", "rust").await;
        let q2 = app.ask(&asker, "Second question here", "rust").await;
        let q3 = app.ask(&asker, "Third question here", "rust").await;

        let first = app.ajax(q1, cmd::QUESTION_UP, None, Some(&voter)).await;
        assert_eq!(first.body["message"], "You have 1 votes left for today");
        let second = app.ajax(q2, cmd::QUESTION_UP, None, Some(&voter)).await;
        assert_eq!(second.body["message"], "You have 0 votes left for today");

        let third = app.ajax(q3, cmd::QUESTION_UP, None, Some(&voter)).await;
        assert_eq!(third.body["allowed"], -3);
        assert_eq!(third.body["success"], 0);
        assert_eq!(third.body["message"], "Sorry you ran out of votes for today");
    }

    #[tokio::test]
    async fn canceling_does_not_use_quota() {
        let app = TestApp::spawn_with_rules(ForumRules {
            max_votes_per_user_per_day: 1,
            ..Default::default()
        })
        .await;
        let (_, asker) = app.create_authenticated_user("asker").await;
        let (_, voter) = app.create_user_with_reputation("voter", 500).await;
        let qid = app.ask(&asker, "How do lifetimes work?", "rust").await;

        app.ajax(qid, cmd::QUESTION_UP, None, Some(&voter)).await;
        let res = app.ajax(qid, cmd::QUESTION_UP, None, Some(&voter)).await;

        assert_eq!(res.body["success"], 1);
        assert_eq!(res.body["status"], 1);
    }
}

mod concurrency {
    use super::*;

    #[tokio::test]
    async fn crossed_downvotes_all_succeed() {
        let app = TestApp::spawn().await;
        let (alice_id, alice) = app.create_user_with_reputation("alice", 1000).await;
        let (bob_id, bob) = app.create_user_with_reputation("bob", 1000).await;

        for round in 0..10 {
            let by_alice = app
                .ask(&alice, &format!("Alice asks question number {round}"), "rust")
                .await;
            let by_bob = app
                .ask(&bob, &format!("Bob asks question number {round}"), "rust")
                .await;

            let (from_alice, from_bob) = tokio::join!(
                app.ajax(by_bob, cmd::QUESTION_DOWN, None, Some(&alice)),
                app.ajax(by_alice, cmd::QUESTION_DOWN, None, Some(&bob)),
            );
            assert_eq!(from_alice.body["success"], 1, "{}", from_alice.text);
            assert_eq!(from_bob.body["success"], 1, "{}", from_bob.text);
        }

        // Ten downvotes received at -2 and ten cast at -1 each.
        assert_eq!(app.user(alice_id).await.reputation, 970);
        assert_eq!(app.user(bob_id).await.reputation, 970);
    }
}
