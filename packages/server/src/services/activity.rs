//! Activity log and fan-out to receivers.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use common::email_feed::{FeedContext, wants_instant_email};
use common::{ActivityType, EmailFrequency, FeedType, ForumRules, PostKind, TargetKind};
use sea_orm::prelude::Expr;
use sea_orm::*;

use crate::entity::{
    activity, activity_recipient, answer, comment, email_feed_setting, question, question_follower,
    user,
};
use crate::services::notify::OutgoingEmail;
use crate::utils::mention::added_mentions;

/// An activity about to be written.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub actor_id: i32,
    pub activity_type: ActivityType,
    pub target_kind: TargetKind,
    pub target_id: i32,
    pub question_id: Option<i32>,
    /// Users to notify; the actor is filtered out.
    pub receivers: Vec<i32>,
}

/// A new or edited question, answer or comment.
#[derive(Debug, Clone)]
pub struct PostUpdate<'q> {
    pub actor_id: i32,
    pub activity_type: ActivityType,
    pub target_kind: TargetKind,
    pub target_id: i32,
    pub question: &'q question::Model,
    /// Post the update touches: the post itself, or the commented post.
    pub post_kind: PostKind,
    pub post_id: i32,
    pub post_author_id: i32,
    /// Text scanned for `@username` mentions.
    pub text: &'q str,
    /// Text before an edit; names it already mentioned are not notified again.
    pub previous_text: Option<&'q str>,
}

pub struct ActivityService<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> ActivityService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Write the activity row and its receivers.
    ///
    /// Response activities bump each receiver's response counter. The
    /// actor's `last_seen` is refreshed unless the activity is an email receipt.
    pub async fn record(
        &self,
        new: NewActivity,
        now: DateTime<Utc>,
    ) -> Result<activity::Model, DbErr> {
        let bump = new.activity_type.is_response();
        self.insert(new, bump, now).await
    }

    async fn insert(
        &self,
        new: NewActivity,
        bump_responses: bool,
        now: DateTime<Utc>,
    ) -> Result<activity::Model, DbErr> {
        let model = activity::ActiveModel {
            user_id: Set(new.actor_id),
            activity_type: Set(new.activity_type),
            target_kind: Set(new.target_kind),
            target_id: Set(new.target_id),
            question_id: Set(new.question_id),
            active_at: Set(now),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        let receivers: BTreeSet<i32> = new
            .receivers
            .into_iter()
            .filter(|&id| id != new.actor_id)
            .collect();

        if !receivers.is_empty() {
            activity_recipient::Entity::insert_many(receivers.iter().map(|&user_id| {
                activity_recipient::ActiveModel {
                    activity_id: Set(model.id),
                    user_id: Set(user_id),
                }
            }))
            .exec_without_returning(self.conn)
            .await?;

            if bump_responses {
                user::Entity::update_many()
                    .col_expr(
                        user::Column::ResponseCount,
                        Expr::cust("\"response_count\" + 1"),
                    )
                    .filter(user::Column::Id.is_in(receivers.iter().copied()))
                    .exec(self.conn)
                    .await?;
            }
        }

        if new.activity_type.touches_last_seen() {
            user::Entity::update_many()
                .col_expr(user::Column::LastSeen, Expr::value(now))
                .filter(user::Column::Id.eq(new.actor_id))
                .exec(self.conn)
                .await?;
        }

        Ok(model)
    }

    /// Authors of the question, its live answers, and commenters on the
    /// question and on the touched post.
    async fn contributors(
        &self,
        question: &question::Model,
        post_kind: PostKind,
        post_id: i32,
    ) -> Result<BTreeSet<i32>, DbErr> {
        let mut ids = BTreeSet::from([question.author_id]);

        let answers = answer::Entity::find()
            .filter(answer::Column::QuestionId.eq(question.id))
            .filter(answer::Column::Deleted.eq(false))
            .all(self.conn)
            .await?;
        ids.extend(answers.iter().map(|a| a.author_id));

        let mut commented = Condition::any().add(
            Condition::all()
                .add(comment::Column::PostKind.eq(PostKind::Question))
                .add(comment::Column::PostId.eq(question.id)),
        );
        if post_kind == PostKind::Answer {
            commented = commented.add(
                Condition::all()
                    .add(comment::Column::PostKind.eq(PostKind::Answer))
                    .add(comment::Column::PostId.eq(post_id)),
            );
        }
        let comments = comment::Entity::find()
            .filter(commented)
            .all(self.conn)
            .await?;
        ids.extend(comments.iter().map(|c| c.author_id));

        Ok(ids)
    }

    /// Newly mentioned usernames resolved to existing users other than the actor.
    async fn resolve_mentions(
        &self,
        previous: Option<&str>,
        text: &str,
        actor_id: i32,
    ) -> Result<Vec<user::Model>, DbErr> {
        let names = added_mentions(previous, text);
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let users = user::Entity::find()
            .filter(user::Column::Username.is_in(names))
            .filter(user::Column::Id.ne(actor_id))
            .all(self.conn)
            .await?;
        Ok(users)
    }

    /// Record a post update, its mentions, and collect the instant emails to
    /// send once the transaction commits.
    pub async fn record_post_update(
        &self,
        update: PostUpdate<'_>,
        rules: &ForumRules,
        now: DateTime<Utc>,
    ) -> Result<Vec<OutgoingEmail>, DbErr> {
        let question = update.question;
        let mut receivers = self
            .contributors(question, update.post_kind, update.post_id)
            .await?;
        receivers.remove(&update.actor_id);

        let activity = self
            .record(
                NewActivity {
                    actor_id: update.actor_id,
                    activity_type: update.activity_type,
                    target_kind: update.target_kind,
                    target_id: update.target_id,
                    question_id: Some(question.id),
                    receivers: receivers.iter().copied().collect(),
                },
                now,
            )
            .await?;

        let mentioned = self
            .resolve_mentions(update.previous_text, update.text, update.actor_id)
            .await?;
        for user in &mentioned {
            // Receivers of a response were already counted once.
            let counted = update.activity_type.is_response() && receivers.contains(&user.id);
            self.insert(
                NewActivity {
                    actor_id: update.actor_id,
                    activity_type: ActivityType::Mention,
                    target_kind: update.target_kind,
                    target_id: update.target_id,
                    question_id: Some(question.id),
                    receivers: vec![user.id],
                },
                !counted,
                now,
            )
            .await?;
        }

        if !update.activity_type.sends_instant_email() {
            return Ok(Vec::new());
        }

        let mentioned_ids: BTreeSet<i32> = mentioned.iter().map(|u| u.id).collect();
        let emails = self
            .instant_subscribers(&update, &activity, &receivers, &mentioned_ids, rules)
            .await?;
        Ok(emails)
    }

    /// Receivers, mentioned users and forum-wide subscribers whose feed
    /// settings ask for an instant email about this update.
    async fn instant_subscribers(
        &self,
        update: &PostUpdate<'_>,
        activity: &activity::Model,
        receivers: &BTreeSet<i32>,
        mentioned: &BTreeSet<i32>,
        rules: &ForumRules,
    ) -> Result<Vec<OutgoingEmail>, DbErr> {
        let question = update.question;

        let global = email_feed_setting::Entity::find()
            .filter(email_feed_setting::Column::FeedType.eq(FeedType::AllQuestions))
            .filter(email_feed_setting::Column::Frequency.eq(EmailFrequency::Instant))
            .all(self.conn)
            .await?;

        let mut candidates: BTreeSet<i32> = receivers | mentioned;
        candidates.extend(global.iter().map(|s| s.subscriber_id));
        candidates.remove(&update.actor_id);
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let settings = email_feed_setting::Entity::find()
            .filter(email_feed_setting::Column::SubscriberId.is_in(candidates.iter().copied()))
            .all(self.conn)
            .await?;
        let mut by_user: HashMap<i32, Vec<(FeedType, EmailFrequency)>> = HashMap::new();
        for s in settings {
            by_user
                .entry(s.subscriber_id)
                .or_default()
                .push((s.feed_type, s.frequency));
        }

        let answerers: BTreeSet<i32> = answer::Entity::find()
            .filter(answer::Column::QuestionId.eq(question.id))
            .filter(answer::Column::Deleted.eq(false))
            .all(self.conn)
            .await?
            .into_iter()
            .map(|a| a.author_id)
            .collect();
        let followers: BTreeSet<i32> = question_follower::Entity::find()
            .filter(question_follower::Column::QuestionId.eq(question.id))
            .all(self.conn)
            .await?
            .into_iter()
            .map(|f| f.user_id)
            .collect();
        let is_comment = matches!(
            update.activity_type,
            ActivityType::CommentQuestion | ActivityType::CommentAnswer
        );

        let users = user::Entity::find()
            .filter(user::Column::Id.is_in(candidates.iter().copied()))
            .order_by_asc(user::Column::Id)
            .all(self.conn)
            .await?;

        let subject = format!("{}: {}", activity.activity_type.describe(), question.title);
        let mut emails = Vec::new();
        for user in users {
            if user.email.is_empty() || (rules.email_validation && !user.email_isvalid) {
                continue;
            }
            let ctx = FeedContext {
                asked_question: question.author_id == user.id,
                answered_question: answerers.contains(&user.id),
                follows_question: followers.contains(&user.id),
                mentioned: mentioned.contains(&user.id),
                comment_on_own_post: is_comment && update.post_author_id == user.id,
            };
            let settings = by_user.get(&user.id).map(Vec::as_slice).unwrap_or(&[]);
            if !wants_instant_email(settings, &ctx) {
                continue;
            }
            emails.push(OutgoingEmail {
                recipient_id: user.id,
                to: user.email,
                subject: subject.clone(),
                body: format!(
                    "Hello {},\n\nThere is a {} on the question \"{}\".\n",
                    user.username,
                    activity.activity_type.describe(),
                    question.title
                ),
            });
        }
        Ok(emails)
    }

    /// Activities still addressed to `user_id`, newest first.
    pub async fn pending_for(
        &self,
        user_id: i32,
        limit: u64,
    ) -> Result<Vec<activity::Model>, DbErr> {
        let ids: Vec<i32> = activity_recipient::Entity::find()
            .filter(activity_recipient::Column::UserId.eq(user_id))
            .all(self.conn)
            .await?
            .into_iter()
            .map(|r| r.activity_id)
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        activity::Entity::find()
            .filter(activity::Column::Id.is_in(ids))
            .order_by_desc(activity::Column::ActiveAt)
            .order_by_desc(activity::Column::Id)
            .limit(limit)
            .all(self.conn)
            .await
    }
}
