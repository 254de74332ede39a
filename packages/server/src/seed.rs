use common::badge::DEFAULT_BADGES;
use sea_orm::sea_query::{Index, IndexCreateStatement, OnConflict, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::entity::{
    activity, activity_recipient, badge, comment, email_feed_setting, flagged_item, repute, vote,
};

/// Seed the `badge` table with the default badge set.
pub async fn seed_badges(db: &DatabaseConnection) -> Result<(), DbErr> {
    let mut inserted = 0u32;
    for def in DEFAULT_BADGES {
        let model = badge::ActiveModel {
            name: Set(def.name.to_string()),
            class: Set(def.class),
            description: Set(def.description.to_string()),
            multiple: Set(def.multiple),
            awarded_count: Set(0),
            ..Default::default()
        };

        let result = badge::Entity::insert(model)
            .on_conflict(OnConflict::column(badge::Column::Name).do_nothing().to_owned())
            .exec_without_returning(db)
            .await;

        match result {
            Ok(n) if n > 0 => inserted += 1,
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if inserted > 0 {
        info!("Seeded {} new badges", inserted);
    }
    Ok(())
}

async fn create_index(
    db: &DatabaseConnection,
    stmt: &mut IndexCreateStatement,
) -> Result<(), DbErr> {
    let sql = stmt.if_not_exists().to_string(PostgresQueryBuilder);
    db.execute_unprepared(&sql).await?;
    Ok(())
}

/// Ensure required database indexes exist.
///
/// Schema sync does not create composite indexes, so they are created here.
/// The unique ones back the one-vote and one-flag per user and post rules;
/// failing to create them is fatal.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_index(
        db,
        Index::create()
            .name("uq_vote_user_post")
            .table(vote::Entity)
            .col(vote::Column::UserId)
            .col(vote::Column::PostKind)
            .col(vote::Column::PostId)
            .unique(),
    )
    .await?;

    create_index(
        db,
        Index::create()
            .name("uq_flagged_item_user_post")
            .table(flagged_item::Entity)
            .col(flagged_item::Column::UserId)
            .col(flagged_item::Column::PostKind)
            .col(flagged_item::Column::PostId)
            .unique(),
    )
    .await?;

    create_index(
        db,
        Index::create()
            .name("uq_email_feed_setting_subscriber_type")
            .table(email_feed_setting::Entity)
            .col(email_feed_setting::Column::SubscriberId)
            .col(email_feed_setting::Column::FeedType)
            .unique(),
    )
    .await?;
    info!("Ensured unique indexes exist");

    // Lookups only; a failure here is not fatal.
    let mut lookups = [
        // Daily vote quota: WHERE user_id = ? AND voted_at >= ?
        Index::create()
            .name("idx_vote_user_voted_at")
            .table(vote::Entity)
            .col(vote::Column::UserId)
            .col(vote::Column::VotedAt)
            .to_owned(),
        Index::create()
            .name("idx_flagged_item_user_flagged_at")
            .table(flagged_item::Entity)
            .col(flagged_item::Column::UserId)
            .col(flagged_item::Column::FlaggedAt)
            .to_owned(),
        // Daily reputation cap and the ledger listing.
        Index::create()
            .name("idx_repute_user_reputed_at")
            .table(repute::Entity)
            .col(repute::Column::UserId)
            .col(repute::Column::ReputedAt)
            .to_owned(),
        Index::create()
            .name("idx_comment_post")
            .table(comment::Entity)
            .col(comment::Column::PostKind)
            .col(comment::Column::PostId)
            .to_owned(),
        Index::create()
            .name("idx_activity_question")
            .table(activity::Entity)
            .col(activity::Column::QuestionId)
            .col(activity::Column::ActiveAt)
            .to_owned(),
        Index::create()
            .name("idx_activity_recipient_user")
            .table(activity_recipient::Entity)
            .col(activity_recipient::Column::UserId)
            .to_owned(),
    ];

    for stmt in lookups.iter_mut() {
        if let Err(e) = create_index(db, stmt).await {
            tracing::warn!("Failed to create lookup index: {}", e);
        }
    }

    Ok(())
}
