use serde::Deserialize;

/// Community rules: reputation thresholds, quotas and reputation amounts.
///
/// Every field has a default so a partial `[forum]` section is enough.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ForumRules {
    pub min_rep_to_vote_up: i32,
    pub min_rep_to_vote_down: i32,
    pub min_rep_to_flag_offensive: i32,
    pub min_rep_to_upload_files: i32,
    pub min_rep_to_close_own_questions: i32,
    pub min_rep_to_close_others_questions: i32,
    pub min_rep_to_reopen_own_questions: i32,
    pub min_rep_to_delete_others_posts: i32,

    /// New votes a user may cast per UTC day.
    pub max_votes_per_user_per_day: u32,
    /// Warn when this many votes or fewer remain after a vote.
    pub votes_left_warning_threshold: u32,
    /// Votes older than this many calendar days cannot be canceled or flipped.
    pub max_days_to_cancel_vote: i64,
    pub max_flags_per_user_per_day: u32,
    pub min_flags_to_hide_post: i32,
    pub min_flags_to_delete_post: i32,

    pub rep_gain_for_receiving_upvote: i32,
    pub rep_loss_for_receiving_upvote_cancel: i32,
    pub rep_loss_for_receiving_downvote: i32,
    pub rep_loss_for_downvoting: i32,
    pub rep_gain_for_receiving_downvote_cancel: i32,
    pub rep_gain_for_canceling_downvote: i32,
    pub rep_gain_for_receiving_answer_acceptance: i32,
    pub rep_gain_for_accepting_answer: i32,
    pub rep_loss_for_receiving_acceptance_cancel: i32,
    pub rep_loss_for_canceling_acceptance: i32,
    pub rep_loss_for_receiving_flag: i32,
    pub rep_loss_for_receiving_hide_flags: i32,
    pub rep_loss_for_receiving_delete_flags: i32,
    /// Cap on reputation gained from received upvotes per UTC day.
    pub max_rep_gain_per_user_per_day: i32,

    /// Require a validated email before subscriptions take effect.
    pub email_validation: bool,
}

impl Default for ForumRules {
    fn default() -> Self {
        Self {
            min_rep_to_vote_up: 15,
            min_rep_to_vote_down: 100,
            min_rep_to_flag_offensive: 15,
            min_rep_to_upload_files: 60,
            min_rep_to_close_own_questions: 250,
            min_rep_to_close_others_questions: 500,
            min_rep_to_reopen_own_questions: 500,
            min_rep_to_delete_others_posts: 2000,

            max_votes_per_user_per_day: 30,
            votes_left_warning_threshold: 5,
            max_days_to_cancel_vote: 1,
            max_flags_per_user_per_day: 5,
            min_flags_to_hide_post: 3,
            min_flags_to_delete_post: 5,

            rep_gain_for_receiving_upvote: 10,
            rep_loss_for_receiving_upvote_cancel: -10,
            rep_loss_for_receiving_downvote: -2,
            rep_loss_for_downvoting: -1,
            rep_gain_for_receiving_downvote_cancel: 2,
            rep_gain_for_canceling_downvote: 1,
            rep_gain_for_receiving_answer_acceptance: 15,
            rep_gain_for_accepting_answer: 2,
            rep_loss_for_receiving_acceptance_cancel: -15,
            rep_loss_for_canceling_acceptance: -2,
            rep_loss_for_receiving_flag: -2,
            rep_loss_for_receiving_hide_flags: -30,
            rep_loss_for_receiving_delete_flags: -100,
            max_rep_gain_per_user_per_day: 200,

            email_validation: false,
        }
    }
}
