use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::state::round::{ActiveRound, Question};

/// Persisted shape of the outstanding round.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundEntity {
    /// Question text.
    pub prompt: String,
    /// Raw correct answer.
    pub answer: String,
    /// When the question was posted.
    #[serde(with = "time::serde::rfc3339")]
    pub issued_at: OffsetDateTime,
}

impl From<&ActiveRound> for RoundEntity {
    fn from(round: &ActiveRound) -> Self {
        Self {
            prompt: round.prompt().to_string(),
            answer: round.answer().to_string(),
            issued_at: round.issued_at(),
        }
    }
}

impl RoundEntity {
    /// Convert back into a live round; `None` when a field was blanked out on disk.
    pub fn into_round(self) -> Option<ActiveRound> {
        Question::new(self.prompt, self.answer)
            .map(|question| ActiveRound::new(question, self.issued_at))
    }
}

/// Persisted mapping from user identity to accumulated points.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ScoreSheet(BTreeMap<String, u64>);

impl ScoreSheet {
    /// Points for `user_id`; unknown users have none.
    pub fn points_for(&self, user_id: &str) -> u64 {
        self.0.get(user_id).copied().unwrap_or(0)
    }

    /// Add `amount` to `user_id`'s total and return the new total.
    pub fn add_points(&mut self, user_id: &str, amount: u64) -> u64 {
        let points = self.0.entry(user_id.to_string()).or_insert(0);
        *points = points.saturating_add(amount);
        *points
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;

    #[test]
    fn round_entity_survives_serialization() {
        let issued_at = OffsetDateTime::UNIX_EPOCH + Duration::from_millis(1_700_000_000_123);
        let round = ActiveRound::new(Question::new("Capital of France?", "Paris").unwrap(), issued_at);
        let entity = RoundEntity::from(&round);

        let encoded = serde_json::to_value(&entity).unwrap();
        let decoded: RoundEntity = serde_json::from_value(encoded).unwrap();

        assert_eq!(decoded, entity);
        assert_eq!(decoded.into_round(), Some(round));
    }

    #[test]
    fn issued_at_is_stored_as_rfc3339() {
        let entity = RoundEntity {
            prompt: "q".into(),
            answer: "a".into(),
            issued_at: OffsetDateTime::UNIX_EPOCH,
        };

        let encoded = serde_json::to_value(&entity).unwrap();
        assert_eq!(encoded["issued_at"], json!("1970-01-01T00:00:00Z"));
    }

    #[test]
    fn blank_persisted_round_is_discarded() {
        let entity = RoundEntity {
            prompt: "q".into(),
            answer: "".into(),
            issued_at: OffsetDateTime::UNIX_EPOCH,
        };
        assert_eq!(entity.into_round(), None);
    }

    #[test]
    fn score_sheet_is_a_plain_object() {
        let mut sheet = ScoreSheet::default();
        sheet.add_points("u1", 1);
        sheet.add_points("u2", 2);

        let encoded = serde_json::to_value(&sheet).unwrap();
        assert_eq!(encoded, json!({"u1": 1, "u2": 2}));

        let decoded: ScoreSheet = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, sheet);
    }

    #[test]
    fn unknown_users_have_zero_points() {
        let mut sheet = ScoreSheet::default();
        assert_eq!(sheet.points_for("nobody"), 0);
        assert_eq!(sheet.add_points("u1", 1), 1);
        assert_eq!(sheet.add_points("u1", 1), 2);
        assert_eq!(sheet, ScoreSheet(BTreeMap::from([("u1".to_string(), 2)])));
    }
}
