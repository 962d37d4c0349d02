use std::collections::HashMap;

use super::{RecordedVote, VoteMessageGroup};
use crate::period::VotingMonth;

/// Keeps the votes cast inside `month`.
///
/// The ISO weeks of a month straddle its edges, so a week-by-week read
/// returns a few votes from the neighbouring months.
pub fn filter_votes_to_month(votes: Vec<RecordedVote>, month: VotingMonth) -> Vec<RecordedVote> {
    votes
        .into_iter()
        .filter(|vote| month.contains(vote.voted_at))
        .collect()
}

/// Collapses votes on the same message into one group per message id,
/// largest group first. Groups of equal size keep first-appearance order.
pub fn group_votes_by_message(votes: &[RecordedVote]) -> Vec<VoteMessageGroup> {
    let mut groups: Vec<VoteMessageGroup> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for vote in votes {
        match index.get(vote.message_id.as_str()) {
            Some(&i) => groups[i].count += 1,
            None => {
                index.insert(vote.message_id.as_str(), groups.len());
                groups.push(VoteMessageGroup {
                    channel_id: vote.channel_id.clone(),
                    message_id: vote.message_id.clone(),
                    count: 1,
                });
            }
        }
    }

    // sort_by is stable
    groups.sort_by(|a, b| b.count.cmp(&a.count));
    groups
}

/// `"1 vote"` or `"{n} votes"`.
pub fn vote_count_label(count: usize) -> String {
    if count == 1 {
        "1 vote".to_string()
    } else {
        format!("{count} votes")
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::period::YearAndWeek;

    fn vote(voter: &str, message: &str, at: &str) -> RecordedVote {
        let voted_at = DateTime::parse_from_rfc3339(at).unwrap().with_timezone(&Utc);
        RecordedVote {
            period: YearAndWeek::from_datetime(voted_at),
            voter_id: voter.to_string(),
            votee_id: "votee123".to_string(),
            channel_id: "chan001".to_string(),
            message_id: message.to_string(),
            voted_at,
        }
    }

    #[test]
    fn test_filter_drops_votes_from_straddling_weeks() {
        let june = VotingMonth::new(2025, 6).unwrap();
        let votes = vec![
            vote("V1", "m1", "2025-05-31T12:00:00Z"),
            vote("V2", "m1", "2025-06-01T00:00:00Z"),
            vote("V3", "m2", "2025-06-30T23:59:59Z"),
            vote("V4", "m2", "2025-07-01T00:00:00Z"),
        ];

        let kept: Vec<String> = filter_votes_to_month(votes, june)
            .into_iter()
            .map(|v| v.voter_id)
            .collect();

        assert_eq!(kept, vec!["V2", "V3"]);
    }

    #[test]
    fn test_group_counts_and_sorts() {
        let votes = vec![
            vote("V1", "m1", "2025-06-02T10:00:00Z"),
            vote("V2", "m2", "2025-06-03T10:00:00Z"),
            vote("V3", "m2", "2025-06-10T10:00:00Z"),
            vote("V4", "m3", "2025-06-11T10:00:00Z"),
            vote("V5", "m2", "2025-06-17T10:00:00Z"),
        ];

        let groups = group_votes_by_message(&votes);
        let summary: Vec<(&str, usize)> = groups
            .iter()
            .map(|g| (g.message_id.as_str(), g.count))
            .collect();

        assert_eq!(summary, vec![("m2", 3), ("m1", 1), ("m3", 1)]);
    }

    #[test]
    fn test_group_empty() {
        assert!(group_votes_by_message(&[]).is_empty());
    }

    #[test]
    fn test_vote_count_label() {
        assert_eq!(vote_count_label(1), "1 vote");
        assert_eq!(vote_count_label(2), "2 votes");
        assert_eq!(vote_count_label(0), "0 votes");
    }
}
