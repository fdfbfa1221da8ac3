//! Extended social and group-membership audits.
//!
//! Optional checks behind `--extended-checks`: which of the user's groups
//! appear on the enemy-group list, and which names on the banished and
//! excommunicated lists appear among the user's friends. Count lookups
//! degrade to zero on failure; neither audit aborts badge processing.

use std::collections::HashSet;

use tracing::warn;

use crate::client::ApiClient;
use crate::error::client::ClientError;
use crate::model::UserInfo;

/// One group membership, flagged when it is on the enemy list.
#[derive(Debug)]
pub struct GroupFinding {
    pub group_id: u64,
    pub group_name: String,
    pub enemy: bool,
}

/// Result of the enemy-group audit.
#[derive(Debug)]
pub struct GroupAudit {
    pub user: UserInfo,
    pub findings: Vec<GroupFinding>,
    pub enemy_count: usize,
    pub friends: u64,
    pub followers: u64,
    pub followings: u64,
}

/// Whether one listed name appears among the user's friends.
#[derive(Debug, PartialEq)]
pub struct FriendFinding {
    pub name: String,
    pub is_friend: bool,
}

/// Result of the friends audit.
#[derive(Debug)]
pub struct FriendAudit {
    pub banished: Vec<FriendFinding>,
    pub excommunicated: Vec<FriendFinding>,
}

/// Audit the user's group memberships against the enemy-group list.
pub fn audit_groups(client: &ApiClient, user_id: u64) -> Result<GroupAudit, ClientError> {
    let user = client.get_user_info(user_id)?;
    let groups = client.get_user_groups(user_id)?;
    let enemy_group_ids = &client.config().watchlist.enemy_group_ids;

    let findings: Vec<GroupFinding> = groups
        .iter()
        .map(|membership| GroupFinding {
            group_id: membership.group.id,
            group_name: membership.group.name.clone(),
            enemy: enemy_group_ids.contains(&membership.group.id),
        })
        .collect();
    let enemy_count = findings.iter().filter(|finding| finding.enemy).count();

    Ok(GroupAudit {
        user,
        findings,
        enemy_count,
        friends: count_or_zero(client.get_friends_count(user_id), "friends"),
        followers: count_or_zero(client.get_followers_count(user_id), "followers"),
        followings: count_or_zero(client.get_followings_count(user_id), "followings"),
    })
}

/// Audit the user's friends list against the banished and excommunicated
/// name lists. Matching is by exact username.
pub fn audit_friends(client: &ApiClient, user_id: u64) -> Result<FriendAudit, ClientError> {
    let friends = client.get_user_friends(user_id)?;
    let friend_names: HashSet<&str> = friends
        .iter()
        .filter_map(|friend| friend.name.as_deref())
        .collect();
    let watchlist = &client.config().watchlist;

    let classify = |names: &[String]| -> Vec<FriendFinding> {
        names
            .iter()
            .map(|name| FriendFinding {
                name: name.clone(),
                is_friend: friend_names.contains(name.as_str()),
            })
            .collect()
    };

    Ok(FriendAudit {
        banished: classify(&watchlist.banished),
        excommunicated: classify(&watchlist.excommunicated),
    })
}

fn count_or_zero(result: Result<u64, ClientError>, what: &str) -> u64 {
    match result {
        Ok(count) => count,
        Err(err) => {
            warn!(error = %err, "failed to fetch {what} count, defaulting to 0");
            0
        }
    }
}
