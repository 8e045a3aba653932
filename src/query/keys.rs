use std::fmt;

/// Cache key of a remote query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    PlatformDay,
    UserReward(String),
    HasRewardable(String),
    HasNetworkFees(String),
    UserCollectedFees { account: String, start: u64, end: u64 },
    Rates,
    AllPairsTvl,
    Emission,
    VoteInfo(u64),
    UserVoteStatus { account: String, index: u64 },
    UserWeight { account: String, day: u64 },
    TotalProposals,
}

impl QueryKey {
    /// Account the key is scoped to, if any
    pub fn account(&self) -> Option<&str> {
        match self {
            QueryKey::UserReward(account)
            | QueryKey::HasRewardable(account)
            | QueryKey::HasNetworkFees(account)
            | QueryKey::UserCollectedFees { account, .. }
            | QueryKey::UserVoteStatus { account, .. }
            | QueryKey::UserWeight { account, .. } => Some(account),
            _ => None,
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::PlatformDay => write!(f, "reward/platform-day"),
            QueryKey::UserReward(account) => write!(f, "reward/user-reward/{}", account),
            QueryKey::HasRewardable(account) => write!(f, "reward/has-rewardable/{}", account),
            QueryKey::HasNetworkFees(account) => write!(f, "reward/has-network-fees/{}", account),
            QueryKey::UserCollectedFees {
                account,
                start,
                end,
            } => write!(f, "reward/user-collected-fees/{}/{}-{}", account, start, end),
            QueryKey::Rates => write!(f, "stats/rates"),
            QueryKey::AllPairsTvl => write!(f, "stats/all-pairs-tvl"),
            QueryKey::Emission => write!(f, "reward/emission"),
            QueryKey::VoteInfo(index) => write!(f, "vote/info/{}", index),
            QueryKey::UserVoteStatus { account, index } => {
                write!(f, "vote/user-status/{}/{}", account, index)
            }
            QueryKey::UserWeight { account, day } => write!(f, "vote/user-weight/{}/{}", account, day),
            QueryKey::TotalProposals => write!(f, "vote/proposals"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display_and_account() {
        let key = QueryKey::UserCollectedFees {
            account: "hx1".to_string(),
            start: 1,
            end: 120,
        };
        assert_eq!(key.to_string(), "reward/user-collected-fees/hx1/1-120");
        assert_eq!(key.account(), Some("hx1"));
        assert_eq!(QueryKey::PlatformDay.account(), None);
    }
}
