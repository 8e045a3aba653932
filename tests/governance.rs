mod common;

use chrono::TimeZone;
use common::{queries, tx, MockChain, ACCOUNT};
use dexdesk::actions::Actions;
use dexdesk::chain::{RawVoteInfo, RawVoteStatus};
use dexdesk::domain::{ProposalStatus, TransactionStatus, TxOutcome};
use dexdesk::tx::{TransactionStore, TransactionWatcher};
use dexdesk::vote::{status_badge, DividendVoteView, StatusIcon};
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;

fn raw_vote(id: u64, name: &str, status: &str, start: u64, end: u64) -> RawVoteInfo {
    RawVoteInfo {
        id: format!("{:#x}", id),
        name: name.to_string(),
        status: status.to_string(),
        start_day: format!("{:#x}", start),
        end_day: format!("{:#x}", end),
        snapshot: Some(format!("{:#x}", start)),
        // 0.25 and 0.05 as 18 decimal shares
        for_share: Some("0x3782dace9d90000".to_string()),
        against_share: Some("0xb1a2bc2ec50000".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn proposals_are_listed_newest_first_with_badges() {
    let mut chain = MockChain::new();
    chain
        .expect_get_total_proposals()
        .times(1)
        .returning(|| Ok("0x2".to_string()));
    chain
        .expect_get_proposals()
        .withf(|offset, count| *offset == 0 && *count == 2)
        .times(1)
        .returning(|_, _| {
            Ok(vec![
                raw_vote(1, "Enable the dividends", "Executed", 1, 5),
                raw_vote(2, "Raise the fee", "Active", 8, 15),
            ])
        });
    let queries = queries(Arc::new(chain));

    let proposals = queries.votes.proposals().await.expect("proposals should load");
    let ids: Vec<u64> = proposals.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![2, 1]);
    assert_eq!(proposals[0].for_pct, dec!(25));
    assert_eq!(proposals[0].against_pct, dec!(5));

    let active = status_badge(proposals[0].status, proposals[0].start_day, proposals[0].end_day, 10);
    assert_eq!(active.icon, Some(StatusIcon::Calendar));
    assert_eq!(active.text, "5 days left");

    let enacted = status_badge(proposals[1].status, proposals[1].start_day, proposals[1].end_day, 10);
    assert_eq!(proposals[1].status, ProposalStatus::Executed);
    assert_eq!(enacted.text, "Enacted");
}

#[tokio::test]
async fn vote_switches_view_to_progress() {
    let mut chain = MockChain::new();
    chain
        .expect_get_vote_info()
        .returning(|index| Ok(raw_vote(index, "Enable the dividends", "Active", 5, 15)));
    // ballot before the vote, approval after the refetch
    let mut seq = mockall::Sequence::new();
    chain
        .expect_get_user_vote_status()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(RawVoteStatus::default()));
    chain
        .expect_get_user_vote_status()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| {
            Ok(RawVoteStatus {
                approval: Some("0x1bc16d674ec80000".to_string()),
                reject: None,
            })
        });
    chain
        .expect_cast_vote()
        .withf(|name, approve| name == "Enable the dividends" && *approve)
        .times(1)
        .returning(|_, _| Ok(tx(7)));
    chain
        .expect_transaction_result()
        .returning(|_| Ok(Some(TxOutcome::Success)));
    let chain = Arc::new(chain);
    let queries = queries(chain.clone());
    let now = chrono::Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();

    let proposal = queries.votes.vote_info(1).await.unwrap();
    let before = queries.votes.user_vote_status(ACCOUNT, 1).await.unwrap();
    let view = DividendVoteView::new(&proposal, Some(&before), Some(dec!(2)), 10, now);
    assert_eq!(view.link_text(), "Vote to distribute fees");

    let store = Arc::new(TransactionStore::new());
    let watcher = Arc::new(TransactionWatcher::with_interval(
        chain.clone(),
        store.clone(),
        Duration::from_millis(1),
    ));
    let actions = Actions::new(chain, queries.clone(), watcher, ACCOUNT, 1);
    let submitted = actions.cast_vote(true).await.expect("vote should be submitted");
    assert_eq!(submitted.settled().await, Some(TransactionStatus::Success));
    assert_eq!(store.get(&tx(7)).await.unwrap().display_text(), "Voted.");

    // the follow-up refetched the ballot, so this read is served from cache
    let after = queries.votes.user_vote_status(ACCOUNT, 1).await.unwrap();
    let view = DividendVoteView::new(&proposal, Some(&after), Some(dec!(2)), 10, now);
    assert_eq!(view.link_text(), "Check voting progress");
    assert_eq!(view.weight_text(), "2.00 BALN");
}
