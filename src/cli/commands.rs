//! Command handlers

use anyhow::{bail, Context, Result};
use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::collections::BTreeMap;
use tabled::Tabled;

use super::output::{self, OutputMode};
use super::Desk;
use crate::actions::{Actions, Submitted};
use crate::chart::{filtered_supported_pair_names, symbol_info, SymbolSearchResult};
use crate::dex::{resolve_pair, PairState, SupplyPlan};
use crate::domain::{find_trade_pair, format_grouped, PairInfo, TransactionStatus};
use crate::rewards::panel::fee_lines;
use crate::rewards::{NetworkFeeView, RewardView, FEE_HISTORY_START};
use crate::vote::{collected_fee_lines, status_badge, Ballot, DividendVoteView};

#[derive(Debug, Serialize, Tabled)]
pub struct FeeWindowRow {
    pub start: u64,
    pub end: u64,
    pub fees: String,
}

#[derive(Debug, Serialize, Tabled)]
pub struct PairRow {
    pub id: u64,
    pub name: String,
    pub tvl_usd: String,
    pub apy: String,
}

#[derive(Debug, Serialize, Tabled)]
pub struct ProposalRow {
    pub id: u64,
    pub name: String,
    pub status: String,
    #[tabled(rename = "for %")]
    pub for_pct: String,
    #[tabled(rename = "against %")]
    pub against_pct: String,
}

#[derive(Debug, Serialize, Tabled)]
pub struct SymbolRow {
    pub symbol: String,
    pub full_name: String,
    pub description: String,
}

impl From<SymbolSearchResult> for SymbolRow {
    fn from(result: SymbolSearchResult) -> Self {
        Self {
            symbol: result.symbol,
            full_name: result.full_name,
            description: result.description,
        }
    }
}

#[derive(Debug, Serialize)]
struct RewardsSummary {
    account: String,
    rewards: RewardView,
    rewards_label: String,
    network_fees: NetworkFeeView,
    fee_lines: Vec<String>,
    claim: Option<String>,
}

pub async fn day(desk: &Desk, mode: OutputMode) -> Result<()> {
    let day = desk.queries.rewards.platform_day().await?;
    output::print_item(&serde_json::json!({ "platform_day": day }), mode)
}

pub async fn rewards(desk: &Desk, account: &str, mode: OutputMode) -> Result<()> {
    let rewards = &desk.queries.rewards;
    let day = rewards.platform_day().await?;
    let (reward, windows, has_rewardable, has_network_fees) = tokio::try_join!(
        rewards.reward(account),
        rewards.user_collected_fees(account, FEE_HISTORY_START, day),
        rewards.has_rewardable(account),
        rewards.has_network_fees(account)
    )?;

    let reward_view = RewardView::new(&reward, has_rewardable);
    let fee_view = NetworkFeeView::new(&windows, has_network_fees);
    let lines = match &fee_view {
        NetworkFeeView::Claimable { fees, .. } => fee_lines(fees),
        _ => Vec::new(),
    };

    output::print_item(
        &RewardsSummary {
            account: account.to_string(),
            rewards_label: reward_view.label(),
            rewards: reward_view,
            claim: fee_view.claim_label(),
            network_fees: fee_view,
            fee_lines: lines,
        },
        mode,
    )
}

pub async fn fees(desk: &Desk, account: &str, mode: OutputMode) -> Result<()> {
    let rewards = &desk.queries.rewards;
    let day = rewards.platform_day().await?;
    let windows = rewards
        .user_collected_fees(account, FEE_HISTORY_START, day)
        .await?;

    let rows: Vec<FeeWindowRow> = windows
        .iter()
        .map(|w| FeeWindowRow {
            start: w.window.start,
            end: w.window.end,
            fees: w
                .fees
                .as_ref()
                .map(|fees| fee_lines(fees).join(", "))
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();
    output::print_items(&rows, mode)
}

fn percent(value: Decimal) -> String {
    let pct = (value * Decimal::from(100))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}%", pct)
}

pub async fn pairs(desk: &Desk, mode: OutputMode) -> Result<()> {
    let rewards = &desk.queries.rewards;
    let (tvl, apy) = tokio::try_join!(rewards.all_pairs_tvl_usd(), rewards.all_pairs_apy())?;

    let rows: Vec<PairRow> = desk
        .pairs
        .iter()
        .map(|pair| PairRow {
            id: pair.id,
            name: pair.name.clone(),
            tvl_usd: tvl
                .get(&pair.id)
                .map(|usd| format!("${}", format_grouped(*usd, 0)))
                .unwrap_or_else(|| "-".to_string()),
            apy: apy
                .get(&pair.id)
                .map(|apy| percent(*apy))
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();
    output::print_items(&rows, mode)
}

pub async fn reserves(desk: &Desk, base: &str, quote: &str, mode: OutputMode) -> Result<()> {
    let a = desk.tokens.by_symbol(base);
    let b = desk.tokens.by_symbol(quote);
    let result = resolve_pair(desk.chain.as_ref(), a, b).await;

    match (result.state, result.pair) {
        (PairState::Exists, Some(pair)) => {
            let mut fields = BTreeMap::new();
            fields.insert("reserve0", pair.reserve0().to_string());
            fields.insert("reserve1", pair.reserve1().to_string());
            output::print_item(&fields, mode)
        }
        (PairState::Invalid, _) => bail!("{}/{} is not a valid pair", base, quote),
        (state, _) => {
            output::print_warn(&format!("{}/{}: {:?}", base, quote, state));
            Ok(())
        }
    }
}

pub async fn proposals(desk: &Desk, mode: OutputMode) -> Result<()> {
    let (day, proposals) = tokio::try_join!(
        desk.queries.rewards.platform_day(),
        desk.queries.votes.proposals()
    )?;

    let rows: Vec<ProposalRow> = proposals
        .iter()
        .map(|p| ProposalRow {
            id: p.id,
            name: p.name.clone(),
            status: status_badge(p.status, p.start_day, p.end_day, day).text,
            for_pct: format!("{:.2}", p.for_pct),
            against_pct: format!("{:.2}", p.against_pct),
        })
        .collect();
    output::print_items(&rows, mode)
}

pub async fn dividend_vote(desk: &Desk, account: &str, mode: OutputMode) -> Result<()> {
    let index = desk.config.governance.dividend_vote_index;
    let votes = &desk.queries.votes;
    let rewards = &desk.queries.rewards;

    let (day, proposal, status) = tokio::try_join!(
        rewards.platform_day(),
        votes.vote_info(index),
        votes.user_vote_status(account, index)
    )?;
    let (weight, windows) = tokio::try_join!(
        votes.user_weight(account, proposal.snapshot_day),
        rewards.user_collected_fees(account, FEE_HISTORY_START, day)
    )?;

    let view = DividendVoteView::new(&proposal, Some(&status), Some(weight), day, Utc::now());
    let collected: BTreeMap<String, Decimal> = windows
        .iter()
        .find_map(|w| w.fees.as_ref())
        .map(|fees| {
            fees.values()
                .map(|fee| (fee.currency.symbol.clone(), fee.amount))
                .collect()
        })
        .unwrap_or_default();

    output::print_item(
        &serde_json::json!({
            "proposal": proposal.name,
            "link": view.link_text(),
            "weight": view.weight_text(),
            "view": view,
            "collected_fees": collected_fee_lines(&collected),
        }),
        mode,
    )
}

pub fn symbols(desk: &Desk, query: &str, mode: OutputMode) -> Result<()> {
    let rows: Vec<SymbolRow> = filtered_supported_pair_names(query, &desk.pairs)
        .into_iter()
        .map(SymbolRow::from)
        .collect();
    output::print_items(&rows, mode)
}

pub fn symbol(desk: &Desk, name: &str, mode: OutputMode) -> Result<()> {
    output::print_item(&symbol_info(name, &desk.pairs), mode)
}

async fn report(actions: &Actions, submitted: Option<Submitted>) -> Result<()> {
    let Some(submitted) = submitted else {
        bail!("nothing was submitted");
    };
    if let Some(record) = actions.store().get(&submitted.hash).await {
        println!("{}", record.text.pending);
    }
    let hash = submitted.hash.clone();
    match submitted.settled().await {
        Some(TransactionStatus::Success) => {
            output::print_success(&format!("{} succeeded", hash));
            Ok(())
        }
        other => {
            output::print_error(&format!("{} ended as {:?}", hash, other));
            bail!("transaction {} did not succeed", hash)
        }
    }
}

pub async fn claim_rewards(desk: &Desk) -> Result<()> {
    let actions = desk.actions()?;
    report(&actions, actions.claim_rewards().await).await
}

pub async fn claim_fees(desk: &Desk) -> Result<()> {
    let actions = desk.actions()?;
    report(&actions, actions.claim_fees().await).await
}

pub async fn vote(desk: &Desk, ballot: Ballot) -> Result<()> {
    let actions = desk.actions()?;
    report(&actions, actions.cast_vote(ballot.approves()).await).await
}

fn supply_pair<'a>(pairs: &'a [PairInfo], base: &str, quote: &str) -> Result<&'a PairInfo> {
    match find_trade_pair(pairs, base, quote) {
        (Some(pair), false) => Ok(pair),
        (Some(pair), true) => bail!("pair is listed as {}", pair.name),
        (None, _) => bail!("{}/{} is not a supported pair", base, quote),
    }
}

pub async fn supply(
    desk: &Desk,
    base: &str,
    quote: &str,
    amount: Decimal,
    quote_amount: Option<Decimal>,
) -> Result<()> {
    let pair = supply_pair(&desk.pairs, base, quote)?;
    let plan = match quote_amount {
        Some(quote_amount) => SupplyPlan::explicit(pair, amount, quote_amount)?,
        None => {
            let result = resolve_pair(desk.chain.as_ref(), Some(&pair.base), Some(&pair.quote)).await;
            let reserves = result
                .pair
                .with_context(|| format!("no pool for {}, pass --quote-amount", pair.name))?;
            SupplyPlan::for_base(pair, &reserves, amount)?
        }
    };

    let actions = desk.actions()?;
    report(&actions, actions.supply_liquidity(&plan).await).await
}
