//! Trade aggregation: reduces one batch of raw deals to a single TradeSummary.
//!
//! Pure function over its inputs. Orders are reached only through the
//! injected lookup, so the same batch and the same lookup always produce the
//! same summary.

use crate::calendar::Localization;
use crate::domain::{Deal, DealType, Direction, Order, OrderRef, TradeSummary};
use crate::price::round_by_magnitude;
use std::fmt;
use thiserror::Error;

/// Largest difference between opening and closing volume still treated as equal.
pub const VOLUME_EPSILON: f64 = 1e-8;

/// Why a batch could not be summarized.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AggregationError {
    #[error("no deals to aggregate")]
    EmptyBatch,

    #[error("deals span more than one symbol ({expected} and {found})")]
    MixedSymbol { expected: String, found: String },

    #[error("entry volume {entry} does not match close volume {close}")]
    VolumeMismatch { entry: f64, close: f64 },

    #[error("no entry or exit fills matched the {direction} direction")]
    NoPositionFills { direction: Direction },

    #[error("risk-reward is undefined: stop loss equals entry price {price}")]
    UndefinedRiskReward { price: f64 },

    #[error("order lookup failed for {reference}: {reason}")]
    OrderLookup { reference: OrderRef, reason: String },
}

/// Running sums for the batch being aggregated.
#[derive(Debug, Default)]
struct Accumulator {
    gross_profit: f64,
    commission_total: f64,
    swap_total: f64,
    entry_volume: f64,
    entry_price_sum: f64,
    stop_loss_sum: f64,
    close_volume: f64,
    close_price_sum: f64,
}

impl Accumulator {
    fn book_cash(&mut self, deal: &Deal) {
        self.gross_profit += deal.profit;
        self.commission_total += deal.costs();
        self.swap_total += deal.swap;
    }

    fn book_entry(&mut self, deal: &Deal, order: &Order) {
        self.entry_volume += deal.volume;
        self.entry_price_sum += deal.price * deal.volume;
        self.stop_loss_sum += order.stop_loss_price * deal.volume;
    }

    fn book_exit(&mut self, deal: &Deal) {
        self.close_volume += deal.volume;
        self.close_price_sum += deal.price * deal.volume;
    }
}

/// Aggregate with the default localization (no clock shift, Japanese weekdays).
pub fn aggregate<F, E>(deals: &[Deal], lookup_order: F) -> Result<TradeSummary, AggregationError>
where
    F: FnMut(OrderRef) -> Result<Order, E>,
    E: fmt::Display,
{
    aggregate_localized(deals, lookup_order, &Localization::default())
}

/// Aggregate a time-ordered batch of deals into one trade.
///
/// The first deal fixes the trade's date, symbol and direction. Every deal
/// books its profit, commission, fee and swap. Only entry fills on the trade's
/// side and exit fills on the opposite side are weighted into prices; any
/// other deal (balance operations, reversals, fills against the detected
/// direction) contributes cash only. A batch opened by a non-directional deal
/// has no side to weight and ends in `NoPositionFills`.
pub fn aggregate_localized<F, E>(
    deals: &[Deal],
    mut lookup_order: F,
    localization: &Localization,
) -> Result<TradeSummary, AggregationError>
where
    F: FnMut(OrderRef) -> Result<Order, E>,
    E: fmt::Display,
{
    let first = deals.first().ok_or(AggregationError::EmptyBatch)?;
    let (date, day_of_week) = localization.date_of(first.timestamp);
    let symbol = first.symbol.clone();
    let side: DealType = first.deal_type;
    let closing_side = side.opposite();

    let mut acc = Accumulator::default();

    for deal in deals {
        if deal.symbol != symbol {
            return Err(AggregationError::MixedSymbol {
                expected: symbol,
                found: deal.symbol.clone(),
            });
        }

        acc.book_cash(deal);

        if deal.is_entry() && closing_side.is_some() && deal.deal_type == side {
            let order = lookup_order(deal.order).map_err(|e| AggregationError::OrderLookup {
                reference: deal.order,
                reason: e.to_string(),
            })?;
            acc.book_entry(deal, &order);
        } else if deal.is_exit() && Some(deal.deal_type) == closing_side {
            acc.book_exit(deal);
        }
    }

    if (acc.entry_volume - acc.close_volume).abs() > VOLUME_EPSILON {
        return Err(AggregationError::VolumeMismatch {
            entry: acc.entry_volume,
            close: acc.close_volume,
        });
    }
    if acc.entry_volume <= VOLUME_EPSILON {
        return Err(AggregationError::NoPositionFills { direction: side.into() });
    }

    let entry_price = round_by_magnitude(acc.entry_price_sum / acc.entry_volume);
    let stop_loss_price = round_by_magnitude(acc.stop_loss_sum / acc.entry_volume);
    let close_price = round_by_magnitude(acc.close_price_sum / acc.entry_volume);

    let risk = entry_price - stop_loss_price;
    if risk == 0.0 {
        return Err(AggregationError::UndefinedRiskReward { price: entry_price });
    }
    let risk_reward = (close_price - entry_price) / risk;

    Ok(TradeSummary {
        date,
        day_of_week: day_of_week.to_string(),
        symbol,
        direction: side.into(),
        entry_price,
        stop_loss_price,
        close_price,
        entry_volume: acc.entry_volume,
        gross_profit: acc.gross_profit,
        commission_total: acc.commission_total,
        swap_total: acc.swap_total,
        net_profit: acc.gross_profit + acc.commission_total + acc.swap_total,
        risk_reward,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{TerminalClock, WeekdayLocale};
    use crate::domain::{DealEntry, DealTicket};
    use chrono::{NaiveDate, NaiveDateTime};
    use std::collections::HashMap;

    fn ts(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn deal(ticket: u64, deal_type: DealType, entry: DealEntry, price: f64, volume: f64) -> Deal {
        Deal {
            ticket: DealTicket(ticket),
            timestamp: ts(10, ticket as u32),
            symbol: "EURUSD".into(),
            deal_type,
            entry,
            price,
            volume,
            profit: 0.0,
            commission: 0.0,
            fee: 0.0,
            swap: 0.0,
            order: OrderRef(ticket),
        }
    }

    fn stops(pairs: &[(u64, f64)]) -> HashMap<OrderRef, Order> {
        pairs
            .iter()
            .map(|&(t, sl)| (OrderRef(t), Order::new(OrderRef(t), sl)))
            .collect()
    }

    fn lookup(
        orders: &HashMap<OrderRef, Order>,
    ) -> impl FnMut(OrderRef) -> Result<Order, String> + '_ {
        move |r| orders.get(&r).copied().ok_or_else(|| format!("unknown order {r}"))
    }

    #[test]
    fn single_round_trip_long() {
        let deals = vec![
            deal(1, DealType::Buy, DealEntry::In, 1.1, 1.0),
            Deal {
                profit: 1000.0,
                commission: -3.5,
                fee: -0.5,
                swap: -1.2,
                ..deal(2, DealType::Sell, DealEntry::Out, 1.11, 1.0)
            },
        ];
        let orders = stops(&[(1, 1.095)]);

        let summary = aggregate(&deals, lookup(&orders)).unwrap();

        assert_eq!(summary.symbol, "EURUSD");
        assert_eq!(summary.direction, Direction::Buy);
        assert_eq!(summary.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(summary.day_of_week, "月");
        assert_eq!(summary.entry_price, 1.1);
        assert_eq!(summary.stop_loss_price, 1.095);
        assert_eq!(summary.close_price, 1.11);
        assert_eq!(summary.entry_volume, 1.0);
        assert_eq!(summary.gross_profit, 1000.0);
        assert_eq!(summary.commission_total, -4.0);
        assert_eq!(summary.swap_total, -1.2);
        assert!((summary.risk_reward - 2.0).abs() < 1e-9);
    }

    #[test]
    fn short_trade_closes_with_buys() {
        let deals = vec![
            deal(1, DealType::Sell, DealEntry::In, 150.0, 0.5),
            deal(2, DealType::Buy, DealEntry::Out, 149.0, 0.5),
        ];
        let orders = stops(&[(1, 150.5)]);

        let summary = aggregate(&deals, lookup(&orders)).unwrap();

        assert_eq!(summary.direction, Direction::Sell);
        assert_eq!(summary.close_price, 149.0);
        // reward -1.0 over risk -0.5
        assert!((summary.risk_reward - 2.0).abs() < 1e-9);
    }

    #[test]
    fn scaled_entries_are_volume_weighted() {
        let deals = vec![
            deal(1, DealType::Buy, DealEntry::In, 1.1000, 0.3),
            deal(2, DealType::Buy, DealEntry::In, 1.1050, 0.7),
            deal(3, DealType::Sell, DealEntry::Out, 1.1100, 0.6),
            deal(4, DealType::Sell, DealEntry::Out, 1.1200, 0.4),
        ];
        let orders = stops(&[(1, 1.0950), (2, 1.1000)]);

        let summary = aggregate(&deals, lookup(&orders)).unwrap();

        assert!((summary.entry_price - 1.1035).abs() < 1e-12);
        assert!((summary.stop_loss_price - 1.0985).abs() < 1e-12);
        assert!((summary.close_price - 1.114).abs() < 1e-12);
        assert!((summary.entry_volume - 1.0).abs() < 1e-12);
    }

    #[test]
    fn mixed_symbols_are_rejected() {
        let deals = vec![
            deal(1, DealType::Buy, DealEntry::In, 1.1, 1.0),
            Deal { symbol: "GBPUSD".into(), ..deal(2, DealType::Sell, DealEntry::Out, 1.27, 1.0) },
        ];
        let orders = stops(&[(1, 1.09)]);

        let err = aggregate(&deals, lookup(&orders)).unwrap_err();
        assert_eq!(
            err,
            AggregationError::MixedSymbol {
                expected: "EURUSD".into(),
                found: "GBPUSD".into(),
            }
        );
    }

    #[test]
    fn partial_close_is_a_volume_mismatch() {
        let deals = vec![
            deal(1, DealType::Buy, DealEntry::In, 1.1, 1.0),
            deal(2, DealType::Sell, DealEntry::Out, 1.11, 0.8),
        ];
        let orders = stops(&[(1, 1.09)]);

        let err = aggregate(&deals, lookup(&orders)).unwrap_err();
        assert!(matches!(
            err,
            AggregationError::VolumeMismatch { entry, close } if entry == 1.0 && close == 0.8
        ));
    }

    #[test]
    fn float_noise_in_volume_sums_is_tolerated() {
        let deals = vec![
            deal(1, DealType::Buy, DealEntry::In, 1.1, 0.1),
            deal(2, DealType::Buy, DealEntry::In, 1.1, 0.2),
            deal(3, DealType::Sell, DealEntry::Out, 1.12, 0.3),
        ];
        let orders = stops(&[(1, 1.09), (2, 1.09)]);

        assert!(aggregate(&deals, lookup(&orders)).is_ok());
    }

    #[test]
    fn stop_at_entry_leaves_risk_reward_undefined() {
        let deals = vec![
            deal(1, DealType::Buy, DealEntry::In, 1.1, 1.0),
            deal(2, DealType::Sell, DealEntry::Out, 1.12, 1.0),
        ];
        let orders = stops(&[(1, 1.1)]);

        let err = aggregate(&deals, lookup(&orders)).unwrap_err();
        assert_eq!(err, AggregationError::UndefinedRiskReward { price: 1.1 });
    }

    #[test]
    fn lookup_failures_propagate() {
        let deals = vec![
            deal(1, DealType::Buy, DealEntry::In, 1.1, 1.0),
            deal(2, DealType::Sell, DealEntry::Out, 1.12, 1.0),
        ];
        let orders = stops(&[]);

        let err = aggregate(&deals, lookup(&orders)).unwrap_err();
        assert!(matches!(err, AggregationError::OrderLookup { reference: OrderRef(1), .. }));
    }

    #[test]
    fn balance_deals_book_cash_only() {
        let deals = vec![
            deal(1, DealType::Buy, DealEntry::In, 1.1, 1.0),
            Deal {
                profit: 500.0,
                commission: -1.0,
                swap: 0.25,
                ..deal(2, DealType::Balance, DealEntry::In, 0.0, 0.0)
            },
            deal(3, DealType::Sell, DealEntry::Out, 1.11, 1.0),
        ];
        let orders = stops(&[(1, 1.095)]);

        let summary = aggregate(&deals, lookup(&orders)).unwrap();
        assert_eq!(summary.entry_volume, 1.0);
        assert_eq!(summary.entry_price, 1.1);
        assert_eq!(summary.gross_profit, 500.0);
        assert_eq!(summary.commission_total, -1.0);
        assert_eq!(summary.swap_total, 0.25);
    }

    #[test]
    fn balance_only_batch_has_no_position_fills() {
        let deals = vec![Deal {
            profit: 100.0,
            ..deal(1, DealType::Balance, DealEntry::In, 0.0, 0.0)
        }];
        let orders = stops(&[]);

        let err = aggregate(&deals, lookup(&orders)).unwrap_err();
        assert_eq!(err, AggregationError::NoPositionFills { direction: Direction::Balance });
    }

    #[test]
    fn reversal_deals_are_not_price_weighted() {
        let deals = vec![
            deal(1, DealType::Buy, DealEntry::In, 1.1, 1.0),
            deal(2, DealType::Sell, DealEntry::Other(2), 1.2, 1.0),
            deal(3, DealType::Sell, DealEntry::Out, 1.11, 1.0),
        ];
        let orders = stops(&[(1, 1.095)]);

        let summary = aggregate(&deals, lookup(&orders)).unwrap();
        assert_eq!(summary.close_price, 1.11);
    }

    #[test]
    fn fills_against_the_trade_direction_book_cash_only() {
        // Buy trade with a Sell/In and a Buy/Out in the middle: neither is
        // an entry or exit of this position.
        let deals = vec![
            deal(1, DealType::Buy, DealEntry::In, 1.1, 1.0),
            Deal {
                commission: -2.0,
                ..deal(2, DealType::Sell, DealEntry::In, 1.3, 0.5)
            },
            Deal {
                profit: 75.0,
                commission: -1.0,
                ..deal(3, DealType::Buy, DealEntry::Out, 1.2, 0.5)
            },
            Deal {
                profit: 100.0,
                ..deal(4, DealType::Sell, DealEntry::Out, 1.11, 1.0)
            },
        ];
        // Order 2 has no stop loss entry: it must never be looked up.
        let orders = stops(&[(1, 1.095)]);

        let summary = aggregate(&deals, lookup(&orders)).unwrap();
        assert_eq!(summary.direction, Direction::Buy);
        assert_eq!(summary.entry_volume, 1.0);
        assert_eq!(summary.entry_price, 1.1);
        assert_eq!(summary.stop_loss_price, 1.095);
        assert_eq!(summary.close_price, 1.11);
        assert_eq!(summary.gross_profit, 175.0);
        assert_eq!(summary.commission_total, -3.0);
        assert_eq!(summary.net_profit, 172.0);
    }

    #[test]
    fn empty_batch_is_rejected() {
        let orders = stops(&[]);
        assert_eq!(aggregate(&[], lookup(&orders)).unwrap_err(), AggregationError::EmptyBatch);
    }

    #[test]
    fn localization_shifts_date_and_labels_weekday() {
        let mut first = deal(1, DealType::Buy, DealEntry::In, 1.1, 1.0);
        first.timestamp = ts(5, 0);
        let deals = vec![first, deal(2, DealType::Sell, DealEntry::Out, 1.11, 1.0)];
        let orders = stops(&[(1, 1.095)]);
        let loc = Localization {
            clock: TerminalClock::from_hours(9),
            weekdays: WeekdayLocale::English,
        };

        let summary = aggregate_localized(&deals, lookup(&orders), &loc).unwrap();
        assert_eq!(summary.date, NaiveDate::from_ymd_opt(2024, 1, 14).unwrap());
        assert_eq!(summary.day_of_week, "Sun");
    }
}
