// Order normalization and submission against the mock exchange

mod helpers;

use futures_bot::types::TimeInForce;
use futures_bot::{BotError, OrderRequest, OrderType, Side};
use helpers::{connected_bot, exchange_symbol, MockApi};
use rust_decimal_macros::dec;
use std::sync::atomic::Ordering;

#[tokio::test]
async fn market_quantity_is_truncated_not_rounded() {
    let api = MockApi::new();
    let bot = connected_bot(&api).await;

    let params = bot
        .normalize(&OrderRequest::market("BTCUSDT", Side::Buy, dec!(0.0015)))
        .await
        .unwrap();

    assert_eq!(params.quantity, "0.001");
    assert_eq!(params.price, None);
    assert_eq!(params.time_in_force, None);
    assert_eq!(params.order_type, OrderType::Market);
}

#[tokio::test]
async fn limit_order_formats_price_and_sets_gtc() {
    let api = MockApi::new();
    let bot = connected_bot(&api).await;

    let params = bot
        .normalize(&OrderRequest::limit(
            "BTCUSDT",
            Side::Sell,
            dec!(0.0129),
            dec!(65000.129),
        ))
        .await
        .unwrap();

    assert_eq!(params.quantity, "0.012");
    assert_eq!(params.price.as_deref(), Some("65000.12"));
    assert_eq!(params.time_in_force, Some(TimeInForce::Gtc));
    assert_eq!(
        params.to_string(),
        "{symbol=BTCUSDT, side=SELL, type=LIMIT, quantity=0.012, price=65000.12, timeInForce=GTC}"
    );
}

#[tokio::test]
async fn short_values_are_zero_padded() {
    let api = MockApi::new();
    let bot = connected_bot(&api).await;

    let params = bot
        .normalize(&OrderRequest::limit("ETHUSDT", Side::Buy, dec!(1), dec!(3000)))
        .await
        .unwrap();

    assert_eq!(params.quantity, "1.000");
    assert_eq!(params.price.as_deref(), Some("3000.00"));
}

#[tokio::test]
async fn zero_precision_quantity_has_no_fraction() {
    let api = MockApi::new();
    let bot = connected_bot(&api).await;

    let params = bot
        .normalize(&OrderRequest::market("DOGEUSDT", Side::Buy, dec!(150.9)))
        .await
        .unwrap();

    assert_eq!(params.quantity, "150");
}

#[tokio::test]
async fn negative_precision_floors_to_power_of_ten() {
    let api = MockApi::new();
    api.set_symbols(vec![exchange_symbol("1000SHIBUSDT", Some(6), Some(-2))]);
    let bot = connected_bot(&api).await;

    let params = bot
        .normalize(&OrderRequest::market("1000SHIBUSDT", Side::Buy, dec!(12345.6)))
        .await
        .unwrap();

    assert_eq!(params.quantity, "12300");
}

#[tokio::test]
async fn limit_without_price_fails_before_any_request() {
    let api = MockApi::new();
    let bot = connected_bot(&api).await;

    let request = OrderRequest {
        price: None,
        ..OrderRequest::limit("BTCUSDT", Side::Buy, dec!(0.01), dec!(1))
    };
    let err = bot.place_order(&request).await.unwrap_err();

    assert_eq!(err, BotError::MissingPrice);
    assert_eq!(api.network_calls_after_connect(), 0);
}

#[tokio::test]
async fn unknown_side_is_rejected_without_io() {
    let api = MockApi::new();
    let _bot = connected_bot(&api).await;

    let err = OrderRequest::parse("BTCUSDT", "HOLD", "MARKET", "0.01", None).unwrap_err();

    assert!(matches!(err, BotError::InvalidOrderSpec(_)));
    assert_eq!(api.network_calls_after_connect(), 0);
}

#[tokio::test]
async fn unknown_order_type_is_rejected() {
    let err = OrderRequest::parse("BTCUSDT", "BUY", "STOP", "0.01", None).unwrap_err();
    assert!(matches!(err, BotError::InvalidOrderSpec(_)));
}

#[tokio::test]
async fn non_positive_quantity_is_rejected_without_io() {
    let api = MockApi::new();
    let bot = connected_bot(&api).await;

    let err = bot
        .place_order(&OrderRequest::market("BTCUSDT", Side::Buy, dec!(0)))
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(api.network_calls_after_connect(), 0);
}

#[tokio::test]
async fn quantity_below_step_is_rejected_without_submitting() {
    let api = MockApi::new();
    let bot = connected_bot(&api).await;

    let err = bot
        .place_order(&OrderRequest::market("BTCUSDT", Side::Buy, dec!(0.0004)))
        .await
        .unwrap_err();

    assert!(matches!(err, BotError::InvalidOrderSpec(_)));
    assert_eq!(api.order_calls(), 0);
}

#[tokio::test]
async fn unknown_symbol_reports_precision_unavailable() {
    let api = MockApi::new();
    let bot = connected_bot(&api).await;

    let err = bot
        .place_market_order("NOPEUSDT", Side::Buy, dec!(1))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        BotError::PrecisionUnavailable {
            symbol: "NOPEUSDT".to_string()
        }
    );
    assert_eq!(api.order_calls(), 0);
}

#[tokio::test]
async fn place_order_sends_formatted_params() {
    let api = MockApi::new();
    let bot = connected_bot(&api).await;

    let result = bot
        .place_limit_order("BTCUSDT", Side::Buy, dec!(0.0019), dec!(64999.999))
        .await
        .unwrap();

    let sent = api.last_order().unwrap();
    assert_eq!(sent.quantity, "0.001");
    assert_eq!(sent.price.as_deref(), Some("64999.99"));
    assert_eq!(sent.time_in_force, Some(TimeInForce::Gtc));
    assert_eq!(result.status, "NEW");
    assert_eq!(result.order_type, "LIMIT");
    assert_eq!(result.price, Some(dec!(64999.99)));
}

#[tokio::test]
async fn repeated_orders_fetch_precision_once() {
    let api = MockApi::new();
    let bot = connected_bot(&api).await;

    for _ in 0..3 {
        bot.place_market_order("ETHUSDT", Side::Sell, dec!(0.5))
            .await
            .unwrap();
    }

    assert_eq!(api.exchange_info_calls(), 1);
    assert_eq!(api.order_calls(), 3);
}

#[tokio::test]
async fn exchange_rejection_is_propagated() {
    let api = MockApi::new();
    api.reject_orders.store(true, Ordering::SeqCst);
    let bot = connected_bot(&api).await;

    let err = bot
        .place_market_order("BTCUSDT", Side::Buy, dec!(0.01))
        .await
        .unwrap_err();

    match err {
        BotError::ExchangeRejected { code, .. } => assert_eq!(code, Some(-2019)),
        other => panic!("expected exchange rejection, got {other:?}"),
    }
    assert_eq!(api.order_calls(), 1);
}

#[tokio::test]
async fn overlong_typed_quantity_never_rounds_up() {
    let api = MockApi::new();
    let bot = connected_bot(&api).await;

    let request =
        OrderRequest::parse("btcusdt", "buy", "market", "0.99999999999999999999999999999", None).unwrap();
    let params = bot.normalize(&request).await.unwrap();

    assert_eq!(params.quantity, "0.999");
}
