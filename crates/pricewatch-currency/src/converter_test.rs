use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::TimeZone;
use rust_decimal_macros::dec;

use super::*;

/// In-memory store with call counting, standing in for the hosting
/// application's persistence.
#[derive(Default)]
struct FakeStore {
    rates: Mutex<Vec<CurrencyRate>>,
    latest_calls: AtomicUsize,
    dated_calls: AtomicUsize,
}

impl FakeStore {
    fn with_rates(rates: Vec<CurrencyRate>) -> Arc<Self> {
        Arc::new(Self {
            rates: Mutex::new(rates),
            ..Self::default()
        })
    }
}

fn rate(from: &str, to: &str, value: Decimal, day: NaiveDate) -> CurrencyRate {
    CurrencyRate {
        from_currency: from.to_string(),
        to_currency: to.to_string(),
        rate: value,
        effective_date: Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0).unwrap()),
        source: "test".to_string(),
        is_active: true,
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[async_trait]
impl RateStore for FakeStore {
    async fn latest_rate(
        &self,
        from: &str,
        to: &str,
    ) -> Result<Option<CurrencyRate>, CurrencyError> {
        self.latest_calls.fetch_add(1, Ordering::SeqCst);
        let rates = self.rates.lock().unwrap();
        Ok(rates
            .iter()
            .filter(|r| r.from_currency == from && r.to_currency == to && r.is_active)
            .max_by_key(|r| r.effective_date)
            .cloned())
    }

    async fn rate_on(
        &self,
        from: &str,
        to: &str,
        day: NaiveDate,
    ) -> Result<Option<CurrencyRate>, CurrencyError> {
        self.dated_calls.fetch_add(1, Ordering::SeqCst);
        let rates = self.rates.lock().unwrap();
        Ok(rates
            .iter()
            .find(|r| {
                r.from_currency == from
                    && r.to_currency == to
                    && r.effective_date.date_naive() == day
            })
            .cloned())
    }

    async fn upsert_rate(&self, rate: CurrencyRate) -> Result<(), CurrencyError> {
        let mut rates = self.rates.lock().unwrap();
        let day = rate.effective_date.date_naive();
        rates.retain(|r| {
            !(r.from_currency == rate.from_currency
                && r.to_currency == rate.to_currency
                && r.effective_date.date_naive() == day)
        });
        rates.push(rate);
        Ok(())
    }
}

fn converter_with(store: Arc<FakeStore>) -> CurrencyConverter {
    CurrencyConverter::with_settings(
        store,
        RateCache::DEFAULT_TTL,
        RateCache::DEFAULT_MAX_ENTRIES,
        Duration::ZERO,
    )
}

// ---------------------------------------------------------------------------
// convert / get_exchange_rate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn identity_conversion_short_circuits() {
    let store = FakeStore::with_rates(Vec::new());
    let mut converter = converter_with(Arc::clone(&store));

    let result = converter.convert(dec!(100), "EUR", "EUR", None).await.unwrap();
    assert_eq!(result, dec!(100));
    assert_eq!(store.latest_calls.load(Ordering::SeqCst), 0, "store untouched");
}

#[tokio::test]
async fn converts_with_direct_rate() {
    let store = FakeStore::with_rates(vec![rate("EUR", "USD", dec!(1.08), today())]);
    let mut converter = converter_with(store);

    let result = converter.convert(dec!(50), "EUR", "USD", None).await.unwrap();
    assert_eq!(result, dec!(54.00));
}

#[tokio::test]
async fn falls_back_to_inverse_rate() {
    let store = FakeStore::with_rates(vec![rate("USD", "EUR", dec!(0.8), today())]);
    let mut converter = converter_with(store);

    let result = converter.get_exchange_rate("EUR", "USD", None).await.unwrap();
    assert_eq!(result, dec!(1.25));
}

#[tokio::test]
async fn derives_cross_rate_through_base_currency() {
    let store = FakeStore::with_rates(vec![
        rate("EUR", "USD", dec!(1.08), today()),
        rate("EUR", "GBP", dec!(0.85), today()),
    ]);
    let mut converter = converter_with(store);

    let result = converter.get_exchange_rate("USD", "GBP", None).await.unwrap();
    assert_eq!(result, dec!(0.85) / dec!(1.08));
}

#[tokio::test]
async fn missing_pair_errors_with_pair_name() {
    let store = FakeStore::with_rates(Vec::new());
    let mut converter = converter_with(store);

    let err = converter.get_exchange_rate("EUR", "USD", None).await.unwrap_err();
    match err {
        CurrencyError::RateNotFound { from, to } => {
            assert_eq!(from, "EUR");
            assert_eq!(to, "USD");
        }
        other => panic!("expected RateNotFound, got: {other:?}"),
    }
}

#[tokio::test]
async fn currency_codes_are_case_insensitive() {
    let store = FakeStore::with_rates(vec![rate("EUR", "USD", dec!(1.08), today())]);
    let mut converter = converter_with(store);

    let result = converter.get_exchange_rate("eur", "usd", None).await.unwrap();
    assert_eq!(result, dec!(1.08));
}

// ---------------------------------------------------------------------------
// Historical lookups
// ---------------------------------------------------------------------------

#[tokio::test]
async fn historical_rate_is_used_when_recorded() {
    let day = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    let store = FakeStore::with_rates(vec![
        rate("EUR", "USD", dec!(1.02), day),
        rate("EUR", "USD", dec!(1.08), today()),
    ]);
    let mut converter = converter_with(store);

    let date = Utc.from_utc_datetime(&day.and_hms_opt(15, 30, 0).unwrap());
    let result = converter.get_exchange_rate("EUR", "USD", Some(date)).await.unwrap();
    assert_eq!(result, dec!(1.02), "midday timestamps resolve to the day's rate");
}

#[tokio::test]
async fn missing_historical_rate_falls_back_to_latest() {
    let store = FakeStore::with_rates(vec![rate("EUR", "USD", dec!(1.08), today())]);
    let mut converter = converter_with(Arc::clone(&store));

    let long_ago = Utc.with_ymd_and_hms(2019, 1, 1, 12, 0, 0).unwrap();
    let result = converter
        .get_exchange_rate("EUR", "USD", Some(long_ago))
        .await
        .unwrap();
    assert_eq!(result, dec!(1.08));
    assert!(store.dated_calls.load(Ordering::SeqCst) >= 1);
}

// ---------------------------------------------------------------------------
// Caching
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn second_lookup_within_ttl_hits_the_cache() {
    let store = FakeStore::with_rates(vec![rate("EUR", "USD", dec!(1.08), today())]);
    let mut converter = converter_with(Arc::clone(&store));

    converter.get_exchange_rate("EUR", "USD", None).await.unwrap();
    converter.get_exchange_rate("EUR", "USD", None).await.unwrap();

    assert_eq!(
        store.latest_calls.load(Ordering::SeqCst),
        1,
        "second call must not reach the store"
    );
}

#[tokio::test(start_paused = true)]
async fn lookup_after_ttl_expiry_requeries_the_store() {
    let store = FakeStore::with_rates(vec![rate("EUR", "USD", dec!(1.08), today())]);
    let mut converter = converter_with(Arc::clone(&store));

    converter.get_exchange_rate("EUR", "USD", None).await.unwrap();
    tokio::time::advance(Duration::from_secs(24 * 60 * 60 + 1)).await;
    converter.get_exchange_rate("EUR", "USD", None).await.unwrap();

    assert_eq!(store.latest_calls.load(Ordering::SeqCst), 2);
}

// ---------------------------------------------------------------------------
// Rate-update batch
// ---------------------------------------------------------------------------

/// Source with a fixed failure pair.
struct FlakySource;

#[async_trait]
impl RateSource for FlakySource {
    async fn fetch_rate(&self, from: &str, to: &str) -> Result<Decimal, CurrencyError> {
        if from == "EUR" && to == "CZK" {
            return Err(CurrencyError::Source {
                from: from.to_string(),
                to: to.to_string(),
                reason: "provider timeout".to_string(),
            });
        }
        Ok(dec!(1.1))
    }
}

#[tokio::test]
async fn update_batch_skips_failed_pairs() {
    let store = FakeStore::with_rates(Vec::new());
    let mut converter = converter_with(Arc::clone(&store));

    let summary = converter.update_exchange_rates(&FlakySource).await;

    // 6 currencies -> 30 ordered pairs, one of which fails.
    assert_eq!(summary.updated, 29);
    assert_eq!(summary.failed, 1);
    assert_eq!(store.rates.lock().unwrap().len(), 29);
}

#[tokio::test]
async fn update_batch_upserts_same_day_records() {
    let store = FakeStore::with_rates(Vec::new());
    let mut converter = converter_with(Arc::clone(&store));

    converter.update_exchange_rates(&FlakySource).await;
    converter.update_exchange_rates(&FlakySource).await;

    // Same day twice: records replaced, not duplicated.
    assert_eq!(store.rates.lock().unwrap().len(), 29);
}
