//! In-memory adapters shared by the aggregation tests.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::provider::{
    Adapter, ConfiguredAdapter, Geocoder, ProviderError, ProviderKind, RegionLookup, RegionQuery,
    RequestParams, WordLookup, WordsQuery,
};

/// Answers every call with the same canned result and counts calls.
pub struct CountingGeocoder {
    response: Result<Value, ProviderError>,
    calls: AtomicUsize,
    last_input: Mutex<Option<String>>,
}

impl CountingGeocoder {
    pub fn ok(response: Value) -> Self {
        Self {
            response: Ok(response),
            calls: AtomicUsize::new(0),
            last_input: Mutex::new(None),
        }
    }

    pub fn err() -> Self {
        Self {
            response: Err(ProviderError::Http("connection refused".into())),
            calls: AtomicUsize::new(0),
            last_input: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_input(&self) -> Option<String> {
        self.last_input.lock().unwrap().clone()
    }

    fn answer(&self, input: &str) -> Result<Value, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_input.lock().unwrap() = Some(input.to_string());
        self.response.clone()
    }
}

#[async_trait]
impl Geocoder for CountingGeocoder {
    async fn geocode(&self, query: &str, _: &RequestParams) -> Result<Value, ProviderError> {
        self.answer(query)
    }

    async fn reverse(&self, coords: &str, _: &RequestParams) -> Result<Value, ProviderError> {
        self.answer(coords)
    }
}

/// Region/word lookup with an optional delay, to exercise concurrent settling.
/// Answers registered with [`CannedLookup::at`] take precedence for their input.
pub struct CannedLookup {
    response: Result<Value, ProviderError>,
    by_input: Vec<(String, Value)>,
    delay: Duration,
    last_input: Mutex<Option<String>>,
}

impl CannedLookup {
    pub fn ok(response: Value) -> Self {
        Self {
            response: Ok(response),
            by_input: Vec::new(),
            delay: Duration::ZERO,
            last_input: Mutex::new(None),
        }
    }

    pub fn err(msg: &str) -> Self {
        Self {
            response: Err(ProviderError::Http(msg.to_string())),
            by_input: Vec::new(),
            delay: Duration::ZERO,
            last_input: Mutex::new(None),
        }
    }

    pub fn at(mut self, input: &str, response: Value) -> Self {
        self.by_input.push((input.to_string(), response));
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn last_input(&self) -> Option<String> {
        self.last_input.lock().unwrap().clone()
    }

    async fn answer(&self, input: String) -> Result<Value, ProviderError> {
        let matched = self
            .by_input
            .iter()
            .find(|(at, _)| *at == input)
            .map(|(_, response)| response.clone());
        *self.last_input.lock().unwrap() = Some(input);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match matched {
            Some(response) => Ok(response),
            None => self.response.clone(),
        }
    }
}

#[async_trait]
impl RegionLookup for CannedLookup {
    async fn get_regions(
        &self,
        q: &RegionQuery,
        _: &RequestParams,
    ) -> Result<Value, ProviderError> {
        self.answer(format!("{},{}", q.lat, q.lng)).await
    }
}

#[async_trait]
impl WordLookup for CannedLookup {
    async fn position_to_words(
        &self,
        q: &WordsQuery,
        _: &RequestParams,
    ) -> Result<Value, ProviderError> {
        self.answer(q.position.clone()).await
    }
}

pub fn primary(g: Arc<CountingGeocoder>) -> ConfiguredAdapter {
    ConfiguredAdapter::new(ProviderKind::ArcGis, Adapter::PrimaryGeocoder(g))
}

pub fn regions(l: Arc<CannedLookup>) -> ConfiguredAdapter {
    ConfiguredAdapter::new(ProviderKind::OsmRegions, Adapter::RegionExtender(l))
}

pub fn words(l: Arc<CannedLookup>) -> ConfiguredAdapter {
    ConfiguredAdapter::new(ProviderKind::What3Words, Adapter::WordExtender(l))
}

pub fn generic(g: Arc<CountingGeocoder>) -> ConfiguredAdapter {
    ConfiguredAdapter::new(ProviderKind::Nominatim, Adapter::GenericExtender(g))
}
