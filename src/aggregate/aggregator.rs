//! Public aggregator surface: `geocode` and `reverse`.
//!
//! geocode: validate → chain (geocode) → per-feature fan-out at its position → merge
//! reverse: validate → chain (reverse) ∥ fan-out → merge, degrading to geometry-only

use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::chain::ChainResolver;
use super::fanout::Extender;
use super::merge::merge;
use crate::config::AggregatorConfig;
use crate::error::GeocodeError;
use crate::geo::{AggregateRequest, Coordinates, GeoFeature, Method, Payload};
use crate::provider::{
    ConfiguredAdapter, JsonClient, ProviderError, ProviderFactory, RequestParams, UreqClient,
};

/// The aggregator. Adapter lists are fixed at construction and shared
/// read-only across concurrent calls.
pub struct Georcoder {
    chain: ChainResolver,
    extender: Extender,
}

impl Georcoder {
    /// Build from configuration using the real HTTP client.
    pub fn new(config: &AggregatorConfig) -> Result<Self, ProviderError> {
        let client = Arc::new(UreqClient::with_timeout(config.timeout_secs));
        Self::with_client(config, client)
    }

    /// Build from configuration with a caller-supplied HTTP client.
    pub fn with_client(
        config: &AggregatorConfig,
        client: Arc<dyn JsonClient>,
    ) -> Result<Self, ProviderError> {
        let factory = ProviderFactory::new(client);
        let primaries = config
            .provider
            .iter()
            .map(|spec| factory.create_primary(spec))
            .collect::<Result<Vec<_>, _>>()?;
        let extenders = config
            .extend
            .iter()
            .map(|spec| factory.create_extender(spec))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_adapters(primaries, extenders))
    }

    pub fn from_adapters(
        primaries: Vec<ConfiguredAdapter>,
        extenders: Vec<ConfiguredAdapter>,
    ) -> Self {
        let chain = ChainResolver::new(primaries);
        let extender = Extender::new(extenders);
        if chain.is_empty() {
            warn!("No primary provider configured, geocode will always fail");
        }
        debug!(primaries = chain.len(), extenders = extender.len(), "Georcoder configured");
        Self { chain, extender }
    }

    /// Geocode an address (or a `"lon,lat"` string treated as free text).
    ///
    /// Fails with `NotGeocodable` when no primary finds a location, and with
    /// `Internal` when every primary failed outright. Each location found is
    /// enriched by running the extenders at its own position.
    pub async fn geocode(
        &self,
        input: &str,
        params: &RequestParams,
    ) -> Result<Vec<GeoFeature>, GeocodeError> {
        let start = Instant::now();
        let request = AggregateRequest::parse(input);
        match &request {
            AggregateRequest::Address(a) if a.is_empty() => {
                return Err(GeocodeError::BadRequest("Empty address".into()));
            }
            AggregateRequest::Coordinates(c) => c.validate()?,
            AggregateRequest::Address(_) => {}
        }

        let chain_results = match self.chain.resolve(Method::Geocode, &request, params).await {
            Ok(results) => results,
            Err(GeocodeError::NotFound) => {
                return Err(GeocodeError::NotGeocodable {
                    query: request.to_string(),
                })
            }
            Err(e) => return Err(e),
        };

        let enriched = chain_results.into_iter().filter_map(|result| {
            let at = match &result.payload {
                Payload::Feature(f) => AggregateRequest::Coordinates(f.coordinates()),
                Payload::Fragment(_) => {
                    warn!(source = %result.source, "Primary result without geometry ignored");
                    return None;
                }
            };
            Some(async move {
                let outcomes = if self.extender.is_empty() {
                    Vec::new()
                } else {
                    self.extender.extend(Method::Reverse, &at, params).await
                };
                merge(vec![result], outcomes, &at)
            })
        });
        let features: Vec<GeoFeature> = join_all(enriched).await.into_iter().flatten().collect();
        info!(
            query = %request,
            features = features.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "geocode"
        );
        Ok(features)
    }

    /// Reverse geocode a `"lon,lat"` string.
    pub async fn reverse(
        &self,
        input: &str,
        params: &RequestParams,
    ) -> Result<Vec<GeoFeature>, GeocodeError> {
        let coords = Coordinates::parse_valid(input)?;
        self.reverse_coordinates(coords, params).await
    }

    /// Reverse geocode a point. Resolves for any valid point: a failing
    /// chain degrades to a geometry-only feature and failing extenders are
    /// skipped.
    pub async fn reverse_coordinates(
        &self,
        coords: Coordinates,
        params: &RequestParams,
    ) -> Result<Vec<GeoFeature>, GeocodeError> {
        coords.validate()?;
        let start = Instant::now();
        let request = AggregateRequest::Coordinates(coords);

        let (chain, outcomes) = tokio::join!(
            self.chain.resolve(Method::Reverse, &request, params),
            self.extender.extend(Method::Reverse, &request, params),
        );
        let chain_results = chain.unwrap_or_else(|e| {
            debug!(error = %e, "Reverse chain produced nothing, degrading to geometry only");
            Vec::new()
        });

        let features = merge(chain_results, outcomes, &request);
        info!(
            coords = %coords,
            features = features.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "reverse"
        );
        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::testing::{primary, regions, words, CannedLookup, CountingGeocoder};
    use crate::config::ProviderSpec;
    use crate::provider::http::tests::MockJsonClient;
    use crate::provider::ProviderKind;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn find_hit() -> serde_json::Value {
        json!({ "locations": [{ "feature": {
            "geometry": { "x": 13.40, "y": 52.52 },
            "attributes": { "StAddr": "Alexanderplatz 1", "City": "Berlin" }
        }}]})
    }

    #[tokio::test]
    async fn test_reverse_with_failing_primary_and_extenders() {
        let g = Georcoder::from_adapters(
            vec![primary(Arc::new(CountingGeocoder::err()))],
            vec![
                regions(Arc::new(CannedLookup::err("down"))),
                words(Arc::new(CannedLookup::ok(json!({ "words": "index.home.raft" })))),
            ],
        );
        let features = g
            .reverse("13.4482975,52.47432930000001", &RequestParams::default())
            .await
            .unwrap();

        assert_eq!(features.len(), 1);
        assert_eq!(features[0].coordinates(), Coordinates::new(13.4482975, 52.47432930000001));
        assert_eq!(features[0].properties["w3w"]["words"], "index.home.raft");
        assert!(!features[0].properties.contains_key("rpath"));
    }

    #[tokio::test]
    async fn test_reverse_enriches_primary() {
        let g = Georcoder::from_adapters(
            vec![primary(Arc::new(CountingGeocoder::ok(json!({
                "address": { "Address": "Sonnenallee 1", "City": "Berlin" }
            }))))],
            vec![regions(Arc::new(CannedLookup::ok(json!([{ "osm_id": 62422 }]))))],
        );
        let features = g.reverse("13.44,52.47", &RequestParams::default()).await.unwrap();
        assert_eq!(features[0].coordinates(), Coordinates::new(13.44, 52.47));
        assert_eq!(features[0].properties["address"], "Sonnenallee 1");
        assert_eq!(features[0].properties["rpath"], json!([62422]));
    }

    #[tokio::test]
    async fn test_reverse_rejects_invalid_input_before_dispatch() {
        let p = Arc::new(CountingGeocoder::ok(json!({})));
        let g = Georcoder::from_adapters(vec![primary(p.clone())], Vec::new());
        assert_eq!(g.reverse("180,10", &RequestParams::default()).await.unwrap_err().code(), 400);
        assert_eq!(g.reverse("10,-90", &RequestParams::default()).await.unwrap_err().code(), 400);
        assert_eq!(g.reverse("Berlin", &RequestParams::default()).await.unwrap_err().code(), 400);
        assert_eq!(p.calls(), 0);
    }

    #[tokio::test]
    async fn test_geocode_zero_locations_rejects_400() {
        let g = Georcoder::from_adapters(
            vec![primary(Arc::new(CountingGeocoder::ok(json!({ "locations": [] }))))],
            vec![words(Arc::new(CannedLookup::ok(json!({ "words": "a.b.c" }))))],
        );
        let err = g.geocode("Berlin", &RequestParams::default()).await.unwrap_err();
        assert_eq!(err.code(), 400);
        assert_eq!(err.to_string(), "Address Berlin could not be geocoded!");
    }

    #[tokio::test]
    async fn test_geocode_extends_with_found_position() {
        let w3w = Arc::new(CannedLookup::ok(json!({ "words": "a.b.c" })));
        let g = Georcoder::from_adapters(
            vec![primary(Arc::new(CountingGeocoder::ok(find_hit())))],
            vec![words(w3w.clone())],
        );
        let features = g.geocode("Alexanderplatz 1", &RequestParams::default()).await.unwrap();

        assert_eq!(features.len(), 1);
        assert_relative_eq!(features[0].coordinates().lon, 13.40);
        assert_eq!(features[0].properties["address"], "Alexanderplatz 1");
        assert_eq!(features[0].properties["w3w"]["words"], "a.b.c");
        assert_eq!(w3w.last_input().as_deref(), Some("52.52,13.4"));
    }

    #[tokio::test]
    async fn test_geocode_enriches_each_location_at_its_own_position() {
        let two_hits = json!({ "locations": [
            { "feature": {
                "geometry": { "x": 13.40, "y": 52.52 },
                "attributes": { "City": "Berlin" }
            }},
            { "feature": {
                "geometry": { "x": 11.58, "y": 48.14 },
                "attributes": { "City": "Muenchen" }
            }}
        ]});
        let osm = Arc::new(
            CannedLookup::ok(json!([]))
                .at("52.52,13.4", json!([{ "osm_id": 62422 }]))
                .at("48.14,11.58", json!([{ "osm_id": 62428 }])),
        );
        let g = Georcoder::from_adapters(
            vec![primary(Arc::new(CountingGeocoder::ok(two_hits)))],
            vec![regions(osm)],
        );
        let params = RequestParams { max_locations: 2, ..RequestParams::default() };
        let features = g.geocode("Hauptbahnhof", &params).await.unwrap();

        assert_eq!(features.len(), 2);
        assert_eq!(features[0].properties["city"], "Berlin");
        assert_eq!(features[0].properties["rpath"], json!([62422]));
        assert_eq!(features[1].properties["city"], "Muenchen");
        assert_eq!(features[1].coordinates(), Coordinates::new(11.58, 48.14));
        assert_eq!(features[1].properties["rpath"], json!([62428]));
    }

    #[tokio::test]
    async fn test_geocode_outage_is_internal_error() {
        let g = Georcoder::from_adapters(
            vec![primary(Arc::new(CountingGeocoder::err()))],
            Vec::new(),
        );
        let err = g.geocode("Berlin", &RequestParams::default()).await.unwrap_err();
        assert_eq!(err.code(), 500);
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_geocode_empty_address() {
        let g = Georcoder::from_adapters(Vec::new(), Vec::new());
        assert!(matches!(
            g.geocode("   ", &RequestParams::default()).await,
            Err(GeocodeError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_geocode_passes_coordinate_text_to_primary() {
        let p = Arc::new(CountingGeocoder::ok(find_hit()));
        let g = Georcoder::from_adapters(vec![primary(p.clone())], Vec::new());
        g.geocode("13.4, 52.52", &RequestParams::default()).await.unwrap();
        assert_eq!(p.last_input().as_deref(), Some("13.4,52.52"));
    }

    #[tokio::test]
    async fn test_built_from_config_over_http_mock() {
        let mock = Arc::new(
            MockJsonClient::new()
                .respond("http://arcgis.test/find", find_hit())
                .respond("http://regions.test", json!([{ "osm_id": "62422" }])),
        );
        let config = AggregatorConfig {
            provider: vec![
                ProviderSpec::new(ProviderKind::ArcGis).with_param("base_url", "http://arcgis.test")
            ],
            extend: vec![
                ProviderSpec::new(ProviderKind::OsmRegions).with_param("url", "http://regions.test")
            ],
            timeout_secs: 5,
        };
        let g = Georcoder::with_client(&config, mock.clone()).unwrap();

        let features = g.geocode("Berlin", &RequestParams::default()).await.unwrap();
        assert_eq!(features[0].properties["city"], "Berlin");
        assert_eq!(features[0].properties["rpath"], json!([62422]));
        assert_eq!(mock.requests().len(), 2);
    }

    #[test]
    fn test_config_rejects_region_primary() {
        let config = AggregatorConfig {
            provider: vec![
                ProviderSpec::new(ProviderKind::OsmRegions).with_param("url", "http://r")
            ],
            extend: Vec::new(),
            timeout_secs: 5,
        };
        assert!(Georcoder::with_client(&config, Arc::new(MockJsonClient::new())).is_err());
    }
}
