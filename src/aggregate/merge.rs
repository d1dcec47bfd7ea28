//! Merge of chain results and extender fragments into the final features.

use tracing::{debug, warn};

use super::fanout::ExtendOutcome;
use crate::geo::{
    AggregateRequest, GeoFeature, Payload, PropertyFragment, ProviderResult, ResultKind,
};

/// Combine chain results and extender outcomes.
///
/// Results are routed by their `kind` tag. When no primary feature exists, a
/// single geometry-only feature is synthesized from the request's
/// coordinates. Every fragment from a successful outcome is then applied to
/// every feature in order, so on a key collision the later fragment wins.
/// Output is empty only when there is no feature and no coordinate to fall
/// back on.
pub fn merge(
    chain_results: Vec<ProviderResult>,
    extend_outcomes: Vec<ExtendOutcome>,
    request: &AggregateRequest,
) -> Vec<GeoFeature> {
    let mut geo = Vec::new();
    let mut fragments = Vec::new();

    let settled = extend_outcomes.into_iter().filter_map(|o| match o.result {
        Ok(results) => Some(results),
        Err(e) => {
            debug!(source = o.source, error = %e, "Skipping failed extender");
            None
        }
    });

    for result in chain_results.into_iter().chain(settled.flatten()) {
        match (result.kind, result.payload) {
            (ResultKind::Primary, Payload::Feature(f)) => geo.push(f),
            (ResultKind::Extend, Payload::Fragment(frag)) => fragments.push(frag),
            (ResultKind::Extend, Payload::Feature(f)) => {
                fragments.push(PropertyFragment(f.properties))
            }
            (ResultKind::Primary, Payload::Fragment(_)) => {
                warn!(source = %result.source, "Primary result without geometry ignored")
            }
        }
    }

    if geo.is_empty() {
        match request.coordinates() {
            Some(c) => geo.push(GeoFeature::bare(c)),
            None => return Vec::new(),
        }
    }

    for feature in &mut geo {
        for frag in &fragments {
            frag.apply_to(&mut feature.properties);
        }
    }
    geo
}
