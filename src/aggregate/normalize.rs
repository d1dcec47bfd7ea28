//! Provider input shaping and response normalization.
//!
//! `format_input` turns an [`AggregateRequest`] into what a given adapter
//! expects; `format_output` turns the adapter's raw JSON back into canonical
//! [`ProviderResult`]s. `None` from `format_output` means the provider has
//! nothing to contribute for that method, which is not an error.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::geo::{
    AggregateRequest, Coordinates, GeoFeature, Method, Properties, PropertyFragment,
    ProviderResult,
};
use crate::provider::{
    Adapter, ConfiguredAdapter, ProviderError, ProviderInput, ProviderKind, RegionQuery,
    WordsQuery,
};

/// Field list requested from region services.
const REGION_FIELDS: &str = "osm_id";

// ─── Input ───────────────────────────────────────────────────────

pub fn format_input(
    adapter: &ConfiguredAdapter,
    method: Method,
    request: &AggregateRequest,
) -> Result<ProviderInput, ProviderError> {
    let coords = || {
        request.coordinates().ok_or_else(|| {
            ProviderError::InvalidInput(format!(
                "{} {} needs coordinates, got address '{}'",
                adapter.source(),
                method,
                request
            ))
        })
    };

    match &adapter.adapter {
        Adapter::PrimaryGeocoder(_) | Adapter::GenericExtender(_) => match method {
            Method::Geocode => Ok(ProviderInput::Text(request.query_string())),
            Method::Reverse => Ok(ProviderInput::Text(coords()?.to_lon_lat())),
        },
        Adapter::RegionExtender(_) => {
            let c = coords()?;
            Ok(ProviderInput::Region(RegionQuery {
                lat: c.lat,
                lng: c.lon,
                fields: REGION_FIELDS.to_string(),
            }))
        }
        Adapter::WordExtender(_) => Ok(ProviderInput::Words(WordsQuery {
            position: coords()?.to_lat_lon(),
        })),
    }
}

// ─── Success classification ─────────────────────────────────────

/// True when the response carries a truthy `error` member.
pub fn has_error_flag(raw: &Value) -> bool {
    match raw.get("error") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(_) => true,
    }
}

/// geocode: at least one location. reverse: a non-empty address block.
pub fn is_success(method: Method, raw: &Value) -> bool {
    if has_error_flag(raw) {
        return false;
    }
    match method {
        Method::Geocode => raw
            .get("locations")
            .and_then(Value::as_array)
            .is_some_and(|l| !l.is_empty()),
        Method::Reverse => raw
            .get("address")
            .and_then(Value::as_object)
            .is_some_and(|a| !a.is_empty()),
    }
}

// ─── Output ──────────────────────────────────────────────────────

pub fn format_output(
    adapter: &ConfiguredAdapter,
    method: Method,
    raw: &Value,
    request: &AggregateRequest,
) -> Option<Vec<ProviderResult>> {
    let source = adapter.source();
    match &adapter.adapter {
        Adapter::PrimaryGeocoder(_) => {
            let features = format_features(adapter.kind, method, raw, request);
            if features.is_empty() {
                return None;
            }
            Some(
                features
                    .into_iter()
                    .map(|f| ProviderResult::primary(source, f))
                    .collect(),
            )
        }
        Adapter::RegionExtender(_) => {
            let rpath = region_ids(raw)?;
            Some(vec![ProviderResult::extend(
                source,
                PropertyFragment::single("rpath", json!(rpath)),
            )])
        }
        Adapter::WordExtender(_) => Some(vec![ProviderResult::extend(
            source,
            PropertyFragment::single("w3w", raw.clone()),
        )]),
        Adapter::GenericExtender(_) => {
            let first = format_features(adapter.kind, method, raw, request)
                .into_iter()
                .next()?;
            Some(vec![ProviderResult::extend(
                source,
                PropertyFragment::single(source, Value::Object(first.properties)),
            )])
        }
    }
}

/// Canonical features for a primary-style response. Empty when the
/// provider/method pair yields nothing usable.
fn format_features(
    kind: ProviderKind,
    method: Method,
    raw: &Value,
    request: &AggregateRequest,
) -> Vec<GeoFeature> {
    if !is_success(method, raw) {
        return Vec::new();
    }
    match (kind, method) {
        (ProviderKind::ArcGis, Method::Geocode) => arcgis_geocode(raw),
        (ProviderKind::ArcGis, Method::Reverse) => request
            .coordinates()
            .and_then(|c| arcgis_reverse(raw, c))
            .into_iter()
            .collect(),
        (ProviderKind::Nominatim, Method::Geocode) => nominatim_geocode(raw),
        (ProviderKind::Nominatim, Method::Reverse) => request
            .coordinates()
            .and_then(|c| nominatim_reverse(raw, c))
            .into_iter()
            .collect(),
        _ => Vec::new(),
    }
}

// ─── ArcGIS ──────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ArcGisFind {
    #[serde(default)]
    locations: Vec<ArcGisLocation>,
}

#[derive(Deserialize)]
struct ArcGisLocation {
    feature: ArcGisFeature,
}

#[derive(Deserialize)]
struct ArcGisFeature {
    geometry: ArcGisPoint,
    #[serde(default)]
    attributes: Properties,
}

#[derive(Deserialize)]
struct ArcGisPoint {
    x: Value,
    y: Value,
}

#[derive(Deserialize)]
struct ArcGisReverse {
    address: Properties,
}

const ARCGIS_FIND_FIELDS: &[(&str, &str)] = &[
    ("address", "StAddr"),
    ("postal", "Postal"),
    ("city", "City"),
    ("country", "Country"),
    ("formatted_name", "Match_addr"),
    ("house_number", "AddNum"),
    ("side", "Side"),
];

const ARCGIS_REVERSE_FIELDS: &[(&str, &str)] = &[
    ("address", "Address"),
    ("postal", "Postal"),
    ("city", "City"),
    ("country", "CountryCode"),
    ("formatted_name", "Match_addr"),
];

fn arcgis_geocode(raw: &Value) -> Vec<GeoFeature> {
    let Ok(find) = ArcGisFind::deserialize(raw) else {
        tracing::warn!("Unexpected ArcGIS find response shape");
        return Vec::new();
    };
    find.locations
        .into_iter()
        .filter_map(|loc| {
            let f = loc.feature;
            // Locations without numeric coordinates cannot become features.
            let lon = as_number(&f.geometry.x)?;
            let lat = as_number(&f.geometry.y)?;
            Some(GeoFeature::new(
                Coordinates::new(lon, lat),
                map_fields(&f.attributes, ARCGIS_FIND_FIELDS),
            ))
        })
        .collect()
}

fn arcgis_reverse(raw: &Value, at: Coordinates) -> Option<GeoFeature> {
    let rev = ArcGisReverse::deserialize(raw).ok()?;
    Some(GeoFeature::new(at, map_fields(&rev.address, ARCGIS_REVERSE_FIELDS)))
}

// ─── Nominatim ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct NominatimSearch {
    #[serde(default)]
    locations: Vec<NominatimPlace>,
}

#[derive(Deserialize)]
struct NominatimPlace {
    #[serde(default)]
    lat: Value,
    #[serde(default)]
    lon: Value,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: Properties,
}

const NOMINATIM_FIELDS: &[(&str, &str)] = &[
    ("address", "road"),
    ("postal", "postcode"),
    ("house_number", "house_number"),
];

fn nominatim_properties(place: &NominatimPlace) -> Properties {
    let mut props = map_fields(&place.address, NOMINATIM_FIELDS);
    if let Some(city) = ["city", "town", "village"]
        .iter()
        .find_map(|k| place.address.get(*k).filter(|v| !v.is_null()))
    {
        props.insert("city".into(), city.clone());
    }
    if let Some(cc) = place.address.get("country_code").and_then(Value::as_str) {
        props.insert("country".into(), json!(cc.to_uppercase()));
    }
    if let Some(ref name) = place.display_name {
        props.insert("formatted_name".into(), json!(name));
    }
    props
}

fn nominatim_geocode(raw: &Value) -> Vec<GeoFeature> {
    let Ok(search) = NominatimSearch::deserialize(raw) else {
        tracing::warn!("Unexpected Nominatim search response shape");
        return Vec::new();
    };
    search
        .locations
        .iter()
        .filter_map(|place| {
            let lon = as_number(&place.lon)?;
            let lat = as_number(&place.lat)?;
            Some(GeoFeature::new(
                Coordinates::new(lon, lat),
                nominatim_properties(place),
            ))
        })
        .collect()
}

fn nominatim_reverse(raw: &Value, at: Coordinates) -> Option<GeoFeature> {
    let place = NominatimPlace::deserialize(raw).ok()?;
    Some(GeoFeature::new(at, nominatim_properties(&place)))
}

// ─── Extenders ──────────────────────────────────────────────────

/// `[{"osm_id": "62422"}, ...]` → `[62422, ...]`. Non-numeric ids are dropped.
fn region_ids(raw: &Value) -> Option<Vec<Value>> {
    let regions = raw.as_array()?;
    Some(
        regions
            .iter()
            .filter_map(|r| r.get("osm_id").and_then(as_number))
            .map(|id| {
                if id.fract() == 0.0 && id.abs() < i64::MAX as f64 {
                    json!(id as i64)
                } else {
                    json!(id)
                }
            })
            .collect(),
    )
}

// ─── Helpers ─────────────────────────────────────────────────────

/// Numeric cast accepting JSON numbers and numeric strings.
fn as_number(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Copy `src[from]` to `to` for each pair; absent or null fields are skipped.
fn map_fields(src: &Properties, mapping: &[(&str, &str)]) -> Properties {
    let mut out = Properties::new();
    for (to, from) in mapping {
        if let Some(v) = src.get(*from).filter(|v| !v.is_null()) {
            out.insert((*to).to_string(), v.clone());
        }
    }
    out
}
