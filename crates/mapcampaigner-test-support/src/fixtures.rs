//! Campaign fixtures shared by the test suites.

use serde_json::{Map, Value, json};

/// A single-feature FeatureCollection holding a closed square ring centred on
/// (`lon`, `lat`), with positions in `[lon, lat]` order.
#[must_use]
pub fn square_geometry(lon: f64, lat: f64, half_side: f64) -> Value {
    let ring = json!([
        [lon - half_side, lat - half_side],
        [lon + half_side, lat - half_side],
        [lon + half_side, lat + half_side],
        [lon - half_side, lat + half_side],
        [lon - half_side, lat - half_side],
    ]);
    json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {},
            "geometry": { "type": "Polygon", "coordinates": [ring] }
        }]
    })
}

/// `square_geometry` encoded as JSON text, the way form submissions carry it.
#[must_use]
pub fn square_geometry_text(lon: f64, lat: f64, half_side: f64) -> String {
    square_geometry(lon, lat, half_side).to_string()
}

/// Initial attributes for creating a campaign: a unit square around (0, 0)
/// and no selected functions, both as JSON text.
#[must_use]
pub fn campaign_attributes(uuid: &str, name: &str) -> Map<String, Value> {
    let mut attributes = Map::new();
    attributes.insert("uuid".to_owned(), json!(uuid));
    attributes.insert("name".to_owned(), json!(name));
    attributes.insert("geometry".to_owned(), json!(square_geometry_text(0.0, 0.0, 1.0)));
    attributes.insert("selected_functions".to_owned(), json!("{}"));
    attributes
}

/// A stored campaign body at version 1, as written by `alice`.
#[must_use]
pub fn campaign_document(uuid: &str, name: &str, status: &str, geometry: &Value) -> String {
    json!({
        "uuid": uuid,
        "version": 1,
        "name": name,
        "campaign_creator": "alice",
        "edited_by": "alice",
        "campaign_status": status,
        "coverage": {},
        "geometry": geometry,
        "start_date": "2017-05-10",
        "campaign_managers": ["alice"],
        "selected_functions": {},
        "tags": [],
        "description": ""
    })
    .to_string()
}
