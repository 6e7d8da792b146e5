//! Station markers as GeoJSON, for a web map to style and draw.

use anyhow::Result;
use geojson::{Feature, FeatureCollection, GeoJson};

use crate::{Controller, FlowBalance};

pub fn markers_to_geojson(controller: &Controller) -> GeoJson {
    let mut features = Vec::new();
    for (marker, s) in controller.markers().into_iter().zip(controller.stations()) {
        let mut feature = Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::Point(vec![
                marker.pos.x(),
                marker.pos.y(),
            ]))),
            id: None,
            properties: None,
            foreign_members: None,
        };
        feature.set_property("short_name", s.station.orig_id.0.clone());
        if let Some(ref name) = s.station.name {
            feature.set_property("name", name.clone());
        }
        feature.set_property("radius", marker.radius);
        feature.set_property("flow_balance", marker.flow_balance);
        feature.set_property("flow", format!("{:?}", FlowBalance::of(s)));
        feature.set_property("tooltip", marker.tooltip);
        feature.set_property("departures", s.departures);
        feature.set_property("arrivals", s.arrivals);
        feature.set_property("total_traffic", s.total_traffic);
        features.push(feature);
    }

    let bbox = if features.is_empty() {
        None
    } else {
        let b = &controller.model().gps_bounds;
        Some(vec![b.min_lon, b.min_lat, b.max_lon, b.max_lat])
    };
    let mut foreign_members = serde_json::Map::new();
    foreign_members.insert(
        "time_label".to_string(),
        serde_json::Value::String(controller.time_label()),
    );
    foreign_members.insert(
        "time_filter".to_string(),
        serde_json::Value::from(controller.filter().to_raw()),
    );

    GeoJson::FeatureCollection(FeatureCollection {
        features,
        bbox,
        foreign_members: Some(foreign_members),
    })
}

pub fn markers_to_geojson_string(controller: &Controller) -> Result<String> {
    Ok(serde_json::to_string_pretty(&markers_to_geojson(controller))?)
}
