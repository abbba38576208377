use serde::{Deserialize, Serialize};

pub type AreaId = i64;

/// A named geographic region with its boundary polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub area_id: AreaId,
    pub name: String,
    pub pin_code: i64,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Coordinates,
}

/// Polygon rings, or a list of polygons for multi-part areas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coordinates {
    Polygon(Vec<Vec<Vec<f64>>>),
    MultiPolygon(Vec<Vec<Vec<Vec<f64>>>>),
}

/// Upstream GeoJSON payload for the areas endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaCollection {
    #[serde(rename = "type", default = "feature_collection_kind")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crs: Option<Crs>,
    #[serde(default)]
    pub features: Vec<AreaFeature>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crs {
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: CrsProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrsProperties {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaFeature {
    #[serde(rename = "type", default = "feature_kind")]
    pub kind: String,
    pub properties: AreaProperties,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaProperties {
    pub area_id: AreaId,
    pub name: String,
    pub pin_code: i64,
}

fn feature_collection_kind() -> String {
    "FeatureCollection".to_string()
}

fn feature_kind() -> String {
    "Feature".to_string()
}

impl From<AreaFeature> for Area {
    fn from(feature: AreaFeature) -> Self {
        Self {
            area_id: feature.properties.area_id,
            name: feature.properties.name,
            pin_code: feature.properties.pin_code,
            geometry: feature.geometry,
        }
    }
}

impl AreaCollection {
    pub fn into_areas(self) -> Vec<Area> {
        self.features.into_iter().map(Area::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{AreaCollection, Coordinates};

    #[test]
    fn parses_feature_collection_with_crs() {
        let payload = r#"{
            "type": "FeatureCollection",
            "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:OGC:1.3:CRS84"}},
            "features": [{
                "type": "Feature",
                "properties": {"area_id": 5, "name": "Indiranagar", "pin_code": 560038},
                "geometry": {"type": "Polygon", "coordinates": [[[77.63, 12.97], [77.64, 12.98], [77.63, 12.97]]]}
            }]
        }"#;

        let collection: AreaCollection =
            serde_json::from_str(payload).expect("area payload should parse");
        assert_eq!(
            collection.crs.as_ref().map(|crs| crs.properties.name.as_str()),
            Some("urn:ogc:def:crs:OGC:1.3:CRS84")
        );

        let areas = collection.into_areas();
        assert_eq!(areas.len(), 1);
        assert_eq!(areas[0].area_id, 5);
        assert_eq!(areas[0].name, "Indiranagar");
        assert_eq!(areas[0].pin_code, 560038);
        assert_eq!(areas[0].geometry.kind, "Polygon");
        assert!(matches!(
            &areas[0].geometry.coordinates,
            Coordinates::Polygon(rings) if rings.len() == 1
        ));
    }

    #[test]
    fn multipolygon_coordinates_are_accepted() {
        let payload = r#"{
            "features": [{
                "properties": {"area_id": 9, "name": "Split", "pin_code": 1},
                "geometry": {"type": "MultiPolygon", "coordinates": [
                    [[[0.0, 0.0], [1.0, 0.0], [0.0, 0.0]]],
                    [[[2.0, 2.0], [3.0, 2.0], [2.0, 2.0]]]
                ]}
            }]
        }"#;

        let collection: AreaCollection =
            serde_json::from_str(payload).expect("multipolygon payload should parse");
        assert_eq!(collection.kind, "FeatureCollection");
        let areas = collection.into_areas();
        assert!(matches!(
            &areas[0].geometry.coordinates,
            Coordinates::MultiPolygon(polygons) if polygons.len() == 2
        ));
    }
}
