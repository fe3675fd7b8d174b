// crates/provstat-core/src/geo.rs

//! Province polygons and the spelling bridge between GeoJSON and CSV names.

use crate::error::{Result, StatError};
use crate::loader::common_io::open_stream;
use crate::model::columns;
use crate::text::{canonical_province, fold_key};
use geojson::{Feature, FeatureCollection};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Feature properties that may carry the province name, in preference order.
pub const NAME_PROPERTIES: &[&str] = &["Propinsi", "NAME_1", "name"];

/// GeoJSON spelling → source CSV spelling for the 34 provinces drawn on the map.
///
/// The CSV side is written as the sources spell it; it is canonicalized
/// when a [`ProvinceMapping`] is built.
pub const INDONESIA_PROVINCES: &[(&str, &str)] = &[
    ("KEPULAUAN BANGKA BELITUNG", "KEP. BANGKA BELITUNG"),
    ("KEPULAUAN RIAU", "KEP. RIAU"),
    ("DKI JAKARTA", "DKI JAKARTA"),
    ("JAWA BARAT", "JAWA BARAT"),
    ("JAWA TENGAH", "JAWA TENGAH"),
    ("DI YOGYAKARTA", "DI YOGYAKARTA"),
    ("JAWA TIMUR", "JAWA TIMUR"),
    ("BANTEN", "BANTEN"),
    ("BALI", "BALI"),
    ("NUSA TENGGARA BARAT", "NUSA TENGGARA BARAT"),
    ("NUSA TENGGARA TIMUR", "NUSA TENGGARA TIMUR"),
    ("KALIMANTAN BARAT", "KALIMANTAN BARAT"),
    ("KALIMANTAN TENGAH", "KALIMANTAN TENGAH"),
    ("KALIMANTAN SELATAN", "KALIMANTAN SELATAN"),
    ("KALIMANTAN TIMUR", "KALIMANTAN TIMUR"),
    ("KALIMANTAN UTARA", "KALIMANTAN UTARA"),
    ("SULAWESI UTARA", "SULAWESI UTARA"),
    ("SULAWESI TENGAH", "SULAWESI TENGAH"),
    ("SULAWESI SELATAN", "SULAWESI SELATAN"),
    ("SULAWESI TENGGARA", "SULAWESI TENGGARA"),
    ("GORONTALO", "GORONTALO"),
    ("SULAWESI BARAT", "SULAWESI BARAT"),
    ("MALUKU", "MALUKU"),
    ("MALUKU UTARA", "MALUKU UTARA"),
    ("PAPUA", "PAPUA"),
    ("PAPUA BARAT", "PAPUA BARAT"),
    ("SUMATERA UTARA", "SUMATERA UTARA"),
    ("SUMATERA BARAT", "SUMATERA BARAT"),
    ("RIAU", "RIAU"),
    ("JAMBI", "JAMBI"),
    ("SUMATERA SELATAN", "SUMATERA SELATAN"),
    ("BENGKULU", "BENGKULU"),
    ("LAMPUNG", "LAMPUNG"),
    ("ACEH", "ACEH"),
];

/// Bidirectional GeoJSON ↔ CSV province-name table.
///
/// Lookups fold case and whitespace on the GeoJSON side; the CSV side is
/// always the canonical province key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProvinceMapping {
    geo_to_csv: BTreeMap<String, String>,
    csv_to_geo: BTreeMap<String, String>,
}

impl ProvinceMapping {
    /// Builds a mapping. Fails if two GeoJSON names claim the same province
    /// or one GeoJSON name is listed twice with different targets.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self> {
        let mut mapping = ProvinceMapping::default();
        for (geo, csv) in pairs {
            let csv = canonical_province(csv);
            let folded = fold_key(geo);
            if let Some(prev) = mapping.geo_to_csv.get(&folded) {
                if *prev != csv {
                    return Err(StatError::Mapping(format!(
                        "{geo} maps to both {prev} and {csv}"
                    )));
                }
                continue;
            }
            if let Some(other) = mapping.csv_to_geo.get(&csv) {
                return Err(StatError::Mapping(format!(
                    "{csv} claimed by both {other} and {geo}"
                )));
            }
            mapping.geo_to_csv.insert(folded, csv.clone());
            mapping.csv_to_geo.insert(csv, geo.to_string());
        }
        Ok(mapping)
    }

    /// The built-in table for Indonesia's 34 pre-2022 provinces, checked
    /// like any other table.
    pub fn indonesia() -> Result<Self> {
        Self::from_pairs(INDONESIA_PROVINCES.iter().copied())
    }

    /// Canonical CSV key for a GeoJSON name.
    pub fn to_csv(&self, geo_name: &str) -> Option<&str> {
        self.geo_to_csv.get(&fold_key(geo_name)).map(String::as_str)
    }

    /// GeoJSON spelling for a canonical CSV key.
    pub fn to_geo(&self, province: &str) -> Option<&str> {
        self.csv_to_geo.get(province).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.csv_to_geo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.csv_to_geo.is_empty()
    }
}

/// Reads a GeoJSON `FeatureCollection`.
pub fn load_geojson(path: &Path) -> Result<FeatureCollection> {
    let reader = open_stream(path)?;
    read_geojson_from(reader)
}

pub fn read_geojson_from<R: Read>(mut reader: R) -> Result<FeatureCollection> {
    let mut buffer = String::new();
    reader.read_to_string(&mut buffer)?;
    Ok(buffer.parse::<FeatureCollection>()?)
}

/// The province name carried by a feature, from the first of
/// [`NAME_PROPERTIES`] that holds a string.
pub fn feature_name(feature: &Feature) -> Option<String> {
    NAME_PROPERTIES.iter().find_map(|p| {
        feature
            .property(p)
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

/// One renderable province polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoShape {
    /// Name as spelled in the GeoJSON.
    pub geo_name: String,
    /// Canonical province key.
    pub province: String,
    pub feature: Feature,
}

/// Keeps the features whose name resolves through `mapping`.
///
/// Each kept feature gets a `Provinsi` property holding the canonical key.
/// Unnamed or unmapped features are dropped silently; the rest are
/// unaffected by the drop.
pub fn reconcile_geometry_keys(features: Vec<Feature>, mapping: &ProvinceMapping) -> Vec<GeoShape> {
    features
        .into_iter()
        .filter_map(|mut feature| {
            let Some(geo_name) = feature_name(&feature) else {
                debug!("feature without a province name dropped");
                return None;
            };
            let Some(province) = mapping.to_csv(&geo_name).map(str::to_string) else {
                debug!(feature = %geo_name, "feature has no province mapping; dropped");
                return None;
            };
            feature.set_property(columns::PROVINCE, province.clone());
            Some(GeoShape {
                geo_name,
                province,
                feature,
            })
        })
        .collect()
}

/// Axis-aligned lat/lng box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }

    pub fn padded(&self, degrees: f64) -> Bounds {
        Bounds {
            min_lat: self.min_lat - degrees,
            max_lat: self.max_lat + degrees,
            min_lng: self.min_lng - degrees,
            max_lng: self.max_lng + degrees,
        }
    }
}

/// Bounds over the outer rings of every polygon of `shapes`.
///
/// `None` when no shape carries polygon geometry.
pub fn bounds_of<'a>(shapes: impl IntoIterator<Item = &'a GeoShape>) -> Option<Bounds> {
    let mut bounds: Option<Bounds> = None;
    let mut extend = |pos: &[f64]| {
        let (lng, lat) = match pos {
            [lng, lat, ..] => (*lng, *lat),
            _ => return,
        };
        let b = bounds.get_or_insert(Bounds {
            min_lat: lat,
            max_lat: lat,
            min_lng: lng,
            max_lng: lng,
        });
        b.min_lat = b.min_lat.min(lat);
        b.max_lat = b.max_lat.max(lat);
        b.min_lng = b.min_lng.min(lng);
        b.max_lng = b.max_lng.max(lng);
    };

    for shape in shapes {
        let Some(geometry) = &shape.feature.geometry else {
            continue;
        };
        match &geometry.value {
            geojson::Value::Polygon(rings) => {
                for pos in rings.iter().take(1).flatten() {
                    extend(pos.as_slice());
                }
            }
            geojson::Value::MultiPolygon(polygons) => {
                for pos in polygons.iter().filter_map(|p| p.first()).flatten() {
                    extend(pos.as_slice());
                }
            }
            _ => {}
        }
    }
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature(name: &str, ring: Vec<Vec<f64>>) -> Feature {
        let mut f = Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::Polygon(vec![ring]))),
            id: None,
            properties: None,
            foreign_members: None,
        };
        f.set_property("Propinsi", name);
        f
    }

    #[test]
    fn mapping_is_bidirectional_and_canonical() {
        let m = ProvinceMapping::indonesia().unwrap();
        assert_eq!(m.len(), 34);
        assert_eq!(m.to_csv("Kepulauan Riau"), Some("KEPULAUAN RIAU"));
        assert_eq!(m.to_csv("KEPULAUAN BANGKA BELITUNG"), Some("KEPULAUAN BANGKA BELITUNG"));
        assert_eq!(m.to_geo("KEPULAUAN RIAU"), Some("KEPULAUAN RIAU"));
        assert_eq!(m.to_csv("PAPUA TENGAH"), None);
    }

    #[test]
    fn mapping_rejects_ambiguous_targets() {
        let err = ProvinceMapping::from_pairs([("BABEL", "KEP. BANGKA BELITUNG"), ("BANGKA", "Kepulauan Bangka Belitung")]);
        assert!(matches!(err, Err(StatError::Mapping(_))));
    }

    #[test]
    fn built_in_table_goes_through_validation() {
        let built_in = ProvinceMapping::indonesia().unwrap();
        assert_eq!(built_in, ProvinceMapping::from_pairs(INDONESIA_PROVINCES.iter().copied()).unwrap());

        let clash = INDONESIA_PROVINCES.iter().copied().chain([("KEPRI", "Kep. Riau")]);
        assert!(matches!(ProvinceMapping::from_pairs(clash), Err(StatError::Mapping(_))));
    }

    #[test]
    fn unmapped_features_are_dropped_without_touching_others() {
        let features = vec![
            feature("ACEH", vec![vec![95.0, 2.0], vec![98.0, 6.0]]),
            feature("ATLANTIS", vec![vec![0.0, 0.0], vec![1.0, 1.0]]),
            feature("KEPULAUAN RIAU", vec![vec![103.0, -1.0], vec![109.0, 4.0]]),
        ];

        let shapes = reconcile_geometry_keys(features, &ProvinceMapping::indonesia().unwrap());

        let names: Vec<_> = shapes.iter().map(|s| s.province.as_str()).collect();
        assert_eq!(names, ["ACEH", "KEPULAUAN RIAU"]);
        assert_eq!(shapes[1].feature.property("Provinsi"), Some(&json!("KEPULAUAN RIAU")));
    }

    #[test]
    fn name_falls_back_to_alternate_properties() {
        let mut f = feature("", vec![]);
        f.set_property("NAME_1", "Bali");
        assert_eq!(feature_name(&f).as_deref(), Some("Bali"));
    }

    #[test]
    fn bounds_cover_outer_rings() {
        let shapes = reconcile_geometry_keys(
            vec![
                feature("ACEH", vec![vec![95.0, 2.0], vec![98.0, 6.0]]),
                feature("BALI", vec![vec![114.4, -8.9], vec![115.7, -8.0]]),
            ],
            &ProvinceMapping::indonesia().unwrap(),
        );
        let b = bounds_of(&shapes).unwrap();
        assert_eq!((b.min_lat, b.max_lat, b.min_lng, b.max_lng), (-8.9, 6.0, 95.0, 115.7));
        assert!(bounds_of(std::iter::empty::<&GeoShape>()).is_none());
    }
}
