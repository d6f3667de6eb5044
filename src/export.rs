//! GeoJSON rendering of a selection for map front ends.

use geo::Point;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue};

use crate::{model::GeoPoint, selector::Selection};

fn point_feature(p: GeoPoint, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::from(&Point::from(p)))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// One feature for the user followed by one per ranked tower, best first.
pub fn to_feature_collection(user: GeoPoint, selection: &Selection) -> FeatureCollection {
    let mut features = Vec::with_capacity(selection.towers().len() + 1);

    let mut properties = JsonObject::new();
    properties.insert("kind".to_owned(), "user".into());
    properties.insert("roaming".to_owned(), selection.is_roaming().into());
    features.push(point_feature(user, properties));

    for (i, x) in selection.towers().iter().enumerate() {
        let mut properties = JsonObject::new();
        properties.insert("kind".to_owned(), "tower".into());
        properties.insert("rank".to_owned(), (i + 1).into());
        properties.insert("score".to_owned(), x.score.into());
        properties.insert("distance".to_owned(), x.distance.into());
        properties.insert("network".to_owned(), x.tower.network.into());
        properties.insert("radio".to_owned(), x.tower.radio.as_ref().into());
        properties.insert("congestion".to_owned(), x.tower.congestion.as_ref().into());
        if let Some(label) = &x.tower.label {
            properties.insert("label".to_owned(), JsonValue::from(label.as_str()));
        }
        features.push(point_feature(x.tower.position, properties));
    }

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{Congestion, RadioTechnology, Tower},
        selector::select_best,
    };

    #[test]
    fn features_follow_ranking() {
        let user = GeoPoint::new(-33.9318, 18.628).unwrap();
        let towers = vec![
            Tower::new(user, 2, RadioTechnology::Gsm).with_label("UWC Library"),
            Tower::new(GeoPoint::new(-33.932, 18.6282).unwrap(), 2, RadioTechnology::Lte)
                .with_congestion(Congestion::Low),
        ];
        let selection = select_best(user, &towers, Some(2), false);
        let collection = to_feature_collection(user, &selection);

        assert_eq!(collection.features.len(), 3);
        let json = serde_json::to_value(&collection).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["features"][0]["properties"]["kind"], "user");
        assert_eq!(
            json["features"][0]["geometry"]["coordinates"],
            serde_json::json!([18.628, -33.9318])
        );
        assert_eq!(json["features"][1]["properties"]["radio"], "LTE");
        assert_eq!(json["features"][1]["properties"]["rank"], 1);
        assert_eq!(json["features"][1]["properties"]["congestion"], "low");
        assert_eq!(json["features"][2]["properties"]["label"], "UWC Library");
    }

    #[test]
    fn no_eligible_tower_is_just_the_user() {
        let user = GeoPoint::new(0.0, 0.0).unwrap();
        let collection = to_feature_collection(user, &Selection::NoEligibleTower);
        assert_eq!(collection.features.len(), 1);
    }
}
