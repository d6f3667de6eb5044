use actix_web::{get, web, HttpResponse};
use cellscout::{source::nearest, Tower};
use serde::{Deserialize, Serialize};

use super::{radius_meters, ApiError, AppState, PositionQuery};

#[derive(Debug, Deserialize)]
struct TowersQuery {
    /// Kilometers.
    radius: Option<f64>,
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct NearbyTower {
    #[serde(flatten)]
    tower: Tower,
    /// Meters.
    distance: f64,
}

#[derive(Debug, Serialize)]
struct TowersResponse {
    success: bool,
    count: usize,
    towers: Vec<NearbyTower>,
}

/// Closest towers to a position, nearest first.
#[get("/api/towers")]
pub async fn nearby(
    position: web::Query<PositionQuery>,
    query: web::Query<TowersQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let center = position.resolve()?;
    let radius = radius_meters(query.radius, state.search_radius)?;
    let limit = query.limit.unwrap_or(state.nearest_limit);

    let towers = state.source.towers_near(center, radius).await?;
    let towers: Vec<_> = nearest(center, towers, limit)
        .into_iter()
        .map(|(tower, distance)| NearbyTower { tower, distance })
        .collect();

    Ok(HttpResponse::Ok().json(TowersResponse {
        success: true,
        count: towers.len(),
        towers,
    }))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use cellscout::{source::TowerSource, GeoPoint, RadioTechnology};
    use serde_json::Value;

    use super::*;
    use crate::api::test_state;

    fn towers() -> Vec<Tower> {
        (1..=8)
            .map(|i| {
                let lon = 18.628 + f64::from(i) * 0.001;
                Tower::new(GeoPoint::new(-33.9318, lon).unwrap(), 2, RadioTechnology::Lte)
            })
            .rev()
            .collect()
    }

    #[actix_web::test]
    async fn nearest_five_by_default() {
        let state = web::Data::new(test_state(TowerSource::Static(towers())));
        let app = test::init_service(App::new().app_data(state).service(nearby)).await;

        let req = test::TestRequest::get()
            .uri("/api/towers?lat=-33.9318&lon=18.628")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["success"], true);
        assert_eq!(body["count"], 5);
        let distances: Vec<f64> = body["towers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|x| x["distance"].as_f64().unwrap())
            .collect();
        assert!(distances.windows(2).all(|x| x[0] <= x[1]));
        assert!(distances[0] < 100.0);
    }

    #[actix_web::test]
    async fn radius_and_limit() {
        let state = web::Data::new(test_state(TowerSource::Static(towers())));
        let app = test::init_service(App::new().app_data(state).service(nearby)).await;

        let req = test::TestRequest::get()
            .uri("/api/towers?lat=-33.9318&lon=18.628&radius=0.3&limit=10")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        // 0.001 degrees of longitude is about 92 m here
        assert_eq!(body["count"], 3);

        let req = test::TestRequest::get()
            .uri("/api/towers?lat=-33.9318&lon=18.628&radius=51")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "radius cannot exceed 50 km");
    }
}
