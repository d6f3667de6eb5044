use actix_web::{get, web, HttpResponse};
use cellscout::{
    signal::{self, Recommendation, SignalEstimate},
    traffic::{is_high_traffic, TrafficArea},
    GeoPoint, Tower,
};
use chrono::{Local, NaiveTime};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState, PositionQuery};

#[derive(Debug, Deserialize)]
struct SignalQuery {
    /// Local time of day as HH:MM, defaults to now.
    time: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalReport<'a> {
    pub position: GeoPoint,
    pub signal: Option<SignalEstimate<'a>>,
    pub recommendation: Recommendation<'a>,
    pub high_traffic: bool,
}

impl<'a> SignalReport<'a> {
    pub fn new(
        position: GeoPoint,
        towers: &'a [Tower],
        areas: &[TrafficArea],
        time: NaiveTime,
    ) -> Self {
        Self {
            position,
            signal: signal::estimate(position, towers),
            recommendation: signal::recommend(position, towers),
            high_traffic: is_high_traffic(position, areas, time),
        }
    }
}

/// Current signal estimate and where to walk for a better one.
#[get("/v1/signal")]
pub async fn service(
    position: web::Query<PositionQuery>,
    query: web::Query<SignalQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let position = position.resolve()?;
    let time = match &query.time {
        Some(x) => NaiveTime::parse_from_str(x, "%H:%M")
            .map_err(|_| ApiError::InvalidTime(x.clone()))?,
        None => Local::now().time(),
    };

    let towers = state.source.towers_near(position, state.search_radius).await?;
    Ok(HttpResponse::Ok().json(SignalReport::new(position, &towers, &state.traffic_areas, time)))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use cellscout::{
        source::TowerSource,
        traffic::PeakWindow,
        Congestion, RadioTechnology,
    };
    use serde_json::Value;

    use super::*;
    use crate::api::test_state;

    fn state() -> AppState {
        let towers = vec![
            Tower::new(GeoPoint::new(-33.9249, 18.4241).unwrap(), 1, RadioTechnology::Lte)
                .with_strength(85.0)
                .with_load(1000, 650),
            Tower::new(GeoPoint::new(-33.932, 18.41).unwrap(), 3, RadioTechnology::Lte)
                .with_label("Cell C")
                .with_strength(92.0)
                .with_load(1200, 400),
        ];
        let mut state = test_state(TowerSource::Static(towers));
        state.traffic_areas = vec![TrafficArea {
            name: "Cape Town CBD".to_owned(),
            position: GeoPoint::new(-33.9249, 18.4241).unwrap(),
            congestion: Congestion::High,
            peak_hours: PeakWindow::parse_list("07:00-09:00, 17:00-19:00").unwrap(),
        }];
        state
    }

    #[actix_web::test]
    async fn reports_signal_and_recommendation() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .service(service),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/v1/signal?lat=-33.9249&lon=18.4241&time=08:15")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["highTraffic"], true);
        assert!(body["signal"]["strength"].as_f64().unwrap() > 0.0);
        assert_eq!(body["recommendation"]["tower"]["label"], "Cell C");
        assert_eq!(body["recommendation"]["route"]["direction"], "SW");
        assert!(body["recommendation"]["route"]["etaMinutes"].as_u64().unwrap() > 0);

        let req = test::TestRequest::get()
            .uri("/v1/signal?lat=-33.9249&lon=18.4241&time=12:00")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["highTraffic"], false);
    }

    #[actix_web::test]
    async fn rejects_bad_time() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .service(service),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/v1/signal?lat=-33.9249&lon=18.4241&time=noon")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
