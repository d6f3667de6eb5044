use actix_web::{get, post, web, HttpResponse};
use cellscout::{select_best_with, GeoPoint, ScoredTower, Selection, Tower};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{radius_meters, ApiError, AppState, PositionQuery};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResponse<'a> {
    pub position: GeoPoint,
    pub roaming: bool,
    pub best: Option<&'a ScoredTower<'a>>,
    pub towers: &'a [ScoredTower<'a>],
}

impl<'a> SelectionResponse<'a> {
    /// `None` when no tower is eligible.
    pub fn new(position: GeoPoint, selection: &'a Selection<'a>) -> Option<Self> {
        match selection {
            Selection::NoEligibleTower => None,
            Selection::Ranked { towers, roaming } => Some(Self {
                position,
                roaming: *roaming,
                best: towers.first(),
                towers,
            }),
        }
    }
}

fn respond(position: GeoPoint, selection: &Selection) -> HttpResponse {
    match SelectionResponse::new(position, selection) {
        Some(body) => HttpResponse::Ok().json(body),
        None => HttpResponse::NotFound().json(json!(
            {
                "error": {
                    "errors": [{
                        "domain": "selection",
                        "reason": "noEligibleTower",
                        "message": "No tower on the preferred network was found, enable roaming to consider other operators",
                    }],
                    "code": 404,
                    "message": "Not found",
                }
            }
        )),
    }
}

#[derive(Debug, Deserialize)]
struct RecommendOptions {
    network: Option<u16>,
    roaming: Option<bool>,
    /// Kilometers.
    radius: Option<f64>,
}

#[get("/v1/recommend")]
pub async fn recommend(
    position: web::Query<PositionQuery>,
    options: web::Query<RecommendOptions>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let user = position.resolve()?;
    let radius = radius_meters(options.radius, state.search_radius)?;
    let towers = state.source.towers_near(user, radius).await?;

    let network = options.network.or(state.preferred_network);
    let roaming = options.roaming.unwrap_or(state.allow_roaming);
    let selection = select_best_with(&state.weights, user, &towers, network, roaming);
    Ok(respond(user, &selection))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectRequest {
    position: GeoPoint,
    #[serde(default)]
    towers: Vec<Tower>,
    preferred_network: Option<u16>,
    #[serde(default)]
    allow_roaming: bool,
}

#[post("/v1/select")]
pub async fn select(
    data: web::Json<SelectRequest>,
    state: web::Data<AppState>,
) -> actix_web::Result<HttpResponse> {
    let data = data.into_inner();
    let selection = select_best_with(
        &state.weights,
        data.position,
        &data.towers,
        data.preferred_network,
        data.allow_roaming,
    );
    Ok(respond(data.position, &selection))
}
