//! Tour routes
//!
//! Alongside the generic CRUD routes, tours carry three derived read
//! endpoints: a preset "top five cheap" listing, per-difficulty aggregate
//! statistics, and a monthly start-date plan for one year.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Datelike};
use serde::Serialize;

use crate::envelope::Envelope;
use crate::error::{Error, Result};
use crate::handlers::{self, list_shaped};
use crate::resources::Tour;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/top-5-cheap", get(top_tours))
        .route("/stats", get(tour_stats))
        .route("/monthly-plan/{year}", get(monthly_plan))
        .route(
            "/",
            get(handlers::list::<Tour>).post(handlers::create::<Tour>),
        )
        .route(
            "/{tour_id}",
            get(handlers::get_one::<Tour>)
                .patch(handlers::update::<Tour>)
                .delete(handlers::delete_one::<Tour>),
        )
        .nest("/{tour_id}/reviews", super::reviews::nested_router())
}

/// `GET /top-5-cheap`: the five best-rated tours, cheapest first among
/// equals, trimmed to the headline fields. Presets override whatever the
/// caller sent for the same keys.
async fn top_tours(
    State(state): State<AppState>,
    Query(mut raw): Query<HashMap<String, String>>,
) -> Result<Envelope> {
    raw.insert("limit".to_string(), "5".to_string());
    raw.insert("sort".to_string(), "-ratingsAverage,price".to_string());
    raw.insert(
        "fields".to_string(),
        "name,price,ratingsAverage,summary,difficulty".to_string(),
    );

    let items = list_shaped::<Tour>(&state, &HashMap::new(), raw).await?;
    Ok(Envelope::list("tours", items))
}

/// One aggregate row per difficulty level
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DifficultyStats {
    #[serde(rename = "_id")]
    id: String,
    num_tours: u64,
    num_ratings: f64,
    avg_rating: f64,
    avg_price: f64,
    min_price: f64,
    max_price: f64,
}

/// `GET /stats`: aggregate well-rated tours (average rating of at least
/// 4.5) per difficulty, cheapest difficulty first.
async fn tour_stats(State(state): State<AppState>) -> Result<Envelope> {
    let tours = state.store().collection("tours").find().run().await?;

    struct Accumulator {
        num_tours: u64,
        num_ratings: f64,
        rating_sum: f64,
        price_sum: f64,
        min_price: f64,
        max_price: f64,
    }

    let mut groups: HashMap<String, Accumulator> = HashMap::new();
    for tour in &tours {
        let rating = tour["ratingsAverage"].as_f64().unwrap_or(0.0);
        if rating < 4.5 {
            continue;
        }
        let Some(difficulty) = tour["difficulty"].as_str() else {
            continue;
        };
        let price = tour["price"].as_f64().unwrap_or(0.0);
        let quantity = tour["ratingsQuantity"].as_f64().unwrap_or(0.0);

        let entry = groups
            .entry(difficulty.to_uppercase())
            .or_insert(Accumulator {
                num_tours: 0,
                num_ratings: 0.0,
                rating_sum: 0.0,
                price_sum: 0.0,
                min_price: f64::INFINITY,
                max_price: f64::NEG_INFINITY,
            });
        entry.num_tours += 1;
        entry.num_ratings += quantity;
        entry.rating_sum += rating;
        entry.price_sum += price;
        entry.min_price = entry.min_price.min(price);
        entry.max_price = entry.max_price.max(price);
    }

    let mut stats: Vec<DifficultyStats> = groups
        .into_iter()
        .map(|(id, acc)| DifficultyStats {
            id,
            num_tours: acc.num_tours,
            num_ratings: acc.num_ratings,
            avg_rating: acc.rating_sum / acc.num_tours as f64,
            avg_price: acc.price_sum / acc.num_tours as f64,
            min_price: acc.min_price,
            max_price: acc.max_price,
        })
        .collect();
    stats.sort_by(|a, b| {
        a.avg_price
            .partial_cmp(&b.avg_price)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(Envelope::ok("stats", serde_json::to_value(stats)?))
}

/// One row of the monthly plan
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MonthPlan {
    month: u32,
    num_tour_starts: u64,
    tours: Vec<String>,
}

/// `GET /monthly-plan/{year}`: how many tours start in each month of the
/// given year, busiest month first.
async fn monthly_plan(
    State(state): State<AppState>,
    Path(year): Path<String>,
) -> Result<Envelope> {
    let year: i32 = year
        .parse()
        .map_err(|_| Error::Operational(StatusCode::BAD_REQUEST, "Invalid year".to_string()))?;

    let tours = state.store().collection("tours").find().run().await?;

    let mut months: HashMap<u32, MonthPlan> = HashMap::new();
    for tour in &tours {
        let Some(name) = tour["name"].as_str() else {
            continue;
        };
        let Some(dates) = tour["startDates"].as_array() else {
            continue;
        };
        for date in dates {
            let Some(parsed) = date.as_str().and_then(|d| DateTime::parse_from_rfc3339(d).ok())
            else {
                continue;
            };
            if parsed.year() != year {
                continue;
            }
            let entry = months.entry(parsed.month()).or_insert(MonthPlan {
                month: parsed.month(),
                num_tour_starts: 0,
                tours: Vec::new(),
            });
            entry.num_tour_starts += 1;
            entry.tours.push(name.to_string());
        }
    }

    let mut plan: Vec<MonthPlan> = months.into_values().collect();
    plan.sort_by(|a, b| {
        b.num_tour_starts
            .cmp(&a.num_tour_starts)
            .then(a.month.cmp(&b.month))
    });
    plan.truncate(12);

    Ok(Envelope::ok("plan", serde_json::to_value(plan)?))
}
