// rest_api/src/handlers.rs

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use log::{debug, info};
use serde::Deserialize;
use serde_json::{Value, json};

use lib::BedScope;
use models::{
    Bed, BedAvailability, BedId, BedStatusChange, BedUpdate, EmergencyAllocation,
    EmergencyRequest, Hospital, HospitalId, HospitalSummary, HospitalUpdate, NewBed, NewHospital,
    NewSpecialty, NewSpecialtyGroup, Specialty, SpecialtyGroup, SpecialtyGroupId,
    SpecialtyGroupUpdate, SpecialtyId, SpecialtySummary, SpecialtyUpdate,
};

use crate::AppState;
use crate::errors::RestApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};

type ApiResult<T> = Result<Json<T>, RestApiError>;
type Created<T> = Result<(StatusCode, Json<T>), RestApiError>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearestQuery {
    pub lat: f64,
    pub lon: f64,
    pub specialty_code: String,
    pub limit: Option<usize>,
    pub radius_km: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyBedQuery {
    pub lat: f64,
    pub lon: f64,
    pub specialty_code: String,
}

fn summaries(hospitals: &[Hospital]) -> Vec<HospitalSummary> {
    hospitals.iter().map(HospitalSummary::from).collect()
}

pub async fn health_check_handler() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok", "message": "Bed allocation API is healthy" })))
}

pub async fn allocate_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<EmergencyRequest>,
) -> ApiResult<EmergencyAllocation> {
    info!(
        "[RestApi] emergency allocation for {} at [{}, {}]",
        request.specialty_code, request.latitude, request.longitude
    );
    let allocation = state
        .engine
        .allocate_for_emergency(request.latitude, request.longitude, &request.specialty_code)
        .await?;
    Ok(Json(allocation))
}

pub async fn list_hospitals_handler(State(state): State<AppState>) -> ApiResult<Vec<HospitalSummary>> {
    let hospitals = state.engine.hospitals().find_all().await?;
    Ok(Json(summaries(&hospitals)))
}

pub async fn get_hospital_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<HospitalId>,
) -> ApiResult<Hospital> {
    Ok(Json(state.engine.hospitals().find_by_id(id).await?))
}

pub async fn hospitals_by_city_handler(
    State(state): State<AppState>,
    ApiPath(city): ApiPath<String>,
) -> ApiResult<Vec<HospitalSummary>> {
    let hospitals = state.engine.hospitals().find_by_city(&city).await?;
    Ok(Json(summaries(&hospitals)))
}

pub async fn hospitals_by_specialty_handler(
    State(state): State<AppState>,
    ApiPath(code): ApiPath<String>,
) -> ApiResult<Vec<HospitalSummary>> {
    let hospitals = state.engine.hospitals().find_by_specialty_code(&code).await?;
    Ok(Json(summaries(&hospitals)))
}

pub async fn search_nearest_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<NearestQuery>,
) -> ApiResult<Vec<HospitalSummary>> {
    debug!("[RestApi] nearest search {:?}", query);
    let found = match query.radius_km {
        Some(max_km) => {
            state
                .engine
                .search_within_radius(query.lat, query.lon, &query.specialty_code, max_km, query.limit)
                .await?
        }
        None => {
            state
                .engine
                .search_nearest_with_availability(query.lat, query.lon, &query.specialty_code, query.limit)
                .await?
        }
    };
    Ok(Json(found))
}

pub async fn hospitals_with_availability_handler(
    State(state): State<AppState>,
) -> ApiResult<Vec<HospitalSummary>> {
    let hospitals = state.engine.hospitals().find_all_with_availability().await?;
    Ok(Json(summaries(&hospitals)))
}

pub async fn recount_available_beds_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<HospitalId>,
) -> ApiResult<Value> {
    let available_beds = state.engine.hospitals().update_available_beds(id).await?;
    Ok(Json(json!({ "hospitalId": id, "availableBeds": available_beds })))
}

pub async fn create_hospital_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewHospital>,
) -> Created<Hospital> {
    let hospital = state.engine.hospitals().create(request).await?;
    Ok((StatusCode::CREATED, Json(hospital)))
}

pub async fn update_hospital_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<HospitalId>,
    ApiJson(request): ApiJson<HospitalUpdate>,
) -> ApiResult<Hospital> {
    Ok(Json(state.engine.hospitals().update(id, request).await?))
}

pub async fn delete_hospital_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<HospitalId>,
) -> Result<StatusCode, RestApiError> {
    state.engine.hospitals().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_hospital_specialty_handler(
    State(state): State<AppState>,
    ApiPath((id, specialty_id)): ApiPath<(HospitalId, SpecialtyId)>,
) -> ApiResult<Hospital> {
    Ok(Json(state.engine.hospitals().add_specialty(id, specialty_id).await?))
}

pub async fn remove_hospital_specialty_handler(
    State(state): State<AppState>,
    ApiPath((id, specialty_id)): ApiPath<(HospitalId, SpecialtyId)>,
) -> ApiResult<Hospital> {
    Ok(Json(state.engine.hospitals().remove_specialty(id, specialty_id).await?))
}

pub async fn list_beds_handler(State(state): State<AppState>) -> ApiResult<Vec<Bed>> {
    Ok(Json(state.engine.beds().find_all().await?))
}

pub async fn get_bed_handler(State(state): State<AppState>, ApiPath(id): ApiPath<BedId>) -> ApiResult<Bed> {
    Ok(Json(state.engine.beds().find_by_id(id).await?))
}

pub async fn available_beds_by_hospital_handler(
    State(state): State<AppState>,
    ApiPath(hospital_id): ApiPath<HospitalId>,
) -> ApiResult<Vec<BedAvailability>> {
    state.engine.hospitals().find_by_id(hospital_id).await?;
    let beds = state.engine.find_available_beds(BedScope::Hospital(hospital_id)).await?;
    Ok(Json(beds))
}

pub async fn available_beds_by_specialty_handler(
    State(state): State<AppState>,
    ApiPath(code): ApiPath<String>,
) -> ApiResult<Vec<BedAvailability>> {
    Ok(Json(state.engine.beds().find_available_by_specialty_code(&code).await?))
}

pub async fn emergency_bed_search_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EmergencyBedQuery>,
) -> ApiResult<Vec<BedAvailability>> {
    let beds = state
        .engine
        .beds()
        .find_available_beds_for_emergency(&query.specialty_code, query.lat, query.lon)
        .await?;
    Ok(Json(beds))
}

pub async fn create_bed_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewBed>,
) -> Created<Bed> {
    let bed = state.engine.beds().create(request).await?;
    Ok((StatusCode::CREATED, Json(bed)))
}

pub async fn update_bed_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<BedId>,
    ApiJson(request): ApiJson<BedUpdate>,
) -> ApiResult<Bed> {
    Ok(Json(state.engine.beds().update(id, request).await?))
}

pub async fn change_bed_status_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<BedId>,
    ApiJson(request): ApiJson<BedStatusChange>,
) -> ApiResult<Bed> {
    Ok(Json(state.engine.transition_bed_status(id, request.status).await?))
}

pub async fn reserve_bed_handler(State(state): State<AppState>, ApiPath(id): ApiPath<BedId>) -> ApiResult<Bed> {
    Ok(Json(state.engine.reserve_bed(id).await?))
}

pub async fn release_bed_handler(State(state): State<AppState>, ApiPath(id): ApiPath<BedId>) -> ApiResult<Bed> {
    Ok(Json(state.engine.release_bed(id).await?))
}

pub async fn delete_bed_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<BedId>,
) -> Result<StatusCode, RestApiError> {
    state.engine.beds().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_specialties_handler(State(state): State<AppState>) -> ApiResult<Vec<SpecialtySummary>> {
    let specialties = state.engine.specialties().find_all().await?;
    Ok(Json(specialties.iter().map(SpecialtySummary::from).collect()))
}

pub async fn get_specialty_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SpecialtyId>,
) -> ApiResult<Specialty> {
    Ok(Json(state.engine.specialties().find_by_id(id).await?))
}

pub async fn specialty_by_code_handler(
    State(state): State<AppState>,
    ApiPath(code): ApiPath<String>,
) -> ApiResult<Specialty> {
    Ok(Json(state.engine.specialties().find_by_code(&code).await?))
}

pub async fn specialties_by_group_handler(
    State(state): State<AppState>,
    ApiPath(group): ApiPath<String>,
) -> ApiResult<Vec<SpecialtySummary>> {
    let specialties = state.engine.specialties().find_by_group(&group).await?;
    Ok(Json(specialties.iter().map(SpecialtySummary::from).collect()))
}

pub async fn create_specialty_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewSpecialty>,
) -> Created<Specialty> {
    let specialty = state.engine.specialties().create(request).await?;
    Ok((StatusCode::CREATED, Json(specialty)))
}

pub async fn update_specialty_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SpecialtyId>,
    ApiJson(request): ApiJson<SpecialtyUpdate>,
) -> ApiResult<Specialty> {
    Ok(Json(state.engine.specialties().update(id, request).await?))
}

pub async fn delete_specialty_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SpecialtyId>,
) -> Result<StatusCode, RestApiError> {
    state.engine.specialties().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_specialty_groups_handler(State(state): State<AppState>) -> ApiResult<Vec<SpecialtyGroup>> {
    Ok(Json(state.engine.specialties().find_all_groups().await?))
}

pub async fn specialty_group_by_code_handler(
    State(state): State<AppState>,
    ApiPath(code): ApiPath<String>,
) -> ApiResult<SpecialtyGroup> {
    Ok(Json(state.engine.specialties().find_group_by_code(&code).await?))
}

pub async fn create_specialty_group_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewSpecialtyGroup>,
) -> Created<SpecialtyGroup> {
    let group = state.engine.specialties().create_group(request).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn get_specialty_group_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SpecialtyGroupId>,
) -> ApiResult<SpecialtyGroup> {
    Ok(Json(state.engine.specialties().find_group_by_id(id).await?))
}

pub async fn update_specialty_group_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SpecialtyGroupId>,
    ApiJson(request): ApiJson<SpecialtyGroupUpdate>,
) -> ApiResult<SpecialtyGroup> {
    Ok(Json(state.engine.specialties().update_group(id, request).await?))
}

pub async fn delete_specialty_group_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SpecialtyGroupId>,
) -> Result<StatusCode, RestApiError> {
    state.engine.specialties().delete_group(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
