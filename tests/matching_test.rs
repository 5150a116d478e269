//! Tests for the free-text booking heuristics

use chrono::NaiveDate;
use salon_ops::matching::{
    match_service, parse_time_preference, ScheduleSource, ServiceMatch, DEFAULT_TIME,
};
use salon_ops::models::Service;

fn service(id: i64, name: &str) -> Service {
    Service {
        id,
        name: name.to_string(),
        category_id: 2,
        price: 45.0,
        duration_minutes: 60,
        supply_cost: 5.0,
        active: true,
        description: String::new(),
        category_name: Some("Cejas".to_string()),
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[test]
fn test_schedule_parse_splits_on_separator() {
    let schedule = parse_time_preference("2025-03-10 a las 16:30", today());
    assert_eq!(schedule.date, NaiveDate::from_ymd_opt(2025, 3, 10).expect("date"));
    assert_eq!(schedule.time, "16:30");
    assert_eq!(schedule.source, ScheduleSource::Parsed);
}

#[test]
fn test_schedule_parse_without_separator_falls_back() {
    let schedule = parse_time_preference("por las tardes si puede ser", today());
    assert_eq!(schedule.date, today());
    assert_eq!(schedule.time, DEFAULT_TIME);
    assert_eq!(schedule.source, ScheduleSource::Fallback);
}

#[test]
fn test_schedule_parse_with_garbage_around_separator_falls_back() {
    // separator present but neither side parses
    let schedule = parse_time_preference("el martes a las tres", today());
    assert_eq!(schedule.source, ScheduleSource::Fallback);
    assert_eq!(schedule.time, DEFAULT_TIME);
}

#[test]
fn test_exact_match_beats_token_match() {
    // id 1 would win any token scan; the exact name must still be preferred
    let services = vec![
        service(1, "Laminado de Cejas"),
        service(2, "Laminado de Cejas especial"),
    ];
    let matched = match_service(&services, "Laminado de Cejas especial").expect("match");
    match matched {
        ServiceMatch::Exact(found) => assert_eq!(found.id, 2),
        other => panic!("expected exact match, got {other:?}"),
    }
}

#[test]
fn test_exact_match_is_case_and_accent_insensitive() {
    let services = vec![service(1, "Micropigmentación de Cejas")];
    let matched = match_service(&services, "micropigmentacion de cejas").expect("match");
    assert!(matches!(matched, ServiceMatch::Exact(_)));
}

#[test]
fn test_token_match_tries_tokens_in_request_order() {
    let services = vec![
        service(1, "Diseño de Cejas con Henna"),
        service(2, "Volumen Ruso"),
    ];
    // "quiero" (6 chars) matches nothing; "volumen" picks service 2 before
    // any later token could hit service 1
    let matched = match_service(&services, "quiero volumen con henna").expect("match");
    match matched {
        ServiceMatch::Token { service: found, token } => {
            assert_eq!(found.id, 2);
            assert_eq!(token, "volumen");
        }
        other => panic!("expected token match, got {other:?}"),
    }
}

#[test]
fn test_short_tokens_are_ignored(){
    let services = vec![service(1, "Depilación con hilo")];
    // every word has three characters or fewer; no token scan happens
    let matched = match_service(&services, "con el de la luz").expect("match");
    assert!(matches!(matched, ServiceMatch::FirstActive(_)));
}

#[test]
fn test_no_match_falls_back_to_lowest_id() {
    let services = vec![
        service(7, "Volumen Ruso"),
        service(3, "Lifting de Pestañas"),
    ];
    let matched = match_service(&services, "algo completamente distinto").expect("match");
    match matched {
        ServiceMatch::FirstActive(found) => assert_eq!(found.id, 3),
        other => panic!("expected first-active fallback, got {other:?}"),
    }
}

#[test]
fn test_token_tie_breaks_on_lowest_id() {
    // both names contain "cejas"; the lower id must win regardless of order
    let services = vec![
        service(9, "Laminado de Cejas"),
        service(4, "Diseño de Cejas"),
    ];
    let matched = match_service(&services, "algo de cejas").expect("match");
    match matched {
        ServiceMatch::Token { service: found, token } => {
            assert_eq!(found.id, 4);
            assert_eq!(token, "cejas");
        }
        other => panic!("expected token match, got {other:?}"),
    }
}

#[test]
fn test_empty_service_list_yields_none() {
    assert!(match_service(&[], "Manicura").is_none());
}
