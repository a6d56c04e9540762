use chrono::NaiveDate;
use rusqlite::Connection;
use shipyard_core::db::open_db_in_memory;
use shipyard_core::{
    PageRequest, Ship, ShipCriteria, ShipDraft, ShipOrder, ShipPatch, ShipRules, ShipService,
    ShipServiceError, ShipType, ShipValidationError, SqliteShipRepository,
};
use std::collections::HashSet;

fn service(conn: &Connection) -> ShipService<SqliteShipRepository<'_>> {
    ShipService::new(SqliteShipRepository::try_new(conn).unwrap())
}

fn date(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 7, 1).unwrap()
}

fn epoch_millis(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp_millis()
}

fn draft(name: &str) -> ShipDraft {
    ShipDraft {
        name: name.to_string(),
        planet: "Neptune".to_string(),
        ship_type: ShipType::Merchant,
        production_date: date(3000),
        used: false,
        speed: 0.5,
        crew_size: 100,
    }
}

fn names(ships: &[Ship]) -> Vec<&str> {
    ships.iter().map(Ship::name).collect()
}

#[test]
fn find_without_criteria_returns_every_ship() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let created: HashSet<_> = (0..3)
        .map(|_| service.create(draft("Twin")).unwrap().id().unwrap())
        .collect();

    let found: HashSet<_> = service
        .find(&ShipCriteria::default())
        .unwrap()
        .iter()
        .filter_map(Ship::id)
        .collect();
    assert_eq!(found, created);
}

#[test]
fn find_single_bound_and_intersection() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    service
        .create(ShipDraft {
            speed: 0.2,
            ..draft("slow")
        })
        .unwrap();
    service
        .create(ShipDraft {
            speed: 0.5,
            used: true,
            ..draft("medium")
        })
        .unwrap();
    service
        .create(ShipDraft {
            speed: 0.8,
            ..draft("fast")
        })
        .unwrap();

    let by_speed = ShipCriteria {
        min_speed: Some(0.5),
        ..ShipCriteria::default()
    };
    assert_eq!(names(&service.find(&by_speed).unwrap()), vec!["medium", "fast"]);

    let by_speed_and_new = ShipCriteria {
        used: Some(false),
        ..by_speed.clone()
    };
    assert_eq!(names(&service.find(&by_speed_and_new).unwrap()), vec!["fast"]);

    let capped = ShipCriteria {
        max_speed: Some(0.5),
        ..by_speed
    };
    assert_eq!(names(&service.find(&capped).unwrap()), vec!["medium"]);
}

#[test]
fn find_matches_text_substrings_type_and_crew_bounds() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    service
        .create(ShipDraft {
            planet: "Saturn".to_string(),
            ship_type: ShipType::Military,
            crew_size: 10,
            ..draft("Star Hammer")
        })
        .unwrap();
    service
        .create(ShipDraft {
            planet: "Mars".to_string(),
            crew_size: 500,
            ..draft("Star Runner")
        })
        .unwrap();
    service.create(draft("Comet")).unwrap();

    let star = ShipCriteria {
        name: Some("Star".to_string()),
        ..ShipCriteria::default()
    };
    assert_eq!(
        names(&service.find(&star).unwrap()),
        vec!["Star Hammer", "Star Runner"]
    );

    let saturn_military = ShipCriteria {
        planet: Some("tur".to_string()),
        ship_type: Some(ShipType::Military),
        ..ShipCriteria::default()
    };
    assert_eq!(
        names(&service.find(&saturn_military).unwrap()),
        vec!["Star Hammer"]
    );

    let crew_window = ShipCriteria {
        min_crew_size: Some(100),
        max_crew_size: Some(500),
        ..ShipCriteria::default()
    };
    assert_eq!(
        names(&service.find(&crew_window).unwrap()),
        vec!["Star Runner", "Comet"]
    );

    let case_sensitive = ShipCriteria {
        name: Some("star".to_string()),
        ..ShipCriteria::default()
    };
    assert!(service.find(&case_sensitive).unwrap().is_empty());
}

#[test]
fn find_date_bounds_are_inclusive() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    for (name, year) in [("old", 2900), ("mid", 3000), ("new", 3010)] {
        service
            .create(ShipDraft {
                production_date: date(year),
                ..draft(name)
            })
            .unwrap();
    }

    let window = ShipCriteria {
        after: Some(epoch_millis(date(2900))),
        before: Some(epoch_millis(date(3000))),
        ..ShipCriteria::default()
    };
    assert_eq!(names(&service.find(&window).unwrap()), vec!["old", "mid"]);

    let after_only = ShipCriteria {
        after: Some(epoch_millis(date(2950))),
        ..ShipCriteria::default()
    };
    assert_eq!(names(&service.find(&after_only).unwrap()), vec!["mid", "new"]);
}

#[test]
fn find_filters_by_rating_bounds() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    // 80 * 0.5 / (3019 - 3017 + 1) = 13.33
    service
        .create(ShipDraft {
            production_date: date(3017),
            ..draft("recent")
        })
        .unwrap();
    // 80 * 0.5 / (3019 - 3000 + 1) = 2.0
    service.create(draft("older")).unwrap();

    let top_rated = ShipCriteria {
        min_rating: Some(13.33),
        ..ShipCriteria::default()
    };
    assert_eq!(names(&service.find(&top_rated).unwrap()), vec!["recent"]);

    let low_rated = ShipCriteria {
        max_rating: Some(2.0),
        ..ShipCriteria::default()
    };
    assert_eq!(names(&service.find(&low_rated).unwrap()), vec!["older"]);
}

#[test]
fn find_rejects_unrepresentable_timestamp() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let criteria = ShipCriteria {
        after: Some(i64::MIN),
        ..ShipCriteria::default()
    };
    let err = service.find(&criteria).unwrap_err();
    assert!(matches!(err, ShipServiceError::InvalidTimestamp(i64::MIN)));
}

#[test]
fn count_matches_find_length() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    service.create(draft("a")).unwrap();
    service
        .create(ShipDraft {
            used: true,
            ..draft("b")
        })
        .unwrap();

    assert_eq!(service.count(&ShipCriteria::default()).unwrap(), 2);
    let used = ShipCriteria {
        used: Some(true),
        ..ShipCriteria::default()
    };
    assert_eq!(service.count(&used).unwrap(), 1);
}

#[test]
fn sort_orders_by_selected_key_or_keeps_input() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    for (name, year, speed) in [("a", 3000, 0.3), ("b", 2900, 0.9), ("c", 3010, 0.1)] {
        service
            .create(ShipDraft {
                production_date: date(year),
                speed,
                ..draft(name)
            })
            .unwrap();
    }
    let ships = service.find(&ShipCriteria::default()).unwrap();

    let by_date = service.sort(ships.clone(), Some(ShipOrder::Date));
    let years: Vec<_> = by_date.iter().map(Ship::production_year).collect();
    assert_eq!(years, vec![2900, 3000, 3010]);

    let by_speed = service.sort(ships.clone(), Some(ShipOrder::Speed));
    assert_eq!(names(&by_speed), vec!["c", "a", "b"]);

    let by_rating = service.sort(ships.clone(), Some(ShipOrder::Rating));
    let ratings: Vec<_> = by_rating.iter().map(Ship::rating).collect();
    assert!(ratings.windows(2).all(|pair| pair[0] <= pair[1]));

    let by_id = service.sort(by_date, Some(ShipOrder::Id));
    assert_eq!(names(&by_id), vec!["a", "b", "c"]);

    let unsorted = service.sort(ships.clone(), None);
    assert_eq!(unsorted, ships);
}

#[test]
fn paginate_slices_pages_with_defaults() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    for index in 0..10 {
        service.create(draft(&format!("ship-{index}"))).unwrap();
    }
    let ships = service.find(&ShipCriteria::default()).unwrap();

    let second_page = service
        .paginate(ships.clone(), PageRequest::new(1, 3))
        .unwrap();
    assert_eq!(names(&second_page), vec!["ship-3", "ship-4", "ship-5"]);

    let first_five = ships[..5].to_vec();
    let default_page = service
        .paginate(first_five, PageRequest::default())
        .unwrap();
    assert_eq!(names(&default_page), vec!["ship-0", "ship-1", "ship-2"]);

    let tail = service
        .paginate(ships.clone(), PageRequest::new(3, 3))
        .unwrap();
    assert_eq!(names(&tail), vec!["ship-9"]);

    let err = service
        .paginate(ships, PageRequest::new(4, 3))
        .unwrap_err();
    assert!(matches!(err, ShipServiceError::PageOutOfRange(page) if page.len == 10));
}

#[test]
fn paginate_uses_configured_default_page_size() {
    let conn = open_db_in_memory().unwrap();
    let rules = ShipRules {
        default_page_size: 2,
        ..ShipRules::default()
    };
    let service = ShipService::with_rules(SqliteShipRepository::try_new(&conn).unwrap(), rules);

    for name in ["a", "b", "c"] {
        service.create(draft(name)).unwrap();
    }
    let ships = service.find(&ShipCriteria::default()).unwrap();

    let page = service
        .paginate(
            ships,
            PageRequest {
                page_number: Some(1),
                page_size: None,
            },
        )
        .unwrap();
    assert_eq!(names(&page), vec!["c"]);
}

#[test]
fn find_page_filters_then_sorts_then_paginates() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    for (name, speed) in [("e", 0.5), ("d", 0.4), ("c", 0.3), ("b", 0.2), ("a", 0.1)] {
        service
            .create(ShipDraft {
                speed,
                ..draft(name)
            })
            .unwrap();
    }

    let criteria = ShipCriteria {
        min_speed: Some(0.2),
        ..ShipCriteria::default()
    };
    let page = service
        .find_page(&criteria, Some(ShipOrder::Speed), PageRequest::new(1, 2))
        .unwrap();
    assert_eq!(names(&page), vec!["d", "e"]);
}

#[test]
fn create_persists_ship_with_rating() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let created = service
        .create(ShipDraft {
            production_date: date(3017),
            ..draft("Herald")
        })
        .unwrap();

    assert_eq!(created.rating(), 13.33);
    let loaded = service.get_by_id(created.id().unwrap()).unwrap().unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn create_rejects_invalid_draft_without_persisting() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service
        .create(ShipDraft {
            production_date: date(3019),
            ..draft("Too new")
        })
        .unwrap_err();

    assert!(matches!(
        err,
        ShipServiceError::InvalidArgument(ShipValidationError::ProductionYearOutOfRange {
            year: 3019,
            ..
        })
    ));
    assert_eq!(service.count(&ShipCriteria::default()).unwrap(), 0);
}

#[test]
fn update_with_only_speed_recomputes_rating_and_persists() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let created = service
        .create(ShipDraft {
            production_date: date(3017),
            ..draft("Swift")
        })
        .unwrap();
    let patch = ShipPatch {
        speed: Some(0.8),
        ..ShipPatch::default()
    };
    let updated = service.update(created.clone(), &patch).unwrap();

    assert_eq!(updated.id(), created.id());
    assert_eq!(updated.rating(), 21.33);
    assert_eq!(updated.name(), created.name());
    assert_eq!(updated.planet(), created.planet());
    assert_eq!(updated.crew_size(), created.crew_size());

    let loaded = service.get_by_id(created.id().unwrap()).unwrap().unwrap();
    assert_eq!(loaded, updated);
}

#[test]
fn update_with_invalid_field_changes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let created = service.create(draft("Steady")).unwrap();
    let patch = ShipPatch {
        name: Some("Renamed".to_string()),
        planet: Some("p".repeat(51)),
        ..ShipPatch::default()
    };
    let err = service.update(created.clone(), &patch).unwrap_err();

    assert!(matches!(
        err,
        ShipServiceError::InvalidArgument(ShipValidationError::PlanetTooLong { chars: 51 })
    ));
    let loaded = service.get_by_id(created.id().unwrap()).unwrap().unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn update_by_id_reports_missing_ship() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service
        .update_by_id(77, &ShipPatch::default())
        .unwrap_err();
    assert!(matches!(err, ShipServiceError::NotFound(77)));

    let created = service.create(draft("Present")).unwrap();
    let patch = ShipPatch {
        used: Some(true),
        ..ShipPatch::default()
    };
    let updated = service.update_by_id(created.id().unwrap(), &patch).unwrap();
    assert!(updated.is_used());
    assert_eq!(updated.rating(), 1.0);
}

#[test]
fn get_by_id_returns_none_for_unknown_id() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    assert!(service.get_by_id(1).unwrap().is_none());
}

#[test]
fn delete_removes_ship_and_reports_missing_ids() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let first = service.create(draft("first")).unwrap();
    let second = service.create(draft("second")).unwrap();

    service.delete(&first).unwrap();
    service.delete_by_id(second.id().unwrap()).unwrap();
    assert_eq!(service.count(&ShipCriteria::default()).unwrap(), 0);

    let err = service.delete(&first).unwrap_err();
    assert!(matches!(err, ShipServiceError::NotFound(_)));
    let err = service.delete_by_id(second.id().unwrap()).unwrap_err();
    assert!(matches!(err, ShipServiceError::NotFound(_)));
}

#[test]
fn validate_applies_service_rules() {
    let conn = open_db_in_memory().unwrap();
    let default_service = service(&conn);
    let created = default_service
        .create(ShipDraft {
            production_date: date(2900),
            ..draft("Veteran")
        })
        .unwrap();
    assert!(default_service.validate(&created));

    let strict_rules = ShipRules {
        min_production_year: 2950,
        ..ShipRules::default()
    };
    let strict =
        ShipService::with_rules(SqliteShipRepository::try_new(&conn).unwrap(), strict_rules);
    assert!(!strict.validate(&created));
    assert!(matches!(
        strict.check(&created),
        Err(ShipValidationError::ProductionYearOutOfRange { year: 2900, .. })
    ));
}

#[test]
fn compute_rating_uses_reference_year() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    assert_eq!(service.compute_rating(0.5, false, date(3017)).unwrap(), 13.33);
    assert_eq!(service.compute_rating(0.5, true, date(3017)).unwrap(), 6.67);
    assert!(matches!(
        service.compute_rating(0.5, false, date(3025)),
        Err(ShipServiceError::InvalidArgument(
            ShipValidationError::RatingUndefined { .. }
        ))
    ));
}
