use chrono::{TimeZone, Utc};

use identra_application::SortClause;
use identra_domain::{AuditResult, EventCategoryType, SortDirection};

use super::query::{order_by, BindValue, MessageCriteriaBuilder, QueryParameter};

#[test]
fn criteria_compile_in_fragment_order() {
    let after = Utc
        .with_ymd_and_hms(2026, 8, 1, 0, 0, 0)
        .single()
        .unwrap_or_else(|| unreachable!());

    let (predicate, parameters) = MessageCriteriaBuilder::new()
        .entity_key(Some("74cd8ece-715a-44a4-a736-e17b46c4e7e6"))
        .event_type(Some(EventCategoryType::Rest))
        .category(Some("UserLogic"))
        .subcategory(None)
        .result(None)
        .events(&["create".to_owned(), "update".to_owned()])
        .before(None)
        .after(Some(after))
        .build();

    assert_eq!(
        predicate,
        concat!(
            " message LIKE '%key%74cd8ece-715a-44a4-a736-e17b46c4e7e6%'",
            " AND message LIKE '%\"type\":\"REST\"%'",
            " AND message LIKE '%\"category\":\"UserLogic\"%'",
            " AND ( message LIKE '%\"event\":\"create\"%' OR message LIKE '%\"event\":\"update\"%' )",
            " AND event_date >= $1"
        )
    );
    assert_eq!(parameters, [QueryParameter::DateTime(after)]);
}

#[test]
fn no_criteria_degenerates_to_tautology() {
    let (predicate, parameters) = MessageCriteriaBuilder::new().build();
    assert_eq!(predicate, " 1=1");
    assert!(parameters.is_empty());
}

#[test]
fn blank_category_and_subcategory_are_skipped() {
    let (predicate, _) = MessageCriteriaBuilder::new()
        .category(Some("   "))
        .subcategory(Some(""))
        .result(Some(AuditResult::Success))
        .build();

    assert_eq!(predicate, " message LIKE '%\"result\":\"SUCCESS\"%'");
}

#[test]
fn date_bounds_number_parameters_in_fragment_order() {
    let before = Utc
        .with_ymd_and_hms(2026, 8, 31, 0, 0, 0)
        .single()
        .unwrap_or_else(|| unreachable!());
    let after = Utc
        .with_ymd_and_hms(2026, 8, 1, 0, 0, 0)
        .single()
        .unwrap_or_else(|| unreachable!());

    let (predicate, parameters) = MessageCriteriaBuilder::new()
        .before(Some(before))
        .after(Some(after))
        .build();

    assert_eq!(predicate, " event_date <= $1 AND event_date >= $2");
    assert_eq!(
        parameters,
        [
            QueryParameter::DateTime(before),
            QueryParameter::DateTime(after)
        ]
    );
}

#[test]
fn boolean_parameters_normalise_to_ints() {
    assert_eq!(QueryParameter::Bool(true).normalise(), BindValue::Int(1));
    assert_eq!(QueryParameter::Bool(false).normalise(), BindValue::Int(0));
}

#[test]
fn datetime_parameters_pass_through() {
    let instant = Utc
        .with_ymd_and_hms(2026, 8, 25, 12, 0, 0)
        .single()
        .unwrap_or_else(|| unreachable!());
    assert_eq!(
        QueryParameter::DateTime(instant).normalise(),
        BindValue::DateTime(instant)
    );
}

#[test]
fn unsorted_requests_order_newest_first() {
    assert_eq!(order_by(&[]), " ORDER BY event_date DESC");
}

#[test]
fn sort_clauses_render_in_sequence() {
    let sort = vec![
        SortClause {
            property: "event_date".to_owned(),
            direction: SortDirection::Desc,
        },
        SortClause {
            property: "message".to_owned(),
            direction: SortDirection::Asc,
        },
    ];

    assert_eq!(order_by(&sort), " ORDER BY event_date DESC, message ASC");
}
