use chrono::Utc;

use super::*;

fn sample() -> PrayerTimeRecord {
    PrayerTimeRecord {
        zone_label: "WLY01 - 292° 31′ 29″".to_string(),
        bearing: "292° 31′ 29″".to_string(),
        gregorian_date: "17/10/2026".to_string(),
        hijri_date: "05/05/1448".to_string(),
        imsak: "05:44".to_string(),
        subuh: "05:54".to_string(),
        syuruk: "07:02".to_string(),
        dhuha: "07:17".to_string(),
        zohor: "13:07".to_string(),
        asar: "16:11".to_string(),
        maghrib: "19:08".to_string(),
        isyak: "20:17".to_string(),
        created_at: Utc::now(),
    }
}

#[test]
fn bare_zone_code_takes_text_before_first_dash() {
    assert_eq!(bare_zone_code("WLY01 - 292° 31′ 29″"), "WLY01");
    assert_eq!(bare_zone_code("sgr01-Gombak-Petaling"), "SGR01");
}

#[test]
fn bare_zone_code_uses_whole_label_without_dash() {
    assert_eq!(bare_zone_code(" jhr02 "), "JHR02");
}

#[test]
fn record_zone_code_is_derived_from_label() {
    assert_eq!(sample().zone_code(), "WLY01");
}

#[test]
fn validate_accepts_well_formed_record() {
    assert_eq!(sample().validate("wly01"), Ok(()));
}

#[test]
fn validate_rejects_wrong_zone() {
    let err = sample().validate("SGR01").unwrap_err();
    assert!(matches!(err, ValidationError::ZoneMismatch { ref requested, .. } if requested == "SGR01"));
}

#[test]
fn validate_rejects_blank_requested_zone() {
    assert_eq!(sample().validate(""), Err(ValidationError::BlankZone));
    assert_eq!(sample().validate("   "), Err(ValidationError::BlankZone));
}

#[test]
fn validate_rejects_missing_or_foreign_date() {
    for date in ["", "17-Okt-2026", "2026-10-17", "7/10/2026", "32/10/2026"] {
        let mut record = sample();
        record.gregorian_date = date.to_string();
        assert_eq!(
            record.validate("WLY01"),
            Err(ValidationError::MalformedDate(date.to_string())),
            "{date:?} should be rejected"
        );
    }
}

#[test]
fn validate_rejects_empty_subuh() {
    let mut record = sample();
    record.subuh = String::new();
    let err = record.validate("WLY01").unwrap_err();
    assert_eq!(
        err,
        ValidationError::MalformedTime {
            field: "subuh",
            value: String::new()
        }
    );
}

#[test]
fn validate_rejects_seconds_and_blank_dhuha() {
    let mut record = sample();
    record.isyak = "20:17:00".to_string();
    assert!(record.validate("WLY01").is_err());

    let mut record = sample();
    record.dhuha = String::new();
    assert!(matches!(
        record.validate("WLY01"),
        Err(ValidationError::MalformedTime { field: "dhuha", .. })
    ));
}

#[test]
fn minimum_viable_tolerates_blank_dhuha() {
    let mut record = sample();
    record.dhuha = String::new();
    assert!(record.is_minimum_viable());
}

#[test]
fn minimum_viable_requires_core_prayers() {
    for field in ["subuh", "zohor", "asar"] {
        let mut record = sample();
        match field {
            "subuh" => record.subuh = " ".to_string(),
            "zohor" => record.zohor = String::new(),
            _ => record.asar = String::new(),
        }
        assert!(!record.is_minimum_viable(), "{field} blank should fail");
    }
}

#[test]
fn record_serializes_with_snake_case_fields() {
    let json = serde_json::to_value(sample()).unwrap();
    assert_eq!(json["zone_label"], "WLY01 - 292° 31′ 29″");
    assert_eq!(json["gregorian_date"], "17/10/2026");
    assert!(json.get("created_at").is_some());
}
