use serde_json::json;

use super::*;

fn response(value: serde_json::Value) -> TakwimResponse {
    serde_json::from_value(value).expect("fixture should deserialize")
}

fn wly01_payload() -> serde_json::Value {
    json!({
        "prayerTime": [{
            "hijri": "1448-05-05",
            "date": "17-Oct-2026",
            "day": "Saturday",
            "imsak": "05:44:00",
            "fajr": "05:54:00",
            "syuruk": "07:02:00",
            "dhuhr": "13:07:00",
            "asr": "16:11:00",
            "maghrib": "19:08:00",
            "isha": "20:17:00"
        }],
        "status": "OK!",
        "serverTime": "2026-10-17 06:00:01",
        "periodType": "today",
        "lang": "ms_my",
        "zone": "WLY01",
        "bearing": "292&#176; 31&#8242; 29&#8243;"
    })
}

#[test]
fn normalizes_full_payload() {
    let record = normalize_takwim("wly01", response(wly01_payload())).unwrap();

    assert_eq!(record.zone_label, "WLY01 - 292° 31′ 29″");
    assert_eq!(record.bearing, "292° 31′ 29″");
    assert_eq!(record.gregorian_date, "17/10/2026");
    assert_eq!(record.hijri_date, "05/05/1448");
    assert_eq!(record.subuh, "05:54");
    assert_eq!(record.zohor, "13:07");
    assert_eq!(record.isyak, "20:17");
    assert_eq!(record.validate("WLY01"), Ok(()));
}

#[test]
fn derives_dhuha_when_absent() {
    let record = normalize_takwim("WLY01", response(wly01_payload())).unwrap();
    assert_eq!(record.dhuha, "07:17");
}

#[test]
fn derives_dhuha_across_the_hour() {
    let mut payload = wly01_payload();
    payload["prayerTime"][0]["syuruk"] = json!("06:50:00");
    let record = normalize_takwim("WLY01", response(payload)).unwrap();
    assert_eq!(record.dhuha, "07:05");
}

#[test]
fn keeps_explicit_dhuha() {
    let mut payload = wly01_payload();
    payload["prayerTime"][0]["dhuha"] = json!("07:30:00");
    let record = normalize_takwim("WLY01", response(payload)).unwrap();
    assert_eq!(record.dhuha, "07:30");
}

#[test]
fn label_is_bare_zone_without_bearing() {
    let mut payload = wly01_payload();
    payload.as_object_mut().unwrap().remove("bearing");
    let record = normalize_takwim("WLY01", response(payload)).unwrap();
    assert_eq!(record.zone_label, "WLY01");
    assert_eq!(record.bearing, "WLY01");
}

#[test]
fn rejects_day_without_date() {
    let mut payload = wly01_payload();
    payload["prayerTime"][0]
        .as_object_mut()
        .unwrap()
        .remove("date");
    let err = normalize_takwim("WLY01", response(payload)).unwrap_err();
    assert!(
        matches!(err, ScraperError::InvalidPayload { ref reason, .. } if reason == "no gregorian date")
    );
}

#[test]
fn unparseable_date_fails_validation() {
    let mut payload = wly01_payload();
    payload["prayerTime"][0]["date"] = json!("17-Okt-2026");
    let record = normalize_takwim("WLY01", response(payload)).unwrap();
    assert_eq!(record.gregorian_date, "17-Okt-2026");
    assert_eq!(
        record.validate("WLY01"),
        Err(waktu_core::ValidationError::MalformedDate("17-Okt-2026".to_string()))
    );
}

#[test]
fn label_uses_zone_reported_by_source() {
    let mut payload = wly01_payload();
    payload["zone"] = json!("SGR01");
    let record = normalize_takwim("WLY01", response(payload)).unwrap();
    assert!(record.zone_label.starts_with("SGR01"));
    assert!(record.validate("WLY01").is_err());
}

#[test]
fn rejects_non_ok_status() {
    let mut payload = wly01_payload();
    payload["status"] = json!("NO_RECORD!");
    let err = normalize_takwim("WLY01", response(payload)).unwrap_err();
    assert!(matches!(err, ScraperError::InvalidPayload { ref zone, .. } if zone == "WLY01"));
}

#[test]
fn rejects_empty_day_list() {
    let err = normalize_takwim(
        "WLY01",
        response(json!({"prayerTime": [], "status": "OK!", "zone": "WLY01"})),
    )
    .unwrap_err();
    assert!(matches!(err, ScraperError::InvalidPayload { .. }));
}
