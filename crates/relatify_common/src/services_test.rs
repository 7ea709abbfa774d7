#[cfg(test)]
mod tests {
    use crate::civil::CivilDate;
    use crate::services::{
        CalendarEvent, EventSource, NewLocalEvent, OwnerId, PROVIDER_SENTINEL,
    };
    use chrono::DateTime;

    fn local_event() -> CalendarEvent {
        CalendarEvent {
            id: "42".to_string(),
            text: "Review".to_string(),
            date: CivilDate::parse("2024-03-01").unwrap(),
            color: Some("#58b7b3".to_string()),
            owner: OwnerId::Local("user-1".to_string()),
            source: EventSource::Local,
            start_time: None,
            end_time: None,
            location: None,
            preview: None,
            is_all_day: None,
        }
    }

    #[test]
    fn test_local_event_wire_shape() {
        let json = serde_json::to_value(local_event()).unwrap();
        assert_eq!(json["event_text"], "Review");
        assert_eq!(json["event_date"], "2024-03-01");
        assert_eq!(json["user_id"], "user-1");
        assert_eq!(json["source"], "local");
        // Optional provider-only fields stay off the wire entirely.
        assert!(json.get("startTime").is_none());
        assert!(json.get("location").is_none());
    }

    #[test]
    fn test_provider_sentinel_wire_shape() {
        let mut event = local_event();
        event.owner = OwnerId::ProviderSentinel;
        event.source = EventSource::Provider;
        event.start_time =
            Some(DateTime::parse_from_rfc3339("2024-03-01T10:00:00-08:00").unwrap());

        let json = serde_json::to_value(event).unwrap();
        assert_eq!(json["user_id"], PROVIDER_SENTINEL);
        assert_eq!(json["source"], "provider");
        assert!(json["startTime"].as_str().unwrap().starts_with("2024-03-01T10:00:00"));
    }

    #[test]
    fn test_owner_round_trips_through_the_sentinel_literal() {
        let owner: OwnerId = serde_json::from_str("\"outlook\"").unwrap();
        assert_eq!(owner, OwnerId::ProviderSentinel);
        let owner: OwnerId = serde_json::from_str("\"user-7\"").unwrap();
        assert_eq!(owner, OwnerId::Local("user-7".to_string()));
        assert!(serde_json::from_str::<OwnerId>("\"\"").is_err());
    }

    #[test]
    fn test_new_local_event_accepts_backend_payload() {
        let event: NewLocalEvent = serde_json::from_str(
            r##"{"event_text": "Call Dana", "event_date": "2024-03-05", "color": "#f6786e"}"##,
        )
        .unwrap();
        assert_eq!(event.event_text, "Call Dana");
        assert_eq!(event.event_date.date_key(), "2024-03-05");
        assert_eq!(event.color.as_deref(), Some("#f6786e"));
    }
}
