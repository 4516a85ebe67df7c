//! Time-of-day itinerary generation
//!
//! Builds the day's activity plan from the hour of the caller's clock:
//! everything already underway today plus the next activity coming up.
//! Past 22:00 the plan rolls over to tomorrow's full template. Pure in
//! `now`; never suspends.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Timelike, Utc};

use crate::models::{ActivityType, ItineraryItem, Place};

/// Latest hour the current day's plan is still shown (inclusive).
const LAST_HOUR_OF_PLAN: u32 = 22;

struct Slot {
    time_label: &'static str,
    start_hour: u32,
    start_minute: u32,
    activity: &'static str,
    duration_label: &'static str,
    activity_type: ActivityType,
}

const TEMPLATE: [Slot; 5] = [
    Slot {
        time_label: "08:00 AM",
        start_hour: 8,
        start_minute: 0,
        activity: "Breakfast at Local Cafe",
        duration_label: "1 hour",
        activity_type: ActivityType::Dining,
    },
    Slot {
        time_label: "10:00 AM",
        start_hour: 10,
        start_minute: 0,
        activity: "Visit Historical Sites",
        duration_label: "2 hours",
        activity_type: ActivityType::Sightseeing,
    },
    Slot {
        time_label: "12:30 PM",
        start_hour: 12,
        start_minute: 30,
        activity: "Lunch at Popular Restaurant",
        duration_label: "1.5 hours",
        activity_type: ActivityType::Dining,
    },
    Slot {
        time_label: "03:00 PM",
        start_hour: 15,
        start_minute: 0,
        activity: "Local Market Tour",
        duration_label: "2 hours",
        activity_type: ActivityType::Shopping,
    },
    Slot {
        time_label: "06:00 PM",
        start_hour: 18,
        start_minute: 0,
        activity: "Evening City Tour",
        duration_label: "2 hours",
        activity_type: ActivityType::Tour,
    },
];

/// Generate the activity plan for `now`.
///
/// Today's plan lists every activity that has begun by the current hour plus
/// the next one coming up. After 22:00 the full template shifts one day
/// forward and every label gains a "Tomorrow" prefix.
///
/// When `nearby_by_category` is supplied, each item is annotated with the
/// first candidate place of its activity type whose category contains the
/// activity keyword (case-insensitive); the activity label is extended with
/// the place name. No distance ranking happens here.
#[must_use]
pub fn generate(
    now: DateTime<Utc>,
    nearby_by_category: Option<&HashMap<ActivityType, Vec<Place>>>,
) -> Vec<ItineraryItem> {
    let hour = now.hour();
    let rollover = hour > LAST_HOUR_OF_PLAN;
    let day = if rollover {
        now.date_naive() + Duration::days(1)
    } else {
        now.date_naive()
    };

    let mut items = Vec::new();
    let mut upcoming_added = false;
    for slot in &TEMPLATE {
        if !rollover && slot.start_hour > hour {
            // Only the first not-yet-started activity is previewed
            if upcoming_added {
                break;
            }
            upcoming_added = true;
        }

        let Some(starts_at) = day
            .and_hms_opt(slot.start_hour, slot.start_minute, 0)
            .map(|dt| dt.and_utc())
        else {
            continue;
        };

        let time_label = if rollover {
            format!("Tomorrow {}", slot.time_label)
        } else {
            slot.time_label.to_string()
        };

        let matched_place = find_match(slot.activity_type, nearby_by_category);
        let activity = match &matched_place {
            Some(place) => format!("{} at {}", slot.activity, place.display_name),
            None => slot.activity.to_string(),
        };

        items.push(ItineraryItem {
            time_label,
            activity,
            activity_type: slot.activity_type,
            duration_label: slot.duration_label.to_string(),
            matched_place,
            starts_at,
        });
    }
    items
}

/// First candidate of the activity type whose category contains the activity
/// keyword, case-insensitively.
fn find_match(
    activity: ActivityType,
    nearby: Option<&HashMap<ActivityType, Vec<Place>>>,
) -> Option<Place> {
    let candidates = nearby?.get(&activity)?;
    let keyword = activity.keyword();
    candidates
        .iter()
        .find(|place| place.category.to_lowercase().contains(keyword))
        .cloned()
}

/// Bucket a flat place list by activity type using the same keyword rule the
/// annotation applies.
#[must_use]
pub fn group_by_activity(places: &[Place]) -> HashMap<ActivityType, Vec<Place>> {
    let activities = [
        ActivityType::Dining,
        ActivityType::Sightseeing,
        ActivityType::Shopping,
        ActivityType::Tour,
    ];

    let mut grouped: HashMap<ActivityType, Vec<Place>> = HashMap::new();
    for place in places {
        let category = place.category.to_lowercase();
        for activity in activities {
            if category.contains(activity.keyword()) {
                grouped.entry(activity).or_default().push(place.clone());
            }
        }
    }
    grouped
}
